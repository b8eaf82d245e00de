// File: ./src/model/mod.rs
// Aggregates the split model files
pub mod adapter;
pub mod item;
pub mod values;

pub use adapter::RawEvent;
pub use item::{DATETIME_FORMAT, EventChanges, EventValues, OwnerId, StoredEvent};
