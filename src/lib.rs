pub mod config;
pub mod error;
pub mod import;
pub mod markup;
pub mod model;
pub mod storage;
pub mod store;
