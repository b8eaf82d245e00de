// File: ./src/import/reconcile.rs
// Create-or-update by event identifier
use crate::error::StoreError;
use crate::model::{EventChanges, EventValues, StoredEvent};
use crate::store::EventStore;
use tracing::debug;

#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Created(StoredEvent),
    Updated { event: StoredEvent, fields: usize },
    Unchanged(StoredEvent),
}

/// Only the fields that differ, plus the owner if it is not yet on the event.
pub fn diff(existing: &StoredEvent, values: &EventValues) -> EventChanges {
    let mut changes = EventChanges::default();
    if existing.start != values.start {
        changes.start = Some(values.start);
    }
    if existing.stop != values.stop {
        changes.stop = Some(values.stop);
    }
    if existing.name != values.name {
        changes.name = Some(values.name.clone());
    }
    if !existing.is_owned_by(&values.owner) {
        changes.owner_added = Some(values.owner.clone());
    }
    if existing.location != values.location {
        changes.location = Some(values.location.clone());
    }
    if existing.description != values.description {
        changes.description = Some(values.description.clone());
    }
    changes
}

pub fn reconcile<S: EventStore + ?Sized>(
    store: &mut S,
    values: &EventValues,
) -> Result<Outcome, StoreError> {
    match store.find_by_identifier(&values.event_identifier)? {
        None => {
            let event = store.create(values)?;
            debug!("Created event {} ({})", event.id, values.event_identifier);
            Ok(Outcome::Created(event))
        }
        Some(existing) => {
            let changes = diff(&existing, values);
            if changes.is_empty() {
                return Ok(Outcome::Unchanged(existing));
            }
            let fields = changes.field_count();
            let event = store.update(&existing, &changes)?;
            debug!(
                "Updated {} field(s) on event {} ({})",
                fields, event.id, values.event_identifier
            );
            Ok(Outcome::Updated { event, fields })
        }
    }
}
