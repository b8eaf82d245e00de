// File: ./src/store.rs
// Repository seam between the importer and whatever keeps the events
use crate::error::StoreError;
use crate::model::{EventChanges, EventValues, OwnerId, StoredEvent};
use chrono::NaiveDate;
use std::collections::BTreeSet;

/// Selects previously imported events of one owner that the current run did
/// not see.
#[derive(Debug, Clone, PartialEq)]
pub struct PruneQuery {
    pub seen: BTreeSet<String>,
    pub owner: OwnerId,
    pub range_start: Option<NaiveDate>,
    pub range_end: Option<NaiveDate>,
}

impl PruneQuery {
    pub fn matches(&self, event: &StoredEvent) -> bool {
        let Some(uid) = event.event_identifier.as_deref() else {
            return false;
        };
        if uid.is_empty() || self.seen.contains(uid) || !event.is_owned_by(&self.owner) {
            return false;
        }
        if let Some(start) = self.range_start
            && event.start.date() < start
        {
            return false;
        }
        if let Some(end) = self.range_end
            && event.stop.date() > end
        {
            return false;
        }
        true
    }
}

pub trait EventStore {
    /// At most one record is expected per identifier.
    fn find_by_identifier(&self, identifier: &str) -> Result<Option<StoredEvent>, StoreError>;

    fn create(&mut self, values: &EventValues) -> Result<StoredEvent, StoreError>;

    /// Writes only the fields present in `changes` and returns the new state.
    fn update(
        &mut self,
        event: &StoredEvent,
        changes: &EventChanges,
    ) -> Result<StoredEvent, StoreError>;

    fn delete(&mut self, event: &StoredEvent) -> Result<(), StoreError>;

    fn find_stale(&self, query: &PruneQuery) -> Result<Vec<StoredEvent>, StoreError>;

    fn all(&self) -> Result<Vec<StoredEvent>, StoreError>;
}

/// Vec-backed store. Also the working copy inside a
/// [`LocalStorage`](crate::storage::LocalStorage) transaction.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    events: Vec<StoredEvent>,
    write_count: usize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_events(events: Vec<StoredEvent>) -> Self {
        Self {
            events,
            write_count: 0,
        }
    }

    pub fn events(&self) -> &[StoredEvent] {
        &self.events
    }

    /// Number of field writes performed by `update` since creation.
    pub fn write_count(&self) -> usize {
        self.write_count
    }

    fn position(&self, id: &str) -> Result<usize, StoreError> {
        self.events
            .iter()
            .position(|e| e.id == id)
            .ok_or_else(|| StoreError::UnknownEvent(id.to_string()))
    }
}

impl EventStore for MemoryStore {
    fn find_by_identifier(&self, identifier: &str) -> Result<Option<StoredEvent>, StoreError> {
        Ok(self
            .events
            .iter()
            .find(|e| e.event_identifier.as_deref() == Some(identifier))
            .cloned())
    }

    fn create(&mut self, values: &EventValues) -> Result<StoredEvent, StoreError> {
        let event = StoredEvent::from_values(values);
        self.events.push(event.clone());
        Ok(event)
    }

    fn update(
        &mut self,
        event: &StoredEvent,
        changes: &EventChanges,
    ) -> Result<StoredEvent, StoreError> {
        let idx = self.position(&event.id)?;
        changes.apply_to(&mut self.events[idx]);
        self.write_count += changes.field_count();
        Ok(self.events[idx].clone())
    }

    fn delete(&mut self, event: &StoredEvent) -> Result<(), StoreError> {
        let idx = self.position(&event.id)?;
        self.events.remove(idx);
        Ok(())
    }

    fn find_stale(&self, query: &PruneQuery) -> Result<Vec<StoredEvent>, StoreError> {
        Ok(self
            .events
            .iter()
            .filter(|e| query.matches(e))
            .cloned()
            .collect())
    }

    fn all(&self) -> Result<Vec<StoredEvent>, StoreError> {
        Ok(self.events.clone())
    }
}
