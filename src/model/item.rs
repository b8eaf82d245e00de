// File: ./src/model/item.rs
// Record types shared by the importer and the stores
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;
use uuid::Uuid;

/// Storage format for start/stop, minute precision with zeroed seconds.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// The party on whose behalf events are imported.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(transparent)]
pub struct OwnerId(pub String);

impl OwnerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct StoredEvent {
    pub id: String,
    pub name: String,
    pub start: NaiveDateTime,
    pub stop: NaiveDateTime,
    /// Only imported events carry one.
    #[serde(default)]
    pub event_identifier: Option<String>,
    #[serde(default)]
    pub partner_ids: BTreeSet<OwnerId>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
}

impl StoredEvent {
    /// Builds a fresh record from imported values. The owner is added to an
    /// empty owner set.
    pub fn from_values(values: &EventValues) -> Self {
        let mut partner_ids = BTreeSet::new();
        partner_ids.insert(values.owner.clone());
        Self {
            id: Uuid::new_v4().to_string(),
            name: values.name.clone(),
            start: values.start,
            stop: values.stop,
            event_identifier: Some(values.event_identifier.clone()),
            partner_ids,
            location: values.location.clone(),
            description: values.description.clone(),
        }
    }

    pub fn is_owned_by(&self, owner: &OwnerId) -> bool {
        self.partner_ids.contains(owner)
    }

    pub fn to_display_string(&self) -> String {
        let mut s = format!(
            "{} -> {}  {}",
            self.start.format(DATETIME_FORMAT),
            self.stop.format(DATETIME_FORMAT),
            self.name
        );
        if let Some(loc) = &self.location {
            s.push_str(&format!(" @ {}", loc));
        }
        if let Some(uid) = &self.event_identifier {
            s.push_str(&format!(" [{}]", uid));
        }
        s
    }
}

/// Normalized values derived from one imported VEVENT.
#[derive(Debug, Clone, PartialEq)]
pub struct EventValues {
    pub name: String,
    pub start: NaiveDateTime,
    pub stop: NaiveDateTime,
    pub event_identifier: String,
    pub owner: OwnerId,
    pub description: Option<String>,
    pub location: Option<String>,
}

/// Field-level changes to write onto an existing record.
///
/// `None` means "leave untouched". For the optional columns the inner option is
/// the new value, so `Some(None)` clears the column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EventChanges {
    pub start: Option<NaiveDateTime>,
    pub stop: Option<NaiveDateTime>,
    pub name: Option<String>,
    pub location: Option<Option<String>>,
    pub description: Option<Option<String>>,
    /// Owners are added or removed one at a time, never replaced.
    pub owner_added: Option<OwnerId>,
    pub owner_removed: Option<OwnerId>,
}

impl EventChanges {
    pub fn is_empty(&self) -> bool {
        self.field_count() == 0
    }

    pub fn field_count(&self) -> usize {
        [
            self.start.is_some(),
            self.stop.is_some(),
            self.name.is_some(),
            self.location.is_some(),
            self.description.is_some(),
            self.owner_added.is_some(),
            self.owner_removed.is_some(),
        ]
        .iter()
        .filter(|changed| **changed)
        .count()
    }

    pub fn apply_to(&self, event: &mut StoredEvent) {
        if let Some(start) = self.start {
            event.start = start;
        }
        if let Some(stop) = self.stop {
            event.stop = stop;
        }
        if let Some(name) = &self.name {
            event.name = name.clone();
        }
        if let Some(location) = &self.location {
            event.location = location.clone();
        }
        if let Some(description) = &self.description {
            event.description = description.clone();
        }
        if let Some(owner) = &self.owner_added {
            event.partner_ids.insert(owner.clone());
        }
        if let Some(owner) = &self.owner_removed {
            event.partner_ids.remove(owner);
        }
    }
}
