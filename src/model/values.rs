// File: ./src/model/values.rs
// Maps decoded VEVENTs to the values the importer writes
use crate::error::ImportError;
use crate::markup::MarkupConverter;
use crate::model::adapter::RawEvent;
use crate::model::item::{EventValues, OwnerId};
use chrono::{NaiveDateTime, Timelike};
use regex::Regex;
use std::sync::LazyLock;

static ADDRESS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^Address: (.+)$").expect("valid address pattern"));

/// Drops seconds and anything below.
pub fn truncate_to_minute(dt: NaiveDateTime) -> NaiveDateTime {
    dt.with_second(0)
        .and_then(|d| d.with_nanosecond(0))
        .unwrap_or(dt)
}

/// The location named by a single `Address: ...` line. Several such lines are
/// ambiguous and yield nothing.
pub fn extract_location(text: &str) -> Option<String> {
    let mut matches = ADDRESS_RE
        .captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim_end_matches('\r').to_string());
    let first = matches.next()?;
    if matches.next().is_some() {
        return None;
    }
    Some(first)
}

impl EventValues {
    /// Expects an event that passed the date filter, so start and end are set.
    pub fn from_raw(
        raw: &RawEvent,
        owner: &OwnerId,
        converter: &dyn MarkupConverter,
    ) -> Result<Self, ImportError> {
        let summary = raw.summary.clone().unwrap_or_default();
        let (start, end) = raw
            .window()
            .ok_or_else(|| ImportError::Decode(format!("event '{}' has no start or end", summary)))?;
        let uid = raw
            .uid
            .clone()
            .ok_or_else(|| ImportError::MissingIdentifier {
                summary: summary.clone(),
            })?;

        let (description, location) = match &raw.description {
            Some(desc) => (
                Some(converter.to_safe_markup(desc)),
                extract_location(desc),
            ),
            None => (None, None),
        };

        Ok(EventValues {
            name: summary,
            start: truncate_to_minute(start),
            stop: truncate_to_minute(end),
            event_identifier: uid,
            owner: owner.clone(),
            description,
            location,
        })
    }
}
