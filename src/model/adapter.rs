// File: ./src/model/adapter.rs
// Typed decoding of VEVENT components
use chrono::{NaiveDate, NaiveDateTime};
use icalendar::{Calendar, CalendarComponent, Component, Event};

/// The properties of a VEVENT the importer consumes, decoded once right after
/// parsing so nothing downstream touches raw properties.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawEvent {
    pub start: Option<NaiveDateTime>,
    pub end: Option<NaiveDateTime>,
    pub summary: Option<String>,
    pub uid: Option<String>,
    pub description: Option<String>,
}

impl RawEvent {
    pub fn from_event(event: &Event) -> Self {
        let props = event.properties();
        let start = props
            .get("DTSTART")
            .and_then(|p| decode_datetime(p.value()));
        let end = props.get("DTEND").and_then(|p| decode_datetime(p.value()));

        // Text values arrive already unescaped by the parser.
        RawEvent {
            start,
            end,
            summary: event.get_summary().map(str::to_string),
            uid: event
                .get_uid()
                .map(str::trim)
                .filter(|uid| !uid.is_empty())
                .map(str::to_string),
            description: event
                .get_description()
                .filter(|desc| !desc.is_empty())
                .map(str::to_string),
        }
    }

    /// Start and end together, or nothing if either is missing.
    pub fn window(&self) -> Option<(NaiveDateTime, NaiveDateTime)> {
        Some((self.start?, self.end?))
    }
}

/// Every VEVENT of the calendar, in document order. Timezone blocks, todos and
/// other components are ignored.
pub fn events_from_calendar(calendar: &Calendar) -> Vec<RawEvent> {
    calendar
        .components
        .iter()
        .filter_map(|c| match c {
            CalendarComponent::Event(e) => Some(RawEvent::from_event(e)),
            _ => None,
        })
        .collect()
}

/// Naive decoding: dates become midnight, UTC and TZID wall times are taken
/// as written.
pub fn decode_datetime(val: &str) -> Option<NaiveDateTime> {
    let val = val.trim();
    if val.len() == 8 {
        return NaiveDate::parse_from_str(val, "%Y%m%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0));
    }
    NaiveDateTime::parse_from_str(
        val,
        if val.ends_with('Z') {
            "%Y%m%dT%H%M%SZ"
        } else {
            "%Y%m%dT%H%M%S"
        },
    )
    .ok()
}
