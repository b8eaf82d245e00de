// File: ./src/import/filter.rs
use crate::model::RawEvent;
use chrono::{NaiveDate, NaiveDateTime};

/// Optional import window, compared at date granularity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self { start, end }
    }

    pub fn between(start: NaiveDate, end: NaiveDate) -> Self {
        Self::new(Some(start), Some(end))
    }

    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Events are only windowed when both bounds are present.
    pub fn is_bounded(&self) -> bool {
        self.start.is_some() && self.end.is_some()
    }

    /// Full containment: an event straddling either bound is outside.
    pub fn contains(&self, start: NaiveDateTime, end: NaiveDateTime) -> bool {
        match (self.start, self.end) {
            (Some(from), Some(to)) => from <= start.date() && to >= end.date(),
            _ => true,
        }
    }
}

/// Events without a start or an end never pass.
pub fn include(event: &RawEvent, range: &DateRange) -> bool {
    event
        .window()
        .is_some_and(|(start, end)| range.contains(start, end))
}
