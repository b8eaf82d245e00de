// File: ./src/import/mod.rs
//! ICS import pipeline: parse, window, map, reconcile, then prune.
//!
//! One [`Importer::run`] is one logical unit of work against an
//! [`EventStore`]. [`Importer::run_locked`] wraps it in the owner lock and a
//! [`LocalStorage`] transaction so a failure leaves the stored file untouched.
pub mod filter;
pub mod parser;
pub mod prune;
pub mod reconcile;

pub use filter::DateRange;
pub use parser::parse_ics;
pub use prune::{PruneOutcome, prune};
pub use reconcile::{Outcome, diff, reconcile};

use crate::error::ImportError;
use crate::markup::{MarkupConverter, PlaintextHtml};
use crate::model::{EventValues, OwnerId};
use crate::storage::LocalStorage;
use crate::store::{EventStore, PruneQuery};
use std::collections::BTreeSet;
use tracing::{debug, info, warn};

#[derive(Debug, Clone)]
pub struct ImportRequest {
    pub filename: String,
    pub content: Vec<u8>,
    pub owner: OwnerId,
    pub range: DateRange,
    /// Prune previously imported events that are not in this import.
    pub remove_old: bool,
}

impl ImportRequest {
    pub fn new(filename: impl Into<String>, content: impl Into<Vec<u8>>, owner: OwnerId) -> Self {
        Self {
            filename: filename.into(),
            content: content.into(),
            owner,
            range: DateRange::unbounded(),
            remove_old: true,
        }
    }

    pub fn with_range(mut self, range: DateRange) -> Self {
        self.range = range;
        self
    }

    pub fn remove_old(mut self, remove_old: bool) -> Self {
        self.remove_old = remove_old;
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImportReport {
    pub created: usize,
    pub updated: usize,
    pub unchanged: usize,
    /// Events in the window that could not be imported (no UID).
    pub skipped: usize,
    /// Events outside the window or without start/end.
    pub filtered_out: usize,
    pub pruned: usize,
    pub deleted: usize,
    pub seen: BTreeSet<String>,
}

impl ImportReport {
    pub fn summary(&self) -> String {
        format!(
            "{} created, {} updated, {} unchanged, {} skipped, {} outside range, {} pruned ({} deleted)",
            self.created,
            self.updated,
            self.unchanged,
            self.skipped,
            self.filtered_out,
            self.pruned,
            self.deleted
        )
    }
}

pub struct Importer<C = PlaintextHtml> {
    converter: C,
}

impl Default for Importer<PlaintextHtml> {
    fn default() -> Self {
        Self::new()
    }
}

impl Importer<PlaintextHtml> {
    pub fn new() -> Self {
        Self {
            converter: PlaintextHtml,
        }
    }
}

impl<C: MarkupConverter> Importer<C> {
    pub fn with_converter(converter: C) -> Self {
        Self { converter }
    }

    pub fn run<S: EventStore + ?Sized>(
        &self,
        request: &ImportRequest,
        store: &mut S,
    ) -> Result<ImportReport, ImportError> {
        let events = parse_ics(&request.content, &request.filename)?;
        info!(
            "Importing {} VEVENT(s) from {} for {}",
            events.len(),
            request.filename,
            request.owner
        );

        let mut report = ImportReport::default();
        for raw in &events {
            if !filter::include(raw, &request.range) {
                report.filtered_out += 1;
                continue;
            }
            let values = match EventValues::from_raw(raw, &request.owner, &self.converter) {
                Ok(v) => v,
                Err(e @ ImportError::MissingIdentifier { .. }) => {
                    warn!("Skipping event: {}", e);
                    report.skipped += 1;
                    continue;
                }
                Err(e) => return Err(e),
            };

            report.seen.insert(values.event_identifier.clone());
            match reconcile(store, &values)? {
                Outcome::Created(_) => report.created += 1,
                Outcome::Updated { .. } => report.updated += 1,
                Outcome::Unchanged(_) => report.unchanged += 1,
            }
        }

        if request.remove_old {
            let query = PruneQuery {
                seen: report.seen.clone(),
                owner: request.owner.clone(),
                range_start: request.range.start,
                range_end: request.range.end,
            };
            let outcome = prune(store, &query)?;
            report.pruned = outcome.released;
            report.deleted = outcome.deleted;
        } else {
            debug!("Keeping events missing from {}", request.filename);
        }

        info!("Import of {} finished: {}", request.filename, report.summary());
        Ok(report)
    }

    /// Same as [`run`](Self::run), serialized per owner and committed
    /// atomically to `storage`.
    pub fn run_locked(
        &self,
        storage: &LocalStorage,
        request: &ImportRequest,
    ) -> Result<ImportReport, ImportError> {
        let _guard = storage.owner_lock(&request.owner)?;
        storage.transaction(|store| self.run(request, store))
    }
}
