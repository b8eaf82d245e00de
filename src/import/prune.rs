// File: ./src/import/prune.rs
// Drops the importing owner from events that vanished from the calendar
use crate::error::StoreError;
use crate::model::EventChanges;
use crate::store::{EventStore, PruneQuery};
use tracing::debug;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PruneOutcome {
    /// Events the owner was removed from.
    pub released: usize,
    /// Of those, events left without any owner and deleted.
    pub deleted: usize,
}

/// Other owners keep their membership, and an event is only deleted once
/// nobody owns it.
pub fn prune<S: EventStore + ?Sized>(
    store: &mut S,
    query: &PruneQuery,
) -> Result<PruneOutcome, StoreError> {
    let mut outcome = PruneOutcome::default();
    let changes = EventChanges {
        owner_removed: Some(query.owner.clone()),
        ..Default::default()
    };

    for stale in store.find_stale(query)? {
        let event = store.update(&stale, &changes)?;
        outcome.released += 1;
        if event.partner_ids.is_empty() {
            store.delete(&event)?;
            outcome.deleted += 1;
            debug!("Deleted orphaned event {} ({:?})", event.id, event.event_identifier);
        } else {
            debug!(
                "Removed {} from event {} ({} owner(s) left)",
                query.owner,
                event.id,
                event.partner_ids.len()
            );
        }
    }
    Ok(outcome)
}
