use thiserror::Error;

/// Errors raised by an import run.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Only ics files are supported (got '{0}')")]
    UnsupportedFormat(String),

    #[error("Could not decode calendar file: {0}")]
    Decode(String),

    /// Per-event condition: the run skips the event and continues.
    #[error("Event '{summary}' has no UID and cannot be reconciled")]
    MissingIdentifier { summary: String },

    #[error("Event store error: {0}")]
    Store(#[from] StoreError),
}

/// Errors raised by an [`EventStore`](crate::store::EventStore) backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Could not acquire lock on {0}")]
    Lock(String),

    #[error("No stored event with id {0}")]
    UnknownEvent(String),
}
