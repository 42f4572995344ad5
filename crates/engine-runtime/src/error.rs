use connectors::{file::csv::error::FileError, store::StoreError};
use engine_config::settings::error::SettingsError;
use engine_processing::error::{ConsumerError, ProducerError};
use thiserror::Error;

/// Top-level errors of an ingest run.
#[derive(Debug, Error)]
pub enum IngestError {
    /// The run configuration was rejected.
    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),

    /// The destination could not be reached or refused a connection.
    #[error("Destination unreachable: {0}")]
    Unreachable(#[source] StoreError),

    /// The input could not be opened or has no header.
    #[error("Source error: {0}")]
    Source(#[from] FileError),

    #[error("Producer error: {0}")]
    Producer(#[from] ProducerError),

    #[error("Worker {worker} failed: {source}")]
    Worker {
        worker: usize,
        #[source]
        source: ConsumerError,
    },

    /// An error occurred while joining a task.
    /// This usually indicates that the task panicked.
    #[error("Task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),

    /// The run was cancelled from outside, e.g. by a shutdown signal.
    #[error("Ingest run cancelled")]
    Cancelled,
}

impl IngestError {
    /// Whether this error only reflects a cancellation caused elsewhere.
    pub fn is_cancellation(&self) -> bool {
        match self {
            IngestError::Cancelled => true,
            IngestError::Producer(e) => e.is_cancellation(),
            IngestError::Worker { source, .. } => source.is_cancellation(),
            _ => false,
        }
    }
}
