use thiserror::Error;

/// Errors raised when validating ingest settings.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// Batches must hold at least one row.
    #[error("Invalid batch size: {0} (must be at least 1)")]
    InvalidBatchSize(usize),

    /// At least one worker is needed to drain the record channel.
    #[error("Invalid worker count: {0} (must be at least 1)")]
    InvalidWorkerCount(usize),

    /// The delimiter must be a single ASCII byte other than quote or newline.
    #[error("Invalid delimiter: {0:?}")]
    InvalidDelimiter(char),

    #[error("Missing required setting: {0}")]
    MissingValue(&'static str),
}
