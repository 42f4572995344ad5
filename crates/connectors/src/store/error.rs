use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Destination '{endpoint}' is unreachable: {reason}")]
    Unreachable { endpoint: String, reason: String },

    #[error("ClickHouse error: {0}")]
    ClickHouse(#[from] ::clickhouse::error::Error),

    #[error("Batch for table '{0}' was already sent")]
    BatchConsumed(String),

    #[error("Write rejected by destination: {0}")]
    Rejected(String),
}
