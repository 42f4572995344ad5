use connectors::store::StoreError;
use engine_runtime::error::IngestError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("Ingest failed: {0}")]
    Runner(#[from] IngestError),

    #[error("Connection test failed: {0}")]
    Connection(#[from] StoreError),

    #[error("Failed to serialize data to JSON: {0}")]
    JsonSerialize(#[from] serde_json::Error),

    #[error("Failed to write the report: {0}")]
    ReportWrite(#[from] std::io::Error),

    #[error("Shutdown requested")]
    ShutdownRequested,
}

impl CliError {
    pub fn is_cancellation(&self) -> bool {
        matches!(
            self,
            CliError::ShutdownRequested | CliError::Runner(IngestError::Cancelled)
        )
    }
}
