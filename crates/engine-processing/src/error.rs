use connectors::{file::csv::error::FileError, store::StoreError};
use model::records::{batch::BatchId, coercion::CoercionError};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConsumerError {
    #[error("Failed to prepare batch '{batch_id}': {source}")]
    Prepare {
        batch_id: BatchId,
        #[source]
        source: StoreError,
    },

    #[error("Failed to append row to batch '{batch_id}': {source}")]
    Append {
        batch_id: BatchId,
        #[source]
        source: StoreError,
    },

    #[error("Failed to commit batch '{batch_id}': {source}")]
    Commit {
        batch_id: BatchId,
        #[source]
        source: StoreError,
    },

    #[error("Record coercion failed: {0}")]
    Coercion(#[from] CoercionError),

    #[error("Worker stopped after the run was cancelled")]
    Cancelled,
}

impl ConsumerError {
    /// Whether this error is only a reaction to a failure elsewhere.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, ConsumerError::Cancelled)
    }
}

#[derive(Error, Debug)]
pub enum ProducerError {
    #[error("Failed to decode input: {0}")]
    Decode(#[from] FileError),

    #[error("The record channel closed before the input was exhausted")]
    ChannelClosed,

    #[error("Producer stopped after the run was cancelled")]
    Cancelled,
}

impl ProducerError {
    /// Whether this error is only a reaction to a failure elsewhere.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, ProducerError::Cancelled | ProducerError::ChannelClosed)
    }
}
