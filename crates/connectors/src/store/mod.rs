//! The destination store collaborator.
//!
//! A [`StoreConnector`] opens connections, a [`StoreConnection`] verifies
//! reachability and starts bulk inserts, and a [`PreparedBatch`] collects rows
//! until it is sent as one write. Connections are never shared between workers:
//! each worker asks the connector for its own.

use async_trait::async_trait;
use model::{core::schema::TableSchema, records::row::PerformanceRow};

pub mod clickhouse;
pub mod error;
pub mod memory;

pub use error::StoreError;

#[async_trait]
pub trait StoreConnector: Send + Sync {
    /// Human readable address of the store, for logs and errors.
    fn endpoint(&self) -> String;

    async fn connect(&self) -> Result<Box<dyn StoreConnection>, StoreError>;
}

#[async_trait]
pub trait StoreConnection: Send + Sync {
    async fn ping(&self) -> Result<(), StoreError>;

    async fn prepare_batch(
        &self,
        table: &TableSchema,
    ) -> Result<Box<dyn PreparedBatch>, StoreError>;
}

#[async_trait]
pub trait PreparedBatch: Send {
    async fn append(&mut self, row: &PerformanceRow) -> Result<(), StoreError>;

    /// Completes the insert and returns the number of rows written.
    /// A batch can be sent once.
    async fn send(&mut self) -> Result<usize, StoreError>;
}
