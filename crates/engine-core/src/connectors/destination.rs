use connectors::store::{
    StoreConnection, StoreConnector, StoreError,
    clickhouse::{ClickHouseConnector, ClickHouseOptions},
    memory::MemoryStore,
};
use model::core::schema::TableSchema;
use std::{fmt::Display, sync::Arc};
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DestinationKind {
    ClickHouse,
    Memory,
}

impl Display for DestinationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DestinationKind::ClickHouse => write!(f, "ClickHouse"),
            DestinationKind::Memory => write!(f, "Memory"),
        }
    }
}

/// The table rows are loaded into, plus the means to open connections to it.
#[derive(Clone)]
pub struct Destination {
    pub kind: DestinationKind,
    pub table: TableSchema,
    connector: Arc<dyn StoreConnector>,
}

impl Destination {
    pub fn clickhouse(options: ClickHouseOptions, table: TableSchema) -> Self {
        Destination {
            kind: DestinationKind::ClickHouse,
            table,
            connector: Arc::new(ClickHouseConnector::new(options)),
        }
    }

    pub fn memory(store: MemoryStore, table: TableSchema) -> Self {
        Destination {
            kind: DestinationKind::Memory,
            table,
            connector: Arc::new(store),
        }
    }

    pub fn endpoint(&self) -> String {
        self.connector.endpoint()
    }

    /// Opens a new, unshared connection.
    pub async fn connect(&self) -> Result<Box<dyn StoreConnection>, StoreError> {
        self.connector.connect().await
    }

    /// Opens a connection and checks that the store answers.
    pub async fn verify(&self) -> Result<Box<dyn StoreConnection>, StoreError> {
        let conn = self.connect().await?;
        conn.ping().await?;
        info!(
            destination = %self.kind,
            endpoint = %self.endpoint(),
            table = %self.table.name,
            "Destination reachable"
        );
        Ok(conn)
    }
}
