use crate::store::{PreparedBatch, StoreConnection, StoreConnector, StoreError};
use async_trait::async_trait;
use model::{core::schema::TableSchema, records::row::PerformanceRow};
use std::{
    sync::{
        Arc, Mutex, PoisonError,
        atomic::{AtomicUsize, Ordering},
    },
    time::Duration,
};
use tracing::debug;

/// A batch as it landed in the memory store.
#[derive(Debug, Clone)]
pub struct CommittedBatch {
    pub connection: usize,
    pub table: String,
    pub row_count: usize,
    /// Empty when the store does not retain rows.
    pub rows: Vec<PerformanceRow>,
}

#[derive(Debug, Default)]
struct MemoryState {
    committed: Mutex<Vec<CommittedBatch>>,
    connections: AtomicUsize,
    prepared: AtomicUsize,
    send_attempts: AtomicUsize,
}

/// In-process destination used for dry runs and tests.
///
/// Clones share the same state, so a test can keep one handle for assertions
/// while the pipeline owns another.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    state: Arc<MemoryState>,
    reachable: bool,
    retain_rows: bool,
    fail_on_send: Option<usize>,
    send_delay: Option<Duration>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore {
            state: Arc::new(MemoryState::default()),
            reachable: true,
            retain_rows: true,
            fail_on_send: None,
            send_delay: None,
        }
    }

    /// A store that only counts rows.
    pub fn counting() -> Self {
        MemoryStore {
            retain_rows: false,
            ..Self::new()
        }
    }

    pub fn unreachable(mut self) -> Self {
        self.reachable = false;
        self
    }

    /// Rejects the `n`-th send (1-based, counted across all connections).
    pub fn fail_on_send(mut self, n: usize) -> Self {
        self.fail_on_send = Some(n);
        self
    }

    /// Makes every send take at least `delay`, to simulate a slow destination.
    pub fn with_send_delay(mut self, delay: Duration) -> Self {
        self.send_delay = Some(delay);
        self
    }

    pub fn committed(&self) -> Vec<CommittedBatch> {
        self.state
            .committed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn committed_rows(&self) -> usize {
        self.committed().iter().map(|b| b.row_count).sum()
    }

    pub fn connections_opened(&self) -> usize {
        self.state.connections.load(Ordering::SeqCst)
    }

    pub fn batches_prepared(&self) -> usize {
        self.state.prepared.load(Ordering::SeqCst)
    }

    fn check_reachable(&self) -> Result<(), StoreError> {
        if self.reachable {
            Ok(())
        } else {
            Err(StoreError::Unreachable {
                endpoint: self.endpoint(),
                reason: "connection refused".into(),
            })
        }
    }
}

#[async_trait]
impl StoreConnector for MemoryStore {
    fn endpoint(&self) -> String {
        "memory://".to_string()
    }

    async fn connect(&self) -> Result<Box<dyn StoreConnection>, StoreError> {
        let id = self.state.connections.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MemoryConnection {
            id,
            store: self.clone(),
        }))
    }
}

struct MemoryConnection {
    id: usize,
    store: MemoryStore,
}

#[async_trait]
impl StoreConnection for MemoryConnection {
    async fn ping(&self) -> Result<(), StoreError> {
        self.store.check_reachable()
    }

    async fn prepare_batch(
        &self,
        table: &TableSchema,
    ) -> Result<Box<dyn PreparedBatch>, StoreError> {
        self.store.check_reachable()?;
        self.store.state.prepared.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(MemoryBatch {
            connection: self.id,
            table: table.name.clone(),
            store: self.store.clone(),
            rows: Vec::new(),
            row_count: 0,
            sent: false,
        }))
    }
}

struct MemoryBatch {
    connection: usize,
    table: String,
    store: MemoryStore,
    rows: Vec<PerformanceRow>,
    row_count: usize,
    sent: bool,
}

#[async_trait]
impl PreparedBatch for MemoryBatch {
    async fn append(&mut self, row: &PerformanceRow) -> Result<(), StoreError> {
        if self.sent {
            return Err(StoreError::BatchConsumed(self.table.clone()));
        }
        if self.store.retain_rows {
            self.rows.push(row.clone());
        }
        self.row_count += 1;
        Ok(())
    }

    async fn send(&mut self) -> Result<usize, StoreError> {
        if self.sent {
            return Err(StoreError::BatchConsumed(self.table.clone()));
        }
        self.sent = true;

        if let Some(delay) = self.store.send_delay {
            tokio::time::sleep(delay).await;
        }

        let attempt = self.store.state.send_attempts.fetch_add(1, Ordering::SeqCst) + 1;
        if self.store.fail_on_send == Some(attempt) {
            return Err(StoreError::Rejected(format!(
                "send #{attempt} to '{}' rejected",
                self.table
            )));
        }

        let batch = CommittedBatch {
            connection: self.connection,
            table: self.table.clone(),
            row_count: self.row_count,
            rows: std::mem::take(&mut self.rows),
        };
        debug!(connection = batch.connection, rows = batch.row_count, "Memory batch committed");

        self.store
            .state
            .committed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(batch);

        Ok(self.row_count)
    }
}
