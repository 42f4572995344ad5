use crate::error::ConsumerError;
use connectors::store::StoreConnection;
use engine_core::metrics::Metrics;
use model::{core::schema::TableSchema, records::batch::Batch};
use std::time::{Duration, Instant};
use tracing::{debug, error, info};

#[derive(Debug, Clone)]
pub struct CommitResult {
    pub rows_written: usize,
    pub duration: Duration,
}

/// Commits a worker's batches over the worker's own connection.
///
/// Each commit is one prepare, append, send sequence; commits on a connection
/// never overlap because the owning worker awaits each one.
pub struct BatchCommitter {
    connection: Box<dyn StoreConnection>,
    table: TableSchema,
    metrics: Metrics,
}

impl BatchCommitter {
    pub fn new(connection: Box<dyn StoreConnection>, table: TableSchema, metrics: Metrics) -> Self {
        Self {
            connection,
            table,
            metrics,
        }
    }

    /// Writes `batch` as a single bulk insert. Empty batches are not sent and return `None`.
    pub async fn commit(&self, batch: &Batch) -> Result<Option<CommitResult>, ConsumerError> {
        if batch.is_empty() {
            debug!(batch_id = %batch.id, "Empty batch; nothing to commit");
            return Ok(None);
        }

        match self.write(batch).await {
            Ok(result) => Ok(Some(result)),
            Err(e) => {
                error!(batch_id = %batch.id, error = %e, "Failed to commit batch");
                self.metrics.increment_failures(1);
                Err(e)
            }
        }
    }

    async fn write(&self, batch: &Batch) -> Result<CommitResult, ConsumerError> {
        let start = Instant::now();
        let batch_id = batch.id;

        let mut prepared = self
            .connection
            .prepare_batch(&self.table)
            .await
            .map_err(|source| ConsumerError::Prepare { batch_id, source })?;

        for row in &batch.rows {
            prepared
                .append(row)
                .await
                .map_err(|source| ConsumerError::Append { batch_id, source })?;
        }

        let rows_written = prepared
            .send()
            .await
            .map_err(|source| ConsumerError::Commit { batch_id, source })?;

        let duration = start.elapsed();
        let rows_per_sec = rows_written as f64 / duration.as_secs_f64().max(f64::EPSILON);
        self.metrics.record_commit(rows_written as u64);

        info!(
            batch_id = %batch_id,
            table = %self.table.name,
            rows = rows_written,
            duration_ms = duration.as_millis(),
            rows_per_sec = %format!("{:.2}", rows_per_sec),
            "Batch committed"
        );

        Ok(CommitResult {
            rows_written,
            duration,
        })
    }
}
