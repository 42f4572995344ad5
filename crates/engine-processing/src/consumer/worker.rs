use crate::{
    consumer::{components::committer::BatchCommitter, config::WorkerConfig},
    error::ConsumerError,
    transform::coercion::CoercionStage,
};
use async_channel::Receiver;
use connectors::store::StoreConnection;
use engine_config::report::summary::WorkerSummary;
use engine_core::metrics::Metrics;
use model::records::{
    batch::{Batch, BatchId},
    raw::RawRecord,
};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Pulls records from the shared channel, coerces them and commits them in
/// batches of `batch_size` rows. The batch is owned by this worker alone.
pub struct IngestWorker {
    id: usize,
    rx: Receiver<RawRecord>,
    committer: BatchCommitter,
    coercion: CoercionStage,
    batch_size: usize,
    cancel: CancellationToken,
    next_seq: u64,
    summary: WorkerSummary,
}

impl IngestWorker {
    pub fn new(
        id: usize,
        rx: Receiver<RawRecord>,
        connection: Box<dyn StoreConnection>,
        config: &WorkerConfig,
        cancel: CancellationToken,
        metrics: Metrics,
    ) -> Self {
        Self {
            id,
            rx,
            committer: BatchCommitter::new(connection, config.table.clone(), metrics.clone()),
            coercion: CoercionStage::new(config.on_invalid, metrics),
            batch_size: config.batch_size,
            cancel,
            next_seq: 0,
            summary: WorkerSummary {
                worker: id,
                ..Default::default()
            },
        }
    }

    pub fn spawn(self) -> JoinHandle<Result<WorkerSummary, ConsumerError>> {
        tokio::spawn(self.run())
    }

    /// Runs until the channel is closed and drained, then commits the final
    /// partial batch. Any failure cancels the whole run.
    pub async fn run(mut self) -> Result<WorkerSummary, ConsumerError> {
        info!(worker = self.id, batch_size = self.batch_size, "Worker started");

        match self.ingest().await {
            Ok(()) => {
                info!(
                    worker = self.id,
                    rows = self.summary.rows,
                    batches = self.summary.batches,
                    "Worker finished"
                );
                Ok(self.summary)
            }
            Err(e) => {
                if e.is_cancellation() {
                    info!(worker = self.id, "Run cancelled; in-flight batch dropped");
                } else {
                    error!(worker = self.id, error = %e, "Worker failed; cancelling run");
                    self.cancel.cancel();
                }
                Err(e)
            }
        }
    }

    async fn ingest(&mut self) -> Result<(), ConsumerError> {
        let mut batch = self.new_batch();

        loop {
            let record = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return Err(ConsumerError::Cancelled),
                received = self.rx.recv() => match received {
                    Ok(record) => record,
                    // Closed and drained
                    Err(_) => break,
                },
            };

            let Some(row) = self.coercion.apply(&record)? else {
                continue;
            };
            batch.push(row);

            if batch.is_full() {
                let full = std::mem::replace(&mut batch, self.new_batch());
                self.commit(&full).await?;
            }
        }

        // The producer cancels before closing when it fails
        if self.cancel.is_cancelled() {
            return Err(ConsumerError::Cancelled);
        }

        self.commit(&batch).await
    }

    async fn commit(&mut self, batch: &Batch) -> Result<(), ConsumerError> {
        if let Some(result) = self.committer.commit(batch).await? {
            self.summary.rows += result.rows_written as u64;
            self.summary.batches += 1;
        }
        Ok(())
    }

    fn new_batch(&mut self) -> Batch {
        let id = BatchId {
            worker: self.id,
            seq: self.next_seq,
        };
        self.next_seq += 1;
        Batch::new(id, self.batch_size)
    }
}
