use crate::error::ProducerError;
use async_channel::{Receiver, Sender};
use connectors::file::csv::source::RecordSource;
use engine_core::metrics::Metrics;
use model::records::raw::RawRecord;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Capacity of the record channel. One slot keeps at most one decoded record
/// waiting, so the producer blocks as soon as no worker is ready to receive.
pub const RECORD_CHANNEL_CAPACITY: usize = 1;

pub fn record_channel() -> (Sender<RawRecord>, Receiver<RawRecord>) {
    async_channel::bounded(RECORD_CHANNEL_CAPACITY)
}

/// Decodes records from a source and publishes them, in input order, to the
/// record channel shared by all workers.
pub struct RecordProducer {
    source: Box<dyn RecordSource>,
    tx: Sender<RawRecord>,
    cancel: CancellationToken,
    metrics: Metrics,
}

impl RecordProducer {
    pub fn new(
        source: Box<dyn RecordSource>,
        tx: Sender<RawRecord>,
        cancel: CancellationToken,
        metrics: Metrics,
    ) -> Self {
        Self {
            source,
            tx,
            cancel,
            metrics,
        }
    }

    /// Runs the producer on the blocking pool; decoding is synchronous file IO.
    pub fn spawn(self) -> JoinHandle<Result<u64, ProducerError>> {
        tokio::task::spawn_blocking(move || self.run())
    }

    /// Publishes every record and closes the channel on all exit paths.
    ///
    /// On failure the run is cancelled before the channel closes, so workers
    /// observe the cancellation instead of treating the close as end of input.
    pub fn run(mut self) -> Result<u64, ProducerError> {
        let result = self.publish_all();

        if let Err(err) = &result {
            if !err.is_cancellation() {
                error!(error = %err, "Producer failed; cancelling run");
                self.metrics.increment_failures(1);
            }
            self.cancel.cancel();
        }

        self.tx.close();
        result
    }

    fn publish_all(&mut self) -> Result<u64, ProducerError> {
        let mut published = 0u64;

        loop {
            if self.cancel.is_cancelled() {
                info!(published, "Cancellation requested. Terminating producer.");
                return Err(ProducerError::Cancelled);
            }

            let Some(record) = self.source.next_record()? else {
                break;
            };

            // Blocks until a worker takes the record
            if self.tx.send_blocking(record).is_err() {
                return Err(ProducerError::ChannelClosed);
            }

            published += 1;
            self.metrics.increment_records(1);
        }

        info!(records = published, "Input exhausted; closing record channel");
        Ok(published)
    }
}
