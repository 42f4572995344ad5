use crate::error::IngestError;
use connectors::file::csv::source::RecordSource;
use engine_config::{report::summary::WorkerSummary, settings::validated::ValidatedSettings};
use engine_core::{connectors::destination::Destination, metrics::Metrics};
use engine_processing::{
    consumer::{config::WorkerConfig, worker::IngestWorker},
    error::ConsumerError,
    producer::{RecordProducer, record_channel},
};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Connects and starts the workers, then the producer, and waits for all of them.
///
/// The first failing task cancels the others. The error returned is the root
/// cause, never the cancellation it triggered elsewhere.
pub async fn spawn(
    records: Box<dyn RecordSource>,
    destination: &Destination,
    settings: &ValidatedSettings,
    metrics: &Metrics,
    cancel: CancellationToken,
) -> Result<Vec<WorkerSummary>, IngestError> {
    let num_workers = settings.num_workers();
    info!(workers = num_workers, "Launching workers");

    let (tx, rx) = record_channel();
    let config = WorkerConfig::from(settings);
    let mut workers = JoinSet::new();

    for id in 0..num_workers {
        let connection = match destination.connect().await {
            Ok(connection) => connection,
            Err(e) => {
                error!(worker = id, error = %e, "Failed to open worker connection");
                cancel.cancel();
                while workers.join_next().await.is_some() {}
                return Err(IngestError::Unreachable(e));
            }
        };

        let worker = IngestWorker::new(
            id,
            rx.clone(),
            connection,
            &config,
            cancel.clone(),
            metrics.clone(),
        );
        workers.spawn(async move { (id, worker.run().await) });
    }

    // Only workers hold receivers, so the channel closes if they all stop
    drop(rx);

    let producer = RecordProducer::new(records, tx, cancel.clone(), metrics.clone()).spawn();

    let mut failure: Option<IngestError> = None;
    let mut summaries = Vec::with_capacity(num_workers);

    while let Some(joined) = workers.join_next().await {
        match joined {
            Ok((_, Ok(summary))) => summaries.push(summary),
            Ok((worker, Err(source))) => {
                cancel.cancel();
                keep_root_cause(&mut failure, worker_error(worker, source));
            }
            Err(e) => {
                error!(error = %e, "Worker task panicked");
                cancel.cancel();
                keep_root_cause(&mut failure, IngestError::TaskJoin(e));
            }
        }
    }

    match producer.await {
        Ok(Ok(published)) => info!(records = published, "Producer finished"),
        Ok(Err(e)) => keep_root_cause(&mut failure, IngestError::Producer(e)),
        Err(e) => keep_root_cause(&mut failure, IngestError::TaskJoin(e)),
    }

    if let Some(err) = failure {
        return Err(if err.is_cancellation() {
            IngestError::Cancelled
        } else {
            err
        });
    }

    summaries.sort_by_key(|s| s.worker);
    Ok(summaries)
}

fn worker_error(worker: usize, source: ConsumerError) -> IngestError {
    IngestError::Worker { worker, source }
}

/// Keeps the first error that is not a mere reaction to cancellation.
fn keep_root_cause(slot: &mut Option<IngestError>, err: IngestError) {
    let replace = match slot.as_ref() {
        None => true,
        Some(current) => current.is_cancellation() && !err.is_cancellation(),
    };
    if replace {
        *slot = Some(err);
    }
}
