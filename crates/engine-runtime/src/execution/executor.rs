use crate::{
    error::IngestError,
    execution::{factory, workers},
};
use chrono::Utc;
use engine_config::{
    report::summary::SummaryReport,
    settings::{IngestSettings, validated::ValidatedSettings},
};
use engine_core::{connectors::destination::Destination, metrics::Metrics};
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{error, info};

/// Validates `settings`, builds the destination they describe and runs the ingest.
pub async fn run(
    settings: IngestSettings,
    cancel: CancellationToken,
) -> Result<SummaryReport, IngestError> {
    let settings = settings.validate()?;
    let destination = factory::create_destination(&settings);
    run_with(settings, destination, cancel).await
}

/// Runs the ingest against an already constructed destination.
pub async fn run_with(
    settings: ValidatedSettings,
    destination: Destination,
    cancel: CancellationToken,
) -> Result<SummaryReport, IngestError> {
    IngestExecutor::new(settings, destination, cancel)
        .execute()
        .await
}

struct IngestExecutor {
    run_id: String,
    settings: ValidatedSettings,
    destination: Destination,
    cancel: CancellationToken,
    metrics: Metrics,
}

impl IngestExecutor {
    fn new(settings: ValidatedSettings, destination: Destination, cancel: CancellationToken) -> Self {
        Self {
            run_id: uuid::Uuid::new_v4().to_string(),
            settings,
            destination,
            cancel,
            metrics: Metrics::new(),
        }
    }

    async fn execute(self) -> Result<SummaryReport, IngestError> {
        let started_at = Utc::now();
        let start = Instant::now();
        let source = factory::create_source(&self.settings);

        info!(
            run_id = %self.run_id,
            file = %source.path().display(),
            destination = %self.destination.endpoint(),
            table = %self.destination.table.name,
            batch_size = self.settings.batch_size(),
            workers = self.settings.num_workers(),
            dry_run = self.settings.dry_run(),
            "Starting ingest run"
        );

        // Nothing is read until the destination has answered
        let check = self.destination.verify().await.map_err(|e| {
            error!(error = %e, "Destination reachability check failed");
            IngestError::Unreachable(e)
        })?;
        drop(check);

        let records = source.open()?;

        let summaries = workers::spawn(
            records,
            &self.destination,
            &self.settings,
            &self.metrics,
            self.cancel.clone(),
        )
        .await?;

        let report = SummaryReport {
            run_id: self.run_id,
            source: source.path().display().to_string(),
            destination: self.destination.endpoint(),
            table: self.destination.table.name.clone(),
            batch_size: self.settings.batch_size(),
            num_workers: self.settings.num_workers(),
            dry_run: self.settings.dry_run(),
            started_at,
            duration_ms: start.elapsed().as_millis(),
            metrics: self.metrics.snapshot(),
            workers: summaries,
        };

        info!(
            run_id = %report.run_id,
            rows = report.rows_committed(),
            batches = report.metrics.batches_committed,
            duration_ms = report.duration_ms,
            rows_per_sec = report.rows_per_sec().round() as u64,
            "Ingest run completed"
        );

        Ok(report)
    }
}
