use chrono::{DateTime, Utc};
use engine_core::metrics::MetricsSnapshot;
use serde::Serialize;

/// Rows and batches committed by one worker.
#[derive(Serialize, Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct WorkerSummary {
    pub worker: usize,
    pub rows: u64,
    pub batches: u64,
}

#[derive(Serialize, Debug, Clone)]
pub struct SummaryReport {
    pub run_id: String,
    pub source: String,
    pub destination: String,
    pub table: String,
    pub batch_size: usize,
    pub num_workers: usize,
    pub dry_run: bool,
    pub started_at: DateTime<Utc>,
    pub duration_ms: u128,
    pub metrics: MetricsSnapshot,
    pub workers: Vec<WorkerSummary>,
}

impl SummaryReport {
    pub fn rows_committed(&self) -> u64 {
        self.metrics.rows_committed
    }

    pub fn rows_per_sec(&self) -> f64 {
        if self.duration_ms == 0 {
            return self.metrics.rows_committed as f64;
        }
        self.metrics.rows_committed as f64 * 1000.0 / self.duration_ms as f64
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}
