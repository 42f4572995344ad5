use serde::Serialize;
use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

#[derive(Debug, Default)]
struct InnerMetrics {
    records_read: AtomicU64,
    rows_committed: AtomicU64,
    batches_committed: AtomicU64,
    rows_skipped: AtomicU64,
    fields_defaulted: AtomicU64,
    failure_count: AtomicU64,
}

/// Run-wide counters shared by the producer and every worker.
#[derive(Debug, Clone)]
pub struct Metrics {
    inner: Arc<InnerMetrics>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MetricsSnapshot {
    pub records_read: u64,
    pub rows_committed: u64,
    pub batches_committed: u64,
    pub rows_skipped: u64,
    pub fields_defaulted: u64,
    pub failure_count: u64,
}

impl Metrics {
    pub fn new() -> Self {
        Metrics {
            inner: Arc::new(InnerMetrics::default()),
        }
    }

    pub fn increment_records(&self, count: u64) {
        self.inner.records_read.fetch_add(count, Ordering::Relaxed);
    }

    pub fn record_commit(&self, rows: u64) {
        self.inner.rows_committed.fetch_add(rows, Ordering::Relaxed);
        self.inner.batches_committed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn increment_skipped(&self, count: u64) {
        self.inner.rows_skipped.fetch_add(count, Ordering::Relaxed);
    }

    pub fn increment_defaulted(&self, count: u64) {
        self.inner
            .fields_defaulted
            .fetch_add(count, Ordering::Relaxed);
    }

    pub fn increment_failures(&self, count: u64) {
        self.inner.failure_count.fetch_add(count, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            records_read: self.inner.records_read.load(Ordering::Relaxed),
            rows_committed: self.inner.rows_committed.load(Ordering::Relaxed),
            batches_committed: self.inner.batches_committed.load(Ordering::Relaxed),
            rows_skipped: self.inner.rows_skipped.load(Ordering::Relaxed),
            fields_defaulted: self.inner.fields_defaulted.load(Ordering::Relaxed),
            failure_count: self.inner.failure_count.load(Ordering::Relaxed),
        }
    }
}

impl Default for Metrics {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clones_share_counters() {
        let metrics = Metrics::new();
        let other = metrics.clone();

        metrics.increment_records(3);
        other.record_commit(2);
        other.record_commit(1);
        metrics.increment_skipped(1);

        let snapshot = metrics.snapshot();
        assert_eq!(snapshot.records_read, 3);
        assert_eq!(snapshot.rows_committed, 3);
        assert_eq!(snapshot.batches_committed, 2);
        assert_eq!(snapshot.rows_skipped, 1);
        assert_eq!(snapshot.failure_count, 0);
    }
}
