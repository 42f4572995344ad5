use crate::error::ConsumerError;
use engine_core::metrics::Metrics;
use model::records::{
    coercion::{CoercionError, CoercionPolicy},
    raw::RawRecord,
    row::{Coerced, PerformanceRow},
};
use tracing::warn;

/// Turns raw records into typed rows, applying the configured policy to
/// records that do not convert cleanly.
#[derive(Debug, Clone)]
pub struct CoercionStage {
    policy: CoercionPolicy,
    metrics: Metrics,
}

impl CoercionStage {
    pub fn new(policy: CoercionPolicy, metrics: Metrics) -> Self {
        Self { policy, metrics }
    }

    /// Returns `Ok(None)` for a skipped record.
    pub fn apply(&self, record: &RawRecord) -> Result<Option<PerformanceRow>, ConsumerError> {
        match PerformanceRow::coerce(record, self.policy)? {
            Coerced::Row(row) => Ok(Some(row)),
            Coerced::Defaulted(row, issues) => {
                for issue in &issues {
                    warn!(line = record.line, error = %issue, "Invalid field replaced with zero");
                }
                let defaulted: usize = issues.iter().map(CoercionError::defaulted_fields).sum();
                self.metrics.increment_defaulted(defaulted as u64);
                Ok(Some(row))
            }
            Coerced::Skipped(issues) => {
                let reasons: Vec<String> = issues.iter().map(ToString::to_string).collect();
                warn!(line = record.line, errors = ?reasons, "Skipping record");
                self.metrics.increment_skipped(1);
                Ok(None)
            }
        }
    }
}
