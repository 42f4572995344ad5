use engine_config::settings::validated::ValidatedSettings;
use model::{core::schema::TableSchema, records::coercion::CoercionPolicy};

/// Configuration shared by every ingestion worker.
#[derive(Clone, Debug)]
pub struct WorkerConfig {
    /// Rows per committed batch
    pub batch_size: usize,

    /// Destination table the batches are inserted into
    pub table: TableSchema,

    /// Handling of records that fail type coercion
    pub on_invalid: CoercionPolicy,
}

impl WorkerConfig {
    pub fn new(batch_size: usize, table: TableSchema) -> Self {
        Self {
            batch_size,
            table,
            on_invalid: CoercionPolicy::default(),
        }
    }

    pub fn with_policy(mut self, policy: CoercionPolicy) -> Self {
        self.on_invalid = policy;
        self
    }
}

impl From<&ValidatedSettings> for WorkerConfig {
    fn from(settings: &ValidatedSettings) -> Self {
        WorkerConfig::new(
            settings.batch_size(),
            TableSchema::performance(settings.table()),
        )
        .with_policy(settings.on_invalid())
    }
}
