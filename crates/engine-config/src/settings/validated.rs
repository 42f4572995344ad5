use crate::settings::StoreSettings;
use model::records::coercion::CoercionPolicy;
use std::path::PathBuf;

/// Immutable, validated configuration used throughout the run.
#[derive(Debug, Clone)]
pub struct ValidatedSettings {
    /// Rows per committed batch, at least 1
    pub batch_size: usize,
    /// Input file
    pub file_name: PathBuf,
    /// Number of ingestion workers, at least 1
    pub num_workers: usize,
    pub delimiter: u8,
    /// Destination table
    pub table: String,
    /// Handling of records that fail type coercion
    pub on_invalid: CoercionPolicy,
    /// Whether rows go to an in-memory counting store instead of the destination
    pub dry_run: bool,
    pub store: StoreSettings,
}

impl ValidatedSettings {
    pub fn batch_size(&self) -> usize {
        self.batch_size
    }

    pub fn file_name(&self) -> &PathBuf {
        &self.file_name
    }

    pub fn num_workers(&self) -> usize {
        self.num_workers
    }

    pub fn delimiter(&self) -> u8 {
        self.delimiter
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn on_invalid(&self) -> CoercionPolicy {
        self.on_invalid
    }

    pub fn dry_run(&self) -> bool {
        self.dry_run
    }

    pub fn store(&self) -> &StoreSettings {
        &self.store
    }
}
