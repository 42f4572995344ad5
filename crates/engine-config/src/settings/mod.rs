use crate::settings::{error::SettingsError, validated::ValidatedSettings};
use model::records::coercion::CoercionPolicy;
use serde::Serialize;
use std::path::PathBuf;
use tracing::info;

pub mod error;
pub mod validated;

pub const DEFAULT_BATCH_SIZE: usize = 10_000;
pub const DEFAULT_NUM_WORKERS: usize = 5;
pub const DEFAULT_FILE_NAME: &str = "performance.csv";
pub const DEFAULT_TABLE: &str = "performance";
pub const DEFAULT_ADDR: &str = "localhost:8123";

/// Connection target of the destination store.
#[derive(Debug, Clone, Serialize)]
pub struct StoreSettings {
    pub addr: String,
    pub database: String,
    pub user: String,
    #[serde(skip_serializing)]
    pub password: String,
}

impl Default for StoreSettings {
    fn default() -> Self {
        StoreSettings {
            addr: DEFAULT_ADDR.to_string(),
            database: "default".to_string(),
            user: "default".to_string(),
            password: String::new(),
        }
    }
}

/// Settings as supplied by the user, before validation.
#[derive(Debug, Clone, Serialize)]
pub struct IngestSettings {
    pub batch_size: usize,
    pub file_name: PathBuf,
    pub num_workers: usize,
    pub delimiter: char,
    pub table: String,
    pub on_invalid: CoercionPolicy,
    pub dry_run: bool,
    pub store: StoreSettings,
}

impl Default for IngestSettings {
    fn default() -> Self {
        IngestSettings {
            batch_size: DEFAULT_BATCH_SIZE,
            file_name: PathBuf::from(DEFAULT_FILE_NAME),
            num_workers: DEFAULT_NUM_WORKERS,
            delimiter: ',',
            table: DEFAULT_TABLE.to_string(),
            on_invalid: CoercionPolicy::default(),
            dry_run: false,
            store: StoreSettings::default(),
        }
    }
}

impl IngestSettings {
    pub fn validate(self) -> Result<ValidatedSettings, SettingsError> {
        if self.batch_size == 0 {
            return Err(SettingsError::InvalidBatchSize(self.batch_size));
        }
        if self.num_workers == 0 {
            return Err(SettingsError::InvalidWorkerCount(self.num_workers));
        }
        if !self.delimiter.is_ascii() || self.delimiter == '"' || self.delimiter == '\n' {
            return Err(SettingsError::InvalidDelimiter(self.delimiter));
        }
        if self.file_name.as_os_str().is_empty() {
            return Err(SettingsError::MissingValue("file name"));
        }
        if self.table.trim().is_empty() {
            return Err(SettingsError::MissingValue("table"));
        }
        if !self.dry_run && self.store.addr.trim().is_empty() {
            return Err(SettingsError::MissingValue("store address"));
        }

        let validated = ValidatedSettings {
            batch_size: self.batch_size,
            file_name: self.file_name,
            num_workers: self.num_workers,
            delimiter: self.delimiter as u8,
            table: self.table,
            on_invalid: self.on_invalid,
            dry_run: self.dry_run,
            store: self.store,
        };

        info!(
            batch_size = validated.batch_size,
            num_workers = validated.num_workers,
            file = %validated.file_name.display(),
            table = %validated.table,
            on_invalid = %validated.on_invalid,
            dry_run = validated.dry_run,
            "Settings validated"
        );

        Ok(validated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_documented_values() {
        let settings = IngestSettings::default().validate().unwrap();
        assert_eq!(settings.batch_size(), 10_000);
        assert_eq!(settings.num_workers(), 5);
        assert_eq!(settings.file_name(), &PathBuf::from("performance.csv"));
        assert_eq!(settings.delimiter(), b',');
        assert_eq!(settings.on_invalid(), CoercionPolicy::Fail);
        assert!(!settings.dry_run());
    }

    #[test]
    fn test_zero_batch_size_rejected() {
        let settings = IngestSettings {
            batch_size: 0,
            ..Default::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(SettingsError::InvalidBatchSize(0))
        ));
    }

    #[test]
    fn test_zero_workers_rejected() {
        let settings = IngestSettings {
            num_workers: 0,
            ..Default::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(SettingsError::InvalidWorkerCount(0))
        ));
    }

    #[test]
    fn test_non_ascii_delimiter_rejected() {
        let settings = IngestSettings {
            delimiter: '§',
            ..Default::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(SettingsError::InvalidDelimiter('§'))
        ));
    }

    #[test]
    fn test_empty_table_rejected() {
        let settings = IngestSettings {
            table: "  ".into(),
            ..Default::default()
        };
        assert!(matches!(
            settings.validate(),
            Err(SettingsError::MissingValue("table"))
        ));
    }

    #[test]
    fn test_password_not_serialized() {
        let mut settings = IngestSettings::default();
        settings.store.password = "hunter2".into();
        let json = serde_json::to_string(&settings).unwrap();
        assert!(!json.contains("hunter2"));
    }
}
