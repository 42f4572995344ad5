use connectors::file::csv::{
    error::FileError,
    source::{CsvRecordSource, RecordSource},
};
use std::{
    fmt::Display,
    path::{Path, PathBuf},
};
use tracing::info;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum DataFormat {
    Csv,
}

impl Display for DataFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataFormat::Csv => write!(f, "CSV"),
        }
    }
}

/// The input the run reads records from.
#[derive(Debug, Clone)]
pub struct Source {
    pub path: PathBuf,
    pub format: DataFormat,
    pub delimiter: u8,
}

impl Source {
    pub fn csv(path: impl Into<PathBuf>, delimiter: u8) -> Self {
        Source {
            path: path.into(),
            format: DataFormat::Csv,
            delimiter,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Opens the input and consumes its header.
    pub fn open(&self) -> Result<Box<dyn RecordSource>, FileError> {
        match self.format {
            DataFormat::Csv => {
                let source = CsvRecordSource::open(&self.path, self.delimiter)?;
                info!(
                    path = %self.path.display(),
                    format = %self.format,
                    columns = source.header().len(),
                    "Opened input"
                );
                Ok(Box::new(source))
            }
        }
    }
}
