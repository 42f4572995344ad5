use thiserror::Error;

#[derive(Debug, Error)]
pub enum FileError {
    #[error("File not found: {0}")]
    NotFound(String),
    #[error("Permission denied: {0}")]
    PermissionDenied(String),
    #[error("Failed to open {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Missing header record in {0}")]
    MissingHeader(String),
    #[error("CSV decode error at line {line}: {source}")]
    Decode {
        line: u64,
        #[source]
        source: csv::Error,
    },
}

impl FileError {
    pub fn open(path: &str, source: std::io::Error) -> Self {
        match source.kind() {
            std::io::ErrorKind::NotFound => FileError::NotFound(path.to_string()),
            std::io::ErrorKind::PermissionDenied => FileError::PermissionDenied(path.to_string()),
            _ => FileError::Open {
                path: path.to_string(),
                source,
            },
        }
    }
}
