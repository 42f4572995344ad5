use crate::file::csv::error::FileError;
use csv::{Reader, ReaderBuilder, StringRecord};
use model::records::raw::RawRecord;
use std::{fs::File, io::Read, path::Path};
use tracing::debug;

/// A stream of decoded records, header already consumed.
pub trait RecordSource: Send {
    fn header(&self) -> &[String];

    /// Decodes the next record. `Ok(None)` marks the end of input.
    fn next_record(&mut self) -> Result<Option<RawRecord>, FileError>;
}

pub struct CsvRecordSource<R: Read> {
    name: String,
    reader: Reader<R>,
    header: Vec<String>,
    buf: StringRecord,
}

impl CsvRecordSource<File> {
    /// Opens `path` and consumes its header record.
    pub fn open(path: impl AsRef<Path>, delimiter: u8) -> Result<Self, FileError> {
        let path = path.as_ref();
        let name = path.display().to_string();
        let file = File::open(path).map_err(|e| FileError::open(&name, e))?;
        Self::from_reader(file, name, delimiter)
    }
}

impl<R: Read> CsvRecordSource<R> {
    pub fn from_reader(
        reader: R,
        name: impl Into<String>,
        delimiter: u8,
    ) -> Result<Self, FileError> {
        let name = name.into();
        // Field counts are checked against the schema during coercion, not here
        let mut reader = ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(delimiter)
            .from_reader(reader);

        let mut header = StringRecord::new();
        match reader.read_record(&mut header) {
            Ok(true) => {}
            Ok(false) => return Err(FileError::MissingHeader(name)),
            Err(source) => return Err(FileError::Decode { line: 1, source }),
        }

        let header: Vec<String> = header.iter().map(str::to_string).collect();
        debug!(source = %name, columns = header.len(), "Header record skipped");

        Ok(CsvRecordSource {
            name,
            reader,
            header,
            buf: StringRecord::new(),
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

impl<R: Read + Send> RecordSource for CsvRecordSource<R> {
    fn header(&self) -> &[String] {
        &self.header
    }

    fn next_record(&mut self) -> Result<Option<RawRecord>, FileError> {
        match self.reader.read_record(&mut self.buf) {
            Ok(true) => {
                let line = self.buf.position().map(|p| p.line()).unwrap_or_default();
                let fields = self.buf.iter().map(str::to_string).collect();
                Ok(Some(RawRecord::new(line, fields)))
            }
            Ok(false) => Ok(None),
            Err(source) => {
                let line = source
                    .position()
                    .map(|p| p.line())
                    .unwrap_or_else(|| self.reader.position().line());
                Err(FileError::Decode { line, source })
            }
        }
    }
}
