use crate::{
    core::{
        data_type::NumericField,
        schema::PERFORMANCE_COLUMNS,
    },
    records::{
        coercion::{CoercionError, CoercionPolicy},
        raw::RawRecord,
    },
};
use clickhouse::Row;
use serde::{Deserialize, Serialize};

/// A performance tile record coerced to its destination column types.
///
/// Serialized field names are the destination column names, so the struct can be
/// handed to a bulk insert as is.
#[derive(Debug, Clone, PartialEq, Row, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceRow {
    pub quad_key: String,
    #[serde(rename = "tileWKT")]
    pub tile_wkt: String,
    pub tile_x: f32,
    pub tile_y: f32,
    pub download_speed_kbps: u32,
    pub upload_speed_kbps: u32,
    pub latency_ms: u32,
    pub download_latency_ms: u32,
    pub upload_latency_ms: u32,
    pub tests: u32,
    pub devices: u16,
}

/// Outcome of coercing one raw record under a [`CoercionPolicy`].
#[derive(Debug, Clone, PartialEq)]
pub enum Coerced {
    /// Every field converted cleanly.
    Row(PerformanceRow),
    /// Some fields were invalid and replaced with zero values.
    Defaulted(PerformanceRow, Vec<CoercionError>),
    /// The record was dropped.
    Skipped(Vec<CoercionError>),
}

impl Coerced {
    pub fn into_row(self) -> Option<PerformanceRow> {
        match self {
            Coerced::Row(row) | Coerced::Defaulted(row, _) => Some(row),
            Coerced::Skipped(_) => None,
        }
    }
}

struct FieldReader<'a> {
    record: &'a RawRecord,
    issues: Vec<CoercionError>,
}

impl FieldReader<'_> {
    fn text(&self, ordinal: usize) -> String {
        self.record.field(ordinal).unwrap_or_default().to_string()
    }

    fn number<T: NumericField>(&mut self, ordinal: usize) -> T {
        let column = PERFORMANCE_COLUMNS[ordinal];
        debug_assert_eq!(column.data_type, T::DATA_TYPE);

        // Missing fields are already reported as a field count mismatch
        let Some(raw) = self.record.field(ordinal) else {
            return T::default();
        };

        match T::parse_field(raw.trim()) {
            Some(value) => value,
            None => {
                self.issues.push(CoercionError::InvalidField {
                    line: self.record.line,
                    column: column.name,
                    value: raw.to_string(),
                    expected: T::DATA_TYPE,
                });
                T::default()
            }
        }
    }
}

impl PerformanceRow {
    /// Converts `record` positionally into a typed row.
    ///
    /// Invalid fields never produce a silently wrong value: depending on `policy`
    /// the first problem is returned as an error, the record is skipped, or the
    /// offending fields are zeroed and reported alongside the row.
    pub fn coerce(record: &RawRecord, policy: CoercionPolicy) -> Result<Coerced, CoercionError> {
        let mut reader = FieldReader {
            record,
            issues: Vec::new(),
        };

        if record.fields.len() != PERFORMANCE_COLUMNS.len() {
            reader.issues.push(CoercionError::FieldCount {
                line: record.line,
                expected: PERFORMANCE_COLUMNS.len(),
                found: record.fields.len(),
            });
        }

        let row = PerformanceRow {
            quad_key: reader.text(0),
            tile_wkt: reader.text(1),
            tile_x: reader.number(2),
            tile_y: reader.number(3),
            download_speed_kbps: reader.number(4),
            upload_speed_kbps: reader.number(5),
            latency_ms: reader.number(6),
            download_latency_ms: reader.number(7),
            upload_latency_ms: reader.number(8),
            tests: reader.number(9),
            devices: reader.number(10),
        };

        let mut issues = reader.issues;
        if issues.is_empty() {
            return Ok(Coerced::Row(row));
        }

        match policy {
            CoercionPolicy::Fail => Err(issues.swap_remove(0)),
            CoercionPolicy::Skip => Ok(Coerced::Skipped(issues)),
            CoercionPolicy::Zero => Ok(Coerced::Defaulted(row, issues)),
        }
    }
}
