use serde::{Deserialize, Serialize};
use std::fmt;

/// Destination column types understood by the loader.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum DataType {
    String,
    Float32,
    UInt32,
    UInt16,
}

impl DataType {
    pub fn clickhouse_name(&self) -> &'static str {
        match self {
            DataType::String => "String",
            DataType::Float32 => "Float32",
            DataType::UInt32 => "UInt32",
            DataType::UInt16 => "UInt16",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.clickhouse_name())
    }
}

/// Parsing of a single numeric cell into its destination representation.
///
/// Returns `None` for anything that would not round-trip faithfully: non-numeric
/// text, negative values for unsigned columns, and values outside the type's range.
pub trait NumericField: Sized + Default + Copy {
    const DATA_TYPE: DataType;

    fn parse_field(text: &str) -> Option<Self>;
}

impl NumericField for f32 {
    const DATA_TYPE: DataType = DataType::Float32;

    fn parse_field(text: &str) -> Option<Self> {
        let value = text.parse::<f32>().ok()?;
        // "1e40" parses to +inf instead of failing
        if value.is_infinite() && !text.to_ascii_lowercase().contains("inf") {
            return None;
        }
        Some(value)
    }
}

impl NumericField for u32 {
    const DATA_TYPE: DataType = DataType::UInt32;

    fn parse_field(text: &str) -> Option<Self> {
        text.parse().ok()
    }
}

impl NumericField for u16 {
    const DATA_TYPE: DataType = DataType::UInt16;

    fn parse_field(text: &str) -> Option<Self> {
        text.parse().ok()
    }
}
