use crate::core::data_type::DataType;
use serde::Serialize;

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: &'static str,
    pub data_type: DataType,
}

impl ColumnDef {
    const fn new(name: &'static str, data_type: DataType) -> Self {
        ColumnDef { name, data_type }
    }
}

/// Source column order of a performance tile record. Destination columns carry the same names.
pub const PERFORMANCE_COLUMNS: [ColumnDef; 11] = [
    ColumnDef::new("quadKey", DataType::String),
    ColumnDef::new("tileWKT", DataType::String),
    ColumnDef::new("tileX", DataType::Float32),
    ColumnDef::new("tileY", DataType::Float32),
    ColumnDef::new("downloadSpeedKbps", DataType::UInt32),
    ColumnDef::new("uploadSpeedKbps", DataType::UInt32),
    ColumnDef::new("latencyMs", DataType::UInt32),
    ColumnDef::new("downloadLatencyMs", DataType::UInt32),
    ColumnDef::new("uploadLatencyMs", DataType::UInt32),
    ColumnDef::new("tests", DataType::UInt32),
    ColumnDef::new("devices", DataType::UInt16),
];

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TableSchema {
    pub name: String,
    pub columns: Vec<ColumnDef>,
}

impl TableSchema {
    pub fn performance(name: impl Into<String>) -> Self {
        TableSchema {
            name: name.into(),
            columns: PERFORMANCE_COLUMNS.to_vec(),
        }
    }

    pub fn column_names(&self) -> Vec<&'static str> {
        self.columns.iter().map(|c| c.name).collect()
    }

    pub fn insert_statement(&self) -> String {
        format!(
            "INSERT INTO {} ({})",
            self.name,
            self.column_names().join(", ")
        )
    }
}
