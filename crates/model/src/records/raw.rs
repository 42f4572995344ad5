/// One decoded, untyped record in source column order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    /// 1-based line number in the input, for diagnostics.
    pub line: u64,
    pub fields: Vec<String>,
}

impl RawRecord {
    pub fn new(line: u64, fields: Vec<String>) -> Self {
        RawRecord { line, fields }
    }

    pub fn field(&self, ordinal: usize) -> Option<&str> {
        self.fields.get(ordinal).map(String::as_str)
    }
}
