use crate::core::data_type::DataType;
use serde::Serialize;
use std::{fmt, str::FromStr};
use thiserror::Error;

/// What to do with a record whose fields do not convert to the destination types.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CoercionPolicy {
    /// Abort the run.
    #[default]
    Fail,
    /// Drop the record and keep going.
    Skip,
    /// Replace each invalid field with zero (empty text for missing text columns).
    Zero,
}

impl FromStr for CoercionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fail" | "abort" => Ok(CoercionPolicy::Fail),
            "skip" => Ok(CoercionPolicy::Skip),
            "zero" | "default" => Ok(CoercionPolicy::Zero),
            other => Err(format!(
                "Unknown coercion policy: {other} (expected fail, skip or zero)"
            )),
        }
    }
}

impl fmt::Display for CoercionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            CoercionPolicy::Fail => "fail",
            CoercionPolicy::Skip => "skip",
            CoercionPolicy::Zero => "zero",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum CoercionError {
    #[error("line {line}: column '{column}' value {value:?} is not a valid {expected}")]
    InvalidField {
        line: u64,
        column: &'static str,
        value: String,
        expected: DataType,
    },

    #[error("line {line}: expected {expected} fields, found {found}")]
    FieldCount {
        line: u64,
        expected: usize,
        found: usize,
    },
}

impl CoercionError {
    /// Number of fields the `Zero` policy replaces because of this issue.
    /// Extra trailing fields are dropped, not defaulted.
    pub fn defaulted_fields(&self) -> usize {
        match self {
            CoercionError::InvalidField { .. } => 1,
            CoercionError::FieldCount {
                expected, found, ..
            } => expected.saturating_sub(*found),
        }
    }

    pub fn line(&self) -> u64 {
        match self {
            CoercionError::InvalidField { line, .. } | CoercionError::FieldCount { line, .. } => {
                *line
            }
        }
    }
}
