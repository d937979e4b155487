use serde::{Deserialize, Serialize};

/// Failure codes for retrieval and buffer-growth operations.
///
/// The numeric values reported by [`ValueError::code`] match the status codes
/// the simulation engine's historical interface used on the wire, so binding
/// layers can pass them through unchanged. `InvalidInstance` is reserved for
/// such layers (hosts that address sessions by handle); the library itself
/// never produces it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueError {
    /// A buffer could not grow to hold the requested data.
    OutOfMemory,
    /// The requested row does not exist.
    InvalidRow,
    /// The requested column does not exist.
    InvalidColumn,
    /// The addressed session handle is unknown (binding layers only).
    InvalidInstance,
}

impl ValueError {
    /// Stable numeric code (success is 0; these are the failure values).
    pub fn code(&self) -> i32 {
        match self {
            ValueError::OutOfMemory => -1,
            ValueError::InvalidRow => -4,
            ValueError::InvalidColumn => -5,
            ValueError::InvalidInstance => -6,
        }
    }
}

impl std::fmt::Display for ValueError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueError::OutOfMemory => write!(f, "out of memory"),
            ValueError::InvalidRow => write!(f, "row index out of range"),
            ValueError::InvalidColumn => write!(f, "column index out of range"),
            ValueError::InvalidInstance => write!(f, "invalid session handle"),
        }
    }
}

/// A typed cell in the selected-output table.
///
/// Fields arrive from the engine already typed (text, real, or integer);
/// `Empty` fills the gap when a data row closes short of the header width,
/// and `Error` marks a field the engine could not evaluate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum CellValue {
    #[default]
    Empty,
    Error(ValueError),
    Text(String),
    Real(f64),
    Integer(i64),
}

impl CellValue {
    /// Render the cell for delimited files and exports.
    ///
    /// Reals use Rust's shortest round-trip formatting; writers that need a
    /// fixed-width scientific form apply their own formatting instead.
    pub fn display_string(&self) -> String {
        match self {
            CellValue::Empty => String::new(),
            CellValue::Error(_) => "#error".to_string(),
            CellValue::Text(s) => s.clone(),
            CellValue::Real(r) => format!("{}", r),
            CellValue::Integer(i) => format!("{}", i),
        }
    }

    /// Numeric view: `Real` and `Integer` convert, everything else is None.
    pub fn as_real(&self) -> Option<f64> {
        match self {
            CellValue::Real(r) => Some(*r),
            CellValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        CellValue::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        CellValue::Text(s)
    }
}

impl From<f64> for CellValue {
    fn from(r: f64) -> Self {
        CellValue::Real(r)
    }
}

impl From<i64> for CellValue {
    fn from(i: i64) -> Self {
        CellValue::Integer(i)
    }
}
