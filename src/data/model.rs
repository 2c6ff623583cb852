use std::fmt;

use serde::Serialize;

// ---------------------------------------------------------------------------
// CellValue – a single cell of the record table
// ---------------------------------------------------------------------------

/// A dynamically-typed cell value mirroring the dtypes a CSV reader infers.
/// Serializes as a bare JSON scalar (`null` for missing).
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CellValue {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Null => Ok(()),
            CellValue::Bool(b) => write!(f, "{b}"),
            CellValue::Integer(i) => write!(f, "{i}"),
            CellValue::Float(v) => write!(f, "{v}"),
            CellValue::Text(s) => write!(f, "{s}"),
        }
    }
}

impl CellValue {
    /// Try to interpret the value as an `f64` (coordinates on the map).
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Float(v) => Some(*v),
            CellValue::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            CellValue::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, CellValue::Null)
    }
}

// ---------------------------------------------------------------------------
// RecordTable – the complete loaded CSV
// ---------------------------------------------------------------------------

/// Row-major table: ordered column names and one `Vec<CellValue>` per row,
/// each exactly `columns.len()` long.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordTable {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl RecordTable {
    pub fn new(columns: Vec<String>, rows: Vec<Vec<CellValue>>) -> Self {
        RecordTable { columns, rows }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the table has no rows.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, column: &str) -> Option<usize> {
        self.columns.iter().position(|c| c == column)
    }

    pub fn has_column(&self, column: &str) -> bool {
        self.column_index(column).is_some()
    }

    /// Cell at `(row, column)`; `None` if either is out of range.
    pub fn cell(&self, row: usize, column: &str) -> Option<&CellValue> {
        let idx = self.column_index(column)?;
        self.rows.get(row)?.get(idx)
    }

    /// Text of a normalized label cell.
    pub fn label(&self, row: usize, column: &str) -> Option<&str> {
        self.cell(row, column).and_then(CellValue::as_text)
    }

    /// All values of one column in row order, or `None` if the column is absent.
    pub fn column_values(&self, column: &str) -> Option<Vec<&CellValue>> {
        let idx = self.column_index(column)?;
        Some(self.rows.iter().filter_map(|r| r.get(idx)).collect())
    }
}
