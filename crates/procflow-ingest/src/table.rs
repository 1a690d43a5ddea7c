//! Loosely typed host table.
//!
//! Cells arrive as whatever scalar the host delivered. Nothing here interprets
//! them; see [`crate::coerce`] for the typed views.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::columns::ColumnRole;
use crate::error::IngestError;

/// One scalar cell as delivered by the host.
///
/// Serializes as the natural JSON scalar (`null`, `true`, `1.5`, `"text"`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Cell {
    Null,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl Cell {
    pub fn text(s: impl Into<String>) -> Self {
        Cell::Text(s.into())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Null => f.write_str(""),
            Cell::Bool(b) => write!(f, "{b}"),
            Cell::Number(n) => write!(f, "{n}"),
            Cell::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

impl From<String> for Cell {
    fn from(s: String) -> Self {
        Cell::Text(s)
    }
}

impl From<f64> for Cell {
    fn from(n: f64) -> Self {
        Cell::Number(n)
    }
}

impl From<i64> for Cell {
    fn from(n: i64) -> Self {
        Cell::Number(n as f64)
    }
}

impl From<bool> for Cell {
    fn from(b: bool) -> Self {
        Cell::Bool(b)
    }
}

/// Column header plus the roles the data binding assigned to it.
///
/// A column may carry several roles (e.g. an activity column bound as both
/// `From` and `Activity`), but a role may only be bound once per table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnMeta {
    pub name: String,
    #[serde(default)]
    pub roles: Vec<ColumnRole>,
}

impl ColumnMeta {
    pub fn new(name: impl Into<String>, roles: Vec<ColumnRole>) -> Self {
        Self {
            name: name.into(),
            roles,
        }
    }

    pub fn unbound(name: impl Into<String>) -> Self {
        Self::new(name, Vec::new())
    }
}

static NULL_CELL: Cell = Cell::Null;

/// Ordered rows over a fixed column layout.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DataTable {
    pub columns: Vec<ColumnMeta>,
    #[serde(default)]
    pub rows: Vec<Vec<Cell>>,
}

impl DataTable {
    pub fn new(columns: Vec<ColumnMeta>) -> Self {
        Self {
            columns,
            rows: Vec::new(),
        }
    }

    pub fn with_rows(columns: Vec<ColumnMeta>, rows: Vec<Vec<Cell>>) -> Self {
        Self { columns, rows }
    }

    pub fn push_row(&mut self, row: Vec<Cell>) {
        self.rows.push(row);
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Cell at `(row, column)`. Short rows read as `Null`.
    pub fn cell(&self, row: usize, column: usize) -> &Cell {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .unwrap_or(&NULL_CELL)
    }

    /// Append a continuation segment delivered by the host.
    ///
    /// Segments of one logical dataset must share the column layout.
    pub fn append(&mut self, segment: DataTable) -> Result<(), IngestError> {
        let same_layout = self.columns.len() == segment.columns.len()
            && self
                .columns
                .iter()
                .zip(&segment.columns)
                .all(|(a, b)| a.name == b.name);
        if !same_layout {
            return Err(IngestError::ColumnMismatch {
                expected: self.columns.iter().map(|c| c.name.clone()).collect(),
                found: segment.columns.iter().map(|c| c.name.clone()).collect(),
            });
        }
        self.rows.extend(segment.rows);
        Ok(())
    }
}
