//! Ingestion errors and per-row data-quality issues.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::columns::ColumnRole;

/// Table-level failures. These stop ingestion of the table as a whole.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("no column is bound to the `{0}` role")]
    MissingRole(ColumnRole),

    #[error("role `{role}` is bound to both `{first}` and `{second}`")]
    DuplicateRole {
        role: ColumnRole,
        first: String,
        second: String,
    },

    #[error("unknown column role `{0}` (expected caseId|from|to|activity|isHappyPath|duration|timestamp)")]
    UnknownRole(String),

    #[error("segment columns {found:?} do not match table columns {expected:?}")]
    ColumnMismatch {
        expected: Vec<String>,
        found: Vec<String>,
    },
}

/// Why a single cell could not be coerced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    NonNumericCaseId,
    NonIntegralCaseId,
    MissingValue,
    NonNumericDuration,
    UnparsableTimestamp,
}

impl IssueKind {
    /// Whether the affected row is excluded from aggregation.
    pub fn drops_row(self) -> bool {
        !matches!(self, IssueKind::NonNumericDuration)
    }
}

impl fmt::Display for IssueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            IssueKind::NonNumericCaseId => "case id is not numeric",
            IssueKind::NonIntegralCaseId => "case id is not an integer",
            IssueKind::MissingValue => "value is missing",
            IssueKind::NonNumericDuration => "duration is not numeric",
            IssueKind::UnparsableTimestamp => "timestamp cannot be parsed",
        };
        f.write_str(s)
    }
}

/// A coercion failure attached to one source row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataQualityIssue {
    /// Zero-based row index in the delivered table.
    pub row: usize,
    pub role: ColumnRole,
    pub kind: IssueKind,
    /// The offending cell, rendered as text.
    pub raw: String,
}

impl fmt::Display for DataQualityIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "row {}: {} ({} = {:?})",
            self.row, self.kind, self.role, self.raw
        )
    }
}
