//! Table → record conversion for both data shapes.

use serde::Serialize;

use crate::coerce::{coerce_case_id, coerce_duration, coerce_flag, coerce_label, coerce_timestamp};
use crate::columns::{ColumnMapping, ColumnRole};
use crate::error::{DataQualityIssue, IngestError, IssueKind};
use crate::records::{Activity, ActivityEvent};
use crate::table::DataTable;

/// Records that survived coercion plus every issue found on the way.
#[derive(Debug, Clone, Serialize)]
pub struct Ingested<T> {
    pub records: Vec<T>,
    pub issues: Vec<DataQualityIssue>,
}

impl<T> Default for Ingested<T> {
    fn default() -> Self {
        Self {
            records: Vec::new(),
            issues: Vec::new(),
        }
    }
}

impl<T> Ingested<T> {
    /// Number of source rows excluded from `records`.
    pub fn dropped_rows(&self) -> usize {
        dropped_row_count(&self.issues)
    }
}

/// Distinct rows excluded by `issues`. Issues arrive in row order.
pub fn dropped_row_count(issues: &[DataQualityIssue]) -> usize {
    let mut rows: Vec<usize> = issues
        .iter()
        .filter(|i| i.kind.drops_row())
        .map(|i| i.row)
        .collect();
    rows.dedup();
    rows.len()
}

struct RowReader<'a> {
    table: &'a DataTable,
    row: usize,
    issues: Vec<DataQualityIssue>,
}

impl<'a> RowReader<'a> {
    fn new(table: &'a DataTable, row: usize) -> Self {
        Self {
            table,
            row,
            issues: Vec::new(),
        }
    }

    fn report(&mut self, role: ColumnRole, column: usize, kind: IssueKind) {
        self.issues.push(DataQualityIssue {
            row: self.row,
            role,
            kind,
            raw: self.table.cell(self.row, column).to_string(),
        });
    }

    fn case_id(&mut self, column: usize) -> Option<i64> {
        match coerce_case_id(self.table.cell(self.row, column)) {
            Ok(v) => Some(v),
            Err(kind) => {
                self.report(ColumnRole::CaseId, column, kind);
                None
            }
        }
    }

    fn label(&mut self, role: ColumnRole, column: usize) -> Option<String> {
        let label = coerce_label(self.table.cell(self.row, column));
        if label.is_none() {
            self.report(role, column, IssueKind::MissingValue);
        }
        label
    }
}

/// Ingest a transitions-shaped table into one `ActivityEvent` per valid row.
///
/// Rows with a bad case id or a missing from/to label are left out and
/// reported. A bad duration keeps the row without a sample.
pub fn ingest_transitions(
    table: &DataTable,
    mapping: &ColumnMapping,
) -> Result<Ingested<ActivityEvent>, IngestError> {
    let case_col = mapping.require(ColumnRole::CaseId)?;
    let from_col = mapping.require(ColumnRole::From)?;
    let to_col = mapping.require(ColumnRole::To)?;
    let flag_col = mapping.get(ColumnRole::HappyPath);
    let duration_col = mapping.get(ColumnRole::Duration);

    let mut out = Ingested::default();
    for row in 0..table.row_count() {
        let mut reader = RowReader::new(table, row);
        let case_id = reader.case_id(case_col);
        let from = reader.label(ColumnRole::From, from_col);
        let to = reader.label(ColumnRole::To, to_col);

        let happy_path = flag_col
            .map(|c| coerce_flag(table.cell(row, c)))
            .unwrap_or(false);
        let duration = match duration_col {
            Some(c) => match coerce_duration(table.cell(row, c)) {
                Ok(d) => d,
                Err(kind) => {
                    reader.report(ColumnRole::Duration, c, kind);
                    None
                }
            },
            None => None,
        };

        out.issues.append(&mut reader.issues);
        if let (Some(case_id), Some(from), Some(to)) = (case_id, from, to) {
            out.records.push(ActivityEvent {
                case_id,
                from,
                to,
                happy_path,
                duration,
            });
        }
    }

    log_summary("transition", table.row_count(), &out);
    Ok(out)
}

/// Ingest an event-log-shaped table into one `Activity` per valid row.
pub fn ingest_activities(
    table: &DataTable,
    mapping: &ColumnMapping,
) -> Result<Ingested<Activity>, IngestError> {
    let case_col = mapping.require(ColumnRole::CaseId)?;
    let activity_col = mapping
        .activity_column()
        .ok_or(IngestError::MissingRole(ColumnRole::Activity))?;
    let ts_col = mapping.require(ColumnRole::Timestamp)?;

    let mut out = Ingested::default();
    for row in 0..table.row_count() {
        let mut reader = RowReader::new(table, row);
        let case_id = reader.case_id(case_col);
        let name = reader.label(ColumnRole::Activity, activity_col);
        let timestamp = match coerce_timestamp(table.cell(row, ts_col)) {
            Ok(ts) => Some(ts),
            Err(kind) => {
                reader.report(ColumnRole::Timestamp, ts_col, kind);
                None
            }
        };

        out.issues.append(&mut reader.issues);
        if let (Some(case_id), Some(activity_name), Some(timestamp)) = (case_id, name, timestamp) {
            out.records.push(Activity {
                case_id,
                activity_name,
                timestamp,
            });
        }
    }

    log_summary("event-log", table.row_count(), &out);
    Ok(out)
}

fn log_summary<T>(shape: &str, rows: usize, out: &Ingested<T>) {
    if out.issues.is_empty() {
        tracing::debug!(shape, rows, records = out.records.len(), "ingested table");
        return;
    }
    for issue in &out.issues {
        tracing::debug!(%issue, "data-quality issue");
    }
    tracing::warn!(
        shape,
        rows,
        records = out.records.len(),
        issues = out.issues.len(),
        dropped = out.dropped_rows(),
        "ingested table with data-quality issues"
    );
}
