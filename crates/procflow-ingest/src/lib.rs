//! Event-log ingestion for procflow
//!
//! Turns a loosely typed host table into typed records:
//! - `ActivityEvent` rows for pre-aggregated `(case, from, to)` transition tables
//! - `Activity` rows for timestamped event logs
//!
//! Column positions are never guessed. The data-binding layer tags each column
//! with a [`ColumnRole`] and [`ColumnMapping::resolve`] turns those tags into an
//! explicit role → index map. Cell coercion is strict: a cell that cannot be
//! coerced produces a [`DataQualityIssue`] for its row instead of a silent
//! default, and the rest of the table is still ingested.

pub mod coerce;
pub mod columns;
pub mod error;
pub mod ingest;
pub mod records;
pub mod table;

pub use columns::{ColumnMapping, ColumnRole, DataShape};
pub use error::{DataQualityIssue, IngestError, IssueKind};
pub use ingest::{dropped_row_count, ingest_activities, ingest_transitions, Ingested};
pub use records::{Activity, ActivityEvent};
pub use table::{Cell, ColumnMeta, DataTable};
