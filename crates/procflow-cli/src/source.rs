//! Host table sources.
//!
//! The host delivers a table in segments through a memory-bounded window.
//! [`SegmentSource`] is that protocol; [`PagedTable`] implements it over a table
//! loaded from a CSV or JSON file.

use anyhow::{anyhow, Context, Result};
use std::fs;
use std::path::Path;

use procflow_ingest::{Cell, DataTable};

use crate::binding::ColumnBinding;

/// Incremental-fetch protocol of the host.
pub trait SegmentSource {
    /// The segment delivered most recently.
    fn current_segment(&self) -> &DataTable;

    /// Segment marker: more rows are available upstream.
    fn has_more(&self) -> bool;

    /// Ask the host for the next segment.
    ///
    /// Returns `false` when the host refuses because its memory ceiling is
    /// reached; the current segment is unchanged in that case.
    fn fetch_more(&mut self) -> bool;
}

/// A fully loaded table served back in fixed-size windows.
#[derive(Debug, Clone)]
pub struct PagedTable {
    full: DataTable,
    segment_rows: usize,
    max_rows: Option<usize>,
    start: usize,
    end: usize,
    current: DataTable,
}

impl PagedTable {
    /// `segment_rows` is the window size (at least 1); `max_rows` is the
    /// ceiling on rows delivered across all segments.
    pub fn new(full: DataTable, segment_rows: usize, max_rows: Option<usize>) -> Self {
        let segment_rows = segment_rows.max(1);
        let mut paged = Self {
            current: DataTable::new(full.columns.clone()),
            full,
            segment_rows,
            max_rows,
            start: 0,
            end: 0,
        };
        paged.deliver(0);
        paged
    }

    /// Serve the whole table as one segment.
    pub fn whole(full: DataTable) -> Self {
        let rows = full.row_count();
        Self::new(full, rows, None)
    }

    fn deliver(&mut self, start: usize) {
        let end = (start + self.segment_rows).min(self.full.row_count());
        self.current = DataTable::with_rows(
            self.full.columns.clone(),
            self.full.rows[start..end].to_vec(),
        );
        self.start = start;
        self.end = end;
    }

    pub fn total_rows(&self) -> usize {
        self.full.row_count()
    }
}

impl SegmentSource for PagedTable {
    fn current_segment(&self) -> &DataTable {
        &self.current
    }

    fn has_more(&self) -> bool {
        self.end < self.full.row_count()
    }

    fn fetch_more(&mut self) -> bool {
        if !self.has_more() {
            return false;
        }
        let next_end = (self.end + self.segment_rows).min(self.full.row_count());
        if let Some(max) = self.max_rows {
            if next_end > max {
                return false;
            }
        }
        tracing::debug!(from = self.end, to = next_end, "fetching next segment");
        self.deliver(self.end);
        true
    }
}

/// Input table encodings understood by the loaders.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    Csv,
    Json,
}

impl TableFormat {
    pub fn parse(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            other => Err(anyhow!("unknown table format `{other}` (expected csv|json)")),
        }
    }

    /// `.json` files are JSON tables; everything else is read as CSV.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|e| e.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("json") => Self::Json,
            _ => Self::Csv,
        }
    }
}

pub fn load_table(path: &Path, format: TableFormat, binding: &ColumnBinding) -> Result<DataTable> {
    let table = match format {
        TableFormat::Csv => {
            let file = fs::File::open(path).with_context(|| format!("open {}", path.display()))?;
            read_csv_table(file, binding)?
        }
        TableFormat::Json => {
            let text = fs::read_to_string(path).with_context(|| format!("read {}", path.display()))?;
            parse_json_table(&text, binding)?
        }
    };
    tracing::debug!(
        path = %path.display(),
        rows = table.row_count(),
        columns = table.columns.len(),
        "loaded table"
    );
    Ok(table)
}

/// Read a headed CSV. Every non-empty cell arrives as text; empty cells are null.
pub fn read_csv_table<R: std::io::Read>(reader: R, binding: &ColumnBinding) -> Result<DataTable> {
    let mut rdr = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
    let mut table = DataTable::new(binding.apply(&headers));
    for record in rdr.records() {
        let record = record?;
        table.push_row(
            record
                .iter()
                .map(|s| if s.is_empty() { Cell::Null } else { Cell::text(s) })
                .collect(),
        );
    }
    Ok(table)
}

/// Parse `{"columns": ["caseId", ...], "rows": [[1, "A", ...], ...]}`.
///
/// Column roles come from the binding, not the document.
pub fn parse_json_table(text: &str, binding: &ColumnBinding) -> Result<DataTable> {
    #[derive(serde::Deserialize)]
    struct JsonTable {
        columns: Vec<String>,
        #[serde(default)]
        rows: Vec<Vec<Cell>>,
    }

    let parsed: JsonTable = serde_json::from_str(text).context("parse JSON table")?;
    Ok(DataTable::with_rows(binding.apply(&parsed.columns), parsed.rows))
}
