//! Incremental-fetch loop.
//!
//! Keeps requesting segments while the host signals more data, then hands the
//! accumulated table to aggregation exactly once. Hitting the host's memory
//! ceiling is a normal terminal state, not an error.

use anyhow::Result;
use serde::Serialize;

use procflow_ingest::DataTable;

use crate::source::SegmentSource;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum FetchOutcome {
    /// Every segment arrived.
    Complete { rows: usize, segments: usize },
    /// The host refused further segments; `rows` is what arrived.
    MemoryCeilingReached { rows: usize, segments: usize },
}

impl FetchOutcome {
    pub fn rows(&self) -> usize {
        match self {
            FetchOutcome::Complete { rows, .. } | FetchOutcome::MemoryCeilingReached { rows, .. } => {
                *rows
            }
        }
    }

    pub fn is_partial(&self) -> bool {
        matches!(self, FetchOutcome::MemoryCeilingReached { .. })
    }
}

/// Drain `source` into one table.
pub fn fetch_all(source: &mut dyn SegmentSource) -> Result<(DataTable, FetchOutcome)> {
    let mut table = source.current_segment().clone();
    let mut segments = 1;
    loop {
        if !source.has_more() {
            let outcome = FetchOutcome::Complete {
                rows: table.row_count(),
                segments,
            };
            tracing::debug!(?outcome, "fetch complete");
            return Ok((table, outcome));
        }
        if !source.fetch_more() {
            let outcome = FetchOutcome::MemoryCeilingReached {
                rows: table.row_count(),
                segments,
            };
            tracing::warn!(rows = table.row_count(), segments, "host memory ceiling reached");
            return Ok((table, outcome));
        }
        table.append(source.current_segment().clone())?;
        segments += 1;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::PagedTable;
    use procflow_ingest::{Cell, ColumnMeta};

    fn numbered(n: usize) -> DataTable {
        DataTable::with_rows(
            vec![ColumnMeta::unbound("n")],
            (0..n).map(|i| vec![Cell::from(i as i64)]).collect(),
        )
    }

    #[test]
    fn collects_all_segments() {
        let mut src = PagedTable::new(numbered(7), 3, None);
        let (table, outcome) = fetch_all(&mut src).unwrap();
        assert_eq!(outcome, FetchOutcome::Complete { rows: 7, segments: 3 });
        assert_eq!(table, numbered(7));
    }

    #[test]
    fn stops_at_the_ceiling_with_partial_data() {
        let mut src = PagedTable::new(numbered(10), 4, Some(8));
        let (table, outcome) = fetch_all(&mut src).unwrap();
        assert_eq!(outcome, FetchOutcome::MemoryCeilingReached { rows: 8, segments: 2 });
        assert!(outcome.is_partial());
        assert_eq!(table.row_count(), 8);
        assert_eq!(table.rows[7], vec![Cell::from(7i64)]);
    }

    #[test]
    fn single_segment_tables_need_no_fetch() {
        let mut src = PagedTable::whole(numbered(2));
        let (_, outcome) = fetch_all(&mut src).unwrap();
        assert_eq!(outcome, FetchOutcome::Complete { rows: 2, segments: 1 });
    }
}
