//! Property tests for the segmented fetch loop.

use proptest::prelude::*;

use procflow_cli::fetch::fetch_all;
use procflow_cli::source::PagedTable;
use procflow_cli::viewport::Viewport;
use procflow_cli::{Visual, VisualSettings};
use procflow_ingest::{Cell, ColumnMeta, ColumnRole, DataTable};

fn transitions_table(rows: &[(i64, u8, u8)]) -> DataTable {
    let columns = vec![
        ColumnMeta::new("caseId", vec![ColumnRole::CaseId]),
        ColumnMeta::new("from", vec![ColumnRole::From]),
        ColumnMeta::new("to", vec![ColumnRole::To]),
    ];
    let rows = rows
        .iter()
        .map(|(c, f, t)| {
            vec![
                Cell::from(*c),
                Cell::text(format!("S{f}")),
                Cell::text(format!("S{t}")),
            ]
        })
        .collect();
    DataTable::with_rows(columns, rows)
}

fn arb_rows() -> impl Strategy<Value = Vec<(i64, u8, u8)>> {
    prop::collection::vec((0i64..12, 0u8..5, 0u8..5), 0..60)
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 256, failure_persistence: None, ..ProptestConfig::default() })]

    #[test]
    fn segment_size_does_not_change_the_table(rows in arb_rows(), seg in 1usize..20) {
        let table = transitions_table(&rows);
        let (fetched, outcome) = fetch_all(&mut PagedTable::new(table.clone(), seg, None)).unwrap();
        prop_assert!(!outcome.is_partial());
        prop_assert_eq!(outcome.rows(), rows.len());
        prop_assert_eq!(fetched, table);
    }

    #[test]
    fn ceiling_never_exceeded_and_prefix_kept(rows in arb_rows(), seg in 1usize..20, max in 0usize..60) {
        let table = transitions_table(&rows);
        let (fetched, outcome) = fetch_all(&mut PagedTable::new(table.clone(), seg, Some(max))).unwrap();
        let first = seg.min(rows.len());
        // The first segment is always delivered; later ones only within the ceiling.
        prop_assert!(outcome.rows() <= max.max(first));
        prop_assert_eq!(&fetched.rows[..], &table.rows[..outcome.rows()]);
        prop_assert_eq!(outcome.is_partial(), outcome.rows() < rows.len());
    }

    #[test]
    fn graph_is_independent_of_segmentation(rows in arb_rows(), seg in 1usize..20) {
        let table = transitions_table(&rows);
        let mut a = Visual::new(VisualSettings::default());
        let mut b = Visual::new(VisualSettings::default());
        let whole = a.update(&mut PagedTable::whole(table.clone()), Viewport::default()).unwrap();
        let paged = b.update(&mut PagedTable::new(table, seg, None), Viewport::default()).unwrap();
        prop_assert_eq!(whole.graph, paged.graph);
    }
}
