use procflow_ingest::coerce::coerce_flag;
use procflow_ingest::*;
use proptest::prelude::*;

fn columns() -> Vec<ColumnMeta> {
    vec![
        ColumnMeta::new("case", vec![ColumnRole::CaseId]),
        ColumnMeta::new("from", vec![ColumnRole::From]),
        ColumnMeta::new("to", vec![ColumnRole::To]),
        ColumnMeta::new("secs", vec![ColumnRole::Duration]),
    ]
}

fn case_cell() -> impl Strategy<Value = Cell> {
    prop_oneof![
        (0i64..50).prop_map(Cell::from),
        (0i64..50).prop_map(|n| Cell::text(n.to_string())),
        "[a-z]{1,3}".prop_map(Cell::text),
        Just(Cell::Null),
    ]
}

fn duration_cell() -> impl Strategy<Value = Cell> {
    prop_oneof![
        (0.0f64..1000.0).prop_map(Cell::from),
        "[a-z]{1,3}".prop_map(Cell::text),
        Just(Cell::Null),
    ]
}

fn row_strategy() -> impl Strategy<Value = Vec<Cell>> {
    (case_cell(), "[A-D]", "[A-D]", duration_cell())
        .prop_map(|(case, from, to, secs)| vec![case, Cell::text(from), Cell::text(to), secs])
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 256,
        failure_persistence: None,
        ..ProptestConfig::default()
    })]

    #[test]
    fn every_row_is_either_ingested_or_dropped_with_an_issue(rows in prop::collection::vec(row_strategy(), 0..40)) {
        let total = rows.len();
        let table = DataTable::with_rows(columns(), rows);
        let mapping = ColumnMapping::resolve(&table.columns).unwrap();
        let out = ingest_transitions(&table, &mapping).unwrap();

        prop_assert_eq!(out.records.len() + out.dropped_rows(), total);
        for issue in &out.issues {
            prop_assert!(issue.row < total);
        }
    }

    #[test]
    fn only_the_exact_true_string_is_truthy(s in ".{0,8}") {
        prop_assert_eq!(coerce_flag(&Cell::text(s.clone())), s == "true");
    }
}
