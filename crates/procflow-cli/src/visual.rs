//! One update cycle of the process-flow visual.
//!
//! `Visual` keeps only the user-facing settings and the pan/zoom transform
//! between updates. Tables, records, relationship maps and path groups are
//! locals of [`Visual::update`] and are dropped when it returns.

use anyhow::Result;
use serde::Serialize;

use procflow_engine::{build_event_log_model, build_model, ProcessModel};
use procflow_ingest::{
    dropped_row_count, ingest_activities, ingest_transitions, ColumnMapping, ColumnRole,
    DataQualityIssue, DataShape, DataTable,
};

use crate::fetch::{fetch_all, FetchOutcome};
use crate::graph::{build_graph, GraphModel};
use crate::layout::{estimate, Layout};
use crate::settings::VisualSettings;
use crate::source::SegmentSource;
use crate::viewport::{Viewport, ZoomTransform, DEFAULT_PADDING};

/// What happens to the pan/zoom transform when a new update arrives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ZoomPolicy {
    /// Refit whenever the layout size or the viewport changes.
    Reset,
    /// Fit once, then keep the user's transform across updates.
    Preserve,
}

#[derive(Debug, Clone, Serialize)]
pub struct UpdateOutcome {
    pub status: String,
    pub fetch: FetchOutcome,
    pub graph: GraphModel,
    pub layout: Layout,
    pub transform: ZoomTransform,
    pub viewport: Viewport,
    pub issues: Vec<DataQualityIssue>,
}

#[derive(Debug, Clone)]
pub struct Visual {
    settings: VisualSettings,
    transform: Option<ZoomTransform>,
    fitted_for: Option<((f64, f64), Viewport)>,
}

impl Visual {
    pub fn new(settings: VisualSettings) -> Self {
        Self {
            settings,
            transform: None,
            fitted_for: None,
        }
    }

    pub fn settings(&self) -> &VisualSettings {
        &self.settings
    }

    pub fn set_settings(&mut self, settings: VisualSettings) {
        self.settings = settings;
    }

    pub fn zoom_policy(&self) -> ZoomPolicy {
        if self.settings.view.preserve_zoom {
            ZoomPolicy::Preserve
        } else {
            ZoomPolicy::Reset
        }
    }

    pub fn transform(&self) -> ZoomTransform {
        self.transform.unwrap_or_default()
    }

    /// User pan gesture.
    pub fn pan(&mut self, dx: f64, dy: f64) {
        self.transform = Some(self.transform().pan(dx, dy));
    }

    /// User zoom gesture around a screen point.
    pub fn zoom_at(&mut self, factor: f64, px: f64, py: f64) {
        self.transform = Some(self.transform().zoom_at(factor, px, py));
    }

    /// Run one full update: fetch, ingest, aggregate, build, lay out, fit.
    pub fn update(&mut self, source: &mut dyn SegmentSource, viewport: Viewport) -> Result<UpdateOutcome> {
        let (table, fetch) = fetch_all(source)?;
        let (model, issues) = aggregate_table(&table)?;
        let graph = build_graph(&model, &self.settings);
        let layout = estimate(&graph);
        let transform = self.recompute_transform(layout.size(), viewport);
        let status = status_message(&fetch, &graph, &issues);

        tracing::debug!(
            nodes = graph.nodes.len(),
            edges = graph.edges.len(),
            scale = transform.scale,
            "update complete"
        );

        Ok(UpdateOutcome {
            status,
            fetch,
            graph,
            layout,
            transform,
            viewport,
            issues,
        })
    }

    fn recompute_transform(&mut self, content: (f64, f64), viewport: Viewport) -> ZoomTransform {
        let changed = self.fitted_for != Some((content, viewport));
        let refit = match self.zoom_policy() {
            ZoomPolicy::Reset => changed || self.transform.is_none(),
            ZoomPolicy::Preserve => self.transform.is_none(),
        };
        if refit {
            self.transform = Some(ZoomTransform::fit(content, viewport, DEFAULT_PADDING));
            self.fitted_for = Some((content, viewport));
        }
        self.transform()
    }
}

/// Ingest and aggregate one delivered table using the strategy its bound
/// columns select.
pub fn aggregate_table(table: &DataTable) -> Result<(ProcessModel, Vec<DataQualityIssue>)> {
    let mapping = ColumnMapping::resolve(&table.columns)?;
    match mapping.shape()? {
        DataShape::Transitions => {
            let ingested = ingest_transitions(table, &mapping)?;
            let has_flags = mapping.has(ColumnRole::HappyPath);
            Ok((build_model(&ingested.records, has_flags), ingested.issues))
        }
        DataShape::EventLog => {
            let ingested = ingest_activities(table, &mapping)?;
            Ok((build_event_log_model(&ingested.records), ingested.issues))
        }
    }
}

pub fn status_message(fetch: &FetchOutcome, graph: &GraphModel, issues: &[DataQualityIssue]) -> String {
    let mut status = if fetch.rows() == 0 || graph.summary.cases == 0 {
        "No data to display".to_string()
    } else if fetch.is_partial() {
        format!("Showing {} rows: data limit reached", fetch.rows())
    } else {
        format!("Showing {} rows", fetch.rows())
    };
    if !issues.is_empty() {
        let skipped = dropped_row_count(issues);
        status.push_str(&format!(
            " ({} data-quality issue{}, {} row{} skipped)",
            issues.len(),
            plural(issues.len()),
            skipped,
            plural(skipped)
        ));
    }
    status
}

fn plural(n: usize) -> &'static str {
    if n == 1 {
        ""
    } else {
        "s"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::binding::ColumnBinding;
    use crate::source::{read_csv_table, PagedTable};

    const CSV: &str = "caseId,from,to\n1,A,B\n1,B,C\n2,A,B\n2,B,D\n3,A,B\n3,B,C\n";

    fn source(csv: &str, segment_rows: usize, max_rows: Option<usize>) -> PagedTable {
        let table = read_csv_table(csv.as_bytes(), &ColumnBinding::default()).unwrap();
        PagedTable::new(table, segment_rows, max_rows)
    }

    #[test]
    fn update_runs_the_whole_pipeline() {
        let mut visual = Visual::new(VisualSettings::default());
        let out = visual.update(&mut source(CSV, 2, None), Viewport::default()).unwrap();
        assert_eq!(out.fetch, FetchOutcome::Complete { rows: 6, segments: 3 });
        assert_eq!(out.status, "Showing 6 rows");
        assert_eq!(out.graph.edges.len(), 3);
        assert_eq!(out.graph.summary.cases, 3);
        let happy: Vec<&str> = out.graph.happy_edges().map(|e| e.to.as_str()).collect();
        assert_eq!(happy, vec!["B", "C"]);
    }

    #[test]
    fn memory_ceiling_aggregates_partial_data() {
        let mut visual = Visual::new(VisualSettings::default());
        let out = visual.update(&mut source(CSV, 2, Some(4)), Viewport::default()).unwrap();
        assert!(out.fetch.is_partial());
        assert_eq!(out.status, "Showing 4 rows: data limit reached");
        assert_eq!(out.graph.summary.cases, 2);
    }

    #[test]
    fn bad_rows_are_reported_in_status() {
        let csv = "caseId,from,to\n1,A,B\nx,A,B\n";
        let mut visual = Visual::new(VisualSettings::default());
        let out = visual.update(&mut source(csv, 10, None), Viewport::default()).unwrap();
        assert_eq!(out.issues.len(), 1);
        assert_eq!(out.status, "Showing 2 rows (1 data-quality issue, 1 row skipped)");
    }

    #[test]
    fn timestamped_transitions_keep_every_edge() {
        let csv = "caseId,from,to,timestamp\n\
                   1,A,B,2024-01-01\n1,B,C,2024-01-02\n\
                   2,A,B,2024-01-01\n2,B,D,2024-01-03\n";
        let table = read_csv_table(csv.as_bytes(), &ColumnBinding::default()).unwrap();
        let (model, issues) = aggregate_table(&table).unwrap();
        assert!(issues.is_empty());
        assert_eq!(model.shape, DataShape::Transitions);
        let keys: Vec<String> = model.relationships.keys().map(|k| k.to_string()).collect();
        assert_eq!(keys, vec!["A → B", "B → C", "B → D"]);
        assert_eq!(model.classification.signature_of(2), Some("A#B;B#D"));
    }

    #[test]
    fn empty_table_is_not_an_error() {
        let mut visual = Visual::new(VisualSettings::default());
        let out = visual
            .update(&mut source("caseId,from,to\n", 10, None), Viewport::default())
            .unwrap();
        assert!(out.graph.is_empty());
        assert_eq!(out.status, "No data to display");
        assert_eq!(out.transform, ZoomTransform::identity());
    }

    #[test]
    fn missing_binding_is_an_error() {
        let mut visual = Visual::new(VisualSettings::default());
        let err = visual
            .update(&mut source("ticket,from,to\n1,A,B\n", 10, None), Viewport::default())
            .unwrap_err();
        assert!(err.to_string().contains("caseId"));
    }

    #[test]
    fn reset_policy_refits_and_preserve_keeps_user_zoom() {
        let mut visual = Visual::new(VisualSettings::default());
        visual.update(&mut source(CSV, 10, None), Viewport::default()).unwrap();
        visual.pan(100.0, 0.0);
        let panned = visual.transform();

        // Same content and viewport: nothing to refit.
        let out = visual.update(&mut source(CSV, 10, None), Viewport::default()).unwrap();
        assert_eq!(out.transform, panned);

        // New viewport: reset policy refits.
        let out = visual
            .update(&mut source(CSV, 10, None), Viewport::new(640.0, 480.0))
            .unwrap();
        assert_ne!(out.transform, panned);

        let mut settings = VisualSettings::default();
        settings.view.preserve_zoom = true;
        let mut visual = Visual::new(settings);
        visual.update(&mut source(CSV, 10, None), Viewport::default()).unwrap();
        visual.zoom_at(2.0, 0.0, 0.0);
        let zoomed = visual.transform();
        let out = visual
            .update(&mut source(CSV, 10, None), Viewport::new(640.0, 480.0))
            .unwrap();
        assert_eq!(out.transform, zoomed);
    }
}
