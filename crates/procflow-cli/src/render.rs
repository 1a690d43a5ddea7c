//! Renderers: Graphviz DOT, JSON handoff and the path-variant report.

use anyhow::{anyhow, Result};
use serde::Serialize;

use procflow_engine::{signature_parts, ProcessModel};

use crate::graph::{EdgeStyle, GraphModel};
use crate::visual::UpdateOutcome;

const HAPPY_COLOR: &str = "#2e7d32";
const NORMAL_COLOR: &str = "#607d8b";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderFormat {
    Dot,
    Json,
}

impl RenderFormat {
    pub fn parse(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dot" | "gv" => Ok(Self::Dot),
            "json" => Ok(Self::Json),
            other => Err(anyhow!("unknown render format `{other}` (expected dot|json)")),
        }
    }
}

fn dot_escape(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}

pub fn render_dot(g: &GraphModel) -> String {
    let mut out = String::new();
    out.push_str("digraph procflow {\n");
    out.push_str("  rankdir=LR;\n");
    out.push_str("  node [shape=box, style=rounded, fontname=\"Helvetica\"];\n");
    out.push_str("  edge [fontname=\"Helvetica\", fontsize=10];\n\n");

    for n in &g.nodes {
        out.push_str(&format!("  {} [label=\"{}\"];\n", n.id, dot_escape(&n.label)));
    }
    if !g.nodes.is_empty() && !g.edges.is_empty() {
        out.push('\n');
    }

    for e in &g.edges {
        let (color, width) = match e.style {
            EdgeStyle::Happy => (HAPPY_COLOR, "2.5"),
            EdgeStyle::Normal => (NORMAL_COLOR, "1.0"),
        };
        out.push_str(&format!(
            "  {} -> {} [label=\"{}\", color=\"{color}\", penwidth={width}];\n",
            e.source,
            e.target,
            dot_escape(&e.label)
        ));
    }

    out.push_str("}\n");
    out
}

pub fn render_json(outcome: &UpdateOutcome) -> Result<String> {
    Ok(serde_json::to_string_pretty(outcome)?)
}

/// One row of the path-variant report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathVariant {
    pub rank: usize,
    pub signature: String,
    pub cases: usize,
    /// Share of all classified cases, rounded.
    pub percentage: u32,
    pub case_ids: Vec<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathReport {
    pub total_cases: usize,
    pub total_variants: usize,
    pub variants: Vec<PathVariant>,
}

/// Ranked path variants, at most `limit` of them.
pub fn path_report(model: &ProcessModel, limit: Option<usize>) -> PathReport {
    let total = model.distinct_case_count();
    let groups = &model.classification.groups;
    let variants = groups
        .iter()
        .take(limit.unwrap_or(groups.len()))
        .enumerate()
        .map(|(i, g)| PathVariant {
            rank: i + 1,
            signature: g.signature.clone(),
            cases: g.len(),
            percentage: procflow_engine::stats::percentage(g.len(), total).unwrap_or(0),
            case_ids: g.case_ids.clone(),
        })
        .collect();
    PathReport {
        total_cases: total,
        total_variants: groups.len(),
        variants,
    }
}

/// Plain-text rendering of a [`PathReport`]. Rank 1 is the happy path.
pub fn render_path_text(report: &PathReport) -> String {
    if report.variants.is_empty() {
        return "no cases\n".to_string();
    }
    let mut out = String::new();
    for v in &report.variants {
        let marker = if v.rank == 1 { "*" } else { " " };
        out.push_str(&format!(
            "{marker}{:>3}. {:>3}% ({} case{})\n",
            v.rank,
            v.percentage,
            v.cases,
            if v.cases == 1 { "" } else { "s" }
        ));
        for step in signature_parts(&v.signature) {
            out.push_str("       ");
            out.push_str(step);
            out.push('\n');
        }
    }
    let hidden = report.total_variants - report.variants.len();
    if hidden > 0 {
        out.push_str(&format!("... {hidden} more variant(s)\n"));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::build_graph;
    use crate::settings::VisualSettings;
    use procflow_engine::build_model;
    use procflow_ingest::ActivityEvent;

    fn model() -> ProcessModel {
        let events = vec![
            ActivityEvent::new(1, "A", "B"),
            ActivityEvent::new(1, "B", "C"),
            ActivityEvent::new(2, "A", "B"),
            ActivityEvent::new(2, "B", "D"),
            ActivityEvent::new(3, "A", "B").with_duration(4.0),
            ActivityEvent::new(3, "B", "C"),
        ];
        build_model(&events, false)
    }

    #[test]
    fn format_parsing() {
        assert_eq!(RenderFormat::parse("DOT").unwrap(), RenderFormat::Dot);
        assert_eq!(RenderFormat::parse(" json ").unwrap(), RenderFormat::Json);
        assert!(RenderFormat::parse("svg").is_err());
    }

    #[test]
    fn dot_marks_happy_edges_and_escapes_labels() {
        let graph = build_graph(&model(), &VisualSettings::default());
        let dot = render_dot(&graph);
        assert!(dot.starts_with("digraph procflow {\n"));
        assert!(dot.contains("  n0 [label=\"A\"];\n"));
        assert!(dot.contains(&format!(
            "  n0 -> n1 [label=\"100% (3)\\navg 4\", color=\"{HAPPY_COLOR}\", penwidth=2.5];\n"
        )));
        assert!(dot.contains(&format!(
            "  n1 -> n3 [label=\"33% (1)\", color=\"{NORMAL_COLOR}\", penwidth=1.0];\n"
        )));
        assert!(dot.trim_end().ends_with('}'));
    }

    #[test]
    fn dot_escape_handles_quotes() {
        assert_eq!(dot_escape("say \"hi\"\\"), "say \\\"hi\\\"\\\\");
    }

    #[test]
    fn path_report_ranks_and_limits() {
        let report = path_report(&model(), Some(1));
        assert_eq!(report.total_cases, 3);
        assert_eq!(report.total_variants, 2);
        assert_eq!(report.variants.len(), 1);
        assert_eq!(report.variants[0].signature, "A#B;B#C");
        assert_eq!(report.variants[0].percentage, 67);
        assert_eq!(report.variants[0].case_ids, vec![1, 3]);

        let text = render_path_text(&report);
        assert!(text.starts_with("*  1.  67% (2 cases)\n"));
        assert!(text.contains("       A#B\n       B#C\n"));
        assert!(text.ends_with("... 1 more variant(s)\n"));
    }

    #[test]
    fn empty_report() {
        let report = path_report(&build_model(&[], false), None);
        assert_eq!(render_path_text(&report), "no cases\n");
    }
}
