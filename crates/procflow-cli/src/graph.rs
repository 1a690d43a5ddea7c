//! Renderer-independent graph model.
//!
//! Built fresh from a [`ProcessModel`] on every update. Layout engines and
//! renderers consume this structure and nothing else.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use procflow_engine::{HappyPathSource, ProcessModel, Relationship};
use procflow_ingest::DataShape;

use crate::settings::VisualSettings;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EdgeStyle {
    Happy,
    Normal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    pub id: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphEdge {
    /// Node id of the source activity.
    pub source: String,
    /// Node id of the target activity.
    pub target: String,
    pub from: String,
    pub to: String,
    pub style: EdgeStyle,
    pub label: String,
    pub amount: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub percentage: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mean_duration: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphSummary {
    pub shape: DataShape,
    pub happy_path_source: HappyPathSource,
    pub cases: usize,
    pub relationships: usize,
    /// Relationships hidden by the percentage threshold.
    pub filtered_edges: usize,
    pub path_variants: usize,
    pub happy_path_cases: usize,
    pub percentage_threshold: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphModel {
    pub nodes: Vec<GraphNode>,
    pub edges: Vec<GraphEdge>,
    pub summary: GraphSummary,
}

impl GraphModel {
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty() && self.edges.is_empty()
    }

    pub fn happy_edges(&self) -> impl Iterator<Item = &GraphEdge> {
        self.edges.iter().filter(|e| e.style == EdgeStyle::Happy)
    }
}

/// `"{pct}% ({amount})"`, plus `"\navg {mean}"` when a mean duration exists.
pub fn edge_label(percentage: Option<u32>, amount: usize, mean_duration: Option<f64>) -> String {
    let mut label = match percentage {
        Some(p) => format!("{p}% ({amount})"),
        None => format!("({amount})"),
    };
    if let Some(mean) = mean_duration {
        label.push_str("\navg ");
        label.push_str(&format_number(mean));
    }
    label
}

/// Whole numbers without decimals, everything else with one.
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 {
        format!("{n:.0}")
    } else {
        format!("{n:.1}")
    }
}

fn passes_threshold(percentage: Option<u32>, threshold: f64) -> bool {
    match percentage {
        Some(p) => f64::from(p) >= threshold,
        None => threshold <= 0.0,
    }
}

/// Build the graph for one update.
///
/// Nodes are the endpoints of the edges that survive the threshold, in the
/// order they are first referenced.
pub fn build_graph(model: &ProcessModel, settings: &VisualSettings) -> GraphModel {
    let threshold = settings.threshold();
    let cases = model.distinct_case_count();

    let mut nodes: Vec<GraphNode> = Vec::new();
    let mut node_ids: HashMap<String, String> = HashMap::new();
    let mut node_id = |label: &str, nodes: &mut Vec<GraphNode>| -> String {
        if let Some(id) = node_ids.get(label) {
            return id.clone();
        }
        let id = format!("n{}", nodes.len());
        nodes.push(GraphNode {
            id: id.clone(),
            label: label.to_string(),
        });
        node_ids.insert(label.to_string(), id.clone());
        id
    };

    let mut edges = Vec::new();
    let mut filtered = 0;
    for rel in &model.relationships {
        let percentage = rel.percentage_of_cases(cases);
        if !passes_threshold(percentage, threshold) {
            filtered += 1;
            continue;
        }
        let source = node_id(&rel.key.from, &mut nodes);
        let target = node_id(&rel.key.to, &mut nodes);
        edges.push(edge_for(rel, source, target, percentage));
    }

    if filtered > 0 {
        tracing::debug!(filtered, threshold, "relationships below threshold hidden");
    }

    GraphModel {
        nodes,
        edges,
        summary: GraphSummary {
            shape: model.shape,
            happy_path_source: model.happy_path_source,
            cases,
            relationships: model.relationships.len(),
            filtered_edges: filtered,
            path_variants: model.classification.groups.len(),
            happy_path_cases: model.classification.happy_path_cases().len(),
            percentage_threshold: threshold,
        },
    }
}

fn edge_for(rel: &Relationship, source: String, target: String, percentage: Option<u32>) -> GraphEdge {
    let mean_duration = rel.mean_duration();
    GraphEdge {
        source,
        target,
        from: rel.key.from.clone(),
        to: rel.key.to.clone(),
        style: if rel.is_happy_path {
            EdgeStyle::Happy
        } else {
            EdgeStyle::Normal
        },
        label: edge_label(percentage, rel.amount, mean_duration),
        amount: rel.amount,
        percentage,
        mean_duration,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use procflow_engine::build_model;
    use procflow_ingest::ActivityEvent;

    fn settings(threshold: f64) -> VisualSettings {
        VisualSettings::default().with_threshold(threshold).unwrap()
    }

    #[test]
    fn labels_combine_percentage_count_and_duration() {
        assert_eq!(edge_label(Some(50), 2, None), "50% (2)");
        assert_eq!(edge_label(Some(50), 2, Some(3.0)), "50% (2)\navg 3");
        assert_eq!(edge_label(Some(5), 1, Some(2.26)), "5% (1)\navg 2.3");
        assert_eq!(edge_label(None, 1, None), "(1)");
    }

    #[test]
    fn threshold_hides_low_percentage_edges() {
        // 20 cases: A→B 10%, A→C 25%, A→D 50%, A→E 15%.
        let mut events = Vec::new();
        for case in 0..20 {
            let to = match case {
                0..=1 => "B",
                2..=6 => "C",
                7..=16 => "D",
                _ => "E",
            };
            events.push(ActivityEvent::new(case, "A", to));
        }
        let model = build_model(&events, false);
        let graph = build_graph(&model, &settings(20.0));

        let shown: Vec<(&str, Option<u32>)> =
            graph.edges.iter().map(|e| (e.to.as_str(), e.percentage)).collect();
        assert_eq!(shown, vec![("C", Some(25)), ("D", Some(50))]);
        assert_eq!(graph.summary.filtered_edges, 2);

        let labels: Vec<&str> = graph.nodes.iter().map(|n| n.label.as_str()).collect();
        assert_eq!(labels, vec!["A", "C", "D"]);
    }

    #[test]
    fn edges_reference_node_ids_and_carry_style() {
        let events = vec![
            ActivityEvent::new(1, "A", "B"),
            ActivityEvent::new(1, "B", "C"),
            ActivityEvent::new(2, "A", "B"),
            ActivityEvent::new(2, "B", "D"),
        ];
        let graph = build_graph(&build_model(&events, false), &VisualSettings::default());
        assert_eq!(graph.nodes.len(), 4);
        assert_eq!(graph.edges[0].source, "n0");
        assert_eq!(graph.edges[0].target, "n1");
        assert_eq!(graph.edges[2].source, "n1");
        assert_eq!(graph.edges[2].target, "n3");
        let happy: Vec<&str> = graph.happy_edges().map(|e| e.to.as_str()).collect();
        assert_eq!(happy, vec!["B", "C"]);
        assert_eq!(graph.summary.path_variants, 2);
        assert_eq!(graph.summary.happy_path_cases, 1);
    }

    #[test]
    fn empty_model_gives_empty_graph() {
        let graph = build_graph(&build_model(&[], false), &VisualSettings::default());
        assert!(graph.is_empty());
        assert_eq!(graph.summary.cases, 0);
    }
}
