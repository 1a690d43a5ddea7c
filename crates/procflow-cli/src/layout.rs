//! Layered layout estimate.
//!
//! The real layout belongs to the renderer (Graphviz or a JSON consumer). The
//! visual still needs content dimensions to compute its zoom transform, so
//! this assigns each node a rank (longest path from the sources, with back
//! edges ignored) and a slot within its rank, left to right.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::graph::GraphModel;

pub const NODE_WIDTH: f64 = 140.0;
pub const NODE_HEIGHT: f64 = 40.0;
pub const RANK_GAP: f64 = 80.0;
pub const NODE_GAP: f64 = 30.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NodePosition {
    pub id: String,
    pub rank: usize,
    /// Top-left corner in layout coordinates.
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layout {
    pub nodes: Vec<NodePosition>,
    pub width: f64,
    pub height: f64,
    /// Edges that close a cycle and were ignored for ranking.
    pub back_edges: usize,
}

impl Layout {
    pub fn size(&self) -> (f64, f64) {
        (self.width, self.height)
    }

    pub fn position(&self, id: &str) -> Option<&NodePosition> {
        self.nodes.iter().find(|p| p.id == id)
    }
}

pub fn estimate(graph: &GraphModel) -> Layout {
    let n = graph.nodes.len();
    let index: HashMap<&str, usize> = graph
        .nodes
        .iter()
        .enumerate()
        .map(|(i, node)| (node.id.as_str(), i))
        .collect();

    let mut adj: Vec<Vec<usize>> = vec![Vec::new(); n];
    for e in &graph.edges {
        if let (Some(&s), Some(&t)) = (index.get(e.source.as_str()), index.get(e.target.as_str())) {
            if s != t {
                adj[s].push(t);
            }
        }
    }

    // Iterative DFS: postorder for ranking, back edges for cycle breaking.
    let mut state = vec![0u8; n];
    let mut postorder = Vec::with_capacity(n);
    let mut back: HashSet<(usize, usize)> = HashSet::new();
    for root in 0..n {
        if state[root] != 0 {
            continue;
        }
        state[root] = 1;
        let mut stack = vec![(root, 0usize)];
        while let Some(top) = stack.last_mut() {
            let u = top.0;
            if top.1 < adj[u].len() {
                let v = adj[u][top.1];
                top.1 += 1;
                match state[v] {
                    0 => {
                        state[v] = 1;
                        stack.push((v, 0));
                    }
                    1 => {
                        back.insert((u, v));
                    }
                    _ => {}
                }
            } else {
                state[u] = 2;
                postorder.push(u);
                stack.pop();
            }
        }
    }

    let mut rank = vec![0usize; n];
    for &u in postorder.iter().rev() {
        for &v in &adj[u] {
            if !back.contains(&(u, v)) {
                rank[v] = rank[v].max(rank[u] + 1);
            }
        }
    }

    let mut slots: HashMap<usize, usize> = HashMap::new();
    let nodes: Vec<NodePosition> = graph
        .nodes
        .iter()
        .enumerate()
        .map(|(i, node)| {
            let slot = slots.entry(rank[i]).or_insert(0);
            let pos = NodePosition {
                id: node.id.clone(),
                rank: rank[i],
                x: rank[i] as f64 * (NODE_WIDTH + RANK_GAP),
                y: *slot as f64 * (NODE_HEIGHT + NODE_GAP),
            };
            *slot += 1;
            pos
        })
        .collect();

    let ranks = rank.iter().max().map(|r| r + 1).unwrap_or(0);
    let widest = slots.values().copied().max().unwrap_or(0);
    Layout {
        nodes,
        width: span(ranks, NODE_WIDTH, RANK_GAP),
        height: span(widest, NODE_HEIGHT, NODE_GAP),
        back_edges: back.len(),
    }
}

fn span(count: usize, size: f64, gap: f64) -> f64 {
    if count == 0 {
        return 0.0;
    }
    count as f64 * size + (count - 1) as f64 * gap
}
