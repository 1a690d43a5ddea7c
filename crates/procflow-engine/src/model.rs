//! One update's process model: relationships + path classification.

use serde::{Deserialize, Serialize};

use procflow_ingest::{Activity, ActivityEvent, DataShape};

use crate::paths::{chain_transitions, classify, classify_chronological, happy_path_edges, PathClassification};
use crate::transitions::{aggregate, RelationshipMap, TransitionKey};

/// Where the happy-path marking on relationships came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HappyPathSource {
    /// The source table carried a happy-path flag column.
    Flagged,
    /// Derived from the edges of the top-ranked path group.
    Derived,
}

#[derive(Debug, Clone, Serialize)]
pub struct ProcessModel {
    pub shape: DataShape,
    pub relationships: RelationshipMap,
    pub classification: PathClassification,
    pub happy_path_source: HappyPathSource,
    /// Source-flagged transitions that no top-group case contains. Always
    /// empty for derived happy paths.
    pub unsupported_flags: Vec<TransitionKey>,
}

impl ProcessModel {
    pub fn distinct_case_count(&self) -> usize {
        self.classification.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.relationships.is_empty()
    }
}

/// Build the model for a transitions-shaped table.
///
/// When `source_has_flags` is set the flags in `events` decide happy-path
/// membership; otherwise the top path group does.
pub fn build_model(events: &[ActivityEvent], source_has_flags: bool) -> ProcessModel {
    let mut relationships = aggregate(events);
    let classification = classify(events);
    let edges = happy_path_edges(events, &classification);
    let mut unsupported_flags = Vec::new();
    let happy_path_source = if source_has_flags {
        unsupported_flags = relationships
            .happy_path_keys()
            .filter(|k| !edges.contains(*k))
            .cloned()
            .collect();
        if !unsupported_flags.is_empty() {
            tracing::warn!(
                count = unsupported_flags.len(),
                "happy-path flags mark transitions outside the most frequent path"
            );
        }
        HappyPathSource::Flagged
    } else {
        relationships.mark_happy_path(&edges);
        HappyPathSource::Derived
    };
    ProcessModel {
        shape: DataShape::Transitions,
        relationships,
        classification,
        happy_path_source,
        unsupported_flags,
    }
}

/// Build the model for an event-log-shaped table.
///
/// Paths are sequence signatures; relationships come from chaining each
/// case's activities in timestamp order.
pub fn build_event_log_model(activities: &[Activity]) -> ProcessModel {
    let events = chain_transitions(activities);
    let mut relationships = aggregate(&events);
    let classification = classify_chronological(activities);
    let edges = happy_path_edges(&events, &classification);
    relationships.mark_happy_path(&edges);
    ProcessModel {
        shape: DataShape::EventLog,
        relationships,
        classification,
        happy_path_source: HappyPathSource::Derived,
        unsupported_flags: Vec::new(),
    }
}
