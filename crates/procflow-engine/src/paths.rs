//! Path-signature mode.
//!
//! Cases are grouped by a canonical signature and the groups are ranked by
//! size. Two signature flavours exist:
//!
//! - set signatures ([`classify`]): each case's `from#to` strings sorted
//!   lexicographically, so encounter order does not matter;
//! - sequence signatures ([`classify_chronological`]): activity names in
//!   timestamp order, so order does matter.
//!
//! Separator characters inside labels are backslash-escaped
//! ([`escape_label`]), so distinct transition sets never share a signature.
//!
//! Ranking is a stable sort on descending group size: equal-size groups keep
//! the order in which their first case was seen.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

use procflow_ingest::{Activity, ActivityEvent};

use crate::group::group_by;
use crate::transitions::TransitionKey;

/// Joins the two activities of one transition in a set signature.
pub const TRANSITION_SEPARATOR: &str = "#";
/// Joins the parts of a signature.
pub const PATH_SEPARATOR: &str = ";";

const ESCAPE: char = '\\';

/// Escape separator characters inside one activity label.
///
/// Labels without `#`, `;` or `\` come back unchanged, so plain signatures
/// read `A#B;B#C`.
pub fn escape_label(label: &str) -> String {
    let mut out = String::with_capacity(label.len());
    for ch in label.chars() {
        if ch == ESCAPE || TRANSITION_SEPARATOR.starts_with(ch) || PATH_SEPARATOR.starts_with(ch) {
            out.push(ESCAPE);
        }
        out.push(ch);
    }
    out
}

/// Split a signature on unescaped path separators. Parts keep their escapes.
pub fn signature_parts(signature: &str) -> Vec<&str> {
    if signature.is_empty() {
        return Vec::new();
    }
    let mut parts = Vec::new();
    let mut start = 0;
    let mut escaped = false;
    for (i, ch) in signature.char_indices() {
        if escaped {
            escaped = false;
        } else if ch == ESCAPE {
            escaped = true;
        } else if PATH_SEPARATOR.starts_with(ch) {
            parts.push(&signature[start..i]);
            start = i + ch.len_utf8();
        }
    }
    parts.push(&signature[start..]);
    parts
}

/// One case and its path signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Case {
    pub case_id: i64,
    pub path_sorted: String,
}

/// Cases sharing one signature, in first-seen order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathGroup {
    pub signature: String,
    pub case_ids: Vec<i64>,
}

impl PathGroup {
    pub fn len(&self) -> usize {
        self.case_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.case_ids.is_empty()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathClassification {
    /// One entry per distinct case id, first-seen order.
    pub cases: Vec<Case>,
    /// Ranked path groups, largest first.
    pub groups: Vec<PathGroup>,
}

impl PathClassification {
    pub fn happy_path_group(&self) -> Option<&PathGroup> {
        self.groups.first()
    }

    /// Case ids of the top-ranked group; empty when there are no cases.
    pub fn happy_path_cases(&self) -> BTreeSet<i64> {
        self.happy_path_group()
            .map(|g| g.case_ids.iter().copied().collect())
            .unwrap_or_default()
    }

    pub fn signature_of(&self, case_id: i64) -> Option<&str> {
        self.cases
            .iter()
            .find(|c| c.case_id == case_id)
            .map(|c| c.path_sorted.as_str())
    }
}

/// Set-mode classification of transition events.
pub fn classify(events: &[ActivityEvent]) -> PathClassification {
    let cases: Vec<Case> = group_by(events, |e| e.case_id)
        .into_iter()
        .map(|(case_id, case_events)| {
            let mut parts: Vec<String> = case_events
                .iter()
                .map(|e| {
                    format!(
                        "{}{}{}",
                        escape_label(&e.from),
                        TRANSITION_SEPARATOR,
                        escape_label(&e.to)
                    )
                })
                .collect();
            parts.sort();
            Case {
                case_id,
                path_sorted: parts.join(PATH_SEPARATOR),
            }
        })
        .collect();
    classify_cases(cases)
}

/// Sequence-mode classification of timestamped activities.
pub fn classify_chronological(activities: &[Activity]) -> PathClassification {
    let cases: Vec<Case> = chronological_traces(activities)
        .into_iter()
        .map(|(case_id, trace)| Case {
            case_id,
            path_sorted: trace
                .iter()
                .map(|a| escape_label(&a.activity_name))
                .collect::<Vec<_>>()
                .join(PATH_SEPARATOR),
        })
        .collect();
    classify_cases(cases)
}

/// Per-case traces ordered by timestamp (ties keep input order).
fn chronological_traces(activities: &[Activity]) -> Vec<(i64, Vec<&Activity>)> {
    group_by(activities, |a| a.case_id)
        .into_iter()
        .map(|(case_id, mut trace)| {
            trace.sort_by_key(|a| a.timestamp);
            (case_id, trace)
        })
        .collect()
}

/// Turn each case's chronological trace into consecutive transition events.
///
/// The duration of each transition is the gap between the two timestamps, in
/// seconds. Single-activity cases produce no transitions.
pub fn chain_transitions(activities: &[Activity]) -> Vec<ActivityEvent> {
    let mut events = Vec::new();
    for (case_id, trace) in chronological_traces(activities) {
        for pair in trace.windows(2) {
            let (a, b) = (pair[0], pair[1]);
            let secs = (b.timestamp - a.timestamp).num_milliseconds() as f64 / 1000.0;
            events.push(
                ActivityEvent::new(case_id, a.activity_name.clone(), b.activity_name.clone())
                    .with_duration(secs),
            );
        }
    }
    events
}

fn classify_cases(cases: Vec<Case>) -> PathClassification {
    let groups: Vec<PathGroup> = group_by(&cases, |c| c.path_sorted.clone())
        .into_iter()
        .map(|(signature, members)| PathGroup {
            signature,
            case_ids: members.iter().map(|c| c.case_id).collect(),
        })
        .collect();
    let groups = rank_groups(groups);
    tracing::debug!(
        cases = cases.len(),
        variants = groups.len(),
        top = groups.first().map(PathGroup::len).unwrap_or(0),
        "classified case paths"
    );
    PathClassification { cases, groups }
}

/// Stable sort by descending size; equal sizes keep their input order.
pub fn rank_groups(mut groups: Vec<PathGroup>) -> Vec<PathGroup> {
    groups.sort_by(|a, b| b.len().cmp(&a.len()));
    groups
}

/// Every transition that occurs in at least one happy-path case.
pub fn happy_path_edges(
    events: &[ActivityEvent],
    classification: &PathClassification,
) -> HashSet<TransitionKey> {
    let happy = classification.happy_path_cases();
    events
        .iter()
        .filter(|e| happy.contains(&e.case_id))
        .map(TransitionKey::of)
        .collect()
}
