//! Transition-aggregation mode.
//!
//! Every `(from, to)` pair becomes one [`Relationship`]. Keys compare by exact,
//! case-sensitive string equality. Accumulated sequences keep input order so
//! two passes over the same rows are identical.

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fmt;

use procflow_ingest::ActivityEvent;

use crate::stats;

#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct TransitionKey {
    pub from: String,
    pub to: String,
}

impl TransitionKey {
    pub fn new(from: impl Into<String>, to: impl Into<String>) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
        }
    }

    pub fn of(event: &ActivityEvent) -> Self {
        Self::new(event.from.clone(), event.to.clone())
    }
}

impl fmt::Display for TransitionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} → {}", self.from, self.to)
    }
}

/// One aggregated transition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Relationship {
    pub key: TransitionKey,
    pub amount: usize,
    pub is_happy_path: bool,
    /// Case id per occurrence, in encounter order (may repeat).
    pub case_ids: Vec<i64>,
    /// Valid duration samples, in encounter order.
    pub durations: Vec<f64>,
}

impl Relationship {
    fn first(event: &ActivityEvent) -> Self {
        Self {
            key: TransitionKey::of(event),
            amount: 1,
            is_happy_path: false,
            case_ids: vec![event.case_id],
            durations: event.duration.into_iter().collect(),
        }
    }

    fn record(&mut self, event: &ActivityEvent) {
        self.amount += 1;
        self.case_ids.push(event.case_id);
        if let Some(d) = event.duration {
            self.durations.push(d);
        }
    }

    pub fn percentage_of_cases(&self, distinct_cases: usize) -> Option<u32> {
        stats::percentage(self.amount, distinct_cases)
    }

    pub fn mean_duration(&self) -> Option<f64> {
        stats::mean(&self.durations)
    }
}

/// Relationships in first-seen key order, with key lookup.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RelationshipMap {
    relationships: Vec<Relationship>,
    #[serde(skip)]
    index: HashMap<TransitionKey, usize>,
    distinct_case_count: usize,
}

impl RelationshipMap {
    pub fn get(&self, key: &TransitionKey) -> Option<&Relationship> {
        self.index.get(key).map(|&i| &self.relationships[i])
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Relationship> {
        self.relationships.iter()
    }

    pub fn keys(&self) -> impl Iterator<Item = &TransitionKey> {
        self.relationships.iter().map(|r| &r.key)
    }

    pub fn len(&self) -> usize {
        self.relationships.len()
    }

    pub fn is_empty(&self) -> bool {
        self.relationships.is_empty()
    }

    /// Number of distinct case ids across all relationships.
    pub fn distinct_case_count(&self) -> usize {
        self.distinct_case_count
    }

    /// Mark every relationship whose key is in `edges` as part of the happy path.
    ///
    /// Returns how many relationships were marked.
    pub fn mark_happy_path(&mut self, edges: &HashSet<TransitionKey>) -> usize {
        let mut marked = 0;
        for rel in &mut self.relationships {
            if edges.contains(&rel.key) {
                rel.is_happy_path = true;
                marked += 1;
            }
        }
        marked
    }

    pub fn happy_path_keys(&self) -> impl Iterator<Item = &TransitionKey> {
        self.relationships
            .iter()
            .filter(|r| r.is_happy_path)
            .map(|r| &r.key)
    }
}

impl<'a> IntoIterator for &'a RelationshipMap {
    type Item = &'a Relationship;
    type IntoIter = std::slice::Iter<'a, Relationship>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Single-pass accumulator for one aggregation call.
///
/// Created, fed and consumed inside [`aggregate`] (or an equivalent caller);
/// it is never kept across updates.
#[derive(Debug, Default)]
pub struct TransitionAccumulator {
    map: RelationshipMap,
    flagged: HashSet<TransitionKey>,
    cases: HashSet<i64>,
}

impl TransitionAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn observe(&mut self, event: &ActivityEvent) {
        let key = TransitionKey::of(event);
        self.cases.insert(event.case_id);
        if event.happy_path {
            self.flagged.insert(key.clone());
        }
        match self.map.index.get(&key) {
            Some(&i) => self.map.relationships[i].record(event),
            None => {
                self.map.index.insert(key, self.map.relationships.len());
                self.map.relationships.push(Relationship::first(event));
            }
        }
    }

    /// Second pass: apply the source happy-path flags collected while observing.
    pub fn finish(mut self) -> RelationshipMap {
        self.map.mark_happy_path(&self.flagged);
        self.map.distinct_case_count = self.cases.len();
        self.map
    }
}

/// Aggregate events into a relationship map.
pub fn aggregate<'a, I>(events: I) -> RelationshipMap
where
    I: IntoIterator<Item = &'a ActivityEvent>,
{
    let mut acc = TransitionAccumulator::new();
    for event in events {
        acc.observe(event);
    }
    let map = acc.finish();
    tracing::debug!(
        relationships = map.len(),
        cases = map.distinct_case_count(),
        "aggregated transitions"
    );
    map
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn ev(case: i64, from: &str, to: &str) -> ActivityEvent {
        ActivityEvent::new(case, from, to)
    }

    #[test]
    fn accumulates_in_encounter_order() {
        let events = vec![
            ev(1, "A", "B").with_duration(2.0),
            ev(1, "B", "C"),
            ev(2, "A", "B").with_duration(4.0),
            ev(2, "B", "D"),
        ];
        let map = aggregate(&events);

        let keys: Vec<String> = map.keys().map(|k| k.to_string()).collect();
        assert_eq!(keys, vec!["A → B", "B → C", "B → D"]);

        let ab = map.get(&TransitionKey::new("A", "B")).unwrap();
        assert_eq!(ab.amount, 2);
        assert_eq!(ab.case_ids, vec![1, 2]);
        assert_eq!(ab.durations, vec![2.0, 4.0]);
        assert_relative_eq!(ab.mean_duration().unwrap(), 3.0);
        assert_eq!(ab.percentage_of_cases(map.distinct_case_count()), Some(100));

        let bc = map.get(&TransitionKey::new("B", "C")).unwrap();
        assert_eq!(bc.mean_duration(), None);
        assert_eq!(bc.percentage_of_cases(map.distinct_case_count()), Some(50));
        assert_eq!(map.distinct_case_count(), 2);
    }

    #[test]
    fn keys_are_case_sensitive_and_directed() {
        let events = vec![ev(1, "a", "b"), ev(1, "A", "B"), ev(1, "b", "a")];
        assert_eq!(aggregate(&events).len(), 3);
    }

    #[test]
    fn source_flags_mark_every_occurrence_of_the_key() {
        let events = vec![ev(1, "A", "B"), ev(2, "A", "B").flagged(), ev(2, "B", "C")];
        let map = aggregate(&events);
        assert!(map.get(&TransitionKey::new("A", "B")).unwrap().is_happy_path);
        assert!(!map.get(&TransitionKey::new("B", "C")).unwrap().is_happy_path);
        assert_eq!(map.happy_path_keys().count(), 1);
    }

    #[test]
    fn repeated_case_counts_each_occurrence() {
        let events = vec![ev(1, "A", "B"), ev(1, "A", "B")];
        let map = aggregate(&events);
        let ab = map.get(&TransitionKey::new("A", "B")).unwrap();
        assert_eq!(ab.amount, 2);
        assert_eq!(ab.case_ids, vec![1, 1]);
        assert_eq!(map.distinct_case_count(), 1);
        assert_eq!(ab.percentage_of_cases(1), Some(200));
    }

    #[test]
    fn empty_input_gives_empty_map() {
        let map = aggregate(&[]);
        assert!(map.is_empty());
        assert_eq!(map.distinct_case_count(), 0);
    }
}
