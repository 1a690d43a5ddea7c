//! First-seen-order grouping shared by both aggregation modes.

use std::collections::HashMap;
use std::hash::Hash;

/// Items grouped by key, keys kept in the order they were first seen.
#[derive(Debug, Clone)]
pub struct GroupedBy<K, T> {
    index: HashMap<K, usize>,
    groups: Vec<(K, Vec<T>)>,
}

impl<K: Eq + Hash + Clone, T> GroupedBy<K, T> {
    fn new() -> Self {
        Self {
            index: HashMap::new(),
            groups: Vec::new(),
        }
    }

    fn push(&mut self, key: K, item: T) {
        match self.index.get(&key) {
            Some(&i) => self.groups[i].1.push(item),
            None => {
                self.index.insert(key.clone(), self.groups.len());
                self.groups.push((key, vec![item]));
            }
        }
    }

    pub fn get(&self, key: &K) -> Option<&[T]> {
        self.index.get(key).map(|&i| self.groups[i].1.as_slice())
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn keys(&self) -> impl Iterator<Item = &K> {
        self.groups.iter().map(|(k, _)| k)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&K, &[T])> {
        self.groups.iter().map(|(k, v)| (k, v.as_slice()))
    }
}

impl<K, T> IntoIterator for GroupedBy<K, T> {
    type Item = (K, Vec<T>);
    type IntoIter = std::vec::IntoIter<(K, Vec<T>)>;

    fn into_iter(self) -> Self::IntoIter {
        self.groups.into_iter()
    }
}

/// Group `items` by `key_fn`.
///
/// Group order is the first-seen order of each key; items inside a group keep
/// their input order.
pub fn group_by<I, K, T, F>(items: I, mut key_fn: F) -> GroupedBy<K, T>
where
    I: IntoIterator<Item = T>,
    K: Eq + Hash + Clone,
    F: FnMut(&T) -> K,
{
    let mut grouped = GroupedBy::new();
    for item in items {
        let key = key_fn(&item);
        grouped.push(key, item);
    }
    grouped
}
