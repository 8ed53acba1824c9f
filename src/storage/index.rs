//! Ordered Index
//!
//! In-memory map from key to the byte offset of its record in a level log.
//! Backed by a `BTreeMap`, so insert and lookup stay logarithmic whatever the
//! insertion order, and traversal is iterative.

use std::collections::BTreeMap;

/// Ordered key → log offset map
#[derive(Debug, Default, Clone)]
pub struct OrderedIndex {
    entries: BTreeMap<Vec<u8>, u64>,
}

impl OrderedIndex {
    /// Create an empty index
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `key` at `offset`, replacing any previous offset for the key
    ///
    /// Upsert is what keeps the latest write visible after replay and merges.
    pub fn insert(&mut self, key: &[u8], offset: u64) {
        match self.entries.get_mut(key) {
            Some(existing) => *existing = offset,
            None => {
                self.entries.insert(key.to_vec(), offset);
            }
        }
    }

    /// Offset of the most recent record for `key`
    pub fn search(&self, key: &[u8]) -> Option<u64> {
        self.entries.get(key).copied()
    }

    /// Entries in ascending key order
    pub fn walk(&self) -> impl Iterator<Item = (&[u8], u64)> + '_ {
        self.entries.iter().map(|(k, &off)| (k.as_slice(), off))
    }

    /// Entries with key `>= from`, ascending
    pub fn walk_from<'a>(&'a self, from: &[u8]) -> impl Iterator<Item = (&'a [u8], u64)> + 'a {
        self.entries
            .range::<[u8], _>((std::ops::Bound::Included(from), std::ops::Bound::Unbounded))
            .map(|(k, &off)| (k.as_slice(), off))
    }

    /// Keys in ascending order
    pub fn keys(&self) -> Vec<Vec<u8>> {
        self.entries.keys().cloned().collect()
    }

    /// Number of distinct keys
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Drop every entry
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
