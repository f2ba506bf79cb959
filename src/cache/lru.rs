//! LRU Core Module
//!
//! Fixed-capacity key→value store with least-recently-used eviction.
//!
//! Entries live in an arena of nodes linked by index. Two permanent sentinel
//! nodes bound the recency sequence, so unlink and relink never special-case
//! an empty list or an end position:
//!
//! ```text
//!   [LRU sentinel] <-> oldest <-> ... <-> newest <-> [MRU sentinel]
//! ```
//!
//! Vacated slots go on a free-list and are reused by later insertions.

use std::collections::HashMap;
use std::hash::Hash;

use serde::Serialize;
use tracing::debug;

use crate::cache::entry::Node;
use crate::cache::{CacheEntry, CacheStats};
use crate::error::{MemoError, Result};

/// Arena slot of the sentinel before the least-recently-used entry.
const LRU_SENTINEL: usize = 0;
/// Arena slot of the sentinel after the most-recently-used entry.
const MRU_SENTINEL: usize = 1;

// == Eviction Trigger ==
/// Decides when `put` evicts before inserting a new key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EvictionTrigger {
    /// Evict once the cache already holds `capacity` entries.
    /// Resident entries never exceed `capacity`.
    #[default]
    AtCapacity,
    /// Evict only once the cache holds more than `capacity` entries.
    /// Allows exactly one entry of overflow.
    OverCapacity,
}

impl EvictionTrigger {
    fn should_evict(self, len: usize, capacity: usize) -> bool {
        match self {
            EvictionTrigger::AtCapacity => len >= capacity,
            EvictionTrigger::OverCapacity => len > capacity,
        }
    }
}

// == LRU Core ==
/// Bounded LRU store with O(1) get, put and eviction.
#[derive(Debug)]
pub struct LruCore<K, V> {
    /// Arena of nodes; slots 0 and 1 are the sentinels
    nodes: Vec<Node<K, V>>,
    /// Vacated arena slots available for reuse
    free: Vec<usize>,
    /// Key → arena slot
    index: HashMap<K, usize>,
    capacity: usize,
    trigger: EvictionTrigger,
    hits: u64,
    misses: u64,
    evictions: u64,
}

impl<K, V> LruCore<K, V>
where
    K: Hash + Eq + Clone,
{
    // == Constructor ==
    /// Creates an empty core evicting at `capacity`.
    ///
    /// # Errors
    /// `InvalidCapacity` when `capacity` is zero.
    pub fn new(capacity: usize) -> Result<Self> {
        Self::with_trigger(capacity, EvictionTrigger::default())
    }

    /// Creates an empty core with an explicit eviction trigger.
    ///
    /// # Errors
    /// `InvalidCapacity` when `capacity` is zero.
    pub fn with_trigger(capacity: usize, trigger: EvictionTrigger) -> Result<Self> {
        if capacity == 0 {
            return Err(MemoError::InvalidCapacity(capacity));
        }
        Ok(Self::unchecked(capacity, trigger))
    }

    /// Builds the core from an already validated capacity.
    pub(crate) fn unchecked(capacity: usize, trigger: EvictionTrigger) -> Self {
        Self {
            nodes: sentinels(),
            free: Vec::new(),
            index: HashMap::new(),
            capacity,
            trigger,
            hits: 0,
            misses: 0,
            evictions: 0,
        }
    }

    // == Get ==
    /// Returns the value for `key` and marks it most recently used.
    ///
    /// A hit increments the hit counter. A miss changes nothing; the caller
    /// is expected to compute the value and `put` it.
    pub fn get(&mut self, key: &K) -> Option<&V> {
        let idx = *self.index.get(key)?;
        self.unlink(idx);
        self.link_most_recent(idx);
        self.hits += 1;
        self.nodes[idx].entry.as_ref().map(|entry| &entry.value)
    }

    // == Peek ==
    /// Returns the value for `key` without touching recency or counters.
    pub fn peek(&self, key: &K) -> Option<&V> {
        let idx = *self.index.get(key)?;
        self.nodes[idx].entry.as_ref().map(|entry| &entry.value)
    }

    // == Put ==
    /// Stores `value` under `key` at the most-recently-used end.
    ///
    /// An existing key has its value replaced and is moved to the
    /// most-recently-used end without touching the counters. A new key may
    /// first evict the least-recently-used entry (see [`EvictionTrigger`]),
    /// and counts as a miss.
    ///
    /// Returns the evicted entry, if any.
    pub fn put(&mut self, key: K, value: V) -> Option<CacheEntry<K, V>> {
        if let Some(&idx) = self.index.get(&key) {
            if let Some(entry) = self.nodes[idx].entry.as_mut() {
                entry.value = value;
            }
            self.unlink(idx);
            self.link_most_recent(idx);
            return None;
        }

        let evicted = if self.trigger.should_evict(self.len(), self.capacity) {
            self.evict_least_recent()
        } else {
            None
        };

        let node = Node::occupied(
            CacheEntry::new(key.clone(), value),
            LRU_SENTINEL,
            MRU_SENTINEL,
        );
        let idx = match self.free.pop() {
            Some(idx) => {
                self.nodes[idx] = node;
                idx
            }
            None => {
                self.nodes.push(node);
                self.nodes.len() - 1
            }
        };
        self.link_most_recent(idx);
        self.index.insert(key, idx);
        self.misses += 1;

        evicted
    }

    // == Remove ==
    /// Drops the entry for `key`, returning its value.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        let idx = *self.index.get(key)?;
        self.detach(idx).map(|entry| entry.value)
    }

    // == Clear ==
    /// Drops every entry and resets all counters.
    pub fn clear(&mut self) {
        self.nodes = sentinels();
        self.free.clear();
        self.index.clear();
        self.hits = 0;
        self.misses = 0;
        self.evictions = 0;
    }

    // == Introspection ==
    /// Returns the key that the next eviction would remove.
    pub fn least_recent(&self) -> Option<&K> {
        self.nodes[self.nodes[LRU_SENTINEL].more_recent]
            .entry
            .as_ref()
            .map(|entry| &entry.key)
    }

    pub fn contains(&self, key: &K) -> bool {
        self.index.contains_key(key)
    }

    /// Returns the number of resident entries.
    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn trigger(&self) -> EvictionTrigger {
        self.trigger
    }

    /// Returns a snapshot of the counters.
    pub fn stats(&self) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            evictions: self.evictions,
            capacity: self.capacity,
            current_size: self.len(),
        }
    }

    /// Iterates resident entries from least to most recently used.
    pub fn iter(&self) -> Iter<'_, K, V> {
        Iter {
            nodes: &self.nodes,
            current: self.nodes[LRU_SENTINEL].more_recent,
        }
    }

    // == Linking ==
    fn unlink(&mut self, idx: usize) {
        let less = self.nodes[idx].less_recent;
        let more = self.nodes[idx].more_recent;
        self.nodes[less].more_recent = more;
        self.nodes[more].less_recent = less;
    }

    fn link_most_recent(&mut self, idx: usize) {
        let newest = self.nodes[MRU_SENTINEL].less_recent;
        self.nodes[idx].less_recent = newest;
        self.nodes[idx].more_recent = MRU_SENTINEL;
        self.nodes[newest].more_recent = idx;
        self.nodes[MRU_SENTINEL].less_recent = idx;
    }

    fn detach(&mut self, idx: usize) -> Option<CacheEntry<K, V>> {
        let entry = self.nodes[idx].entry.take()?;
        self.unlink(idx);
        self.index.remove(&entry.key);
        self.free.push(idx);
        Some(entry)
    }

    fn evict_least_recent(&mut self) -> Option<CacheEntry<K, V>> {
        let idx = self.nodes[LRU_SENTINEL].more_recent;
        if idx == MRU_SENTINEL {
            return None;
        }
        let entry = self.detach(idx)?;
        self.evictions += 1;
        debug!(
            resident = self.len(),
            capacity = self.capacity,
            "Evicted least recently used entry"
        );
        Some(entry)
    }

    /// Walks the arena and checks the index/sequence bijection.
    #[cfg(test)]
    pub(crate) fn check_invariants(&self) {
        let mut walked = 0;
        let mut prev = LRU_SENTINEL;
        let mut idx = self.nodes[LRU_SENTINEL].more_recent;
        while idx != MRU_SENTINEL {
            let node = &self.nodes[idx];
            assert_eq!(node.less_recent, prev, "broken back link at slot {idx}");
            let entry = node.entry.as_ref().expect("linked slot must be occupied");
            assert_eq!(self.index.get(&entry.key), Some(&idx));
            walked += 1;
            prev = idx;
            idx = node.more_recent;
        }
        assert_eq!(self.nodes[MRU_SENTINEL].less_recent, prev);
        assert_eq!(walked, self.index.len());
        assert!(self.nodes[LRU_SENTINEL].entry.is_none());
        assert!(self.nodes[MRU_SENTINEL].entry.is_none());
        for &slot in &self.free {
            assert!(self.nodes[slot].entry.is_none());
        }
    }
}

/// Creates the two sentinel nodes, linked to each other.
fn sentinels<K, V>() -> Vec<Node<K, V>> {
    let mut lru = Node::vacant();
    lru.more_recent = MRU_SENTINEL;
    let mut mru = Node::vacant();
    mru.less_recent = LRU_SENTINEL;
    vec![lru, mru]
}

// == Iterator ==
/// Iterator over resident entries, least recently used first.
pub struct Iter<'a, K, V> {
    nodes: &'a [Node<K, V>],
    current: usize,
}

impl<'a, K, V> Iterator for Iter<'a, K, V> {
    type Item = &'a CacheEntry<K, V>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current == MRU_SENTINEL {
            return None;
        }
        let node = &self.nodes[self.current];
        self.current = node.more_recent;
        node.entry.as_ref()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    fn keys<V>(core: &LruCore<&'static str, V>) -> Vec<&'static str> {
        core.iter().map(|entry| entry.key).collect()
    }

    #[test]
    fn test_core_new() {
        let core: LruCore<&str, u32> = LruCore::new(3).unwrap();
        assert!(core.is_empty());
        assert_eq!(core.len(), 0);
        assert_eq!(core.capacity(), 3);
        assert_eq!(core.least_recent(), None);
        core.check_invariants();
    }

    #[test]
    fn test_core_rejects_zero_capacity() {
        let core: Result<LruCore<&str, u32>> = LruCore::new(0);
        assert_eq!(core.err(), Some(MemoError::InvalidCapacity(0)));

        let core: Result<LruCore<&str, u32>> =
            LruCore::with_trigger(0, EvictionTrigger::OverCapacity);
        assert!(matches!(core, Err(MemoError::InvalidCapacity(0))));
    }

    #[test]
    fn test_put_then_get_is_hit() {
        let mut core = LruCore::new(3).unwrap();
        core.put("a", 1);

        assert_eq!(core.get(&"a"), Some(&1));
        let stats = core.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.current_size, 1);
    }

    #[test]
    fn test_get_missing_counts_nothing() {
        let mut core: LruCore<&str, u32> = LruCore::new(3).unwrap();
        assert_eq!(core.get(&"nope"), None);
        assert_eq!(core.stats(), CacheStats::new(3));
    }

    #[test]
    fn test_capacity_two_evicts_first_key() {
        let mut core = LruCore::new(2).unwrap();
        core.put("A", 1);
        core.put("B", 2);
        let evicted = core.put("C", 3);

        assert_eq!(evicted, Some(CacheEntry::new("A", 1)));
        assert_eq!(core.len(), 2);
        assert_eq!(core.get(&"A"), None);
        assert_eq!(core.get(&"B"), Some(&2));
        assert_eq!(core.get(&"C"), Some(&3));
        assert_eq!(core.stats().evictions, 1);
        core.check_invariants();
    }

    #[test]
    fn test_over_capacity_allows_one_extra() {
        let mut core = LruCore::with_trigger(2, EvictionTrigger::OverCapacity).unwrap();
        assert_eq!(core.put("A", 1), None);
        assert_eq!(core.put("B", 2), None);
        assert_eq!(core.put("C", 3), None);
        assert_eq!(core.len(), 3);

        // Next insertion evicts the oldest and stays at capacity + 1
        assert_eq!(core.put("D", 4), Some(CacheEntry::new("A", 1)));
        assert_eq!(core.len(), 3);
        assert_eq!(keys(&core), vec!["B", "C", "D"]);
        core.check_invariants();
    }

    #[test]
    fn test_get_moves_to_most_recent() {
        let mut core = LruCore::new(3).unwrap();
        core.put("a", 1);
        core.put("b", 2);
        core.put("c", 3);

        core.get(&"a");
        assert_eq!(keys(&core), vec!["b", "c", "a"]);
        assert_eq!(core.least_recent(), Some(&"b"));

        core.put("d", 4);
        assert!(!core.contains(&"b"));
        assert_eq!(keys(&core), vec!["c", "a", "d"]);
        core.check_invariants();
    }

    #[test]
    fn test_repeated_get_is_idempotent_for_order() {
        let mut core = LruCore::new(3).unwrap();
        core.put("a", 1);
        core.put("b", 2);
        core.put("c", 3);

        core.get(&"b");
        let once = keys(&core);
        core.get(&"b");
        core.get(&"b");
        assert_eq!(keys(&core), once);
        assert_eq!(core.least_recent(), Some(&"a"));
    }

    #[test]
    fn test_put_existing_key_updates_value() {
        let mut core = LruCore::new(3).unwrap();
        core.put("a", 1);
        core.put("b", 2);

        assert_eq!(core.put("a", 10), None);
        assert_eq!(core.len(), 2);
        assert_eq!(core.peek(&"a"), Some(&10));
        assert_eq!(keys(&core), vec!["b", "a"]);
        // update path does not count as a miss
        assert_eq!(core.stats().misses, 2);
    }

    #[test]
    fn test_peek_does_not_touch() {
        let mut core = LruCore::new(2).unwrap();
        core.put("a", 1);
        core.put("b", 2);

        assert_eq!(core.peek(&"a"), Some(&1));
        assert_eq!(core.stats().hits, 0);
        assert_eq!(core.least_recent(), Some(&"a"));
    }

    #[test]
    fn test_remove_frees_slot_for_reuse() {
        let mut core = LruCore::new(3).unwrap();
        core.put("a", 1);
        core.put("b", 2);
        core.put("c", 3);

        assert_eq!(core.remove(&"b"), Some(2));
        assert_eq!(core.remove(&"b"), None);
        assert_eq!(keys(&core), vec!["a", "c"]);

        core.put("d", 4);
        assert_eq!(core.nodes.len(), 5, "vacated slot should be reused");
        assert_eq!(keys(&core), vec!["a", "c", "d"]);
        core.check_invariants();
    }

    #[test]
    fn test_clear_resets_everything() {
        let mut core = LruCore::new(2).unwrap();
        core.put("a", 1);
        core.put("b", 2);
        core.put("c", 3);
        core.get(&"c");

        core.clear();

        assert!(core.is_empty());
        assert_eq!(core.stats(), CacheStats::new(2));
        assert_eq!(core.get(&"c"), None);
        core.check_invariants();

        core.put("x", 9);
        assert_eq!(core.get(&"x"), Some(&9));
    }

    #[test]
    fn test_capacity_one() {
        let mut core = LruCore::new(1).unwrap();
        core.put("a", 1);
        core.put("b", 2);
        assert_eq!(keys(&core), vec!["b"]);
        core.check_invariants();
    }

    #[test]
    fn test_tuple_keys() {
        let mut core = LruCore::new(4).unwrap();
        core.put((1, "x"), "one-x");
        core.put((1, "y"), "one-y");

        assert_eq!(core.get(&(1, "x")), Some(&"one-x"));
        assert_eq!(core.get(&(1, "z")), None);
    }
}
