//! Cache Entry Module
//!
//! Defines the resident entries and the arena nodes that link them into
//! recency order.

use serde::Serialize;

// == Cache Entry ==
/// A single memoized call: the argument key and its computed value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CacheEntry<K, V> {
    /// The argument tuple identifying the call
    pub key: K,
    /// The computed result
    pub value: V,
}

impl<K, V> CacheEntry<K, V> {
    pub fn new(key: K, value: V) -> Self {
        Self { key, value }
    }
}

// == Arena Node ==
/// Slot in the recency arena.
///
/// Links are arena indices. Sentinel and vacant slots carry no entry.
#[derive(Debug)]
pub(crate) struct Node<K, V> {
    pub entry: Option<CacheEntry<K, V>>,
    /// Neighbour towards the least-recently-used end
    pub less_recent: usize,
    /// Neighbour towards the most-recently-used end
    pub more_recent: usize,
}

impl<K, V> Node<K, V> {
    /// Creates an unlinked node with no entry.
    pub fn vacant() -> Self {
        Self {
            entry: None,
            less_recent: 0,
            more_recent: 0,
        }
    }

    /// Creates a node holding `entry` with its links set.
    pub fn occupied(entry: CacheEntry<K, V>, less_recent: usize, more_recent: usize) -> Self {
        Self {
            entry: Some(entry),
            less_recent,
            more_recent,
        }
    }
}
