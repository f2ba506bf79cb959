//! Timed Cache Module
//!
//! Wraps the LRU core with a whole-cache expiry epoch.
//!
//! When a TTL is configured the cache is fresh until `epoch_end`. The first
//! access at or after that instant clears the core and starts a new epoch
//! before the lookup runs, so that access always misses. Nothing happens
//! between accesses; there is no background timer.

use std::convert::Infallible;
use std::hash::Hash;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, trace};

use crate::cache::lru::{EvictionTrigger, Iter, LruCore};
use crate::cache::{CacheEntry, CacheStats, Clock, SystemClock};
use crate::error::{MemoError, Result};

// == Outcome ==
/// Whether a lookup was answered from the cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Hit,
    Miss,
}

// == Timed Cache ==
/// LRU cache whose contents are discarded wholesale every `ttl`.
#[derive(Debug)]
pub struct TimedCache<K, V, C = SystemClock> {
    core: LruCore<K, V>,
    /// Epoch length, None = never expires
    ttl: Option<chrono::Duration>,
    /// Instant of the next forced clear
    epoch_end: Option<DateTime<Utc>>,
    clock: C,
}

impl<K, V> TimedCache<K, V, SystemClock>
where
    K: Hash + Eq + Clone,
    V: Clone,
{
    /// Creates a cache on the system clock with the default eviction trigger.
    ///
    /// # Errors
    /// See [`with_clock`](TimedCache::with_clock).
    pub fn new(capacity: usize, ttl: Option<chrono::Duration>) -> Result<Self> {
        Self::with_clock(capacity, EvictionTrigger::default(), ttl, SystemClock)
    }
}

impl<K, V, C> TimedCache<K, V, C>
where
    K: Hash + Eq + Clone,
    V: Clone,
    C: Clock,
{
    // == Constructor ==
    /// Creates a cache and starts its first epoch.
    ///
    /// An epoch end beyond the representable range disables expiry.
    ///
    /// # Errors
    /// - `InvalidCapacity` when `capacity` is zero
    /// - `InvalidTtl` when `ttl` is zero or negative
    pub fn with_clock(
        capacity: usize,
        trigger: EvictionTrigger,
        ttl: Option<chrono::Duration>,
        clock: C,
    ) -> Result<Self> {
        if capacity == 0 {
            return Err(MemoError::InvalidCapacity(capacity));
        }
        if let Some(ttl) = ttl.filter(|ttl| *ttl <= chrono::Duration::zero()) {
            return Err(MemoError::InvalidTtl(ttl));
        }
        Ok(Self::unchecked(capacity, trigger, ttl, clock))
    }

    /// Builds the cache from an already validated capacity and TTL.
    pub(crate) fn unchecked(
        capacity: usize,
        trigger: EvictionTrigger,
        ttl: Option<chrono::Duration>,
        clock: C,
    ) -> Self {
        let epoch_end = ttl.and_then(|ttl| clock.now().checked_add_signed(ttl));
        Self {
            core: LruCore::unchecked(capacity, trigger),
            ttl,
            epoch_end,
            clock,
        }
    }

    // == Access ==
    /// Returns the cached value for `key`, computing and storing it on a miss.
    pub fn access<F>(&mut self, key: &K, compute: F) -> V
    where
        F: FnOnce() -> V,
    {
        match self.try_access(key, || Ok::<V, Infallible>(compute())) {
            Ok(value) => value,
            Err(never) => match never {},
        }
    }

    /// Like [`access`](Self::access) for fallible computations.
    ///
    /// A failed computation stores nothing and its error is returned as is.
    pub fn try_access<E, F>(&mut self, key: &K, compute: F) -> std::result::Result<V, E>
    where
        F: FnOnce() -> std::result::Result<V, E>,
    {
        self.try_lookup(key, compute).map(|(value, _)| value)
    }

    /// Like [`try_access`](Self::try_access), also reporting hit or miss.
    pub fn try_lookup<E, F>(
        &mut self,
        key: &K,
        compute: F,
    ) -> std::result::Result<(V, Outcome), E>
    where
        F: FnOnce() -> std::result::Result<V, E>,
    {
        if let Some(value) = self.lookup(key) {
            return Ok((value, Outcome::Hit));
        }

        let value = compute()?;
        self.store(key.clone(), value.clone());
        Ok((value, Outcome::Miss))
    }

    /// First half of an access: rolls the epoch, then returns a clone of the
    /// cached value on a hit.
    ///
    /// No borrow of the cache outlives the call, so a miss can be computed
    /// by code that re-enters the cache before [`store`](Self::store) runs.
    pub(crate) fn lookup(&mut self, key: &K) -> Option<V> {
        self.roll_epoch();

        match self.core.get(key) {
            Some(value) => {
                trace!("Cache hit");
                Some(value.clone())
            }
            None => {
                trace!("Cache miss, computing value");
                None
            }
        }
    }

    /// Second half of an access: stores a freshly computed value.
    pub(crate) fn store(&mut self, key: K, value: V) {
        self.core.put(key, value);
    }

    // == Epoch ==
    /// Clears the core if the current epoch has elapsed.
    fn roll_epoch(&mut self) {
        let (Some(ttl), Some(end)) = (self.ttl, self.epoch_end) else {
            return;
        };

        let now = self.clock.now();
        if now < end {
            return;
        }

        let discarded = self.core.len();
        self.core.clear();
        self.epoch_end = now.checked_add_signed(ttl);
        debug!(
            discarded,
            epoch_end = ?self.epoch_end,
            "Cache epoch elapsed, cleared all entries"
        );
    }

    // == Clear ==
    /// Drops every entry and resets the counters. The epoch is left as is.
    pub fn clear(&mut self) {
        self.core.clear();
        debug!("Cache cleared");
    }

    // == Remove ==
    /// Drops the entry for `key`, returning its value.
    pub fn remove(&mut self, key: &K) -> Option<V> {
        self.core.remove(key)
    }

    // == Introspection ==
    /// Returns the value for `key` without touching recency, counters or the epoch.
    pub fn peek(&self, key: &K) -> Option<&V> {
        self.core.peek(key)
    }

    pub fn stats(&self) -> CacheStats {
        self.core.stats()
    }

    /// Returns the resident entries, least recently used first.
    pub fn entries(&self) -> Vec<CacheEntry<K, V>> {
        self.core.iter().cloned().collect()
    }

    pub fn iter(&self) -> Iter<'_, K, V> {
        self.core.iter()
    }

    pub fn ttl(&self) -> Option<chrono::Duration> {
        self.ttl
    }

    pub fn epoch_end(&self) -> Option<DateTime<Utc>> {
        self.epoch_end
    }

    pub fn len(&self) -> usize {
        self.core.len()
    }

    pub fn is_empty(&self) -> bool {
        self.core.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.core.capacity()
    }

    pub fn trigger(&self) -> EvictionTrigger {
        self.core.trigger()
    }
}
