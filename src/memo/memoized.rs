//! Memoized Function Module
//!
//! Binds a computation to a timed LRU cache keyed by its arguments.

use std::convert::Infallible;
use std::fmt;
use std::hash::Hash;
use std::time::Duration;

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::cache::{CacheEntry, CacheStats, Clock, SystemClock, TimedCache};
use crate::config::MemoConfig;
use crate::error::Result;
use crate::memo::{CallReport, Recurse, RecursiveMemoized, SharedMemoized};

// == Memoizer ==
/// Validated configuration that can wrap any number of computations.
///
/// This is the deferred form: configure once, apply later.
///
/// ```
/// use std::time::Duration;
/// use memo_lru::lru_cache;
///
/// let memoizer = lru_cache(5, Some(Duration::from_secs(4))).unwrap();
/// let mut double = memoizer.wrap(|n: &u64| n * 2);
/// let mut square = memoizer.wrap(|n: &u64| n * n);
///
/// assert_eq!(double.invoke(3), 6);
/// assert_eq!(square.invoke(3), 9);
/// ```
#[derive(Debug, Clone, Default)]
pub struct Memoizer {
    config: MemoConfig,
    ttl: Option<chrono::Duration>,
}

impl Memoizer {
    /// Validates `config` and returns a reusable memoizer.
    ///
    /// # Errors
    /// Any error from [`MemoConfig::validate`].
    pub fn new(config: MemoConfig) -> Result<Self> {
        let ttl = config.validate()?;
        debug!(
            capacity = config.capacity,
            ttl = ?config.ttl,
            trigger = ?config.trigger,
            "Memoizer configured"
        );
        Ok(Self { config, ttl })
    }

    pub fn config(&self) -> &MemoConfig {
        &self.config
    }

    /// Wraps an infallible computation.
    pub fn wrap<A, V, F>(&self, func: F) -> Memoized<A, V, F>
    where
        A: Hash + Eq + Clone,
        V: Clone,
        F: FnMut(&A) -> V,
    {
        self.build(func, SystemClock)
    }

    /// Wraps a computation returning `Result`; only `Ok` values are cached.
    pub fn wrap_fallible<A, V, E, F>(&self, func: F) -> Memoized<A, V, F>
    where
        A: Hash + Eq + Clone,
        V: Clone,
        F: FnMut(&A) -> std::result::Result<V, E>,
    {
        self.build(func, SystemClock)
    }

    /// Like [`wrap`](Self::wrap), reading time from `clock`.
    pub fn wrap_with_clock<A, V, F, C>(&self, func: F, clock: C) -> Memoized<A, V, F, C>
    where
        A: Hash + Eq + Clone,
        V: Clone,
        F: FnMut(&A) -> V,
        C: Clock,
    {
        self.build(func, clock)
    }

    /// Like [`wrap_fallible`](Self::wrap_fallible), reading time from `clock`.
    pub fn wrap_fallible_with_clock<A, V, E, F, C>(
        &self,
        func: F,
        clock: C,
    ) -> Memoized<A, V, F, C>
    where
        A: Hash + Eq + Clone,
        V: Clone,
        F: FnMut(&A) -> std::result::Result<V, E>,
        C: Clock,
    {
        self.build(func, clock)
    }

    /// Wraps a computation that calls itself through the `recurse` handle it
    /// is given. See [`RecursiveMemoized`].
    pub fn wrap_recursive<A, V, F>(&self, func: F) -> RecursiveMemoized<A, V, F>
    where
        A: Hash + Eq + Clone,
        V: Clone,
        F: Fn(&mut Recurse<'_, A, V>, &A) -> V,
    {
        self.wrap_recursive_with_clock(func, SystemClock)
    }

    /// Like [`wrap_recursive`](Self::wrap_recursive), reading time from `clock`.
    pub fn wrap_recursive_with_clock<A, V, F, C>(
        &self,
        func: F,
        clock: C,
    ) -> RecursiveMemoized<A, V, F, C>
    where
        A: Hash + Eq + Clone,
        V: Clone,
        F: Fn(&mut Recurse<'_, A, V>, &A) -> V,
        C: Clock,
    {
        RecursiveMemoized::new(func, self.cache(clock))
    }

    fn build<A, V, F, C>(&self, func: F, clock: C) -> Memoized<A, V, F, C>
    where
        A: Hash + Eq + Clone,
        V: Clone,
        C: Clock,
    {
        Memoized {
            func,
            cache: self.cache(clock),
        }
    }

    fn cache<A, V, C>(&self, clock: C) -> TimedCache<A, V, C>
    where
        A: Hash + Eq + Clone,
        V: Clone,
        C: Clock,
    {
        TimedCache::unchecked(self.config.capacity, self.config.trigger, self.ttl, clock)
    }
}

// == Entry Points ==
/// Memoizes `func` with the default configuration (capacity 10, no TTL).
///
/// ```
/// let mut square = memo_lru::memoize(|n: &u64| n * n);
/// assert_eq!(square.invoke(12), 144);
/// assert_eq!(square.stats().misses, 1);
/// ```
pub fn memoize<A, V, F>(func: F) -> Memoized<A, V, F>
where
    A: Hash + Eq + Clone,
    V: Clone,
    F: FnMut(&A) -> V,
{
    Memoizer::default().wrap(func)
}

/// Returns a memoizer holding `capacity` entries, optionally expiring every `ttl`.
///
/// # Errors
/// `InvalidCapacity` for zero capacity, `InvalidTtl` / `TtlOutOfRange` for a
/// zero or unrepresentable TTL.
pub fn lru_cache(capacity: usize, ttl: Option<Duration>) -> Result<Memoizer> {
    let mut config = MemoConfig::default().with_capacity(capacity);
    config.ttl = ttl;
    Memoizer::new(config)
}

// == Memoized ==
/// A computation whose results are cached by argument.
///
/// Two calls share an entry iff their arguments compare equal. The
/// computation runs once per distinct argument while the entry stays
/// resident, and again after it is evicted or the cache is cleared.
pub struct Memoized<A, V, F, C = SystemClock> {
    func: F,
    cache: TimedCache<A, V, C>,
}

impl<A, V, F, C> Memoized<A, V, F, C>
where
    A: Hash + Eq + Clone,
    V: Clone,
    C: Clock,
{
    // == Invoke ==
    /// Returns the cached result for `args`, computing it on a miss.
    pub fn invoke(&mut self, args: A) -> V
    where
        F: FnMut(&A) -> V,
    {
        let Self { func, cache } = self;
        cache.access(&args, || func(&args))
    }

    /// Returns the cached result for `args`, computing it on a miss.
    ///
    /// An `Err` from the computation is returned unchanged and not cached,
    /// so the next call with the same arguments computes again.
    pub fn try_invoke<E>(&mut self, args: A) -> std::result::Result<V, E>
    where
        F: FnMut(&A) -> std::result::Result<V, E>,
    {
        let Self { func, cache } = self;
        cache.try_access(&args, || func(&args))
    }

    /// Like [`invoke`](Self::invoke), returning a diagnostic report instead
    /// of the bare value.
    pub fn invoke_traced(&mut self, args: A) -> CallReport<A, V>
    where
        F: FnMut(&A) -> V,
    {
        let Self { func, cache } = self;
        let (value, outcome) = match cache.try_lookup(&args, || Ok::<V, Infallible>(func(&args))) {
            Ok(found) => found,
            Err(never) => match never {},
        };
        CallReport::capture(args, value, outcome, cache)
    }

    // == Management ==
    /// Drops every cached result and resets the counters.
    pub fn clear(&mut self) {
        self.cache.clear();
    }

    /// Drops the cached result for `args`, returning it.
    pub fn forget(&mut self, args: &A) -> Option<V> {
        self.cache.remove(args)
    }

    /// Moves this memoized computation behind a shared async lock.
    pub fn into_shared(self) -> SharedMemoized<A, V, F, C> {
        SharedMemoized::new(self)
    }

    // == Introspection ==
    pub fn stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Returns the resident entries, least recently used first.
    pub fn entries(&self) -> Vec<CacheEntry<A, V>> {
        self.cache.entries()
    }

    pub fn len(&self) -> usize {
        self.cache.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cache.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.cache.capacity()
    }

    pub fn ttl(&self) -> Option<chrono::Duration> {
        self.cache.ttl()
    }

    pub fn epoch_end(&self) -> Option<DateTime<Utc>> {
        self.cache.epoch_end()
    }
}

impl<A, V, F, C> fmt::Debug for Memoized<A, V, F, C>
where
    A: fmt::Debug,
    V: fmt::Debug,
    C: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Memoized")
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}
