//! Recursive Memoized Module
//!
//! Memoizes computations that call themselves.
//!
//! The computation receives a `recurse` handle instead of naming itself.
//! Every call through the handle goes back through the cache, so a
//! recursive definition is evaluated once per distinct argument. The cache
//! is only borrowed for the lookup and for the store. Between the two it is
//! free for the nested calls made while computing.

use std::fmt;
use std::hash::Hash;

use chrono::{DateTime, Utc};

use crate::cache::{CacheEntry, CacheStats, Clock, SystemClock, TimedCache};

/// Handle a recursive computation calls to evaluate itself on other arguments.
pub type Recurse<'a, A, V> = dyn FnMut(A) -> V + 'a;

// == Recursive Memoized ==
/// A self-referential computation whose results are cached by argument.
///
/// ```
/// let mut fib = memo_lru::Memoizer::default().wrap_recursive(
///     |recurse: &mut memo_lru::Recurse<'_, u64, u64>, n: &u64| {
///         if *n < 2 { *n } else { recurse(n - 1) + recurse(n - 2) }
///     },
/// );
/// assert_eq!(fib.invoke(50), 12_586_269_025);
/// ```
pub struct RecursiveMemoized<A, V, F, C = SystemClock> {
    func: F,
    cache: TimedCache<A, V, C>,
}

impl<A, V, F, C> RecursiveMemoized<A, V, F, C>
where
    A: Hash + Eq + Clone,
    V: Clone,
    C: Clock,
    F: Fn(&mut Recurse<'_, A, V>, &A) -> V,
{
    pub(crate) fn new(func: F, cache: TimedCache<A, V, C>) -> Self {
        Self { func, cache }
    }

    // == Invoke ==
    /// Returns the cached result for `args`, computing it on a miss.
    ///
    /// Nested calls made through the handle are cached the same way and
    /// count towards the same statistics.
    pub fn invoke(&mut self, args: A) -> V {
        let Self { func, cache } = self;
        resolve(func, cache, args)
    }

    // == Management ==
    /// Drops every cached result and resets the counters.
    pub fn clear(&mut self) {
        self.cache.clear();
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

    pub fn epoch_end(&self) -> Option<DateTime<Utc>> {
        self.cache.epoch_end()
    }
}

/// One cached evaluation. The cache is released while `func` runs so the
/// handle passed to it can reach the cache again.
fn resolve<A, V, F, C>(func: &F, cache: &mut TimedCache<A, V, C>, args: A) -> V
where
    A: Hash + Eq + Clone,
    V: Clone,
    C: Clock,
    F: Fn(&mut Recurse<'_, A, V>, &A) -> V,
{
    if let Some(value) = cache.lookup(&args) {
        return value;
    }

    let value = func(&mut |inner: A| resolve(func, cache, inner), &args);
    cache.store(args, value.clone());
    value
}

impl<A, V, F, C> fmt::Debug for RecursiveMemoized<A, V, F, C>
where
    A: fmt::Debug,
    V: fmt::Debug,
    C: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RecursiveMemoized")
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}
