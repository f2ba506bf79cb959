//! Call Report Module
//!
//! Diagnostic descriptor returned by the traced invocation path.

use std::fmt;
use std::hash::Hash;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::cache::{CacheEntry, CacheStats, Clock, EvictionTrigger, Outcome, TimedCache};

// == Call Report ==
/// Snapshot of one traced call and the cache state right after it.
#[derive(Debug, Clone, Serialize)]
pub struct CallReport<A, V> {
    /// Whether the value came from the cache
    pub outcome: Outcome,
    /// The arguments of the call
    pub args: A,
    /// The value the call returned
    pub value: V,
    /// Resident entries, least recently used first
    pub entries: Vec<CacheEntry<A, V>>,
    /// Counters after the call
    pub stats: CacheStats,
    /// When the cache evicts before inserting
    pub trigger: EvictionTrigger,
    /// Epoch length in milliseconds, None = never expires
    pub ttl_ms: Option<i64>,
    /// Instant of the next forced clear
    pub epoch_end: Option<DateTime<Utc>>,
}

impl<A, V> CallReport<A, V>
where
    A: Hash + Eq + Clone,
    V: Clone,
{
    pub(crate) fn capture<C: Clock>(
        args: A,
        value: V,
        outcome: Outcome,
        cache: &TimedCache<A, V, C>,
    ) -> Self {
        Self {
            outcome,
            args,
            value,
            entries: cache.entries(),
            stats: cache.stats(),
            trigger: cache.trigger(),
            ttl_ms: cache.ttl().map(|ttl| ttl.num_milliseconds()),
            epoch_end: cache.epoch_end(),
        }
    }
}

impl<A, V> CallReport<A, V> {
    pub fn is_hit(&self) -> bool {
        self.outcome == Outcome::Hit
    }

    /// Discards the diagnostics and keeps the returned value.
    pub fn into_value(self) -> V {
        self.value
    }
}

impl<A: fmt::Debug, V: fmt::Debug> fmt::Display for CallReport<A, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self.outcome {
            Outcome::Hit => "hit",
            Outcome::Miss => "miss",
        };
        writeln!(f, "{label}: {:?} -> {:?}", self.args, self.value)?;

        write!(f, "    cache:")?;
        for entry in &self.entries {
            write!(f, " {:?}->{:?}", entry.key, entry.value)?;
        }
        writeln!(f)?;

        write!(
            f,
            "    info: hits={}, misses={}, capacity={}, size={}",
            self.stats.hits, self.stats.misses, self.stats.capacity, self.stats.current_size
        )?;
        if let Some(ttl_ms) = self.ttl_ms {
            write!(f, ", ttl={ttl_ms}ms")?;
        }
        Ok(())
    }
}
