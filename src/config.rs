//! Configuration Module
//!
//! Handles loading and validating memoizer configuration.

use std::env;
use std::time::Duration;

use crate::cache::EvictionTrigger;
use crate::error::{MemoError, Result};

/// Default number of resident entries.
pub const DEFAULT_CAPACITY: usize = 10;

/// Memoizer configuration parameters.
///
/// Values can be set directly, through the `with_*` setters, or loaded from
/// environment variables with sensible defaults.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoConfig {
    /// Maximum number of resident entries
    pub capacity: usize,
    /// Whole-cache expiry period, None = never expires
    pub ttl: Option<Duration>,
    /// When `put` evicts before inserting
    pub trigger: EvictionTrigger,
}

impl MemoConfig {
    /// Creates a new MemoConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `MEMO_CAPACITY` - Maximum resident entries (default: 10)
    /// - `MEMO_TTL_SECS` - Expiry period in seconds, 0 disables (default: disabled)
    pub fn from_env() -> Self {
        Self {
            capacity: env::var("MEMO_CAPACITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_CAPACITY),
            ttl: env::var("MEMO_TTL_SECS")
                .ok()
                .and_then(|v| v.parse::<u64>().ok())
                .filter(|secs| *secs > 0)
                .map(Duration::from_secs),
            trigger: EvictionTrigger::default(),
        }
    }

    /// Sets the maximum number of resident entries.
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }

    /// Enables whole-cache expiry every `ttl`.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = Some(ttl);
        self
    }

    /// Sets when `put` evicts before inserting.
    pub fn with_trigger(mut self, trigger: EvictionTrigger) -> Self {
        self.trigger = trigger;
        self
    }

    // == Validate ==
    /// Checks the configuration and returns the TTL as a wall-clock offset.
    ///
    /// # Errors
    /// - `InvalidCapacity` when capacity is zero
    /// - `InvalidTtl` when a zero TTL is configured
    /// - `TtlOutOfRange` when the TTL does not fit a `chrono::Duration`
    pub fn validate(&self) -> Result<Option<chrono::Duration>> {
        if self.capacity == 0 {
            return Err(MemoError::InvalidCapacity(self.capacity));
        }

        match self.ttl {
            None => Ok(None),
            Some(ttl) if ttl.is_zero() => Err(MemoError::InvalidTtl(chrono::Duration::zero())),
            Some(ttl) => chrono::Duration::from_std(ttl)
                .map(Some)
                .map_err(|_| MemoError::TtlOutOfRange(ttl)),
        }
    }
}

impl Default for MemoConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_CAPACITY,
            ttl: None,
            trigger: EvictionTrigger::default(),
        }
    }
}
