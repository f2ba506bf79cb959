//! Memo LRU - A bounded memoizing cache
//!
//! Caches computed results by argument with LRU eviction and optional
//! whole-cache TTL expiry.

pub mod cache;
pub mod config;
pub mod error;
pub mod memo;

pub use cache::{CacheStats, EvictionTrigger};
pub use config::MemoConfig;
pub use error::{MemoError, Result};
pub use memo::{
    lru_cache, memoize, CallReport, Memoized, Memoizer, Recurse, RecursiveMemoized, SharedMemoized,
};
