//! Cache Module
//!
//! Provides the bounded LRU core and the expiring cache built on top of it.

mod clock;
mod entry;
mod lru;
mod stats;
mod timed;


// Re-export public types
pub use clock::{Clock, ManualClock, SystemClock};
pub use entry::CacheEntry;
pub use lru::{EvictionTrigger, Iter, LruCore};
pub use stats::CacheStats;
pub use timed::{Outcome, TimedCache};
