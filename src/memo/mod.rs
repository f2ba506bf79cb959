//! Memo Module
//!
//! Binds computations to the timed LRU cache.
//!
//! # Entry points
//! - [`memoize`]: wrap a computation right away with default settings
//! - [`lru_cache`] / [`Memoizer::new`]: configure first, wrap later
//! - [`Memoizer::wrap_recursive`]: memoize a computation that calls itself
//! - [`Memoized::into_shared`]: share one cache between async tasks

mod memoized;
mod recursive;
mod report;
mod shared;

pub use memoized::{lru_cache, memoize, Memoized, Memoizer};
pub use recursive::{Recurse, RecursiveMemoized};
pub use report::CallReport;
pub use shared::SharedMemoized;
