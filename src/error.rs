//! Error types for the memoizing cache
//!
//! Only configuration can fail. Errors raised by a wrapped computation are
//! the caller's own type and pass through untouched.

use std::time::Duration;

use thiserror::Error;

// == Memo Error Enum ==
/// Errors raised while building a memoizing cache.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MemoError {
    /// Capacity must allow at least one resident entry
    #[error("Invalid capacity: {0} (must be at least 1)")]
    InvalidCapacity(usize),

    /// A TTL was given but it is zero or negative
    #[error("Invalid ttl: {0} (must be greater than zero)")]
    InvalidTtl(chrono::Duration),

    /// The TTL cannot be represented as a wall-clock offset
    #[error("Ttl out of range: {0:?}")]
    TtlOutOfRange(Duration),
}

// == Result Type Alias ==
/// Convenience Result type for cache construction.
pub type Result<T> = std::result::Result<T, MemoError>;
