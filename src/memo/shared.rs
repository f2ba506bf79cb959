//! Shared Memoized Module
//!
//! Async handle for calling one memoized computation from many tasks.
//!
//! The whole access (epoch check, lookup, computation and insertion) runs
//! under a single lock. Concurrent callers with the same arguments therefore
//! compute once, and the recency list is never observed half-updated. The
//! computation itself is synchronous and blocks other callers while it runs.

use std::hash::Hash;
use std::sync::Arc;

use tokio::sync::Mutex;

use crate::cache::{CacheStats, Clock, SystemClock};
use crate::memo::{CallReport, Memoized};

// == Shared Memoized ==
/// Cloneable handle to a memoized computation behind an async mutex.
pub struct SharedMemoized<A, V, F, C = SystemClock> {
    inner: Arc<Mutex<Memoized<A, V, F, C>>>,
}

impl<A, V, F, C> Clone for SharedMemoized<A, V, F, C> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<A, V, F, C> SharedMemoized<A, V, F, C>
where
    A: Hash + Eq + Clone,
    V: Clone,
    C: Clock,
{
    pub fn new(memoized: Memoized<A, V, F, C>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(memoized)),
        }
    }

    /// See [`Memoized::invoke`].
    pub async fn invoke(&self, args: A) -> V
    where
        F: FnMut(&A) -> V,
    {
        self.inner.lock().await.invoke(args)
    }

    /// See [`Memoized::try_invoke`].
    pub async fn try_invoke<E>(&self, args: A) -> Result<V, E>
    where
        F: FnMut(&A) -> Result<V, E>,
    {
        self.inner.lock().await.try_invoke(args)
    }

    /// See [`Memoized::invoke_traced`].
    pub async fn invoke_traced(&self, args: A) -> CallReport<A, V>
    where
        F: FnMut(&A) -> V,
    {
        self.inner.lock().await.invoke_traced(args)
    }

    pub async fn stats(&self) -> CacheStats {
        self.inner.lock().await.stats()
    }

    pub async fn clear(&self) {
        self.inner.lock().await.clear();
    }

    pub async fn len(&self) -> usize {
        self.inner.lock().await.len()
    }
}
