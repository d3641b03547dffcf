//! Nonblocking Module
//!
//! Asynchronous forms of the cache operations. The synchronous core
//! runs on tokio's blocking pool; results come back either as awaited
//! futures or through success/failure callbacks invoked from a task
//! on the runtime, so callers never block on store I/O.

use serde::de::DeserializeOwned;
use serde::Serialize;
use tokio::task::{self, JoinHandle};

use crate::cache::Cache;
use crate::error::{CacheError, Result};

// == Async Cache ==
/// Non-blocking wrapper around a [`Cache`].
///
/// Operations submitted here run to completion once started; there is
/// no cancellation. Submissions against the same key are not ordered
/// relative to each other; callers that need ordering must await one
/// operation before submitting the next.
#[derive(Clone)]
pub struct AsyncCache {
    cache: Cache,
}

impl AsyncCache {
    // == Constructor ==
    pub fn new(cache: Cache) -> Self {
        Self { cache }
    }

    /// The wrapped synchronous handle.
    pub fn inner(&self) -> &Cache {
        &self.cache
    }

    // == Future Forms ==
    /// Stores `value` under `key` off the caller's thread.
    pub async fn put<T>(&self, key: &str, value: T, ttl_ms: Option<u64>) -> Result<()>
    where
        T: Serialize + Send + 'static,
    {
        let cache = self.cache.clone();
        let key = key.to_string();
        run_blocking(move || cache.put(&key, &value, ttl_ms)).await
    }

    /// Retrieves the value under `key` off the caller's thread.
    pub async fn get<T>(&self, key: &str) -> Result<Option<T>>
    where
        T: DeserializeOwned + Send + 'static,
    {
        let cache = self.cache.clone();
        let key = key.to_string();
        run_blocking(move || cache.get(&key)).await
    }

    /// Deletes the entry under `key` off the caller's thread.
    pub async fn remove(&self, key: &str) -> Result<()> {
        let cache = self.cache.clone();
        let key = key.to_string();
        run_blocking(move || cache.remove(&key)).await
    }

    /// Removes every entry off the caller's thread.
    pub async fn clear(&self) -> Result<()> {
        let cache = self.cache.clone();
        run_blocking(move || cache.clear()).await
    }

    // == Callback Forms ==
    /// Submits a put; exactly one of the callbacks fires when it
    /// completes. The returned handle joins the completion task.
    pub fn submit_put<T, S, F>(
        &self,
        key: &str,
        value: T,
        ttl_ms: Option<u64>,
        on_success: S,
        on_failure: F,
    ) -> JoinHandle<()>
    where
        T: Serialize + Send + 'static,
        S: FnOnce() + Send + 'static,
        F: FnOnce(CacheError) + Send + 'static,
    {
        let this = self.clone();
        let key = key.to_string();
        tokio::spawn(async move {
            match this.put(&key, value, ttl_ms).await {
                Ok(()) => on_success(),
                Err(err) => on_failure(err),
            }
        })
    }

    /// Submits a get; the success callback receives the value or
    /// `None` for a miss, the failure callback the captured error.
    pub fn submit_get<T, S, F>(&self, key: &str, on_success: S, on_failure: F) -> JoinHandle<()>
    where
        T: DeserializeOwned + Send + 'static,
        S: FnOnce(Option<T>) + Send + 'static,
        F: FnOnce(CacheError) + Send + 'static,
    {
        let this = self.clone();
        let key = key.to_string();
        tokio::spawn(async move {
            match this.get::<T>(&key).await {
                Ok(value) => on_success(value),
                Err(err) => on_failure(err),
            }
        })
    }

    /// Submits a remove.
    pub fn submit_remove<S, F>(&self, key: &str, on_success: S, on_failure: F) -> JoinHandle<()>
    where
        S: FnOnce() + Send + 'static,
        F: FnOnce(CacheError) + Send + 'static,
    {
        let this = self.clone();
        let key = key.to_string();
        tokio::spawn(async move {
            match this.remove(&key).await {
                Ok(()) => on_success(),
                Err(err) => on_failure(err),
            }
        })
    }

    /// Submits a clear.
    pub fn submit_clear<S, F>(&self, on_success: S, on_failure: F) -> JoinHandle<()>
    where
        S: FnOnce() + Send + 'static,
        F: FnOnce(CacheError) + Send + 'static,
    {
        let this = self.clone();
        tokio::spawn(async move {
            match this.clear().await {
                Ok(()) => on_success(),
                Err(err) => on_failure(err),
            }
        })
    }
}

/// Runs one synchronous cache operation on the blocking pool,
/// surfacing a died worker as a `Background` error instead of a panic.
async fn run_blocking<T, Op>(op: Op) -> Result<T>
where
    T: Send + 'static,
    Op: FnOnce() -> Result<T> + Send + 'static,
{
    task::spawn_blocking(op)
        .await
        .map_err(|err| CacheError::Background(err.to_string()))?
}
