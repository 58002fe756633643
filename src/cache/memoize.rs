//! Memoization Module
//!
//! Cache-aside wrapper around async functions: look up the key, call the
//! function on a miss, store what it returned.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use crate::cache::handle::Cache;
use crate::cache::value::CacheValue;

// == Memoized ==
/// An async function whose results are cached by a derived key.
pub struct Memoized<V, K, F> {
    cache: Arc<Cache<V>>,
    key_fn: K,
    ttl: Option<Duration>,
    func: F,
}

/// Wraps `func` so results are served from `cache` when present.
///
/// `key_fn` derives the cache key from the call arguments; returning `None`
/// bypasses the cache for that call.
pub fn memoize<V, K, F>(
    cache: Arc<Cache<V>>,
    key_fn: K,
    ttl: Option<Duration>,
    func: F,
) -> Memoized<V, K, F> {
    Memoized {
        cache,
        key_fn,
        ttl,
        func,
    }
}

impl<V: CacheValue, K, F> Memoized<V, K, F> {
    /// Calls the wrapped function, or returns its cached result.
    pub async fn call<A, Fut>(&self, args: A) -> V
    where
        K: Fn(&A) -> Option<String>,
        F: Fn(A) -> Fut,
        Fut: Future<Output = V>,
    {
        let Some(key) = (self.key_fn)(&args) else {
            return (self.func)(args).await;
        };

        if let Some(cached) = self.cache.get(&key).await {
            return cached;
        }

        let value = (self.func)(args).await;
        self.cache.put(key, value.clone(), self.ttl).await;
        value
    }

    /// Like [`Memoized::call`] for fallible functions; only `Ok` results
    /// are cached.
    pub async fn try_call<A, E, Fut>(&self, args: A) -> Result<V, E>
    where
        K: Fn(&A) -> Option<String>,
        F: Fn(A) -> Fut,
        Fut: Future<Output = Result<V, E>>,
    {
        let Some(key) = (self.key_fn)(&args) else {
            return (self.func)(args).await;
        };

        if let Some(cached) = self.cache.get(&key).await {
            return Ok(cached);
        }

        let value = (self.func)(args).await?;
        self.cache.put(key, value.clone(), self.ttl).await;
        Ok(value)
    }

    pub fn cache(&self) -> &Arc<Cache<V>> {
        &self.cache
    }
}

// == Json Key ==
/// Default key shape: `"{prefix}_{json(args)}"`.
///
/// Returns `None` if the arguments cannot be serialized.
pub fn json_key<A: Serialize + ?Sized>(prefix: &str, args: &A) -> Option<String> {
    serde_json::to_string(args)
        .ok()
        .map(|json| format!("{}_{}", prefix, json))
}
