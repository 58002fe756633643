//! Cache Handle Module
//!
//! Thread-safe facade over the store. Every operation is total: failures
//! inside the engine turn into misses or fallbacks, never errors.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::entry::{CacheEntry, EntrySnapshot};
use crate::cache::metrics::CacheMetrics;
use crate::cache::obfuscate::obfuscate_key;
use crate::cache::sink::{emit, MetricEvent, MetricsSink};
use crate::cache::store::{CacheStore, PutOutcome};
use crate::cache::value::CacheValue;
use crate::config::CacheConfig;
use crate::error::{CacheError, Result};
use crate::tasks::spawn_reaper;

// == Cache ==
/// Shared, bounded cache.
///
/// Estimation and compression happen before the write lock is taken; the
/// eviction and insert that follow run under it, so concurrent puts to the
/// same key are serialized with last-writer-wins semantics.
///
/// Share it behind an `Arc`. Dropping the last handle stops the reaper.
pub struct Cache<V> {
    store: Arc<RwLock<CacheStore<V>>>,
    config: CacheConfig,
    sink: Option<Arc<dyn MetricsSink>>,
    reaper: Option<JoinHandle<()>>,
}

impl<V: CacheValue> Cache<V> {
    // == Constructor ==
    /// Creates a cache after validating `config`.
    ///
    /// No reaper runs until [`Cache::with_reaper`] is called.
    pub fn new(config: CacheConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            store: Arc::new(RwLock::new(CacheStore::new(config.clone()))),
            config,
            sink: None,
            reaper: None,
        })
    }

    /// Attaches the sink that receives put/get events.
    pub fn with_sink(mut self, sink: Arc<dyn MetricsSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Starts the periodic TTL sweep on the current tokio runtime.
    ///
    /// # Panics
    /// Panics when called outside a tokio runtime.
    pub fn with_reaper(mut self) -> Self {
        if self.reaper.is_none() {
            self.reaper = Some(spawn_reaper(
                Arc::clone(&self.store),
                self.config.reaper_interval,
            ));
        }
        self
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    // == Put ==
    /// Stores a value under `key`. Never fails.
    ///
    /// A `ttl` of `None` or zero uses the configured default.
    pub async fn put(&self, key: impl Into<String>, value: V, ttl: Option<Duration>) {
        let key = key.into();
        let ttl_ms = self.config.effective_ttl_ms(ttl);
        let entry = CacheEntry::build(value, ttl_ms, self.config.compression_enabled);

        let outcome = {
            let mut store = self.store.write().await;
            store.insert(key.clone(), entry)
        };

        match outcome {
            PutOutcome::Stored {
                size_bytes,
                compressed,
                ..
            } => self.report(|| MetricEvent::set(obfuscate_key(&key), size_bytes, compressed, ttl_ms)),
            PutOutcome::Rejected { .. } => {
                debug!(key = %obfuscate_key(&key), "put rejected");
            }
        }
    }

    // == Get ==
    /// Returns the live value for `key`, decompressing it transparently.
    ///
    /// Absent, expired and corrupt entries all read as `None`.
    pub async fn get(&self, key: &str) -> Option<V> {
        let result = {
            let mut store = self.store.write().await;
            store.get(key)
        };

        match result {
            Ok(hit) => {
                self.report(|| MetricEvent::hit(obfuscate_key(key), hit.hit_count));
                Some(hit.value)
            }
            Err(err) => {
                debug!(key = %obfuscate_key(key), reason = miss_reason(&err), "cache miss");
                None
            }
        }
    }

    // == Has ==
    /// Whether a live entry exists. Removes the entry if it has expired.
    pub async fn has(&self, key: &str) -> bool {
        self.store.write().await.contains(key)
    }

    // == Delete ==
    /// Removes `key`, returning whether an entry was present.
    pub async fn delete(&self, key: &str) -> bool {
        self.store.write().await.remove(key)
    }

    // == Clear ==
    /// Drops all entries and zeroes every counter in one step.
    pub async fn clear(&self) {
        self.store.write().await.clear();
    }

    // == Metrics ==
    pub async fn metrics(&self) -> CacheMetrics {
        self.store.read().await.metrics()
    }

    /// Entry metadata without touching expiry or hit accounting.
    pub async fn inspect(&self, key: &str) -> Option<EntrySnapshot> {
        self.store.read().await.inspect(key)
    }

    /// Runs one TTL sweep now, returning the number of entries removed.
    pub async fn purge_expired(&self) -> usize {
        self.store.write().await.purge_expired()
    }

    // == Shutdown ==
    /// Stops the reaper. Safe to call more than once.
    pub fn shutdown(&self) {
        if let Some(handle) = &self.reaper {
            if !handle.is_finished() {
                handle.abort();
                info!("Cache reaper stopped");
            }
        }
    }

    pub fn reaper_running(&self) -> bool {
        self.reaper
            .as_ref()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }

    fn report<F>(&self, event: F)
    where
        F: FnOnce() -> MetricEvent,
    {
        if !self.config.metrics_enabled {
            return;
        }
        if let Some(sink) = &self.sink {
            emit(sink.as_ref(), event());
        }
    }
}

impl<V> Drop for Cache<V> {
    fn drop(&mut self) {
        if let Some(handle) = self.reaper.take() {
            handle.abort();
        }
    }
}

fn miss_reason(err: &CacheError) -> &'static str {
    match err {
        CacheError::NotFound(_) => "absent",
        CacheError::Expired(_) => "expired",
        CacheError::Corrupted { .. } => "corrupt",
        CacheError::InvalidConfig(_) => "config",
    }
}
