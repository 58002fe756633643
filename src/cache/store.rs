//! Cache Store Module
//!
//! Main cache engine combining HashMap storage with size accounting,
//! score-based eviction and TTL expiration.

use std::collections::HashMap;
use std::time::Duration;

use tracing::{debug, error, warn};

use crate::cache::entry::{current_timestamp_ms, CacheEntry, EntrySnapshot};
use crate::cache::eviction::{plan_evictions, EvictionPlan};
use crate::cache::metrics::{CacheMetrics, RunningTotals};
use crate::cache::value::CacheValue;
use crate::config::CacheConfig;
use crate::error::{CacheError, Result};

// == Put Outcome ==
/// What happened to an insert.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PutOutcome {
    /// Entry stored after evicting `evicted` others
    Stored {
        size_bytes: u64,
        compressed: bool,
        evicted: usize,
    },
    /// Entry larger than the whole cache, refused in strict mode
    Rejected { size_bytes: u64 },
}

// == Hit ==
/// A successful lookup.
#[derive(Debug, Clone, PartialEq)]
pub struct Hit<V> {
    pub value: V,
    /// Entry hit count including this read
    pub hit_count: u64,
}

// == Cache Store ==
/// Main cache storage with size-bounded eviction and TTL support.
///
/// Not synchronized; the `Cache` handle wraps it in a lock.
#[derive(Debug)]
pub struct CacheStore<V> {
    /// Key-value storage
    entries: HashMap<String, CacheEntry<V>>,
    /// Size and request counters
    totals: RunningTotals,
    /// Limits and defaults
    config: CacheConfig,
}

impl<V: CacheValue> CacheStore<V> {
    // == Constructor ==
    /// Creates an empty store governed by `config`.
    pub fn new(config: CacheConfig) -> Self {
        Self {
            entries: HashMap::new(),
            totals: RunningTotals::new(),
            config,
        }
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    // == Put ==
    /// Measures, optionally compresses and stores a value.
    ///
    /// # Arguments
    /// * `key` - The key to store
    /// * `value` - The value to store
    /// * `ttl` - Optional TTL (uses the default if None or zero)
    pub fn put(&mut self, key: String, value: V, ttl: Option<Duration>) -> PutOutcome {
        let ttl_ms = self.config.effective_ttl_ms(ttl);
        let entry = CacheEntry::build(value, ttl_ms, self.config.compression_enabled);
        self.insert(key, entry)
    }

    // == Insert ==
    /// Stores a prepared entry, evicting others if capacity requires it.
    ///
    /// An existing entry under the same key is removed first so its bytes
    /// never count twice.
    pub fn insert(&mut self, key: String, entry: CacheEntry<V>) -> PutOutcome {
        self.detach(&key);

        let size_bytes = entry.size_bytes;
        if size_bytes > self.config.max_size_bytes {
            if self.config.strict_capacity {
                warn!(
                    "Rejected entry of {} bytes, larger than capacity {}",
                    size_bytes, self.config.max_size_bytes
                );
                return PutOutcome::Rejected { size_bytes };
            }
            debug!(
                "Entry of {} bytes exceeds capacity {}, storing anyway",
                size_bytes, self.config.max_size_bytes
            );
        }

        let plan = self.evict_for(size_bytes);
        let compressed = entry.is_compressed();

        self.totals.add_size(size_bytes);
        self.entries.insert(key, entry);

        PutOutcome::Stored {
            size_bytes,
            compressed,
            evicted: plan.keys.len(),
        }
    }

    // == Ensure Space ==
    /// Evicts entries until `incoming` more bytes fit.
    ///
    /// Returns the number of bytes freed.
    pub fn ensure_space(&mut self, incoming: u64) -> u64 {
        self.evict_for(incoming).freed_bytes
    }

    fn evict_for(&mut self, incoming: u64) -> EvictionPlan {
        let plan = plan_evictions(
            &self.entries,
            self.totals.total_size_bytes,
            incoming,
            self.config.max_size_bytes,
        );

        for key in &plan.keys {
            if self.detach(key).is_some() {
                self.totals.record_eviction();
            }
        }

        if !plan.is_empty() {
            debug!(
                "Evicted {} entries ({} bytes) to fit {} bytes",
                plan.keys.len(),
                plan.freed_bytes,
                incoming
            );
        }
        plan
    }

    // == Get ==
    /// Retrieves a value by key.
    ///
    /// Expired and undecodable entries are removed and counted as misses.
    ///
    /// # Arguments
    /// * `key` - The key to retrieve
    pub fn get(&mut self, key: &str) -> Result<Hit<V>> {
        let Some(entry) = self.entries.get(key) else {
            self.totals.record_miss();
            return Err(CacheError::NotFound(key.to_string()));
        };

        if entry.is_expired() {
            self.detach(key);
            self.totals.record_miss();
            return Err(CacheError::Expired(key.to_string()));
        }

        match entry.value() {
            Ok(value) => {
                let hit_count = match self.entries.get_mut(key) {
                    Some(entry) => {
                        entry.hit_count += 1;
                        entry.hit_count
                    }
                    None => 0,
                };
                self.totals.record_hit();
                Ok(Hit { value, hit_count })
            }
            Err(source) => {
                error!("Decompression failed, dropping entry: {}", source);
                self.detach(key);
                self.totals.record_miss();
                Err(CacheError::Corrupted {
                    key: key.to_string(),
                    source,
                })
            }
        }
    }

    // == Contains ==
    /// Checks for a live entry without touching hit accounting.
    ///
    /// Like `get`, this removes the entry if it has expired.
    pub fn contains(&mut self, key: &str) -> bool {
        let expired = match self.entries.get(key) {
            Some(entry) => entry.is_expired(),
            None => return false,
        };

        if expired {
            self.detach(key);
            return false;
        }
        true
    }

    // == Remove ==
    /// Removes an entry by key, returning whether one was present.
    pub fn remove(&mut self, key: &str) -> bool {
        self.detach(key).is_some()
    }

    /// Removes an entry and releases its bytes. Missing keys are a no-op.
    fn detach(&mut self, key: &str) -> Option<CacheEntry<V>> {
        let entry = self.entries.remove(key)?;
        self.totals.sub_size(entry.size_bytes);
        Some(entry)
    }

    // == Clear ==
    /// Drops every entry and resets all counters.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.totals = RunningTotals::new();
    }

    // == Purge Expired ==
    /// Removes all expired entries from the cache.
    ///
    /// Returns the number of entries removed.
    pub fn purge_expired(&mut self) -> usize {
        let now = current_timestamp_ms();
        let expired_keys: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired_at(now))
            .map(|(key, _)| key.clone())
            .collect();

        expired_keys
            .iter()
            .filter(|key| self.detach(key).is_some())
            .count()
    }

    // == Metrics ==
    /// Returns current cache statistics.
    pub fn metrics(&self) -> CacheMetrics {
        let compressed_sizes = self
            .entries
            .values()
            .filter(|entry| entry.is_compressed())
            .map(|entry| entry.size_bytes)
            .collect();

        CacheMetrics::from_totals(&self.totals, self.entries.len(), compressed_sizes)
    }

    // == Inspect ==
    /// Entry metadata, ignoring expiry and hit accounting.
    pub fn inspect(&self, key: &str) -> Option<EntrySnapshot> {
        self.entries.get(key).map(CacheEntry::snapshot)
    }

    /// Accounted size of all entries.
    pub fn total_size_bytes(&self) -> u64 {
        self.totals.total_size_bytes
    }

    // == Length ==
    /// Returns the current number of entries in the cache.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of live entry sizes, recomputed from scratch.
    #[cfg(test)]
    pub(crate) fn recomputed_size_bytes(&self) -> u64 {
        self.entries.values().map(|entry| entry.size_bytes).sum()
    }

    #[cfg(test)]
    pub(crate) fn entry_mut(&mut self, key: &str) -> Option<&mut CacheEntry<V>> {
        self.entries.get_mut(key)
    }
}
