//! Metrics Reporter Task
//!
//! Periodically logs the statistics of a set of named caches.

use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::info;

use crate::cache::{Cache, CacheValue};

/// Spawns a task that logs each cache's metrics every `interval`.
///
/// Aborting the returned handle stops the reports.
pub fn spawn_metrics_reporter<V: CacheValue>(
    caches: Vec<(&'static str, Arc<Cache<V>>)>,
    interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(interval).await;

            for (name, cache) in &caches {
                let metrics = cache.metrics().await;
                info!(
                    cache = *name,
                    entries = metrics.total_entries,
                    size_bytes = metrics.total_size_bytes,
                    hit_rate = metrics.hit_rate,
                    evictions = metrics.evictions,
                    compression_ratio = metrics.compression_ratio,
                    "cache metrics"
                );
            }
        }
    })
}
