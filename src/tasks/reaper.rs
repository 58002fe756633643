//! TTL Reaper Task
//!
//! Background task that periodically removes expired cache entries,
//! independent of lazy expiry on reads.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::{CacheStore, CacheValue};

/// Spawns a background task that periodically purges expired entries.
///
/// The task runs in an infinite loop, sleeping for `interval` between
/// sweeps and taking the write lock only for the sweep itself. Removal is
/// idempotent, so racing with foreground deletes is harmless.
///
/// # Arguments
/// * `store` - shared reference to the cache store
/// * `interval` - time between sweeps
///
/// # Returns
/// A JoinHandle for the spawned task; aborting it stops the sweeps.
pub fn spawn_reaper<V: CacheValue>(
    store: Arc<RwLock<CacheStore<V>>>,
    interval: Duration,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        info!("Starting TTL reaper with interval of {:?}", interval);

        loop {
            tokio::time::sleep(interval).await;

            let removed = {
                let mut guard = store.write().await;
                guard.purge_expired()
            };

            if removed > 0 {
                info!("TTL reaper: removed {} expired entries", removed);
            } else {
                debug!("TTL reaper: no expired entries found");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CacheConfig;

    fn shared_store() -> Arc<RwLock<CacheStore<String>>> {
        Arc::new(RwLock::new(CacheStore::new(CacheConfig::default())))
    }

    #[tokio::test]
    async fn test_reaper_removes_expired_entries() {
        let store = shared_store();
        store.write().await.put(
            "expire_soon".to_string(),
            "value".to_string(),
            Some(Duration::from_millis(1)),
        );

        let handle = spawn_reaper(store.clone(), Duration::from_millis(20));
        tokio::time::sleep(Duration::from_millis(100)).await;

        {
            let guard = store.read().await;
            assert!(guard.inspect("expire_soon").is_none());
            assert_eq!(guard.total_size_bytes(), 0);
            // swept, not read: no miss recorded
            assert_eq!(guard.metrics().misses, 0);
        }

        handle.abort();
    }

    #[tokio::test]
    async fn test_reaper_preserves_valid_entries() {
        let store = shared_store();
        store.write().await.put(
            "long_lived".to_string(),
            "value".to_string(),
            Some(Duration::from_secs(3600)),
        );

        let handle = spawn_reaper(store.clone(), Duration::from_millis(20));
        tokio::time::sleep(Duration::from_millis(80)).await;

        {
            let mut guard = store.write().await;
            assert_eq!(guard.get("long_lived").unwrap().value, "value");
        }

        handle.abort();
    }

    #[tokio::test]
    async fn test_reaper_tolerates_deleted_keys() {
        let store = shared_store();
        store.write().await.put(
            "gone".to_string(),
            "value".to_string(),
            Some(Duration::from_millis(1)),
        );
        assert!(store.write().await.remove("gone"));

        let handle = spawn_reaper(store.clone(), Duration::from_millis(10));
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert!(store.read().await.is_empty());
        assert!(!handle.is_finished());
        handle.abort();
    }

    #[tokio::test]
    async fn test_reaper_can_be_aborted() {
        let handle = spawn_reaper(shared_store(), Duration::from_secs(1));

        handle.abort();

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(handle.is_finished(), "Task should be finished after abort");
    }
}
