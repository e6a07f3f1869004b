//! TTL Cleanup Task
//!
//! Background task that periodically removes expired cache entries.
//! Reads already treat stale entries as misses; the sweep only reclaims memory.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::SharedCache;

/// Spawns a background task that periodically cleans up expired cache entries.
///
/// The task runs in an infinite loop, sleeping for the given interval
/// between cleanup runs, and holds the write lock only for the sweep itself.
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during graceful shutdown.
pub fn spawn_cleanup_task(cache: SharedCache, cleanup_interval_secs: u64) -> JoinHandle<()> {
    let interval = Duration::from_secs(cleanup_interval_secs.max(1));

    tokio::spawn(async move {
        info!(
            "Starting TTL cleanup task with interval of {} seconds",
            interval.as_secs()
        );

        loop {
            tokio::time::sleep(interval).await;

            let removed = cache.write().await.cleanup_expired();

            if removed > 0 {
                info!("TTL cleanup: removed {} expired entries", removed);
            } else {
                debug!("TTL cleanup: no expired entries found");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{shared, CacheStore, TtlTable};
    use serde_json::json;

    fn short_lived_cache() -> SharedCache {
        shared(CacheStore::new(TtlTable {
            default: Duration::from_millis(300),
            ..TtlTable::default()
        }))
    }

    #[tokio::test]
    async fn test_cleanup_task_removes_expired_entries() {
        let cache = short_lived_cache();
        cache.write().await.set("expire_soon", json!(1));

        let handle = spawn_cleanup_task(cache.clone(), 1);
        tokio::time::sleep(Duration::from_millis(1500)).await;

        assert!(cache.read().await.is_empty(), "Expired entry should be gone");
        assert_eq!(cache.read().await.stats().expired_removed, 1);

        handle.abort();
    }

    #[tokio::test]
    async fn test_cleanup_task_preserves_valid_entries() {
        let cache = short_lived_cache();
        cache.write().await.set("categories", json!(["music"]));

        let handle = spawn_cleanup_task(cache.clone(), 1);
        tokio::time::sleep(Duration::from_millis(1500)).await;

        let value = cache.write().await.get("categories");
        assert_eq!(value, Some(json!(["music"])));

        handle.abort();
    }

    #[tokio::test]
    async fn test_cleanup_task_can_be_aborted() {
        let handle = spawn_cleanup_task(short_lived_cache(), 1);

        handle.abort();

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(handle.is_finished(), "Task should be finished after abort");
    }
}
