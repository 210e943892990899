//! Expired-Entry Reaper
//!
//! Background task that bounds memory held by stale cache entries and
//! abandoned in-flight fetch records.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::gateway::CacheMiddleware;

/// Spawns a background task that periodically sweeps expired cache entries.
///
/// Reads never delete stale entries, so without this sweep a key that is
/// never requested again would stay in memory until LRU eviction reached it.
/// Each pass also forgets in-flight records whose clients all disconnected.
///
/// # Returns
/// A JoinHandle for the spawned task, aborted during graceful shutdown.
///
/// # Example
/// ```ignore
/// let handle = spawn_cleanup_task(state.middleware().clone(), 60);
/// // Later, during shutdown:
/// handle.abort();
/// ```
pub fn spawn_cleanup_task(middleware: CacheMiddleware, cleanup_interval_secs: u64) -> JoinHandle<()> {
    let interval = Duration::from_secs(cleanup_interval_secs.max(1));

    tokio::spawn(async move {
        info!(
            "Starting cache reaper with interval of {} seconds",
            interval.as_secs()
        );

        loop {
            tokio::time::sleep(interval).await;

            let removed = middleware.cache().write().await.cleanup_expired();
            let abandoned = middleware.prune_in_flight();

            if removed > 0 || abandoned > 0 {
                info!(
                    removed,
                    abandoned, "Cache reaper: dropped expired entries and abandoned fetches"
                );
            } else {
                debug!("Cache reaper: nothing to drop");
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::CacheStore;
    use crate::gateway::UpstreamForwarder;
    use bytes::Bytes;

    fn middleware() -> CacheMiddleware {
        CacheMiddleware::new(CacheStore::new(100), UpstreamForwarder::new().unwrap())
    }

    #[tokio::test]
    async fn test_cleanup_task_removes_expired_entries() {
        let middleware = middleware();
        middleware
            .cache()
            .write()
            .await
            .put("GET /expire_soon".into(), Bytes::from_static(b"{}"), 1)
            .unwrap();

        let handle = spawn_cleanup_task(middleware.clone(), 1);

        // Wait for entry to expire and a sweep to run
        tokio::time::sleep(Duration::from_millis(2500)).await;

        assert!(!middleware.cache().read().await.contains("GET /expire_soon"));

        handle.abort();
    }

    #[tokio::test]
    async fn test_cleanup_task_preserves_valid_entries() {
        let middleware = middleware();
        middleware
            .cache()
            .write()
            .await
            .put("GET /long_lived".into(), Bytes::from_static(b"{}"), 3600)
            .unwrap();

        let handle = spawn_cleanup_task(middleware.clone(), 1);

        tokio::time::sleep(Duration::from_millis(1500)).await;

        let value = middleware.cache().write().await.get("GET /long_lived");
        assert_eq!(value, Some(Bytes::from_static(b"{}")));

        handle.abort();
    }

    #[tokio::test]
    async fn test_cleanup_task_can_be_aborted() {
        let handle = spawn_cleanup_task(middleware(), 1);

        handle.abort();

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(handle.is_finished(), "Task should be finished after abort");
    }
}
