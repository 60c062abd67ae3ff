//! Health Monitor Task
//!
//! Background task that periodically runs the directory health check and
//! logs the outcome. It only observes: dead caches are repaired by the next
//! `ensure_started` or `restart_cache`, never by this task.

use std::hash::Hash;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::directory::{CacheDirectory, CacheStatus, HealthStatus};

/// Spawns a background task that logs directory health every `interval_secs`.
///
/// # Returns
/// A JoinHandle for the spawned task, which can be used to abort the task
/// during graceful shutdown.
///
/// # Example
/// ```ignore
/// let directory = CacheDirectory::<String, String>::new();
/// let monitor = spawn_health_monitor(directory.clone(), 30);
/// // Later, during shutdown:
/// monitor.abort();
/// ```
pub fn spawn_health_monitor<K, V>(directory: CacheDirectory<K, V>, interval_secs: u64) -> JoinHandle<()>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    let interval = Duration::from_secs(interval_secs.max(1));

    tokio::spawn(async move {
        info!("Starting cache health monitor with interval of {} seconds", interval.as_secs());

        loop {
            tokio::time::sleep(interval).await;

            let report = match directory.health_check().await {
                Ok(report) => report,
                Err(err) => {
                    warn!(reason = %err, "health monitor stopping");
                    break;
                }
            };

            match report.status {
                HealthStatus::Healthy => {
                    debug!(total = report.total, "cache health: healthy")
                }
                HealthStatus::NoCaches => debug!("cache health: no caches tracked"),
                HealthStatus::Degraded | HealthStatus::Unhealthy => {
                    let dead: Vec<&str> = report
                        .caches
                        .iter()
                        .filter(|cache| cache.status == CacheStatus::Dead)
                        .map(|cache| cache.name.as_str())
                        .collect();
                    warn!(
                        status = ?report.status,
                        alive = report.alive,
                        total = report.total,
                        dead = ?dead,
                        "cache health degraded"
                    );
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_monitor_leaves_dead_cache_dead() {
        let directory = CacheDirectory::<String, String>::new();
        let handle = directory
            .ensure_started("c", crate::cache::CacheConfig::new())
            .await
            .unwrap();
        handle.shutdown();
        handle.closed().await;

        let monitor = spawn_health_monitor(directory.clone(), 1);
        tokio::time::sleep(Duration::from_millis(1200)).await;

        // Observed, not repaired
        let report = directory.health_check().await.unwrap();
        assert_eq!(report.status, HealthStatus::Unhealthy);
        assert!(!monitor.is_finished());

        monitor.abort();
    }

    #[tokio::test]
    async fn test_monitor_can_be_aborted() {
        let directory = CacheDirectory::<String, String>::new();

        let handle = spawn_health_monitor(directory, 1);
        handle.abort();

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(handle.is_finished(), "Task should be finished after abort");
    }
}
