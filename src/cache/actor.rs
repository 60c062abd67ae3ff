//! Cache Actor Module
//!
//! One tokio task per cache instance. The task owns the [`CacheStore`] and
//! drains a single unbounded mailbox, so every request for one cache is
//! handled in arrival order.

use std::any::Any;
use std::collections::HashMap;
use std::hash::Hash;
use std::ops::ControlFlow;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::cache::{CacheConfig, CacheHandle, CacheStats, CacheStore, Warmer};
use crate::error::WarmError;

// == Command ==
/// Messages accepted by a cache actor.
pub(crate) enum Command<K, V> {
    Get {
        key: K,
        reply: oneshot::Sender<Option<V>>,
    },
    GetMany {
        keys: Arc<[K]>,
        defaults: Arc<HashMap<K, V>>,
        reply: oneshot::Sender<HashMap<K, Option<V>>>,
    },
    Put {
        key: K,
        value: V,
    },
    PutMany {
        entries: Vec<(K, V)>,
    },
    Invalidate {
        key: K,
    },
    InvalidateMany {
        keys: Vec<K>,
    },
    Clear,
    Warm,
    Stats {
        reply: oneshot::Sender<CacheStats>,
    },
    Shutdown,
}

// == Cache Actor ==
pub(crate) struct CacheActor<K, V> {
    name: String,
    store: CacheStore<K, V>,
    warmer: Option<Warmer<K, V>>,
    mailbox: mpsc::UnboundedReceiver<Command<K, V>>,
}

impl<K, V> CacheActor<K, V>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    // == Spawn ==
    /// Starts the actor task and returns a handle to its mailbox.
    ///
    /// When a warmer is configured, a warm request is queued before the
    /// handle is returned: the caller does not wait for warming, but any
    /// request it sends afterwards is handled after the warm.
    pub(crate) fn spawn(
        name: &str,
        config: &CacheConfig<K, V>,
        call_timeout: Duration,
    ) -> (CacheHandle<K, V>, JoinHandle<()>) {
        let (sender, mailbox) = mpsc::unbounded_channel();

        if config.warmer.is_some() {
            // The receiver is alive until the actor runs, so this cannot fail
            let _ = sender.send(Command::Warm);
        }

        let actor = CacheActor {
            name: name.to_string(),
            store: CacheStore::new(config.ttl(), config.max_size),
            warmer: config.warmer.clone(),
            mailbox,
        };
        let task = tokio::spawn(actor.run());

        (CacheHandle::new(name, sender, call_timeout), task)
    }

    async fn run(mut self) {
        debug!(cache = %self.name, "cache actor started");

        while let Some(command) = self.mailbox.recv().await {
            if self.handle(command).await.is_break() {
                break;
            }
        }

        debug!(cache = %self.name, "cache actor stopped");
    }

    async fn handle(&mut self, command: Command<K, V>) -> ControlFlow<()> {
        match command {
            Command::Get { key, reply } => {
                // The caller may have timed out already
                let _ = reply.send(self.store.get(&key));
            }
            Command::GetMany {
                keys,
                defaults,
                reply,
            } => {
                let _ = reply.send(self.store.get_many(&keys, &defaults));
            }
            Command::Put { key, value } => self.store.put(key, value),
            Command::PutMany { entries } => self.store.put_many(entries),
            Command::Invalidate { key } => {
                self.store.invalidate(&key);
            }
            Command::InvalidateMany { keys } => {
                self.store.invalidate_many(&keys);
            }
            Command::Clear => {
                let removed = self.store.clear();
                debug!(cache = %self.name, removed, "cache cleared");
            }
            Command::Warm => self.warm().await,
            Command::Stats { reply } => {
                let _ = reply.send(self.store.stats());
            }
            Command::Shutdown => return ControlFlow::Break(()),
        }
        ControlFlow::Continue(())
    }

    // == Warm ==
    /// Loads the warmer's output into the store.
    ///
    /// On failure the store is left exactly as it was.
    async fn warm(&mut self) {
        let Some(warmer) = self.warmer.clone() else {
            warn!(cache = %self.name, reason = "no warmer configured", "cache warm skipped");
            return;
        };

        let started = Instant::now();
        match run_warmer(warmer).await {
            Ok(entries) => {
                let count = entries.len();
                self.store.put_many(entries);
                info!(
                    cache = %self.name,
                    entries = count,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "cache warmed"
                );
            }
            Err(err) => {
                self.store.record_warm_failure();
                error!(cache = %self.name, reason = %err, "cache warm failed, keeping existing entries");
            }
        }
    }
}

/// Runs a warmer on the blocking pool, turning a panic into a [`WarmError`].
async fn run_warmer<K, V>(warmer: Warmer<K, V>) -> Result<HashMap<K, V>, WarmError>
where
    K: Send + 'static,
    V: Send + 'static,
{
    match tokio::task::spawn_blocking(move || warmer()).await {
        Ok(result) => result,
        Err(err) if err.is_panic() => Err(WarmError::Panicked(panic_message(err.into_panic()))),
        Err(err) => Err(WarmError::Failed(err.to_string())),
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        message.to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    const TIMEOUT: Duration = Duration::from_secs(5);

    fn spawn(config: CacheConfig<String, String>) -> (CacheHandle<String, String>, JoinHandle<()>) {
        CacheActor::spawn("test", &config, TIMEOUT)
    }

    #[tokio::test]
    async fn test_put_then_get_same_caller() {
        let (cache, _task) = spawn(CacheConfig::new());

        cache.put("k".to_string(), "v".to_string());

        assert_eq!(cache.get("k".to_string(), "default".to_string()).await, "v");
    }

    #[tokio::test]
    async fn test_get_without_put_returns_default() {
        let (cache, _task) = spawn(CacheConfig::new());

        assert_eq!(cache.get("k".to_string(), "default".to_string()).await, "default");
        assert_eq!(cache.stats().await.misses, 1);
    }

    #[tokio::test]
    async fn test_ttl_expiry_counts_miss() {
        let (cache, _task) = spawn(CacheConfig::new().with_ttl_ms(50));

        cache.put("k".to_string(), "v".to_string());
        assert_eq!(cache.get("k".to_string(), "d".to_string()).await, "v");

        tokio::time::sleep(Duration::from_millis(100)).await;

        assert_eq!(cache.get("k".to_string(), "d".to_string()).await, "d");
        let stats = cache.stats().await;
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.size, 0);
    }

    #[tokio::test]
    async fn test_startup_warm_is_visible_to_first_read() {
        let config = CacheConfig::new().with_warmer(|| {
            Ok(HashMap::from([("date_format".to_string(), "Y-m-d".to_string())]))
        });
        let (cache, _task) = spawn(config);

        assert_eq!(cache.get("date_format".to_string(), "?".to_string()).await, "Y-m-d");
        assert_eq!(cache.get("time_format".to_string(), "H:i".to_string()).await, "H:i");
    }

    #[tokio::test]
    async fn test_failed_warm_keeps_entries() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let config = CacheConfig::new().with_warmer(move || {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                Ok(HashMap::from([("a".to_string(), "1".to_string())]))
            } else {
                Err(WarmError::Failed("database offline".to_string()))
            }
        });
        let (cache, _task) = spawn(config);

        cache.put("b".to_string(), "2".to_string());
        cache.warm();

        let stats = cache.stats().await;
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert_eq!(stats.warm_failures, 1);
        assert_eq!(stats.size, 2);
        assert_eq!(cache.get("a".to_string(), "-".to_string()).await, "1");
        assert_eq!(cache.get("b".to_string(), "-".to_string()).await, "2");
    }

    #[tokio::test]
    async fn test_panicking_warmer_does_not_kill_actor() {
        let config = CacheConfig::new().with_warmer(|| panic!("warmer exploded"));
        let (cache, _task) = spawn(config);

        cache.put("k".to_string(), "v".to_string());

        assert_eq!(cache.get("k".to_string(), "d".to_string()).await, "v");
        assert_eq!(cache.stats().await.warm_failures, 1);
        assert!(cache.is_alive());
    }

    #[tokio::test]
    async fn test_warm_without_warmer_is_noop() {
        let (cache, _task) = spawn(CacheConfig::new());

        cache.put("k".to_string(), "v".to_string());
        cache.warm();

        let stats = cache.stats().await;
        assert_eq!(stats.size, 1);
        assert_eq!(stats.warm_failures, 0);
    }

    #[tokio::test]
    async fn test_shutdown_ends_task() {
        let (cache, task) = spawn(CacheConfig::new());

        cache.shutdown();
        task.await.unwrap();

        assert!(!cache.is_alive());
        assert_eq!(cache.get("k".to_string(), "d".to_string()).await, "d");
        assert_eq!(cache.stats().await, CacheStats::default());
    }

    #[test]
    fn test_panic_message() {
        assert_eq!(panic_message(Box::new("static")), "static");
        assert_eq!(panic_message(Box::new("owned".to_string())), "owned");
        assert_eq!(panic_message(Box::new(7u8)), "unknown panic payload");
    }
}
