//! Cache Handle Module
//!
//! The caller-facing side of a cache actor. Every operation degrades instead
//! of failing: reads fall back to the caller's default, writes are dropped
//! with a warning when no actor is listening.

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tracing::warn;

use crate::cache::actor::Command;
use crate::cache::CacheStats;
use crate::error::{CacheError, Result};

// == Cache Handle ==
/// Address of one running cache instance.
///
/// Cheap to clone. A handle outlives its actor: once the actor is gone every
/// call takes the degradation path.
pub struct CacheHandle<K, V> {
    name: Arc<str>,
    sender: mpsc::UnboundedSender<Command<K, V>>,
    /// Set once a shutdown is queued, shared by every clone
    closing: Arc<AtomicBool>,
    call_timeout: Duration,
}

impl<K, V> CacheHandle<K, V>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    pub(crate) fn new(
        name: &str,
        sender: mpsc::UnboundedSender<Command<K, V>>,
        call_timeout: Duration,
    ) -> Self {
        Self {
            name: Arc::from(name),
            sender,
            closing: Arc::new(AtomicBool::new(false)),
            call_timeout,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    // == Liveness ==
    /// Whether the actor behind this handle is still draining its mailbox
    /// and has not been asked to stop.
    pub fn is_alive(&self) -> bool {
        !self.closing.load(Ordering::Acquire) && !self.sender.is_closed()
    }

    /// Resolves once the actor has stopped.
    pub async fn closed(&self) {
        self.sender.closed().await
    }

    /// Asks the actor to stop after the requests already queued.
    pub fn shutdown(&self) {
        self.closing.store(true, Ordering::Release);
        let _ = self.sender.send(Command::Shutdown);
    }

    // == Reads ==
    /// Returns the cached value for `key`, or `default` on a miss or when the
    /// cache cannot answer in time.
    pub async fn get(&self, key: K, default: V) -> V {
        self.lookup(key).await.unwrap_or(default)
    }

    /// Like [`get`](Self::get) without a default: None on a miss or failure.
    pub async fn lookup(&self, key: K) -> Option<V> {
        match self.try_get(key).await {
            Ok(value) => value,
            Err(err) => {
                self.degraded("get", &err);
                None
            }
        }
    }

    /// Single-key read that reports why the cache could not answer.
    pub async fn try_get(&self, key: K) -> Result<Option<V>> {
        self.call(|reply| Command::Get { key, reply }).await
    }

    /// Reads several keys in one round trip.
    ///
    /// Each key maps to its cached value, else its default, else None.
    pub async fn get_multiple(&self, keys: Vec<K>, defaults: HashMap<K, V>) -> HashMap<K, Option<V>> {
        // Shared with the actor so the fallback below needs no second copy
        let keys: Arc<[K]> = keys.into();
        let defaults = Arc::new(defaults);
        let result = self
            .call(|reply| Command::GetMany {
                keys: keys.clone(),
                defaults: defaults.clone(),
                reply,
            })
            .await;

        match result {
            Ok(values) => values,
            Err(err) => {
                self.degraded("get_multiple", &err);
                keys.iter()
                    .map(|key| (key.clone(), defaults.get(key).cloned()))
                    .collect()
            }
        }
    }

    /// Current statistics, or the all-zero snapshot when unreachable.
    pub async fn stats(&self) -> CacheStats {
        match self.try_stats().await {
            Ok(stats) => stats,
            Err(err) => {
                self.degraded("stats", &err);
                CacheStats::default()
            }
        }
    }

    pub async fn try_stats(&self) -> Result<CacheStats> {
        self.call(|reply| Command::Stats { reply }).await
    }

    // == Writes ==
    pub fn put(&self, key: K, value: V) {
        self.cast("put", Command::Put { key, value });
    }

    pub fn put_multiple<I>(&self, entries: I)
    where
        I: IntoIterator<Item = (K, V)>,
    {
        let entries = entries.into_iter().collect();
        self.cast("put_multiple", Command::PutMany { entries });
    }

    pub fn invalidate(&self, key: K) {
        self.cast("invalidate", Command::Invalidate { key });
    }

    pub fn invalidate_multiple(&self, keys: Vec<K>) {
        self.cast("invalidate_multiple", Command::InvalidateMany { keys });
    }

    pub fn clear(&self) {
        self.cast("clear", Command::Clear);
    }

    /// Re-runs the configured warmer in the background.
    pub fn warm(&self) {
        self.cast("warm", Command::Warm);
    }

    // == Plumbing ==
    async fn call<T>(&self, make: impl FnOnce(oneshot::Sender<T>) -> Command<K, V>) -> Result<T> {
        let (reply, response) = oneshot::channel();
        self.sender
            .send(make(reply))
            .map_err(|_| CacheError::Unreachable(self.name.to_string()))?;

        // A timeout leaves the request queued; the actor still handles it
        match tokio::time::timeout(self.call_timeout, response).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(_)) => Err(CacheError::Unreachable(self.name.to_string())),
            Err(_) => Err(CacheError::Timeout(self.name.to_string())),
        }
    }

    fn cast(&self, op: &'static str, command: Command<K, V>) {
        if self.sender.send(command).is_err() {
            warn!(cache = %self.name, op, reason = "no live actor", "cache write dropped");
        }
    }

    fn degraded(&self, op: &'static str, err: &CacheError) {
        warn!(cache = %self.name, op, reason = %err, "cache call degraded to default");
    }
}

impl<K, V> Clone for CacheHandle<K, V> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            sender: self.sender.clone(),
            closing: self.closing.clone(),
            call_timeout: self.call_timeout,
        }
    }
}

impl<K, V> fmt::Debug for CacheHandle<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheHandle")
            .field("name", &self.name)
            .field("closing", &self.closing.load(Ordering::Relaxed))
            .field("closed", &self.sender.is_closed())
            .finish()
    }
}
