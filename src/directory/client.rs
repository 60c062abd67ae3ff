//! Cache Directory Module
//!
//! [`CacheDirectory`] is the one entry point callers hold. It exposes two
//! surfaces:
//!
//! - the management API (`ensure_started`, `restart_cache`, `stop_cache`,
//!   `list_caches`, `health_check`, `stats`), which reports failures as
//!   explicit errors;
//! - the data API (`get`, `put`, `invalidate`, ...), addressed by cache name,
//!   which never fails and degrades to the caller's default instead.

use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use dashmap::DashMap;
use tokio::sync::{mpsc, oneshot};
use tracing::{info, warn};

use crate::cache::{CacheConfig, CacheHandle, CacheStats, DEFAULT_CALL_TIMEOUT_MS};
use crate::directory::actor::{DirectoryActor, DirectoryCommand, LookupTable, RecordSnapshot};
use crate::directory::{CacheHealth, CacheInfo, CacheStatus, HealthReport, HealthStatus, StatsReport};
use crate::error::{CacheError, Result};

// == Cache Directory ==
/// Handle to a running cache directory.
///
/// Cloning shares the same directory. Independent directories (for example
/// one per test) do not see each other's caches. The directory task, and
/// every cache it started, stops once the last clone is dropped.
pub struct CacheDirectory<K, V> {
    sender: mpsc::UnboundedSender<DirectoryCommand<K, V>>,
    lookup: LookupTable<K, V>,
}

impl<K, V> CacheDirectory<K, V>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    /// Starts a directory with the default 5 second call timeout.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn new() -> Self {
        Self::with_call_timeout(Duration::from_millis(DEFAULT_CALL_TIMEOUT_MS))
    }

    /// Starts a directory whose caches answer reads within `call_timeout`.
    pub fn with_call_timeout(call_timeout: Duration) -> Self {
        let (sender, mailbox) = mpsc::unbounded_channel();
        let lookup: LookupTable<K, V> = Arc::new(DashMap::new());

        tokio::spawn(DirectoryActor::new(lookup.clone(), call_timeout, mailbox).run());

        Self { sender, lookup }
    }

    // == Boot Registration ==
    /// Starts each cache in order, stopping at the first failure.
    pub async fn start_all<I>(&self, caches: I) -> Result<()>
    where
        I: IntoIterator<Item = (String, CacheConfig<K, V>)>,
    {
        for (name, config) in caches {
            self.ensure_started(&name, config).await?;
        }
        Ok(())
    }

    // == Management API ==
    /// Makes sure a live cache backs `name`.
    ///
    /// Starts it when untracked, replaces it when its actor has died, and
    /// leaves a running cache untouched. A running cache whose TTL or size
    /// bound differ from `config` is a conflict.
    pub async fn ensure_started(&self, name: &str, config: CacheConfig<K, V>) -> Result<CacheHandle<K, V>> {
        self.request(|reply| DirectoryCommand::EnsureStarted {
            name: name.to_string(),
            config,
            reply,
        })
        .await?
    }

    /// Replaces whatever backs `name` with a fresh cache built from `config`.
    pub async fn restart_cache(&self, name: &str, config: CacheConfig<K, V>) -> Result<CacheHandle<K, V>> {
        let handle = self
            .request(|reply| DirectoryCommand::Restart {
                name: name.to_string(),
                config,
                reply,
            })
            .await??;
        info!(cache = %name, "cache restarted");
        Ok(handle)
    }

    /// Stops the cache and forgets it.
    pub async fn stop_cache(&self, name: &str) -> Result<()> {
        self.request(|reply| DirectoryCommand::Stop {
            name: name.to_string(),
            reply,
        })
        .await?
    }

    /// Every tracked cache with its liveness, configuration and statistics.
    ///
    /// Dead caches are listed with zeroed statistics.
    pub async fn list_caches(&self) -> Result<BTreeMap<String, CacheInfo>> {
        let mut caches = BTreeMap::new();
        for record in self.snapshot().await? {
            let stats = record_stats(&record).await;
            caches.insert(
                record.name,
                CacheInfo {
                    status: CacheStatus::from_alive(record.alive),
                    started_at: record.started_at,
                    uptime_ms: record.uptime.as_millis() as u64,
                    config: record.config,
                    stats,
                },
            );
        }
        Ok(caches)
    }

    // == Health Check ==
    /// Aggregates liveness across all tracked caches.
    pub async fn health_check(&self) -> Result<HealthReport> {
        let records = self.snapshot().await?;
        let total = records.len();
        let alive = records.iter().filter(|record| record.alive).count();

        let mut caches = Vec::with_capacity(total);
        for record in &records {
            let stats = record_stats(record).await;
            caches.push(CacheHealth {
                name: record.name.clone(),
                status: CacheStatus::from_alive(record.alive),
                hit_rate: stats.hit_rate,
                uptime_ms: record.uptime.as_millis() as u64,
            });
        }

        Ok(HealthReport {
            status: HealthStatus::from_counts(alive, total),
            total,
            alive,
            caches,
            checked_at: Utc::now(),
        })
    }

    /// Statistics for one cache, or for all of them when `name` is None.
    ///
    /// Unlike the data API an unknown name is an error, not a default.
    pub async fn stats(&self, name: Option<&str>) -> Result<StatsReport> {
        let records = self.snapshot().await?;

        match name {
            Some(name) => {
                let record = records
                    .iter()
                    .find(|record| record.name == name)
                    .ok_or_else(|| CacheError::NotFound(name.to_string()))?;
                Ok(StatsReport::Single(record_stats(record).await))
            }
            None => {
                let mut all = BTreeMap::new();
                for record in &records {
                    all.insert(record.name.clone(), record_stats(record).await);
                }
                Ok(StatsReport::All(all))
            }
        }
    }

    // == Resolve ==
    /// Looks up the handle currently registered for `name`.
    ///
    /// The handle may belong to a dead actor; its calls then degrade.
    pub fn resolve(&self, name: &str) -> Option<CacheHandle<K, V>> {
        self.lookup.get(name).map(|entry| entry.value().clone())
    }

    // == Data API ==
    pub async fn get(&self, name: &str, key: K, default: V) -> V {
        self.lookup(name, key).await.unwrap_or(default)
    }

    /// Cached value for `key`, or None on a miss or when the cache is unavailable.
    pub async fn lookup(&self, name: &str, key: K) -> Option<V> {
        match self.resolve_or_warn(name, "get") {
            Some(cache) => cache.lookup(key).await,
            None => None,
        }
    }

    pub async fn get_multiple(&self, name: &str, keys: Vec<K>, defaults: HashMap<K, V>) -> HashMap<K, Option<V>> {
        match self.resolve_or_warn(name, "get_multiple") {
            Some(cache) => cache.get_multiple(keys, defaults).await,
            None => keys
                .into_iter()
                .map(|key| {
                    let default = defaults.get(&key).cloned();
                    (key, default)
                })
                .collect(),
        }
    }

    pub fn put(&self, name: &str, key: K, value: V) {
        if let Some(cache) = self.resolve_or_warn(name, "put") {
            cache.put(key, value);
        }
    }

    pub fn put_multiple<I>(&self, name: &str, entries: I)
    where
        I: IntoIterator<Item = (K, V)>,
    {
        if let Some(cache) = self.resolve_or_warn(name, "put_multiple") {
            cache.put_multiple(entries);
        }
    }

    pub fn invalidate(&self, name: &str, key: K) {
        if let Some(cache) = self.resolve_or_warn(name, "invalidate") {
            cache.invalidate(key);
        }
    }

    pub fn invalidate_multiple(&self, name: &str, keys: Vec<K>) {
        if let Some(cache) = self.resolve_or_warn(name, "invalidate_multiple") {
            cache.invalidate_multiple(keys);
        }
    }

    pub fn clear(&self, name: &str) {
        if let Some(cache) = self.resolve_or_warn(name, "clear") {
            cache.clear();
        }
    }

    pub fn warm(&self, name: &str) {
        if let Some(cache) = self.resolve_or_warn(name, "warm") {
            cache.warm();
        }
    }

    /// Data-path statistics: the all-zero snapshot when the cache is unavailable.
    pub async fn cache_stats(&self, name: &str) -> CacheStats {
        match self.resolve_or_warn(name, "stats") {
            Some(cache) => cache.stats().await,
            None => CacheStats::default(),
        }
    }

    // == Plumbing ==
    fn resolve_or_warn(&self, name: &str, op: &'static str) -> Option<CacheHandle<K, V>> {
        let handle = self.resolve(name);
        if handle.is_none() {
            warn!(cache = %name, op, reason = "no such cache", "cache call degraded to default");
        }
        handle
    }

    async fn snapshot(&self) -> Result<Vec<RecordSnapshot<K, V>>> {
        self.request(|reply| DirectoryCommand::Snapshot { reply }).await
    }

    async fn request<T>(&self, make: impl FnOnce(oneshot::Sender<T>) -> DirectoryCommand<K, V>) -> Result<T> {
        let (reply, response) = oneshot::channel();
        self.sender
            .send(make(reply))
            .map_err(|_| CacheError::DirectoryUnavailable)?;
        response.await.map_err(|_| CacheError::DirectoryUnavailable)
    }
}

async fn record_stats<K, V>(record: &RecordSnapshot<K, V>) -> CacheStats
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    if record.alive {
        record.handle.stats().await
    } else {
        CacheStats::default()
    }
}

impl<K, V> Default for CacheDirectory<K, V>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> Clone for CacheDirectory<K, V> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
            lookup: self.lookup.clone(),
        }
    }
}

impl<K, V> fmt::Debug for CacheDirectory<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheDirectory")
            .field("running", &!self.sender.is_closed())
            .finish()
    }
}
