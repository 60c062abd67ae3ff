//! Directory Actor Module
//!
//! Owns the name → cache record table. Every lifecycle decision (start,
//! repair, restart, stop) goes through this task's mailbox, so decisions
//! for one name never interleave.

use std::collections::BTreeMap;
use std::hash::Hash;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::cache::{CacheActor, CacheConfig, CacheHandle, ConfigSummary};
use crate::error::{CacheError, Result};

/// Name → handle table published by the directory for data-path lookups.
pub(crate) type LookupTable<K, V> = Arc<DashMap<String, CacheHandle<K, V>>>;

pub(crate) enum DirectoryCommand<K, V> {
    EnsureStarted {
        name: String,
        config: CacheConfig<K, V>,
        reply: oneshot::Sender<Result<CacheHandle<K, V>>>,
    },
    Restart {
        name: String,
        config: CacheConfig<K, V>,
        reply: oneshot::Sender<Result<CacheHandle<K, V>>>,
    },
    Stop {
        name: String,
        reply: oneshot::Sender<Result<()>>,
    },
    Snapshot {
        reply: oneshot::Sender<Vec<RecordSnapshot<K, V>>>,
    },
}

// == Cache Record ==
struct CacheRecord<K, V> {
    handle: CacheHandle<K, V>,
    task: JoinHandle<()>,
    started_at: DateTime<Utc>,
    started: Instant,
    config: CacheConfig<K, V>,
}

impl<K, V> CacheRecord<K, V>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    fn is_alive(&self) -> bool {
        self.handle.is_alive() && !self.task.is_finished()
    }
}

/// Point-in-time view of one record, handed out to callers.
pub(crate) struct RecordSnapshot<K, V> {
    pub name: String,
    pub handle: CacheHandle<K, V>,
    pub alive: bool,
    pub started_at: DateTime<Utc>,
    pub uptime: Duration,
    pub config: ConfigSummary,
}

// == Directory Actor ==
pub(crate) struct DirectoryActor<K, V> {
    records: BTreeMap<String, CacheRecord<K, V>>,
    lookup: LookupTable<K, V>,
    call_timeout: Duration,
    mailbox: mpsc::UnboundedReceiver<DirectoryCommand<K, V>>,
}

impl<K, V> DirectoryActor<K, V>
where
    K: Eq + Hash + Clone + Send + Sync + 'static,
    V: Clone + Send + Sync + 'static,
{
    pub(crate) fn new(
        lookup: LookupTable<K, V>,
        call_timeout: Duration,
        mailbox: mpsc::UnboundedReceiver<DirectoryCommand<K, V>>,
    ) -> Self {
        Self {
            records: BTreeMap::new(),
            lookup,
            call_timeout,
            mailbox,
        }
    }

    pub(crate) async fn run(mut self) {
        debug!("cache directory started");

        while let Some(command) = self.mailbox.recv().await {
            match command {
                DirectoryCommand::EnsureStarted {
                    name,
                    config,
                    reply,
                } => {
                    let _ = reply.send(self.ensure_started(name, config));
                }
                DirectoryCommand::Restart {
                    name,
                    config,
                    reply,
                } => {
                    let _ = reply.send(self.restart(name, config));
                }
                DirectoryCommand::Stop { name, reply } => {
                    let _ = reply.send(self.stop(&name));
                }
                DirectoryCommand::Snapshot { reply } => {
                    let _ = reply.send(self.snapshot());
                }
            }
        }

        // Every directory handle is gone: take the caches down with us
        for (name, record) in std::mem::take(&mut self.records) {
            record.task.abort();
            debug!(cache = %name, "cache actor aborted on directory shutdown");
        }
        self.lookup.clear();
        debug!("cache directory stopped");
    }

    // == Ensure Started ==
    fn ensure_started(&mut self, name: String, config: CacheConfig<K, V>) -> Result<CacheHandle<K, V>> {
        config.validate(&name)?;

        match self.records.get(&name) {
            Some(record) if record.is_alive() => {
                if !record.config.same_limits(&config) {
                    return Err(CacheError::ConfigConflict(format!(
                        "cache '{}' is running with {:?}, requested {:?}",
                        name,
                        record.config.summary(),
                        config.summary()
                    )));
                }
                debug!(cache = %name, "cache already running");
                Ok(record.handle.clone())
            }
            Some(_) => {
                warn!(cache = %name, reason = "actor not alive", "restarting dead cache");
                Ok(self.start(name, config))
            }
            None => Ok(self.start(name, config)),
        }
    }

    // == Restart ==
    fn restart(&mut self, name: String, config: CacheConfig<K, V>) -> Result<CacheHandle<K, V>> {
        config.validate(&name)?;

        if let Some(old) = self.records.remove(&name) {
            old.task.abort();
            debug!(cache = %name, "previous cache actor aborted for restart");
        }
        Ok(self.start(name, config))
    }

    // == Stop ==
    fn stop(&mut self, name: &str) -> Result<()> {
        let record = self
            .records
            .remove(name)
            .ok_or_else(|| CacheError::NotFound(name.to_string()))?;

        record.task.abort();
        self.lookup.remove(name);
        info!(cache = %name, "cache stopped");
        Ok(())
    }

    fn start(&mut self, name: String, config: CacheConfig<K, V>) -> CacheHandle<K, V> {
        let (handle, task) = CacheActor::spawn(&name, &config, self.call_timeout);
        info!(
            cache = %name,
            ttl_ms = ?config.ttl_ms,
            max_size = ?config.max_size,
            warmer = config.warmer.is_some(),
            "cache started"
        );

        self.lookup.insert(name.clone(), handle.clone());
        if let Some(replaced) = self.records.insert(
            name,
            CacheRecord {
                handle: handle.clone(),
                task,
                started_at: Utc::now(),
                started: Instant::now(),
                config,
            },
        ) {
            replaced.task.abort();
        }
        handle
    }

    fn snapshot(&self) -> Vec<RecordSnapshot<K, V>> {
        self.records
            .iter()
            .map(|(name, record)| RecordSnapshot {
                name: name.clone(),
                handle: record.handle.clone(),
                alive: record.is_alive(),
                started_at: record.started_at,
                uptime: record.started.elapsed(),
                config: record.config.summary(),
            })
            .collect()
    }
}
