//! Snapshot types returned by the management API.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cache::{CacheStats, ConfigSummary};

// == Cache Status ==
/// Liveness of a tracked cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CacheStatus {
    Running,
    Dead,
}

impl CacheStatus {
    pub fn from_alive(alive: bool) -> Self {
        if alive {
            CacheStatus::Running
        } else {
            CacheStatus::Dead
        }
    }
}

// == Cache Info ==
/// One row of `list_caches`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheInfo {
    pub status: CacheStatus,
    pub started_at: DateTime<Utc>,
    pub uptime_ms: u64,
    pub config: ConfigSummary,
    /// Zeroed for dead caches
    pub stats: CacheStats,
}

// == Health ==
/// Aggregate liveness across every tracked cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum HealthStatus {
    /// Nothing is tracked
    NoCaches,
    /// Every tracked cache is alive
    Healthy,
    /// Some alive, some dead
    Degraded,
    /// At least one tracked, none alive
    Unhealthy,
}

impl HealthStatus {
    pub fn from_counts(alive: usize, total: usize) -> Self {
        if total == 0 {
            HealthStatus::NoCaches
        } else if alive == total {
            HealthStatus::Healthy
        } else if alive == 0 {
            HealthStatus::Unhealthy
        } else {
            HealthStatus::Degraded
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheHealth {
    pub name: String,
    pub status: CacheStatus,
    pub hit_rate: f64,
    pub uptime_ms: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub total: usize,
    pub alive: usize,
    pub caches: Vec<CacheHealth>,
    pub checked_at: DateTime<Utc>,
}

// == Stats Report ==
/// Answer to `stats(name)` or `stats(None)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum StatsReport {
    Single(CacheStats),
    All(BTreeMap<String, CacheStats>),
}
