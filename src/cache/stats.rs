//! Cache Statistics Module
//!
//! Tracks per-instance counters and produces serializable snapshots.

use serde::{Deserialize, Serialize};

// == Cache Counters ==
/// Running counters owned by a single cache actor.
///
/// Counters live and die with the actor: a restarted cache starts from zero.
#[derive(Debug, Clone, Default)]
pub struct CacheCounters {
    hits: u64,
    misses: u64,
    puts: u64,
    invalidations: u64,
    evictions: u64,
    warm_failures: u64,
}

impl CacheCounters {
    /// Creates counters with everything at zero.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_puts(&mut self, count: usize) {
        self.puts += count as u64;
    }

    pub fn record_invalidations(&mut self, count: usize) {
        self.invalidations += count as u64;
    }

    pub fn record_evictions(&mut self, count: usize) {
        self.evictions += count as u64;
    }

    pub fn record_warm_failure(&mut self) {
        self.warm_failures += 1;
    }

    // == Snapshot ==
    /// Freezes the counters into a snapshot, with `size` as the current entry count.
    pub fn snapshot(&self, size: usize) -> CacheStats {
        CacheStats {
            hits: self.hits,
            misses: self.misses,
            puts: self.puts,
            invalidations: self.invalidations,
            evictions: self.evictions,
            warm_failures: self.warm_failures,
            size,
            hit_rate: hit_rate(self.hits, self.misses),
        }
    }
}

// == Cache Stats ==
/// Point-in-time statistics for one cache.
///
/// `Default` is the all-zero snapshot reported for unreachable caches.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheStats {
    /// Reads that found a live entry
    pub hits: u64,
    /// Reads that found nothing or an expired entry
    pub misses: u64,
    /// Entries written by put, put_multiple and warming
    pub puts: u64,
    /// Entries removed by invalidate, invalidate_multiple and clear
    pub invalidations: u64,
    /// Entries removed to respect the size bound
    pub evictions: u64,
    /// Warmer runs that failed
    pub warm_failures: u64,
    /// Current number of entries in the store
    pub size: usize,
    /// hits / (hits + misses), 0.0 before any access
    pub hit_rate: f64,
}

/// Calculates the hit rate, defined as 0.0 when no reads have happened.
pub fn hit_rate(hits: u64, misses: u64) -> f64 {
    let total = hits + misses;
    if total == 0 {
        0.0
    } else {
        hits as f64 / total as f64
    }
}
