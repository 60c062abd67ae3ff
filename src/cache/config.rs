//! Per-cache configuration.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{CacheError, Result, WarmError};

/// Zero-argument function producing a cache's initial contents.
pub type Warmer<K, V> = Arc<dyn Fn() -> std::result::Result<HashMap<K, V>, WarmError> + Send + Sync>;

// == Cache Config ==
/// Settings a cache instance is started with.
pub struct CacheConfig<K, V> {
    /// Entry lifetime in milliseconds, None = entries never expire
    pub ttl_ms: Option<u64>,
    /// Maximum number of entries, None = unbounded
    pub max_size: Option<usize>,
    /// Loader run at startup and on every `warm`
    pub warmer: Option<Warmer<K, V>>,
}

impl<K, V> CacheConfig<K, V> {
    pub fn new() -> Self {
        Self {
            ttl_ms: None,
            max_size: None,
            warmer: None,
        }
    }

    pub fn with_ttl_ms(mut self, ttl_ms: u64) -> Self {
        self.ttl_ms = Some(ttl_ms);
        self
    }

    pub fn with_max_size(mut self, max_size: usize) -> Self {
        self.max_size = Some(max_size);
        self
    }

    pub fn with_warmer<F>(mut self, warmer: F) -> Self
    where
        F: Fn() -> std::result::Result<HashMap<K, V>, WarmError> + Send + Sync + 'static,
    {
        self.warmer = Some(Arc::new(warmer));
        self
    }

    /// TTL as a `Duration`.
    pub fn ttl(&self) -> Option<Duration> {
        self.ttl_ms.map(Duration::from_millis)
    }

    // == Validate ==
    /// Rejects settings that could never produce a useful cache.
    pub fn validate(&self, name: &str) -> Result<()> {
        if name.trim().is_empty() {
            return Err(CacheError::InvalidConfig(
                "Cache name cannot be empty".to_string(),
            ));
        }
        if self.ttl_ms == Some(0) {
            return Err(CacheError::InvalidConfig(format!(
                "Cache '{}': ttl_ms must be greater than zero",
                name
            )));
        }
        if self.max_size == Some(0) {
            return Err(CacheError::InvalidConfig(format!(
                "Cache '{}': max_size must be greater than zero",
                name
            )));
        }
        Ok(())
    }

    /// Whether two configs agree on the settings that can be compared.
    ///
    /// Warmers are closures and are never compared.
    pub fn same_limits(&self, other: &Self) -> bool {
        self.ttl_ms == other.ttl_ms && self.max_size == other.max_size
    }

    /// Serializable view of this config.
    pub fn summary(&self) -> ConfigSummary {
        ConfigSummary {
            ttl_ms: self.ttl_ms,
            max_size: self.max_size,
            has_warmer: self.warmer.is_some(),
        }
    }
}

impl<K, V> Default for CacheConfig<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> Clone for CacheConfig<K, V> {
    fn clone(&self) -> Self {
        Self {
            ttl_ms: self.ttl_ms,
            max_size: self.max_size,
            warmer: self.warmer.clone(),
        }
    }
}

impl<K, V> fmt::Debug for CacheConfig<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheConfig")
            .field("ttl_ms", &self.ttl_ms)
            .field("max_size", &self.max_size)
            .field("warmer", &self.warmer.as_ref().map(|_| "<fn>"))
            .finish()
    }
}

// == Config Summary ==
/// What `list_caches` reports about a cache's configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigSummary {
    pub ttl_ms: Option<u64>,
    pub max_size: Option<usize>,
    pub has_warmer: bool,
}
