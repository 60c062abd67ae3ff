//! Request DTOs for the admin API
//!
//! Defines the structure of incoming HTTP request bodies.

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;

use crate::cache::CacheConfig;

/// Maximum allowed key length in bytes
pub const MAX_KEY_LENGTH: usize = 256;

/// Request body for starting or restarting a cache
///
/// Both fields are optional; an empty body starts an unbounded cache whose
/// entries never expire.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StartCacheRequest {
    /// Entry lifetime in milliseconds
    #[serde(default)]
    pub ttl_ms: Option<u64>,
    /// Maximum number of entries
    #[serde(default)]
    pub max_size: Option<usize>,
}

impl StartCacheRequest {
    pub fn into_config(self) -> CacheConfig<String, Value> {
        let mut config = CacheConfig::new();
        config.ttl_ms = self.ttl_ms;
        config.max_size = self.max_size;
        config
    }
}

/// Request body for PUT /caches/:name/entries
#[derive(Debug, Clone, Deserialize)]
pub struct PutRequest {
    /// The cache key
    pub key: String,
    /// Any JSON value
    pub value: Value,
}

impl PutRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        validate_key(&self.key)
    }
}

/// Request body for PUT /caches/:name/batch
#[derive(Debug, Clone, Deserialize)]
pub struct PutManyRequest {
    pub entries: HashMap<String, Value>,
}

impl PutManyRequest {
    pub fn validate(&self) -> Option<String> {
        self.entries.keys().find_map(|key| validate_key(key))
    }
}

/// Request body for POST /caches/:name/lookup
#[derive(Debug, Clone, Deserialize)]
pub struct LookupRequest {
    pub keys: Vec<String>,
    /// Fallbacks for keys that miss
    #[serde(default)]
    pub defaults: HashMap<String, Value>,
}

fn validate_key(key: &str) -> Option<String> {
    if key.is_empty() {
        return Some("Key cannot be empty".to_string());
    }
    if key.len() > MAX_KEY_LENGTH {
        return Some(format!(
            "Key exceeds maximum length of {} bytes",
            MAX_KEY_LENGTH
        ));
    }
    None
}
