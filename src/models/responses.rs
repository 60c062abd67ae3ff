//! Response DTOs for the admin API
//!
//! Defines the structure of outgoing HTTP response bodies.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Response body for GET /caches/:name/entries/:key
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetResponse {
    /// The requested key
    pub key: String,
    /// The cached value
    pub value: Value,
}

impl GetResponse {
    pub fn new(key: impl Into<String>, value: Value) -> Self {
        Self {
            key: key.into(),
            value,
        }
    }
}

/// Response body for POST /caches/:name/lookup
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LookupResponse {
    /// Cached value or default per key, null when neither exists
    pub values: HashMap<String, Option<Value>>,
}

/// Acknowledgement for lifecycle and write operations
///
/// Writes are fire-and-forget, so a write acknowledgement means the request
/// was queued, not that it was applied.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageResponse {
    /// The cache the request addressed
    pub cache: String,
    /// Human-readable outcome
    pub message: String,
}

impl MessageResponse {
    pub fn new(cache: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            cache: cache.into(),
            message: message.into(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
