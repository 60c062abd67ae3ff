//! Configuration Module
//!
//! Handles loading server configuration and boot-time cache registrations
//! from environment variables.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use serde_json::Value;

use crate::cache::{json_file_warmer, CacheConfig, DEFAULT_CALL_TIMEOUT_MS};
use crate::error::{CacheError, Result};

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// HTTP server port
    pub server_port: u16,
    /// How long reads wait for a cache actor, in milliseconds
    pub call_timeout_ms: u64,
    /// Seconds between health log lines, 0 disables the monitor
    pub health_check_interval: u64,
    /// Caches started before the server accepts requests, in order
    pub caches: Vec<BootCache>,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `CALL_TIMEOUT_MS` - Cache read timeout (default: 5000)
    /// - `HEALTH_CHECK_INTERVAL` - Health log frequency in seconds (default: 30)
    /// - `CACHES` - Boot caches, see [`BootCache::parse`] (default: none)
    pub fn from_env() -> Result<Self> {
        let defaults = Self::default();
        let caches = match env::var("CACHES") {
            Ok(raw) => BootCache::parse_list(&raw)?,
            Err(_) => Vec::new(),
        };

        let config = Self {
            server_port: env_or("SERVER_PORT", defaults.server_port),
            call_timeout_ms: env_or("CALL_TIMEOUT_MS", defaults.call_timeout_ms),
            health_check_interval: env_or("HEALTH_CHECK_INTERVAL", defaults.health_check_interval),
            caches,
        };
        config.validate()?;
        Ok(config)
    }

    /// Rejects settings that would leave every cache read timing out.
    pub fn validate(&self) -> Result<()> {
        if self.call_timeout_ms == 0 {
            return Err(CacheError::InvalidConfig(
                "CALL_TIMEOUT_MS must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    pub fn call_timeout(&self) -> Duration {
        Duration::from_millis(self.call_timeout_ms)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server_port: 3000,
            call_timeout_ms: DEFAULT_CALL_TIMEOUT_MS,
            health_check_interval: 30,
            caches: Vec::new(),
        }
    }
}

fn env_or<T: std::str::FromStr>(var: &str, default: T) -> T {
    env::var(var)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}

// == Boot Cache ==
/// One cache to pre-start at boot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BootCache {
    pub name: String,
    pub ttl_ms: Option<u64>,
    pub max_size: Option<usize>,
    /// JSON object file loaded by the cache's warmer
    pub warm_file: Option<PathBuf>,
}

impl BootCache {
    /// Parses a comma-separated list of cache specs, keeping their order.
    pub fn parse_list(raw: &str) -> Result<Vec<Self>> {
        raw.split(',')
            .map(str::trim)
            .filter(|spec| !spec.is_empty())
            .map(Self::parse)
            .collect()
    }

    /// Parses `name[:ttl_ms=N][:max_size=N][:warm_file=PATH]`.
    pub fn parse(spec: &str) -> Result<Self> {
        let mut parts = spec.split(':');
        let name = parts.next().unwrap_or_default().trim();
        if name.is_empty() {
            return Err(invalid(spec, "missing cache name"));
        }

        let mut cache = BootCache {
            name: name.to_string(),
            ttl_ms: None,
            max_size: None,
            warm_file: None,
        };

        for option in parts {
            let (key, value) = option
                .split_once('=')
                .ok_or_else(|| invalid(spec, "options must look like key=value"))?;
            match key.trim() {
                "ttl_ms" => {
                    cache.ttl_ms = Some(value.trim().parse().map_err(|_| invalid(spec, "ttl_ms is not a number"))?)
                }
                "max_size" => {
                    cache.max_size =
                        Some(value.trim().parse().map_err(|_| invalid(spec, "max_size is not a number"))?)
                }
                "warm_file" => cache.warm_file = Some(PathBuf::from(value.trim())),
                other => return Err(invalid(spec, &format!("unknown option '{}'", other))),
            }
        }

        Ok(cache)
    }

    /// Builds the name and cache configuration used by the server.
    pub fn into_config(self) -> (String, CacheConfig<String, Value>) {
        let mut config = CacheConfig::new();
        config.ttl_ms = self.ttl_ms;
        config.max_size = self.max_size;
        if let Some(path) = self.warm_file {
            config = config.with_warmer(json_file_warmer(path));
        }
        (self.name, config)
    }
}

fn invalid(spec: &str, reason: &str) -> CacheError {
    CacheError::InvalidConfig(format!("cache spec '{}': {}", spec, reason))
}
