//! Named Cache - supervised in-memory caches addressed by name
//!
//! Each cache runs as its own task with optional TTL, size bound and
//! warmer. A directory starts, tracks, restarts and health-checks them,
//! and an axum admin API exposes both surfaces over HTTP.

pub mod api;
pub mod cache;
pub mod config;
pub mod directory;
pub mod error;
pub mod models;
pub mod tasks;

pub use api::AppState;
pub use cache::{CacheConfig, CacheHandle, CacheStats};
pub use config::Config;
pub use directory::CacheDirectory;
pub use error::{CacheError, WarmError};
pub use tasks::spawn_health_monitor;
