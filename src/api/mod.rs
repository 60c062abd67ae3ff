//! API Module
//!
//! HTTP handlers and routing for the cache directory admin API.
//!
//! # Endpoints
//! - `GET /health` - Aggregate cache health (503 when nothing is alive)
//! - `GET /caches` - Tracked caches with status, uptime, config and stats
//! - `GET /stats` - Stats for every tracked cache
//! - `PUT /caches/:name` - Ensure a cache is running
//! - `DELETE /caches/:name` - Stop and forget a cache
//! - `GET /caches/:name/stats` - Stats for one cache
//! - `POST /caches/:name/restart` - Replace a cache with a fresh instance
//! - `POST /caches/:name/warm` - Queue a warmer run
//! - `PUT /caches/:name/entries` - Store one entry
//! - `DELETE /caches/:name/entries` - Clear all entries
//! - `GET /caches/:name/entries/:key` - Read one entry
//! - `DELETE /caches/:name/entries/:key` - Invalidate one entry
//! - `PUT /caches/:name/batch` - Store several entries
//! - `POST /caches/:name/lookup` - Read several entries with defaults

pub mod handlers;
pub mod routes;

pub use handlers::*;
pub use routes::create_router;
