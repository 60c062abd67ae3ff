//! Directory Module
//!
//! Maps logical cache names to live cache actors, starts them on demand and
//! repairs dead ones the next time `ensure_started` or `restart_cache`
//! touches their name. There is no background restart.

mod actor;
mod client;
mod report;

pub use client::CacheDirectory;
pub use report::{CacheHealth, CacheInfo, CacheStatus, HealthReport, HealthStatus, StatsReport};
