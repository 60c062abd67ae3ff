//! Cache Module
//!
//! In-memory caches, each owned by its own actor task, with lazy TTL
//! expiration and a simple size bound.

mod actor;
mod config;
mod entry;
mod handle;
mod stats;
mod store;
mod warmer;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub(crate) use actor::CacheActor;
pub use config::{CacheConfig, ConfigSummary, Warmer};
pub use entry::CacheEntry;
pub use handle::CacheHandle;
pub use stats::{hit_rate, CacheCounters, CacheStats};
pub use store::CacheStore;
pub use warmer::{json_file_warmer, parse_json_object};

// == Public Constants ==
/// Default wait for a reply from a cache actor.
pub const DEFAULT_CALL_TIMEOUT_MS: u64 = 5000;
