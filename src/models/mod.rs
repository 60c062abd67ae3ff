//! Request and Response models for the admin API
//!
//! This module defines the DTOs (Data Transfer Objects) used for
//! serializing/deserializing HTTP request and response bodies. Directory
//! snapshots (`HealthReport`, `CacheInfo`, `StatsReport`) serialize directly.

pub mod requests;
pub mod responses;

// Re-export commonly used types
pub use requests::{LookupRequest, PutManyRequest, PutRequest, StartCacheRequest};
pub use responses::{ErrorResponse, GetResponse, LookupResponse, MessageResponse};
