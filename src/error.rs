//! Error types for the cache directory
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::models::ErrorResponse;

// == Cache Error Enum ==
/// Unified error type for the management API and the admin HTTP surface.
///
/// The data API (`get`, `put`, ...) never returns these to its callers; it
/// logs them and degrades to the caller's default instead.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Cache name (or key, at the HTTP surface) is not known
    #[error("Not found: {0}")]
    NotFound(String),

    /// No live actor backs the cache name
    #[error("Cache unreachable: {0}")]
    Unreachable(String),

    /// The actor did not answer within the call timeout
    #[error("Cache call timed out: {0}")]
    Timeout(String),

    /// Cache configuration was rejected at start
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// A running cache was asked to start with different settings
    #[error("Configuration conflict: {0}")]
    ConfigConflict(String),

    /// The directory task has stopped
    #[error("Cache directory is not running")]
    DirectoryUnavailable,

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

// == Warm Error Enum ==
/// Reasons a warmer run can fail. These only ever reach the logs.
#[derive(Error, Debug)]
pub enum WarmError {
    /// The warmer reported a failure
    #[error("warmer failed: {0}")]
    Failed(String),

    /// The warmer produced something other than a key/value mapping
    #[error("warmer returned invalid output: {0}")]
    InvalidOutput(String),

    /// The warmer panicked
    #[error("warmer panicked: {0}")]
    Panicked(String),

    #[error("warmer I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("warmer JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::NotFound(_) => StatusCode::NOT_FOUND,
            CacheError::InvalidConfig(_) | CacheError::InvalidRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            CacheError::ConfigConflict(_) => StatusCode::CONFLICT,
            CacheError::Unreachable(_) | CacheError::DirectoryUnavailable => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            CacheError::Timeout(_) => StatusCode::GATEWAY_TIMEOUT,
        };

        let body = Json(ErrorResponse::new(self.to_string()));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the cache directory.
pub type Result<T> = std::result::Result<T, CacheError>;
