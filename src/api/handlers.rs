//! API Handlers
//!
//! HTTP request handlers for the admin surface over a cache directory.

use std::collections::BTreeMap;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde_json::Value;

use crate::cache::CacheHandle;
use crate::config::Config;
use crate::directory::{CacheDirectory, CacheInfo, HealthReport, HealthStatus, StatsReport};
use crate::error::{CacheError, Result};
use crate::models::{
    GetResponse, LookupRequest, LookupResponse, MessageResponse, PutManyRequest, PutRequest,
    StartCacheRequest,
};

/// Directory type served over HTTP: string keys, arbitrary JSON values.
pub type JsonDirectory = CacheDirectory<String, Value>;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub directory: JsonDirectory,
}

impl AppState {
    pub fn new(directory: JsonDirectory) -> Self {
        Self { directory }
    }

    /// Creates a fresh directory using the configured call timeout.
    ///
    /// Boot caches are not started here; see [`JsonDirectory::start_all`].
    pub fn from_config(config: &Config) -> Self {
        Self::new(CacheDirectory::with_call_timeout(config.call_timeout()))
    }

    /// Resolves a cache for an HTTP request; unknown names are a 404.
    fn cache(&self, name: &str) -> Result<CacheHandle<String, Value>> {
        self.directory
            .resolve(name)
            .ok_or_else(|| CacheError::NotFound(format!("cache '{}'", name)))
    }
}

type Accepted = (StatusCode, Json<MessageResponse>);

fn accepted(cache: &str, message: &str) -> Accepted {
    (StatusCode::ACCEPTED, Json(MessageResponse::new(cache, message)))
}

// == Management ==

/// Handler for GET /health
///
/// 503 when no tracked cache is alive.
pub async fn health_handler(State(state): State<AppState>) -> Result<(StatusCode, Json<HealthReport>)> {
    let report = state.directory.health_check().await?;
    let status = match report.status {
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
        _ => StatusCode::OK,
    };
    Ok((status, Json(report)))
}

/// Handler for GET /caches
pub async fn list_caches_handler(State(state): State<AppState>) -> Result<Json<BTreeMap<String, CacheInfo>>> {
    Ok(Json(state.directory.list_caches().await?))
}

/// Handler for GET /stats
pub async fn all_stats_handler(State(state): State<AppState>) -> Result<Json<StatsReport>> {
    Ok(Json(state.directory.stats(None).await?))
}

/// Handler for GET /caches/:name/stats
pub async fn cache_stats_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<StatsReport>> {
    Ok(Json(state.directory.stats(Some(&name)).await?))
}

/// Handler for PUT /caches/:name
pub async fn start_cache_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
    body: Option<Json<StartCacheRequest>>,
) -> Result<Json<MessageResponse>> {
    let req = body.map(|Json(req)| req).unwrap_or_default();
    state.directory.ensure_started(&name, req.into_config()).await?;
    Ok(Json(MessageResponse::new(name, "cache running")))
}

/// Handler for POST /caches/:name/restart
pub async fn restart_cache_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
    body: Option<Json<StartCacheRequest>>,
) -> Result<Json<MessageResponse>> {
    let req = body.map(|Json(req)| req).unwrap_or_default();
    state.directory.restart_cache(&name, req.into_config()).await?;
    Ok(Json(MessageResponse::new(name, "cache restarted")))
}

/// Handler for DELETE /caches/:name
pub async fn stop_cache_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<MessageResponse>> {
    state.directory.stop_cache(&name).await?;
    Ok(Json(MessageResponse::new(name, "cache stopped")))
}

/// Handler for POST /caches/:name/warm
pub async fn warm_handler(State(state): State<AppState>, Path(name): Path<String>) -> Result<Accepted> {
    state.cache(&name)?.warm();
    Ok(accepted(&name, "warm queued"))
}

// == Data ==

/// Handler for GET /caches/:name/entries/:key
///
/// A miss is a 404, whether the key is absent, expired, or the cache could
/// not answer in time.
pub async fn get_entry_handler(
    State(state): State<AppState>,
    Path((name, key)): Path<(String, String)>,
) -> Result<Json<GetResponse>> {
    let value = state
        .cache(&name)?
        .lookup(key.clone())
        .await
        .ok_or_else(|| CacheError::NotFound(format!("key '{}' in cache '{}'", key, name)))?;

    Ok(Json(GetResponse::new(key, value)))
}

/// Handler for POST /caches/:name/lookup
pub async fn lookup_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(req): Json<LookupRequest>,
) -> Result<Json<LookupResponse>> {
    let values = state
        .cache(&name)?
        .get_multiple(req.keys, req.defaults)
        .await;
    Ok(Json(LookupResponse { values }))
}

/// Handler for PUT /caches/:name/entries
pub async fn put_entry_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(req): Json<PutRequest>,
) -> Result<Accepted> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    state.cache(&name)?.put(req.key, req.value);
    Ok(accepted(&name, "put queued"))
}

/// Handler for PUT /caches/:name/batch
pub async fn put_entries_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(req): Json<PutManyRequest>,
) -> Result<Accepted> {
    if let Some(error_msg) = req.validate() {
        return Err(CacheError::InvalidRequest(error_msg));
    }

    state.cache(&name)?.put_multiple(req.entries);
    Ok(accepted(&name, "batch put queued"))
}

/// Handler for DELETE /caches/:name/entries/:key
pub async fn delete_entry_handler(
    State(state): State<AppState>,
    Path((name, key)): Path<(String, String)>,
) -> Result<Accepted> {
    state.cache(&name)?.invalidate(key);
    Ok(accepted(&name, "invalidation queued"))
}

/// Handler for DELETE /caches/:name/entries
pub async fn clear_handler(State(state): State<AppState>, Path(name): Path<String>) -> Result<Accepted> {
    state.cache(&name)?.clear();
    Ok(accepted(&name, "clear queued"))
}
