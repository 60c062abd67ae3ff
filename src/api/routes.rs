//! API Routes
//!
//! Configures the Axum router with the cache directory endpoints.

use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};

use super::handlers::{
    all_stats_handler, cache_stats_handler, clear_handler, delete_entry_handler,
    get_entry_handler, health_handler, list_caches_handler, lookup_handler,
    put_entries_handler, put_entry_handler, restart_cache_handler, start_cache_handler,
    stop_cache_handler, warm_handler, AppState,
};

/// Creates the main router with all endpoints configured.
///
/// # Middleware
/// - CORS: Allows any origin
/// - Tracing: Logs all requests
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler))
        .route("/caches", get(list_caches_handler))
        .route("/stats", get(all_stats_handler))
        .route(
            "/caches/:name",
            put(start_cache_handler).delete(stop_cache_handler),
        )
        .route("/caches/:name/stats", get(cache_stats_handler))
        .route("/caches/:name/restart", post(restart_cache_handler))
        .route("/caches/:name/warm", post(warm_handler))
        .route(
            "/caches/:name/entries",
            put(put_entry_handler).delete(clear_handler),
        )
        .route(
            "/caches/:name/entries/:key",
            get(get_entry_handler).delete(delete_entry_handler),
        )
        .route("/caches/:name/batch", put(put_entries_handler))
        .route("/caches/:name/lookup", post(lookup_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::directory::CacheDirectory;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::util::ServiceExt;

    fn create_test_app() -> Router {
        create_router(AppState::new(CacheDirectory::new()))
    }

    #[tokio::test]
    async fn test_health_endpoint() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_stats_endpoint() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/stats")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_start_cache_endpoint() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .method("PUT")
                    .uri("/caches/settings")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"ttl_ms":60000,"max_size":10}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_entry_on_unknown_cache() {
        let app = create_test_app();

        let response = app
            .oneshot(
                Request::builder()
                    .uri("/caches/ghost/entries/anything")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
