//! Named Cache - supervised in-memory caches addressed by name
//!
//! Boots the cache directory, pre-starts the configured caches and serves
//! the admin API.

use std::net::SocketAddr;

use anyhow::Context;
use tokio::{signal, task::JoinHandle};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use named_cache::api::create_router;
use named_cache::config::BootCache;
use named_cache::{spawn_health_monitor, AppState, Config};

/// Main entry point for the cache server.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration from environment variables
/// 3. Create the cache directory and start boot caches in order
/// 4. Start the health monitor
/// 5. Serve the admin API until SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to info for this crate, override with RUST_LOG
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "named_cache=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Named Cache server");

    let config = Config::from_env().context("invalid configuration")?;
    info!(
        "Configuration loaded: port={}, call_timeout={}ms, health_check_interval={}s, boot_caches={}",
        config.server_port,
        config.call_timeout_ms,
        config.health_check_interval,
        config.caches.len()
    );

    let state = AppState::from_config(&config);
    state
        .directory
        .start_all(config.caches.iter().cloned().map(BootCache::into_config))
        .await
        .context("failed to start boot caches")?;
    info!("Cache directory initialized");

    let monitor = (config.health_check_interval > 0)
        .then(|| spawn_health_monitor(state.directory.clone(), config.health_check_interval));

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(monitor))
        .await
        .context("server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM), then stops the monitor.
async fn shutdown_signal(monitor: Option<JoinHandle<()>>) {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", err);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(err) => {
                error!("Failed to install SIGTERM handler: {}", err);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, initiating shutdown...");
        }
        _ = terminate => {
            info!("Received SIGTERM, initiating shutdown...");
        }
    }

    if let Some(monitor) = monitor {
        monitor.abort();
        warn!("Health monitor aborted");
    }
}
