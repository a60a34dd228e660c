//! Tube Gateway - request gateway core
//!
//! Serves the cache and admission controller over HTTP.

use std::net::SocketAddr;

use anyhow::Context;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tube_gateway::api::create_router;
use tube_gateway::{spawn_reclaim_task, AppState, Config};

/// Main entry point for the gateway.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load and validate configuration from environment variables
/// 3. Create the cache store and admission controller
/// 4. Start the background reclaim task
/// 5. Create Axum router with all endpoints
/// 6. Start HTTP server on configured port
/// 7. Handle graceful shutdown on SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tube_gateway=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Tube Gateway");

    let config = Config::from_env();
    info!(
        "Configuration loaded: capacity={}, default_ttl={}s, rate={}/{}s, reclaim_interval={}s, port={}",
        config.cache_capacity,
        config.default_ttl,
        config.rate,
        config.per,
        config.reclaim_interval,
        config.server_port
    );

    let state = AppState::from_config(&config).context("invalid gateway configuration")?;
    info!("Cache store and admission controller initialized");

    let reclaim_handle = spawn_reclaim_task(
        state.cache.clone(),
        state.limiter.clone(),
        config.reclaim_interval(),
    );
    info!("Background reclaim task started");

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("Server listening on http://{}", addr);

    // Connect info supplies the peer address used as the admission identity
    axum::serve(
        listener,
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(shutdown_signal(reclaim_handle))
    .await
    .context("server error")?;

    info!("Server shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM).
///
/// On shutdown signal, aborts the reclaim task and allows graceful shutdown.
async fn shutdown_signal(reclaim_handle: tokio::task::JoinHandle<()>) {
    let ctrl_c = async {
        if let Err(err) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", err);
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
                warn!("Failed to install SIGTERM handler: {}", err);
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

    reclaim_handle.abort();
    warn!("Reclaim task aborted");
}
