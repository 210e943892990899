//! API Cache Gateway - caching forwarder for third-party JSON APIs
//!
//! Binary entry point: configuration, background reaper, HTTP server.

use std::net::SocketAddr;

use anyhow::Context;
use tokio::signal;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_cache_gateway::{api::create_router, spawn_cleanup_task, AppState, Config};

/// Main entry point for the gateway.
///
/// # Startup Sequence
/// 1. Initialize tracing subscriber for logging
/// 2. Load configuration and credentials from environment variables
/// 3. Build the route table, cache and upstream client
/// 4. Start the background cache reaper
/// 5. Serve HTTP until SIGINT/SIGTERM
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Defaults to "info" level, can be overridden with RUST_LOG env var
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "api_cache_gateway=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting API Cache Gateway");

    let config = Config::from_env();
    info!(
        "Configuration loaded: max_entries={}, port={}, cleanup_interval={}s, upstream_timeout={}s",
        config.max_entries, config.server_port, config.cleanup_interval, config.upstream_timeout
    );

    let state = AppState::from_config(&config).context("failed to initialize gateway")?;
    for prefix in state.dispatcher.routes().missing_credentials() {
        warn!(route = prefix, "credential not set; requests to this route will fail");
    }
    info!(
        routes = state.dispatcher.routes().len(),
        "Route table initialized"
    );

    let cleanup_handle = spawn_cleanup_task(state.middleware().clone(), config.cleanup_interval);

    let app = create_router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server_port));
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Gateway listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(cleanup_handle))
        .await
        .context("server error")?;

    info!("Gateway shutdown complete");
    Ok(())
}

/// Waits for shutdown signal (Ctrl+C or SIGTERM), then stops the reaper.
async fn shutdown_signal(cleanup_handle: tokio::task::JoinHandle<()>) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
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

    cleanup_handle.abort();
    warn!("Cache reaper aborted");
}
