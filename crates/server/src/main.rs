//! shopscrape server entry point.
//!
//! Boots the HTTP API. Logging goes to stderr as JSON; the notifier line is
//! the only thing written to stdout.

use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

use shopscrape_core::{AppConfig, CacheClient};

mod app;
mod error;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(std::io::stderr)
        .json()
        .init();

    let config = AppConfig::load()?;
    let token = config.require_static_token()?.to_string();
    config.require_base_url()?;

    let cache = CacheClient::connect(&config)
        .await
        .context("failed to connect to the cache")?;

    let shutdown = CancellationToken::new();
    let listener = tokio::net::TcpListener::bind(&config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;

    tracing::info!(addr = %config.bind_addr, backend = ?config.cache_backend, "Starting shopscrape server");

    let state = app::AppState::new(config, cache.clone(), &token, shutdown.clone());
    axum::serve(listener, app::router(state))
        .with_graceful_shutdown(shutdown_signal(shutdown))
        .await?;

    cache.close().await?;
    tracing::info!("shopscrape server stopped");

    Ok(())
}

/// Resolves on Ctrl-C or SIGTERM and cancels in-flight scrapes.
async fn shutdown_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    tracing::info!("shutdown requested");
    shutdown.cancel();
}
