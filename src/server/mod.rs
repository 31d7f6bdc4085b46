use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{routing::get, Router};
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::service::AnalysisPipeline;

mod routes;

pub use routes::{analyze, health, info, ApiError};

/// Shared state handed to every handler
pub struct AppState {
    pub config: Config,
    pub pipeline: AnalysisPipeline,
}

impl AppState {
    pub fn new(config: Config, pipeline: AnalysisPipeline) -> Arc<Self> {
        Arc::new(Self { config, pipeline })
    }
}

/// Build the API router
pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/",       get(routes::analyze))
        .route("/health", get(routes::health))
        .route("/info",   get(routes::info))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve until Ctrl+C
pub async fn serve(state: Arc<AppState>) -> Result<()> {
    let bind = format!("{}:{}", state.config.server.host, state.config.server.port);
    let addr: SocketAddr = bind
        .parse()
        .with_context(|| format!("invalid listen address {bind}"))?;

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("binding to {addr}"))?;

    if !state.pipeline.extractor().is_available().await {
        tracing::warn!(
            "{} is not available; analysis requests will fail until it is installed",
            state.pipeline.extractor().name()
        );
    }

    tracing::info!("listening on {addr}");
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server error")?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to install Ctrl+C handler: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutting down");
}
