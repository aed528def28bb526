mod catalog;
mod config;
mod document;
mod errors;
mod render;
mod routes;
mod state;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use std::sync::Arc;

use crate::config::Config;
use crate::document::RenderPipeline;
use crate::render::{ChromiumEngine, RenderAdapter};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting intake v{}", env!("CARGO_PKG_VERSION"));

    tokio::fs::create_dir_all(&config.output_dir)
        .await
        .with_context(|| format!("cannot create output dir {}", config.output_dir.display()))?;
    info!("Writing documents to {}", config.output_dir.display());

    // Render engine: one headless browser process per document
    let engine = Arc::new(ChromiumEngine::new(config.chromium_bin.clone()));
    let adapter = RenderAdapter::new(engine, config.render_settle_timeout);
    info!(
        "Render engine: {} (settle timeout {:?})",
        config.chromium_bin.display(),
        adapter.settle_timeout()
    );

    let pipeline = RenderPipeline::new(config.locale, adapter)
        .context("document template failed to compile")?;
    info!("Document locale: {}", pipeline.locale().code());

    // Build app state
    let state = AppState {
        config: config.clone(),
        pipeline: Arc::new(pipeline),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
