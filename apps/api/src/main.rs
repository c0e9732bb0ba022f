mod acquisition;
mod config;
mod errors;
mod llm_client;
mod optimization;
mod routes;
mod state;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::acquisition::http::Fetcher;
use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::optimization::pipeline::ContentOptimizer;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting E-E-A-T Optimizer API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize LLM client
    let llm = LlmClient::new(config.openai_api_key.clone(), &config.openai_base_url)?;
    info!(
        "LLM client initialized (model: {}, base: {})",
        llm_client::MODEL,
        config.openai_base_url
    );

    if config.verify_llm_on_startup {
        llm.verify()
            .await
            .context("Inference API rejected the configured credentials")?;
    }

    // Shared HTTP fetcher for sitemaps and competitor pages
    let fetcher = Fetcher::new()?;
    info!(
        "Fetcher initialized (competitor delay: {:?})",
        config.competitor_delay
    );

    let optimizer = ContentOptimizer::new(Arc::new(llm), fetcher, config.competitor_delay)
        .with_progress_callback(Arc::new(|run_id, step| {
            info!("Run {run_id}: {:?} ({}%)", step, step.percent());
        }));

    let state = AppState { optimizer };

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
