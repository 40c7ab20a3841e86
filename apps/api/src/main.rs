mod analysis;
mod config;
mod errors;
mod llm_client;
mod routes;
mod state;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analysis::engine::AnalysisEngine;
use crate::analysis::heuristic::HeuristicScorer;
use crate::config::Config;
use crate::llm_client::{CompletionModel, LlmClient};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Resume Analyser API v{}", env!("CARGO_PKG_VERSION"));

    // Remote analysis only when a non-placeholder key is present
    let model: Option<Arc<dyn CompletionModel>> = match config.configured_api_key() {
        Some(key) => {
            let client = LlmClient::new(key, &config.openai_model, &config.openai_api_base)
                .context("failed to build LLM client")?;
            let check = config.credential_check();
            if !check.valid {
                warn!("OpenAI API key: {}", check.message);
            }
            info!(
                "LLM client initialized (model: {}, key: {})",
                config.openai_model,
                config.masked_api_key()
            );
            Some(Arc::new(client) as Arc<dyn CompletionModel>)
        }
        None => {
            info!("No OpenAI API key configured, using heuristic analysis only");
            None
        }
    };

    let engine = AnalysisEngine::new(model, HeuristicScorer::default());
    info!(
        "Analysis engine ready ({} mode)",
        if engine.is_remote_enabled() { "remote" } else { "heuristic" }
    );

    let state = AppState {
        engine: Arc::new(engine),
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
