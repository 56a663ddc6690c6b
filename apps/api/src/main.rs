mod analysis;
mod assistants;
mod config;
mod errors;
mod llm_client;
mod models;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analysis::ingest::FileIngestor;
use crate::analysis::orchestrator::{FileAnalyzer, PollSettings};
use crate::assistants::openai::OpenAiAssistants;
use crate::config::Config;
use crate::llm_client::{http_client, LlmClient};
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

    info!("Starting Resume API v{}", env!("CARGO_PKG_VERSION"));

    let http = http_client(Duration::from_secs(config.http_timeout_secs))?;

    // Text completion client
    let llm = LlmClient::new(
        http.clone(),
        config.openai_api_key.clone(),
        config.openai_base_url.clone(),
        config.completion_model.clone(),
    );
    info!("LLM client initialized (model: {})", llm.model());

    // File analyzer over the assistants API
    let provider = OpenAiAssistants::new(
        http.clone(),
        config.openai_api_key.clone(),
        config.openai_base_url.clone(),
    );
    let polling = PollSettings {
        interval: Duration::from_millis(config.run_poll_interval_ms),
        timeout: Duration::from_secs(config.run_poll_timeout_secs),
    };
    let analyzer = FileAnalyzer::new(
        Arc::new(provider),
        FileIngestor::new(http),
        config.assistant_model.clone(),
        polling,
    );
    info!(
        "File analyzer initialized (model: {}, poll every {}ms, timeout {}s)",
        config.assistant_model, config.run_poll_interval_ms, config.run_poll_timeout_secs
    );

    let state = AppState {
        llm: Arc::new(llm),
        analyzer: Arc::new(analyzer),
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
