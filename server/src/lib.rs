pub mod api;
pub mod llm;
pub mod services;
pub mod utils;

use common::config::{ConfigOverrides, Settings};
use common::Result;
use insight::{InsightEngine, InsightRequest, InsightResponse};
use std::path::Path;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

/// Reads an analysis request from a JSON file.
pub fn load_request(path: &Path) -> Result<InsightRequest> {
    let raw = std::fs::read_to_string(path)?;
    let request = serde_json::from_str(&raw)?;
    Ok(request)
}

/// Runs a single analysis of the request stored at `path`.
pub fn analyze_file(
    path: &Path,
    settings: &Settings,
    overrides: &ConfigOverrides,
) -> Result<InsightResponse> {
    let request = load_request(path)?;
    let engine = InsightEngine::new(settings.engine.clone())?;
    engine.analyze_with_overrides(request, overrides)
}

/// Starts the HTTP API and serves until the process is stopped.
pub async fn run_server(settings: Settings) -> Result<()> {
    let engine = Arc::new(InsightEngine::new(settings.engine.clone())?);

    if let Err(e) = llm::build_chat_model(&settings.engine) {
        warn!(error = %e, "Narrative generation backend unavailable");
    }

    let api_router = api::routes(Arc::clone(&engine));

    let addr = format!("{}:{}", settings.server.host, settings.server.port);
    let listener = TcpListener::bind(addr.as_str()).await?;
    info!(%addr, "Insight API server listening");
    axum::serve(listener, api_router).await?;

    Ok(())
}
