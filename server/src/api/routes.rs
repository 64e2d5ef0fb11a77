use axum::{
    Json, Router,
    extract::{
        Query, State,
        rejection::{JsonRejection, QueryRejection},
    },
    routing::{get, post},
};
use common::config::ConfigOverrides;
use insight::{InsightEngine, InsightRequest, InsightResponse};
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::info_span;
use uuid::Uuid;

use super::models::{AnalyzeQuery, HealthResponse};
use crate::services::AppError;

pub async fn analyze(
    State(engine): State<Arc<InsightEngine>>,
    query: Result<Query<AnalyzeQuery>, QueryRejection>,
    payload: Result<Json<InsightRequest>, JsonRejection>,
) -> Result<Json<InsightResponse>, AppError> {
    let Query(query) = query.map_err(|rejection| AppError::bad_request(rejection.body_text()))?;
    let Json(request) = payload.map_err(|rejection| AppError::bad_request(rejection.body_text()))?;
    let overrides = ConfigOverrides::from(query);
    let span = info_span!("request", request_id = %Uuid::new_v4());

    // Pure CPU work; keep it off the async workers.
    let response = tokio::task::spawn_blocking(move || {
        let _guard = span.enter();
        engine.analyze_with_overrides(request, &overrides)
    })
    .await
    .map_err(|e| AppError(common::Error::Other(format!("Analysis task failed: {}", e))))??;

    Ok(Json(response))
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

// Define all API routes
pub fn routes(engine: Arc<InsightEngine>) -> Router {
    Router::new()
        .route("/analyze", post(analyze))
        .route("/health", get(health))
        .layer(ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(engine)
}
