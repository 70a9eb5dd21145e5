//! HTTP transport for the analytics backend
//!
//! Axum router exposing the prompt query, RCA, next-best-action, fleet
//! summary and health endpoints. All bodies are JSON; failures use the
//! `{"error": {"code", "message"}}` envelope from `KpiRcaError`.

use axum::{
    BoxError, Json, Router,
    error_handling::HandleErrorLayer,
    extract::{State, rejection::JsonRejection},
    http::{StatusCode, header},
    response::IntoResponse,
    routing::{get, post},
};
use chrono::Utc;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::{sync::Arc, time::Duration};
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};

use crate::config::Config;
use crate::deserializers::de_site_ids;
use crate::error::{KpiRcaError, Result};
use crate::intent::extract_intent;
use crate::kpi::{KpiService, PromptResponse, source};
use crate::rca::{
    AnalysisResult, FleetSummary, NextBestAction, RcaEngine, RuleCatalog, SiteInput, SiteReading,
    next_best_action, summarize,
};

pub const SERVICE_NAME: &str = "kpi-rca";

/// Shared state for HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub engine: RcaEngine,
    pub kpi: Arc<KpiService>,
}

impl AppState {
    pub fn new(engine: RcaEngine, kpi: KpiService) -> Self {
        Self {
            engine,
            kpi: Arc::new(kpi),
        }
    }

    /// Build the rule catalog and KPI source named by the configuration
    pub fn from_config(config: &Config) -> Result<Self> {
        let engine = RcaEngine::new(Arc::new(load_catalog(config)?));
        let kpi = KpiService::new(source::from_config(&config.data), config.data.cache_max);
        Ok(Self::new(engine, kpi))
    }
}

pub fn load_catalog(config: &Config) -> Result<RuleCatalog> {
    match &config.rca.rules_path {
        Some(path) => RuleCatalog::load(path),
        None => Ok(RuleCatalog::builtin()),
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PromptRequest {
    pub prompt: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct AnalyzeRequest {
    pub site: SiteInput,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct NextBestActionRequest {
    pub site: SiteInput,
    /// Accepted for client compatibility; does not influence the result
    pub context: Option<Value>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SummaryRequest {
    #[serde(deserialize_with = "de_site_ids")]
    pub site_ids: Vec<String>,
}

/// Unwrap a JSON body, turning extractor rejections into `InvalidInput`
fn body<T: DeserializeOwned>(payload: std::result::Result<Json<T>, JsonRejection>) -> Result<T> {
    payload
        .map(|Json(inner)| inner)
        .map_err(|rejection| KpiRcaError::invalid_input(rejection.body_text()))
}

pub async fn health_handler() -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "application/json")],
        json!({
            "status": "healthy",
            "service": SERVICE_NAME,
            "timestamp": Utc::now(),
        })
        .to_string(),
    )
}

pub async fn prompt_query_handler(
    State(state): State<AppState>,
    payload: std::result::Result<Json<PromptRequest>, JsonRejection>,
) -> Result<Json<PromptResponse>> {
    let request = body(payload)?;
    let intent = extract_intent(&request.prompt);
    tracing::debug!(kpi = %intent.kpi, geo = %intent.geo, time = %intent.time, "prompt intent");

    let kpi = state.kpi.clone();
    let response = tokio::task::spawn_blocking(move || kpi.query(&intent))
        .await
        .map_err(|e| KpiRcaError::Internal {
            message: format!("KPI query task failed: {}", e),
        })??;
    Ok(Json(response))
}

pub async fn analyze_handler(
    State(state): State<AppState>,
    payload: std::result::Result<Json<AnalyzeRequest>, JsonRejection>,
) -> Result<Json<AnalysisResult>> {
    let reading = SiteReading::try_from(body(payload)?.site)?;
    Ok(Json(state.engine.analyze(&reading)))
}

pub async fn next_best_action_handler(
    State(state): State<AppState>,
    payload: std::result::Result<Json<NextBestActionRequest>, JsonRejection>,
) -> Result<Json<NextBestAction>> {
    let request = body(payload)?;
    if request.context.is_some() {
        tracing::debug!("next-best-action context ignored");
    }
    let reading = SiteReading::try_from(request.site)?;
    let analysis = state.engine.analyze(&reading);
    Ok(Json(next_best_action(&analysis)))
}

pub async fn summary_handler(
    payload: std::result::Result<Json<SummaryRequest>, JsonRejection>,
) -> Result<Json<FleetSummary>> {
    let request = body(payload)?;
    Ok(Json(summarize(&request.site_ids)))
}

async fn handle_timeout(err: BoxError) -> impl IntoResponse {
    let (status, message) = if err.is::<tower::timeout::error::Elapsed>() {
        (StatusCode::REQUEST_TIMEOUT, "Request timed out".to_string())
    } else {
        (
            StatusCode::INTERNAL_SERVER_ERROR,
            format!("Unhandled internal error: {}", err),
        )
    };
    (
        status,
        [(header::CONTENT_TYPE, "application/json")],
        json!({"error": {"code": status.as_u16(), "message": message}}).to_string(),
    )
}

/// Router with CORS open to any origin and a per-request timeout
pub fn build_router(state: AppState, request_timeout: Duration) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/assistant/prompt-query", post(prompt_query_handler))
        .route("/rca/analyze", post(analyze_handler))
        .route(
            "/recommendations/next-best-action",
            post(next_best_action_handler),
        )
        .route("/rca/summary", post(summary_handler))
        .layer(
            ServiceBuilder::new()
                .layer(HandleErrorLayer::new(handle_timeout))
                .timeout(request_timeout),
        )
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Start the HTTP server
pub async fn start_http_server(config: &Config, state: AppState) -> anyhow::Result<()> {
    let app = build_router(
        state,
        Duration::from_millis(config.server.request_timeout_ms),
    );

    let listener = tokio::net::TcpListener::bind(config.server.bind).await?;
    tracing::info!("HTTP server listening on http://{}", config.server.bind);
    axum::serve(listener, app).await?;
    Ok(())
}
