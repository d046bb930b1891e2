//! HTTP surface of Queztl Core.
//!
//! Every request-triggered operation lives here. Handlers that produce a
//! result observers care about also push it through the broadcaster.

use crate::application::power::StressTestRequest;
use crate::application::system::Application;
use crate::domain::creative::CreativeMode;
use crate::domain::errors::{ScenarioError, TrainingError, ValidationError};
use crate::domain::messages::MessageKind;
use crate::domain::scenario::{PerformanceAnalytics, ScenarioId};
use crate::infrastructure::observability::LatencyGuard;
use crate::interfaces::websocket;
use axum::extract::{Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{Map, Value, json};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::{error, info, warn};

pub type AppState = Arc<Application>;

const LATEST_METRICS_LIMIT: usize = 100;
const RECENT_PROBLEMS_LIMIT: usize = 20;
const SERVICE_NAME: &str = "Queztl-Core Testing & Monitoring System";

/// Error returned by handlers, rendered as `{"error": "..."}`
#[derive(Debug)]
pub enum ApiError {
    Validation(ValidationError),
    Conflict(TrainingError),
    Scenario(ScenarioError),
    Internal(anyhow::Error),
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        ApiError::Validation(e)
    }
}

impl From<TrainingError> for ApiError {
    fn from(e: TrainingError) -> Self {
        ApiError::Conflict(e)
    }
}

impl From<ScenarioError> for ApiError {
    fn from(e: ScenarioError) -> Self {
        ApiError::Scenario(e)
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(e: anyhow::Error) -> Self {
        ApiError::Internal(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Validation(e) => (StatusCode::BAD_REQUEST, e.to_string()),
            ApiError::Conflict(e) => (StatusCode::CONFLICT, e.to_string()),
            ApiError::Scenario(e @ ScenarioError::NotFound { .. }) => {
                (StatusCode::NOT_FOUND, e.to_string())
            }
            ApiError::Scenario(e) => (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()),
            ApiError::Internal(e) => {
                error!("API: internal error: {:#}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };
        if status != StatusCode::INTERNAL_SERVER_ERROR {
            warn!("API: request rejected ({}): {}", status.as_u16(), message);
        }
        (status, Json(json!({ "error": message }))).into_response()
    }
}

type ApiResult<T> = Result<T, ApiError>;

pub fn router(app: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/api/health", get(health))
        .route("/api/metrics/latest", get(latest_metrics))
        .route("/api/metrics/summary", get(metrics_summary))
        .route("/api/analytics/performance", get(performance_analytics))
        .route("/metrics", get(prometheus_metrics))
        .route("/api/scenarios/generate", post(generate_scenario))
        .route("/api/scenarios/{id}/execute", post(execute_scenario))
        .route("/api/problems/recent", get(recent_problems))
        .route("/api/training/status", get(training_status))
        .route("/api/training/start", post(start_training))
        .route("/api/training/stop", post(stop_training))
        .route("/api/training/creative", post(creative_scenario))
        .route("/api/training/creative/modes", get(creative_modes))
        .route("/api/power/measure", get(measure_power))
        .route("/api/power/stress-test", post(stress_test))
        .route("/api/power/benchmark", post(benchmark_suite))
        .route("/api/power/report", get(power_report))
        .route("/api/power/leaderboard", get(leaderboard))
        .route("/ws/metrics", get(websocket::metrics_stream))
        // Dashboard is served from another origin
        .layer(CorsLayer::permissive())
        .with_state(app)
}

async fn root() -> Json<Value> {
    Json(json!({
        "service": SERVICE_NAME,
        "status": "running",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn health() -> Json<Value> {
    Json(json!({ "status": "healthy", "timestamp": Utc::now() }))
}

async fn latest_metrics(State(app): State<AppState>) -> ApiResult<Json<Value>> {
    let _timer = LatencyGuard::start(&app.metrics, "metrics_latest");
    let metrics = app.store.latest(LATEST_METRICS_LIMIT).await?;
    Ok(Json(json!({ "metrics": metrics })))
}

async fn metrics_summary(State(app): State<AppState>) -> ApiResult<impl IntoResponse> {
    let _timer = LatencyGuard::start(&app.metrics, "metrics_summary");
    Ok(Json(app.store.summary().await?))
}

async fn performance_analytics(State(app): State<AppState>) -> ApiResult<impl IntoResponse> {
    let _timer = LatencyGuard::start(&app.metrics, "analytics_performance");
    let results = app.store.all().await?;
    Ok(Json(PerformanceAnalytics::from_results(&results)))
}

async fn prometheus_metrics(State(app): State<AppState>) -> impl IntoResponse {
    app.metrics
        .uptime_seconds
        .set(app.started_at.elapsed().as_secs_f64());
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        app.metrics.render(),
    )
}

async fn generate_scenario(State(app): State<AppState>) -> ApiResult<impl IntoResponse> {
    let _timer = LatencyGuard::start(&app.metrics, "scenarios_generate");
    Ok(Json(app.generator.generate().await?))
}

async fn execute_scenario(
    State(app): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let _timer = LatencyGuard::start(&app.metrics, "scenarios_execute");
    let result = app.executor.execute(&ScenarioId::from(id)).await?;
    app.metrics.inc_scenarios("completed");
    app.broadcaster
        .publish(MessageKind::ScenarioCompleted, &result)
        .await;
    Ok(Json(result))
}

async fn recent_problems(State(app): State<AppState>) -> Json<Value> {
    let problems = app.generator.recent(RECENT_PROBLEMS_LIMIT).await;
    Json(json!({ "problems": problems }))
}

async fn training_status(State(app): State<AppState>) -> impl IntoResponse {
    Json(app.training.status().await)
}

async fn start_training(State(app): State<AppState>) -> ApiResult<Json<Value>> {
    let status = app.training.start().await?;
    info!("API: training started");
    Ok(Json(json!({ "status": "training_started", "training": status })))
}

async fn stop_training(State(app): State<AppState>) -> Json<Value> {
    let outcome = app.training.stop().await;
    Json(json!({ "status": "training_stopped", "outcome": outcome }))
}

#[derive(Debug, Deserialize)]
pub struct CreativeParams {
    pub mode: Option<String>,
}

async fn creative_scenario(
    State(app): State<AppState>,
    Query(params): Query<CreativeParams>,
) -> ApiResult<impl IntoResponse> {
    let mode = params
        .mode
        .as_deref()
        .filter(|m| !m.trim().is_empty())
        .map(str::parse::<CreativeMode>)
        .transpose()?;

    let scenario = app.creative.generate(mode);
    app.broadcaster
        .publish(MessageKind::CreativeScenarioStarted, &scenario)
        .await;
    Ok(Json(scenario))
}

async fn creative_modes(State(app): State<AppState>) -> Json<Value> {
    let modes = app.creative.modes();
    let descriptions: Map<String, Value> = modes
        .iter()
        .map(|m| (m.mode.as_str().to_string(), Value::from(m.description)))
        .collect();
    Json(json!({
        "modes": modes.iter().map(|m| m.mode).collect::<Vec<_>>(),
        "descriptions": descriptions,
    }))
}

async fn measure_power(State(app): State<AppState>) -> ApiResult<impl IntoResponse> {
    let _timer = LatencyGuard::start(&app.metrics, "power_measure");
    let measurement = app.power.measure().await?;
    app.broadcaster
        .publish(MessageKind::PowerMeasurement, &measurement)
        .await;
    Ok(Json(measurement))
}

#[derive(Debug, Deserialize)]
pub struct StressTestParams {
    pub duration: Option<i64>,
    pub intensity: Option<String>,
}

async fn stress_test(
    State(app): State<AppState>,
    Query(params): Query<StressTestParams>,
) -> ApiResult<impl IntoResponse> {
    let _timer = LatencyGuard::start(&app.metrics, "power_stress_test");
    let request = StressTestRequest::new(
        params.duration.unwrap_or(10),
        params.intensity.as_deref().unwrap_or("medium"),
    )?;

    let result = app.power.run_stress_test(request).await;
    app.broadcaster
        .publish(MessageKind::StressTestComplete, &result)
        .await;
    Ok(Json(result))
}

async fn benchmark_suite(State(app): State<AppState>) -> impl IntoResponse {
    let _timer = LatencyGuard::start(&app.metrics, "power_benchmark");
    let suite = app.power.run_benchmark_suite().await;
    app.broadcaster
        .publish(MessageKind::BenchmarkComplete, &suite)
        .await;
    Json(suite)
}

async fn power_report(State(app): State<AppState>) -> impl IntoResponse {
    Json(app.power.report().await)
}

async fn leaderboard(State(app): State<AppState>) -> impl IntoResponse {
    let _timer = LatencyGuard::start(&app.metrics, "power_leaderboard");
    Json(app.power.leaderboard().await)
}
