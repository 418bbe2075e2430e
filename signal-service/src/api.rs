use crate::desk::SignalDesk;
use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use std::sync::Arc;
use tracing::{error, info};

#[derive(Clone)]
pub struct AppState {
    pub desk: Arc<SignalDesk>,
}

pub fn build_router(state: AppState) -> Router {
    Router::new().nest(
        "/api",
        Router::new()
            .route("/health", get(health))
            .route("/signal/generate", post(generate))
            .route("/signal/evaluate", post(evaluate))
            .route("/signal/cycle", post(cycle))
            .route("/signal/stats", get(stats))
            .with_state(state),
    )
}

fn api_ok(data: Value) -> Response {
    (StatusCode::OK, Json(json!({ "success": true, "data": data }))).into_response()
}

/// Failures are logged in full; callers only learn which operation failed
fn api_error(operation: &str, err: anyhow::Error) -> Response {
    error!("{} failed: {:#}", operation, err);
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(json!({ "success": false, "error": format!("{} failed", operation) })),
    )
        .into_response()
}

pub async fn health() -> Json<Value> {
    Json(json!({ "status": "ok" }))
}

pub async fn generate(State(state): State<AppState>) -> Response {
    info!("Trigger: generate");
    match state.desk.generate().await {
        Ok(signal) => api_ok(json!({ "generated": signal.is_some(), "signal": signal })),
        Err(err) => api_error("signal generation", err),
    }
}

pub async fn evaluate(State(state): State<AppState>) -> Response {
    info!("Trigger: evaluate");
    match state.desk.evaluate().await {
        Ok(outcome) => api_ok(json!({ "outcome": outcome })),
        Err(err) => api_error("signal evaluation", err),
    }
}

pub async fn cycle(State(state): State<AppState>) -> Response {
    info!("Trigger: cycle");
    match state.desk.cycle().await {
        Ok(report) => api_ok(json!(report)),
        Err(err) => api_error("signal cycle", err),
    }
}

pub async fn stats(State(state): State<AppState>) -> Response {
    match state.desk.stats().await {
        Ok(stats) => api_ok(json!(stats)),
        Err(err) => api_error("signal statistics", err),
    }
}
