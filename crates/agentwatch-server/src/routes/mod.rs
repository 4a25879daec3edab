//! HTTP route handlers.

pub mod activity;
pub mod workers;
pub mod ws;

use crate::state::AppState;
use agentwatch_core::AgentwatchError;
use axum::{
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// API and WebSocket routes, without transport layers.
pub fn router(state: Arc<AppState>) -> Router {
    let api_routes = Router::new()
        .route("/workers", get(workers::list).post(workers::create))
        .route("/workers/{id}", get(workers::get).delete(workers::remove))
        .route("/workers/{id}/logs", post(workers::append_logs))
        .route("/workers/{id}/run-state", put(workers::set_run_state))
        .route("/classify", post(activity::classify))
        .route("/health", get(health));

    let ws_routes = Router::new().route("/events", get(ws::upgrade));

    Router::new()
        .nest("/api", api_routes)
        .nest("/ws", ws_routes)
        .with_state(state)
}

/// Map a core error onto an HTTP rejection.
pub(crate) fn reject(err: AgentwatchError) -> (StatusCode, String) {
    let status = match &err {
        AgentwatchError::WorkerNotFound(_) => StatusCode::NOT_FOUND,
        AgentwatchError::WorkerAlreadyExists(_) => StatusCode::CONFLICT,
        AgentwatchError::WorkerLimitExceeded(_) => StatusCode::TOO_MANY_REQUESTS,
        AgentwatchError::JsonError(_) => StatusCode::BAD_REQUEST,
        AgentwatchError::IoError(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status.is_server_error() {
        tracing::error!(target: "agentwatch::api", "{}", err);
    } else {
        tracing::debug!(target: "agentwatch::api", "Rejected request: {}", err);
    }
    (status, err.to_string())
}
