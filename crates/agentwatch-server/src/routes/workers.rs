//! Worker registration, log ingestion and run-state routes.

use super::reject;
use crate::state::AppState;
use agentwatch_types::{LogEntry, PresenceView, RunState, WorkerSummary};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

#[derive(Serialize)]
pub struct WorkerListResponse {
    pub workers: Vec<WorkerSummary>,
    pub visible_count: usize,
}

pub async fn list(State(state): State<Arc<AppState>>) -> Json<WorkerListResponse> {
    let workers = state.registry.list();
    let visible_count = workers.iter().filter(|w| w.view.visible).count();
    Json(WorkerListResponse {
        workers,
        visible_count,
    })
}

#[derive(Deserialize, Default)]
pub struct RegisterWorkerRequest {
    #[serde(default)]
    pub worker_id: Option<Uuid>,
    #[serde(default)]
    pub run_state: Option<RunState>,
}

pub async fn create(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RegisterWorkerRequest>,
) -> Result<(StatusCode, Json<WorkerSummary>), (StatusCode, String)> {
    let worker_id = req.worker_id.unwrap_or_else(Uuid::new_v4);
    let summary = state
        .registry
        .register(worker_id, req.run_state.unwrap_or_default())
        .map_err(reject)?;
    Ok((StatusCode::CREATED, Json(summary)))
}

pub async fn get(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<Json<WorkerSummary>, (StatusCode, String)> {
    state.registry.summary(id).map(Json).map_err(reject)
}

pub async fn remove(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, (StatusCode, String)> {
    state.registry.unregister(id).map_err(reject)?;
    Ok(StatusCode::NO_CONTENT)
}

/// Either fully formed entries or bare lines; bare lines are stamped on receipt
/// and appended after `entries`.
#[derive(Deserialize)]
pub struct AppendLogsRequest {
    #[serde(default)]
    pub entries: Vec<LogEntry>,
    #[serde(default)]
    pub lines: Vec<String>,
}

pub async fn append_logs(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<AppendLogsRequest>,
) -> Result<Json<PresenceView>, (StatusCode, String)> {
    let received_at = state.registry.now();
    let mut batch = req.entries;
    batch.extend(req.lines.into_iter().map(|text| LogEntry::new(text, received_at)));

    state.registry.append_logs(id, batch).map(Json).map_err(reject)
}

#[derive(Deserialize)]
pub struct SetRunStateRequest {
    pub run_state: RunState,
}

pub async fn set_run_state(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
    Json(req): Json<SetRunStateRequest>,
) -> Result<Json<PresenceView>, (StatusCode, String)> {
    state
        .registry
        .set_run_state(id, req.run_state)
        .map(Json)
        .map_err(reject)
}
