//! Stateless classification endpoint, handy for tuning rules against real output.

use crate::state::AppState;
use agentwatch_core::normalize_line;
use agentwatch_types::ActivityRecord;
use axum::{extract::State, Json};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

#[derive(Deserialize)]
pub struct ClassifyRequest {
    pub line: String,
}

#[derive(Serialize)]
pub struct ClassifyResponse {
    pub activity: Option<ActivityRecord>,
    /// Name of the pattern rule that fired, or `None` for narrative/no match.
    pub rule: Option<&'static str>,
}

pub async fn classify(
    State(state): State<Arc<AppState>>,
    Json(req): Json<ClassifyRequest>,
) -> Json<ClassifyResponse> {
    let extractor = state.registry.machine().extractor();
    let activity = extractor.classify_line(&req.line);
    let rule = normalize_line(&req.line)
        .and_then(|line| extractor.rules().first_match(&line).map(|(rule, _)| rule.name));

    Json(ClassifyResponse { activity, rule })
}
