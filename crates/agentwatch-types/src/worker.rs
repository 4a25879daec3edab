//! Worker run state and summaries.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::PresenceView;

/// Run state reported by the orchestration layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunState {
    #[default]
    Running,
    Paused,
    Stopped,
    Crashed,
}

impl RunState {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunState::Running => "running",
            RunState::Paused => "paused",
            RunState::Stopped => "stopped",
            RunState::Crashed => "crashed",
        }
    }
}

impl std::fmt::Display for RunState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Summary view of a tracked worker for listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerSummary {
    pub worker_id: Uuid,
    pub run_state: RunState,
    /// Number of log entries currently retained.
    pub log_len: usize,
    pub view: PresenceView,
}
