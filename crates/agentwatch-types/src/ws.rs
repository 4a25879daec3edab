//! WebSocket message protocol between dashboard clients and the server.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{ActivityRecord, RunState};

/// Messages sent from client to server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WsClientMessage {
    /// Ping for keepalive.
    Ping { timestamp: u64 },
    /// Request a snapshot of every worker's presence.
    GetState,
}

/// Messages sent from server to client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WsServerMessage {
    /// A worker's displayed presence changed.
    PresenceUpdate {
        worker_id: Uuid,
        run_state: RunState,
        visible: bool,
        activity: Option<ActivityRecord>,
    },
    /// A worker was unregistered.
    WorkerRemoved { worker_id: Uuid },
    /// Pong response.
    Pong { timestamp: u64 },
    /// Error message.
    Error { code: String, message: String },
}
