//! Global WebSocket pushing presence updates to dashboards.

use crate::state::AppState;
use agentwatch_core::PresenceEvent;
use agentwatch_types::{WorkerSummary, WsClientMessage, WsServerMessage};
use anyhow::Result;
use axum::extract::ws::{Message, WebSocket};
use futures::{SinkExt, StreamExt};
use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, trace, warn};

fn summary_message(summary: WorkerSummary) -> WsServerMessage {
    WsServerMessage::PresenceUpdate {
        worker_id: summary.worker_id,
        run_state: summary.run_state,
        visible: summary.view.visible,
        activity: summary.view.activity,
    }
}

fn event_message(event: PresenceEvent) -> WsServerMessage {
    match event {
        PresenceEvent::Updated {
            worker_id,
            run_state,
            view,
        } => WsServerMessage::PresenceUpdate {
            worker_id,
            run_state,
            visible: view.visible,
            activity: view.activity,
        },
        PresenceEvent::Removed { worker_id } => WsServerMessage::WorkerRemoved { worker_id },
    }
}

/// Current presence of every worker, as update messages.
fn snapshot(state: &AppState) -> Vec<WsServerMessage> {
    state.registry.list().into_iter().map(summary_message).collect()
}

/// Handle a dashboard connection: send a snapshot, then stream changes.
pub async fn handle_global_websocket(socket: WebSocket, state: Arc<AppState>) -> Result<()> {
    let (mut ws_tx, mut ws_rx) = socket.split();

    // Subscribe before the snapshot so no change slips between the two
    let mut event_rx = state.registry.subscribe();

    for msg in snapshot(&state) {
        let json = serde_json::to_string(&msg)?;
        ws_tx.send(Message::Text(json.into())).await?;
    }

    info!(target: "agentwatch::ws", "Dashboard WebSocket client connected");

    // Replies produced by the receive side go through the send task
    let (outgoing_tx, mut outgoing_rx) = tokio::sync::mpsc::channel::<WsServerMessage>(32);

    let state_clone = state.clone();
    let mut send_task = tokio::spawn(async move {
        loop {
            let batch = tokio::select! {
                Some(msg) = outgoing_rx.recv() => vec![msg],
                event = event_rx.recv() => match event {
                    Ok(event) => vec![event_message(event)],
                    Err(RecvError::Lagged(skipped)) => {
                        warn!(target: "agentwatch::ws", "Dashboard client lagged by {} events, resending snapshot", skipped);
                        snapshot(&state_clone)
                    }
                    Err(RecvError::Closed) => break,
                },
            };

            for msg in batch {
                let json = match serde_json::to_string(&msg) {
                    Ok(j) => j,
                    Err(_) => continue,
                };
                if ws_tx.send(Message::Text(json.into())).await.is_err() {
                    debug!(target: "agentwatch::ws", "Dashboard WebSocket send failed");
                    return;
                }
            }
        }
    });

    let state_clone = state.clone();
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = ws_rx.next().await {
            match msg {
                Message::Text(text) => {
                    let reply = match serde_json::from_str::<WsClientMessage>(text.as_str()) {
                        Ok(WsClientMessage::Ping { timestamp }) => {
                            trace!(target: "agentwatch::ws::ping", "Ping {}", timestamp);
                            vec![WsServerMessage::Pong { timestamp }]
                        }
                        Ok(WsClientMessage::GetState) => snapshot(&state_clone),
                        Err(e) => vec![WsServerMessage::Error {
                            code: "invalid_message".to_string(),
                            message: e.to_string(),
                        }],
                    };
                    for msg in reply {
                        if outgoing_tx.send(msg).await.is_err() {
                            return;
                        }
                    }
                }
                Message::Close(_) => {
                    debug!(target: "agentwatch::ws", "Dashboard WebSocket client closed connection");
                    break;
                }
                _ => {}
            }
        }
    });

    // Wait for either task to finish
    tokio::select! {
        _ = &mut send_task => {
            recv_task.abort();
        }
        _ = &mut recv_task => {
            send_task.abort();
        }
    }

    info!(target: "agentwatch::ws", "Dashboard WebSocket client disconnected");
    Ok(())
}
