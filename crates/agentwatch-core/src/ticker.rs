//! Periodic re-evaluation of every tracked worker.

use crate::registry::WorkerRegistry;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

/// Owns the background tick task. Dropping the handle cancels the task.
#[derive(Debug)]
pub struct TickerHandle {
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl TickerHandle {
    /// Stop ticking and wait for the task to exit.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        let _ = (&mut self.task).await;
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}

impl Drop for TickerHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Spawn a task that calls [`WorkerRegistry::tick`] every `period`.
///
/// Must be called from within a tokio runtime.
pub fn spawn_ticker(registry: Arc<WorkerRegistry>, period: Duration) -> TickerHandle {
    let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();

    let task = tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tracing::debug!(
            target: "agentwatch::presence::tick",
            "Presence ticker started ({}ms)",
            period.as_millis()
        );

        loop {
            tokio::select! {
                _ = interval.tick() => {
                    registry.tick();
                }
                _ = &mut shutdown_rx => {
                    break;
                }
            }
        }

        tracing::debug!(target: "agentwatch::presence::tick", "Presence ticker stopped");
    });

    TickerHandle {
        shutdown_tx: Some(shutdown_tx),
        task,
    }
}
