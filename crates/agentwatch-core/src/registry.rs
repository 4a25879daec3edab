//! Per-worker log windows and presence state.
//!
//! Every mutation runs one synchronous evaluation for the affected worker while
//! its map entry is held, so evaluations for the same worker never interleave.
//! Changes are broadcast to subscribers (dashboard WebSockets).

use crate::clock::{Clock, SystemClock};
use crate::presence::{PresenceInputs, PresenceMachine};
use crate::{AgentwatchError, Result};
use agentwatch_types::{LogEntry, PresenceState, PresenceView, RunState, WorkerSummary};
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::Deserialize;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use tokio::sync::broadcast;
use uuid::Uuid;

fn default_max_workers() -> usize {
    32
}

fn default_max_log_entries() -> usize {
    2000
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct RegistryConfig {
    #[serde(default = "default_max_workers")]
    pub max_workers: usize,
    /// Log entries retained per worker; oldest are evicted first.
    #[serde(default = "default_max_log_entries")]
    pub max_log_entries: usize,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            max_workers: default_max_workers(),
            max_log_entries: default_max_log_entries(),
        }
    }
}

/// Events broadcast when a worker's displayed presence changes.
#[derive(Debug, Clone, PartialEq)]
pub enum PresenceEvent {
    Updated {
        worker_id: Uuid,
        run_state: RunState,
        view: PresenceView,
    },
    Removed {
        worker_id: Uuid,
    },
}

#[derive(Debug)]
struct WorkerSlot {
    entries: VecDeque<LogEntry>,
    run_state: RunState,
    presence: PresenceState,
}

impl WorkerSlot {
    fn new(run_state: RunState) -> Self {
        Self {
            entries: VecDeque::new(),
            run_state,
            presence: PresenceState::default(),
        }
    }

    fn last_entry_at(&self) -> Option<DateTime<Utc>> {
        self.entries.back().map(LogEntry::observed_at_or_epoch)
    }

    fn summary(&self, worker_id: Uuid) -> WorkerSummary {
        WorkerSummary {
            worker_id,
            run_state: self.run_state,
            log_len: self.entries.len(),
            view: self.presence.view(),
        }
    }
}

pub struct WorkerRegistry {
    workers: DashMap<Uuid, WorkerSlot>,
    machine: PresenceMachine,
    config: RegistryConfig,
    clock: Arc<dyn Clock>,
    event_tx: broadcast::Sender<PresenceEvent>,
    /// Serializes the capacity check with the insert in `register`.
    admission: Mutex<()>,
}

impl WorkerRegistry {
    pub fn new(machine: PresenceMachine, config: RegistryConfig) -> Self {
        Self::with_clock(machine, config, Arc::new(SystemClock))
    }

    pub fn with_clock(machine: PresenceMachine, config: RegistryConfig, clock: Arc<dyn Clock>) -> Self {
        let (event_tx, _) = broadcast::channel(256);
        Self {
            workers: DashMap::new(),
            machine,
            config,
            clock,
            event_tx,
            admission: Mutex::new(()),
        }
    }

    /// Subscribe to presence events.
    pub fn subscribe(&self) -> broadcast::Receiver<PresenceEvent> {
        self.event_tx.subscribe()
    }

    pub fn machine(&self) -> &PresenceMachine {
        &self.machine
    }

    /// Current time as seen by presence evaluation.
    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn len(&self) -> usize {
        self.workers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }

    /// Start tracking a worker. A fresh worker has nothing latched and is hidden.
    pub fn register(&self, worker_id: Uuid, run_state: RunState) -> Result<WorkerSummary> {
        // Removals only shrink the map, so holding this across check and
        // insert is enough to keep concurrent registrations under the limit.
        let _admission = self.admission.lock().unwrap_or_else(|e| e.into_inner());
        if self.workers.len() >= self.config.max_workers {
            return Err(AgentwatchError::WorkerLimitExceeded(self.config.max_workers));
        }

        match self.workers.entry(worker_id) {
            dashmap::mapref::entry::Entry::Occupied(_) => {
                Err(AgentwatchError::WorkerAlreadyExists(worker_id))
            }
            dashmap::mapref::entry::Entry::Vacant(vacant) => {
                let slot = vacant.insert(WorkerSlot::new(run_state));
                tracing::info!(
                    target: "agentwatch::workers",
                    "Registered worker {} ({})",
                    worker_id,
                    run_state
                );
                Ok(slot.summary(worker_id))
            }
        }
    }

    /// Stop tracking a worker.
    pub fn unregister(&self, worker_id: Uuid) -> Result<()> {
        self.workers
            .remove(&worker_id)
            .ok_or(AgentwatchError::WorkerNotFound(worker_id))?;
        tracing::info!(target: "agentwatch::workers", "Unregistered worker {}", worker_id);
        let _ = self.event_tx.send(PresenceEvent::Removed { worker_id });
        Ok(())
    }

    /// Append a batch of log entries and re-evaluate.
    pub fn append_logs(&self, worker_id: Uuid, batch: Vec<LogEntry>) -> Result<PresenceView> {
        let mut slot = self
            .workers
            .get_mut(&worker_id)
            .ok_or(AgentwatchError::WorkerNotFound(worker_id))?;

        // The latch already holds the newest match among older entries, so
        // classifying just the new batch is equivalent to rescanning the window.
        let activity = self.machine.extractor().extract(&batch);

        let appended = batch.len();
        slot.entries.extend(batch);
        let mut evicted = 0usize;
        while slot.entries.len() > self.config.max_log_entries {
            slot.entries.pop_front();
            evicted += 1;
        }

        tracing::trace!(
            target: "agentwatch::workers",
            "Worker {}: appended {} entries (evicted {}), matched={:?}",
            worker_id,
            appended,
            evicted,
            activity.as_ref().map(|a| a.kind)
        );

        let inputs = PresenceInputs {
            activity,
            run_state: slot.run_state,
            last_entry_at: slot.last_entry_at(),
            now: self.clock.now(),
        };
        Ok(self.apply(worker_id, &mut slot, inputs, false))
    }

    /// Record a run-state change from the orchestration layer and re-evaluate.
    pub fn set_run_state(&self, worker_id: Uuid, run_state: RunState) -> Result<PresenceView> {
        let mut slot = self
            .workers
            .get_mut(&worker_id)
            .ok_or(AgentwatchError::WorkerNotFound(worker_id))?;

        let changed = slot.run_state != run_state;
        if changed {
            tracing::info!(
                target: "agentwatch::workers",
                "Worker {} run state {} -> {}",
                worker_id,
                slot.run_state,
                run_state
            );
            slot.run_state = run_state;
        }

        let inputs = self.idle_inputs(&slot);
        Ok(self.apply(worker_id, &mut slot, inputs, changed))
    }

    pub fn view(&self, worker_id: Uuid) -> Result<PresenceView> {
        self.workers
            .get(&worker_id)
            .map(|slot| slot.presence.view())
            .ok_or(AgentwatchError::WorkerNotFound(worker_id))
    }

    pub fn summary(&self, worker_id: Uuid) -> Result<WorkerSummary> {
        self.workers
            .get(&worker_id)
            .map(|slot| slot.summary(worker_id))
            .ok_or(AgentwatchError::WorkerNotFound(worker_id))
    }

    /// All tracked workers, ordered by id.
    pub fn list(&self) -> Vec<WorkerSummary> {
        let mut summaries: Vec<_> = self
            .workers
            .iter()
            .map(|entry| entry.value().summary(*entry.key()))
            .collect();
        summaries.sort_by_key(|s| s.worker_id);
        summaries
    }

    /// Re-evaluate every worker against the current time.
    ///
    /// Needed because a paused worker goes hidden purely by elapsed time.
    /// Returns the number of workers whose view changed.
    pub fn tick(&self) -> usize {
        let mut changed = 0;
        for mut entry in self.workers.iter_mut() {
            let worker_id = *entry.key();
            let slot = entry.value_mut();
            let before = slot.presence.view();
            let inputs = self.idle_inputs(slot);
            if self.apply(worker_id, slot, inputs, false) != before {
                changed += 1;
            }
        }
        if changed > 0 {
            tracing::debug!(target: "agentwatch::presence::tick", "Tick changed {} worker(s)", changed);
        }
        changed
    }

    /// Inputs for an evaluation with no new log data.
    fn idle_inputs(&self, slot: &WorkerSlot) -> PresenceInputs {
        PresenceInputs {
            activity: None,
            run_state: slot.run_state,
            last_entry_at: slot.last_entry_at(),
            now: self.clock.now(),
        }
    }

    /// Reduce and store the next state, broadcasting when the presence or
    /// (per `run_state_changed`) the run state differs from before.
    fn apply(
        &self,
        worker_id: Uuid,
        slot: &mut WorkerSlot,
        inputs: PresenceInputs,
        run_state_changed: bool,
    ) -> PresenceView {
        let run_state = inputs.run_state;
        let next = self.machine.reduce(&slot.presence, inputs);
        let view = next.view();
        if run_state_changed || next != slot.presence {
            slot.presence = next;
            let _ = self.event_tx.send(PresenceEvent::Updated {
                worker_id,
                run_state,
                view: view.clone(),
            });
        }
        view
    }
}
