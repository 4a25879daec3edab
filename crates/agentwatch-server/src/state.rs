//! Shared application state.

use crate::config::Config;
use agentwatch_core::{ActivityExtractor, Clock, PresenceMachine, SystemClock, WorkerRegistry};
use std::sync::Arc;

/// Shared application state.
pub struct AppState {
    pub registry: Arc<WorkerRegistry>,
    pub config: Config,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self::with_clock(config, Arc::new(SystemClock))
    }

    /// Build the registry from `config`'s narrative, presence and registry
    /// sections, evaluating against `clock`.
    pub fn with_clock(config: Config, clock: Arc<dyn Clock>) -> Self {
        let machine = PresenceMachine::new(ActivityExtractor::new(config.narrative), config.presence);
        let registry = Arc::new(WorkerRegistry::with_clock(
            machine,
            config.registry_config(),
            clock,
        ));
        Self { registry, config }
    }
}
