//! Latched, idle-aware presence state machine.
//!
//! The machine is level-sensitive: every evaluation recomputes visibility from
//! the current run state, the clock and the last entry's timestamp. The only
//! value carried between evaluations is the latched activity, which is replaced
//! when the extractor finds a newer match and otherwise left alone.

use crate::extractor::ActivityExtractor;
use agentwatch_types::{ActivityRecord, LogEntry, PresenceState, RunState};
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;

fn default_idle_timeout_ms() -> u64 {
    30_000
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct PresenceConfig {
    /// How long a paused worker's last activity stays visible after its last
    /// log entry.
    #[serde(default = "default_idle_timeout_ms")]
    pub idle_timeout_ms: u64,
}

impl Default for PresenceConfig {
    fn default() -> Self {
        Self {
            idle_timeout_ms: default_idle_timeout_ms(),
        }
    }
}

impl PresenceConfig {
    pub fn idle_timeout(&self) -> Duration {
        Duration::milliseconds(i64::try_from(self.idle_timeout_ms).unwrap_or(i64::MAX))
    }
}

/// Everything one evaluation depends on besides the previous state.
#[derive(Debug, Clone)]
pub struct PresenceInputs {
    /// Extractor result for the current log; `None` keeps the latch.
    pub activity: Option<ActivityRecord>,
    pub run_state: RunState,
    /// Timestamp of the most recent entry; `None` counts as the epoch.
    pub last_entry_at: Option<DateTime<Utc>>,
    pub now: DateTime<Utc>,
}

#[derive(Debug, Clone, Default)]
pub struct PresenceMachine {
    extractor: ActivityExtractor,
    config: PresenceConfig,
}

impl PresenceMachine {
    pub fn new(extractor: ActivityExtractor, config: PresenceConfig) -> Self {
        Self { extractor, config }
    }

    pub fn extractor(&self) -> &ActivityExtractor {
        &self.extractor
    }

    pub fn config(&self) -> PresenceConfig {
        self.config
    }

    /// Extract from `entries` and reduce in one step.
    pub fn evaluate(
        &self,
        prev: &PresenceState,
        entries: &[LogEntry],
        run_state: RunState,
        now: DateTime<Utc>,
    ) -> PresenceState {
        let inputs = PresenceInputs {
            activity: self.extractor.extract(entries),
            run_state,
            last_entry_at: entries.last().map(LogEntry::observed_at_or_epoch),
            now,
        };
        self.reduce(prev, inputs)
    }

    /// Pure reducer: `(previous state, inputs) -> next state`.
    pub fn reduce(&self, prev: &PresenceState, inputs: PresenceInputs) -> PresenceState {
        let latched_activity = inputs.activity.or_else(|| prev.latched_activity.clone());

        let last_entry_at = inputs.last_entry_at.unwrap_or(DateTime::<Utc>::UNIX_EPOCH);
        let elapsed = (inputs.now - last_entry_at).max(Duration::zero());

        let visible = latched_activity.is_some()
            && match inputs.run_state {
                RunState::Running => true,
                RunState::Paused => elapsed <= self.config.idle_timeout(),
                RunState::Stopped | RunState::Crashed => false,
            };

        if visible != prev.visible {
            tracing::debug!(
                target: "agentwatch::presence",
                "Visibility {} -> {} (run_state={}, elapsed={}ms, latched={})",
                prev.visible,
                visible,
                inputs.run_state,
                elapsed.num_milliseconds(),
                latched_activity.is_some()
            );
        }

        PresenceState {
            latched_activity,
            visible,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agentwatch_types::ActivityKind;
    use chrono::TimeZone;

    fn t0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap()
    }

    fn ms(n: i64) -> Duration {
        Duration::milliseconds(n)
    }

    fn latched() -> PresenceState {
        PresenceState {
            latched_activity: Some(ActivityRecord::tool_use("Bash")),
            visible: true,
        }
    }

    fn inputs(run_state: RunState, elapsed_ms: i64) -> PresenceInputs {
        PresenceInputs {
            activity: None,
            run_state,
            last_entry_at: Some(t0()),
            now: t0() + ms(elapsed_ms),
        }
    }

    #[test]
    fn test_empty_log_stays_hidden() {
        let machine = PresenceMachine::default();
        for run_state in [RunState::Running, RunState::Paused] {
            let state = machine.evaluate(&PresenceState::default(), &[], run_state, t0());
            assert!(!state.visible);
            assert!(state.latched_activity.is_none());
        }
    }

    #[test]
    fn test_running_with_latch_is_visible() {
        let machine = PresenceMachine::default();
        let state = machine.reduce(&latched(), inputs(RunState::Running, 10 * 60 * 1000));
        assert!(state.visible);
    }

    #[test]
    fn test_paused_idle_timeout() {
        let machine = PresenceMachine::default();

        let state = machine.reduce(&latched(), inputs(RunState::Paused, 29_000));
        assert!(state.visible);

        let state = machine.reduce(&state, inputs(RunState::Paused, 31_000));
        assert!(!state.visible);
        assert_eq!(state.latched_activity, Some(ActivityRecord::tool_use("Bash")));

        // Back to running: the preserved activity reappears unchanged.
        let state = machine.reduce(&state, inputs(RunState::Running, 31_000));
        assert!(state.visible);
        assert_eq!(state.latched_activity, Some(ActivityRecord::tool_use("Bash")));
    }

    #[test]
    fn test_paused_exactly_at_timeout_is_visible() {
        let machine = PresenceMachine::default();
        assert!(machine.reduce(&latched(), inputs(RunState::Paused, 30_000)).visible);
        assert!(!machine.reduce(&latched(), inputs(RunState::Paused, 30_001)).visible);
    }

    #[test]
    fn test_stopped_and_crashed_always_hidden() {
        let machine = PresenceMachine::default();
        for run_state in [RunState::Stopped, RunState::Crashed] {
            let state = machine.reduce(&latched(), inputs(run_state, 0));
            assert!(!state.visible);
            assert!(state.latched_activity.is_some());
        }
    }

    #[test]
    fn test_unmatched_input_keeps_latch() {
        let machine = PresenceMachine::default();
        let log = vec![LogEntry::new("ok", t0())];
        let state = machine.evaluate(&latched(), &log, RunState::Running, t0());
        assert_eq!(state.latched_activity, Some(ActivityRecord::tool_use("Bash")));
        assert!(state.visible);
    }

    #[test]
    fn test_unmatched_input_on_fresh_state_stays_hidden() {
        let machine = PresenceMachine::default();
        let log = vec![LogEntry::new("ok", t0())];
        let state = machine.evaluate(&PresenceState::default(), &log, RunState::Running, t0());
        assert_eq!(state, PresenceState::default());
    }

    #[test]
    fn test_new_match_replaces_latch() {
        let machine = PresenceMachine::default();
        let log = vec![
            LogEntry::new("[Tool: Bash]", t0()),
            LogEntry::new("SESSION COMPLETE", t0() + ms(100)),
        ];
        let state = machine.evaluate(&latched(), &log, RunState::Running, t0() + ms(200));
        let activity = state.latched_activity.unwrap();
        assert_eq!(activity.kind, ActivityKind::Complete);
        assert_eq!(activity.message, "Session complete");
    }

    #[test]
    fn test_missing_timestamp_is_immediately_stale() {
        let machine = PresenceMachine::default();
        let log = vec![LogEntry {
            text: "[Tool: Edit]".to_string(),
            observed_at: None,
        }];
        let state = machine.evaluate(&PresenceState::default(), &log, RunState::Paused, t0());
        assert!(state.latched_activity.is_some());
        assert!(!state.visible);
    }

    #[test]
    fn test_clock_behind_entry_counts_as_fresh() {
        let machine = PresenceMachine::default();
        let state = machine.reduce(&latched(), inputs(RunState::Paused, -5_000));
        assert!(state.visible);
    }

    #[test]
    fn test_custom_idle_timeout() {
        let machine = PresenceMachine::new(
            ActivityExtractor::default(),
            PresenceConfig { idle_timeout_ms: 1_000 },
        );
        assert!(!machine.reduce(&latched(), inputs(RunState::Paused, 1_500)).visible);
    }
}
