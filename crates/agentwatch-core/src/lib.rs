//! Log classification and activity presence tracking for agentwatch.

mod ansi;
mod clock;
mod error;
mod extractor;
mod narrative;
mod presence;
mod registry;
mod rules;
mod ticker;

pub use ansi::{normalize_line, strip_ansi_codes};
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::AgentwatchError;
pub use extractor::ActivityExtractor;
pub use narrative::{NarrativeHeuristic, NarrativeThresholds};
pub use presence::{PresenceConfig, PresenceInputs, PresenceMachine};
pub use registry::{PresenceEvent, RegistryConfig, WorkerRegistry};
pub use rules::{Extract, PatternRule, RuleTable};
pub use ticker::{spawn_ticker, TickerHandle};

/// Result type for agentwatch operations.
pub type Result<T> = std::result::Result<T, AgentwatchError>;
