//! Activity classification results.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Semantic bucket a log line can classify into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivityKind {
    /// A prompt is being handed to the agent runtime.
    Sending,
    /// The worker is busy with mechanical work (reading, writing, continuing).
    Processing,
    /// The worker is planning or narrating its next step.
    Thinking,
    /// A tool invocation marker was seen.
    ToolUse,
    /// The session finished.
    Complete,
    /// Free-text reasoning that matched no explicit rule.
    Narrative,
}

impl ActivityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActivityKind::Sending => "sending",
            ActivityKind::Processing => "processing",
            ActivityKind::Thinking => "thinking",
            ActivityKind::ToolUse => "tool_use",
            ActivityKind::Complete => "complete",
            ActivityKind::Narrative => "narrative",
        }
    }
}

impl fmt::Display for ActivityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single classified activity.
///
/// `tool_name` is only ever set for [`ActivityKind::ToolUse`]; use the
/// constructors rather than building the struct by hand.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActivityRecord {
    pub kind: ActivityKind,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_name: Option<String>,
}

impl ActivityRecord {
    /// Create a record for any kind other than tool use.
    pub fn new(kind: ActivityKind, message: impl Into<String>) -> Self {
        debug_assert!(kind != ActivityKind::ToolUse, "use ActivityRecord::tool_use");
        Self {
            kind,
            message: message.into(),
            tool_name: None,
        }
    }

    /// Create a tool-use record; the message is derived from the tool name.
    pub fn tool_use(tool_name: impl Into<String>) -> Self {
        let tool_name = tool_name.into();
        Self {
            kind: ActivityKind::ToolUse,
            message: format!("Using tool: {}", tool_name),
            tool_name: Some(tool_name),
        }
    }
}
