//! Ordered pattern rules for classifying worker log lines.
//!
//! Rules are evaluated top to bottom and the first match wins, so the table
//! order is the precedence order. Every rule carries a stable name so tests
//! and debug logging can point at the exact rule that fired.

use agentwatch_types::{ActivityKind, ActivityRecord};
use once_cell::sync::Lazy;
use regex::Regex;

/// How a matching rule turns the line into a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extract {
    /// Always report the same canonical message.
    Fixed(&'static str),
    /// Report the (normalized) line as-is.
    Verbatim,
    /// Report the tool named by the `name` capture group.
    ToolName,
}

/// A single classification rule.
#[derive(Debug, Clone)]
pub struct PatternRule {
    pub name: &'static str,
    pub pattern: Regex,
    pub kind: ActivityKind,
    pub extract: Extract,
}

impl PatternRule {
    fn new(name: &'static str, pattern: &str, kind: ActivityKind, extract: Extract) -> Self {
        Self {
            name,
            pattern: Regex::new(pattern).unwrap(),
            kind,
            extract,
        }
    }

    /// Apply this rule to a normalized line.
    pub fn apply(&self, line: &str) -> Option<ActivityRecord> {
        let caps = self.pattern.captures(line)?;
        match self.extract {
            Extract::Fixed(message) => Some(ActivityRecord::new(self.kind, message)),
            Extract::Verbatim => Some(ActivityRecord::new(self.kind, line)),
            Extract::ToolName => {
                let name = caps.name("name")?.as_str().trim();
                if name.is_empty() {
                    return None;
                }
                Some(ActivityRecord::tool_use(name))
            }
        }
    }
}

static STANDARD_RULES: Lazy<RuleTable> = Lazy::new(|| {
    RuleTable::new(vec![
        PatternRule::new(
            "sending_prompt",
            r"(?i)^sending prompt to\b",
            ActivityKind::Sending,
            Extract::Fixed("Sending prompt to agent..."),
        ),
        PatternRule::new(
            "auto_continue",
            r"(?i)^agent will auto-continue",
            ActivityKind::Processing,
            Extract::Verbatim,
        ),
        PatternRule::new(
            "initializer",
            r"(?i)^(?:fresh start|starting (?:initializer|fresh)|running initializer|initializer agent)\b",
            ActivityKind::Thinking,
            Extract::Fixed("Starting initializer..."),
        ),
        PatternRule::new(
            "continuing_project",
            r"(?i)^continuing existing project",
            ActivityKind::Thinking,
            Extract::Fixed("Continuing existing project..."),
        ),
        PatternRule::new(
            "session_complete",
            r"(?i)^session complete",
            ActivityKind::Complete,
            Extract::Fixed("Session complete"),
        ),
        PatternRule::new(
            "turn_limit",
            r"(?i)(?:(?:reached|hit)\s+(?:the\s+)?(?:max(?:imum)?\s+)?turn[\s-]?limit|max(?:imum)?[\s_-]?turns\s+reached)",
            ActivityKind::Processing,
            Extract::Fixed("Reached turn limit..."),
        ),
        PatternRule::new(
            "tool_use",
            r"(?i)^\[tool:\s*(?P<name>[^\]]+?)\s*\]",
            ActivityKind::ToolUse,
            Extract::ToolName,
        ),
        PatternRule::new(
            "action_verb",
            r"(?i)^(?:processing|analyzing|reading|writing|creating|updating|checking)\b",
            ActivityKind::Processing,
            Extract::Verbatim,
        ),
        PatternRule::new(
            "first_person",
            r"(?i)^(?:(?:i'll|i will|let me|now i)\b|first,|next,)",
            ActivityKind::Thinking,
            Extract::Verbatim,
        ),
    ])
});

/// An ordered list of classification rules.
#[derive(Debug, Clone)]
pub struct RuleTable {
    rules: Vec<PatternRule>,
}

impl RuleTable {
    pub fn new(rules: Vec<PatternRule>) -> Self {
        Self { rules }
    }

    /// The built-in rule table for autonomous coding-agent logs.
    pub fn standard() -> &'static RuleTable {
        &STANDARD_RULES
    }

    pub fn rules(&self) -> &[PatternRule] {
        &self.rules
    }

    /// Look up a rule by name.
    pub fn rule(&self, name: &str) -> Option<&PatternRule> {
        self.rules.iter().find(|r| r.name == name)
    }

    /// First rule (in table order) that produces a record for `line`.
    pub fn first_match(&self, line: &str) -> Option<(&PatternRule, ActivityRecord)> {
        self.rules
            .iter()
            .find_map(|rule| rule.apply(line).map(|record| (rule, record)))
    }

    /// Classify a normalized line.
    pub fn classify(&self, line: &str) -> Option<ActivityRecord> {
        let (rule, record) = self.first_match(line)?;
        tracing::trace!(
            target: "agentwatch::classifier",
            "Rule '{}' matched: {:?}",
            rule.name,
            record.kind
        );
        Some(record)
    }
}

impl Default for RuleTable {
    fn default() -> Self {
        Self::standard().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matched_rule(line: &str) -> Option<&'static str> {
        RuleTable::standard().first_match(line).map(|(rule, _)| rule.name)
    }

    #[test]
    fn test_rule_order_is_fixed() {
        let names: Vec<_> = RuleTable::standard().rules().iter().map(|r| r.name).collect();
        assert_eq!(
            names,
            vec![
                "sending_prompt",
                "auto_continue",
                "initializer",
                "continuing_project",
                "session_complete",
                "turn_limit",
                "tool_use",
                "action_verb",
                "first_person",
            ]
        );
    }

    #[test]
    fn test_sending_prompt() {
        let record = RuleTable::standard()
            .classify("Sending prompt to Claude Agent SDK")
            .unwrap();
        assert_eq!(record.kind, ActivityKind::Sending);
        assert_eq!(record.message, "Sending prompt to agent...");
        assert!(record.tool_name.is_none());
    }

    #[test]
    fn test_auto_continue_is_verbatim() {
        let line = "Agent will auto-continue in 3s...";
        let record = RuleTable::standard().classify(line).unwrap();
        assert_eq!(record.kind, ActivityKind::Processing);
        assert_eq!(record.message, line);
    }

    #[test]
    fn test_initializer_variants() {
        for line in [
            "Fresh start - will use initializer agent",
            "Starting initializer agent",
            "starting fresh session",
            "Running initializer",
        ] {
            let record = RuleTable::standard().classify(line).unwrap();
            assert_eq!(record.kind, ActivityKind::Thinking, "{}", line);
            assert_eq!(record.message, "Starting initializer...", "{}", line);
        }
    }

    #[test]
    fn test_continuing_project() {
        let record = RuleTable::standard()
            .classify("Continuing existing project at ./generations/app")
            .unwrap();
        assert_eq!(record.kind, ActivityKind::Thinking);
        assert_eq!(record.message, "Continuing existing project...");
    }

    #[test]
    fn test_session_complete_case_insensitive() {
        for line in ["SESSION COMPLETE", "Session complete - 12 features passing"] {
            let record = RuleTable::standard().classify(line).unwrap();
            assert_eq!(record.kind, ActivityKind::Complete);
            assert_eq!(record.message, "Session complete");
        }
    }

    #[test]
    fn test_turn_limit() {
        for line in [
            "Reached turn limit (50), continuing",
            "Agent hit the max turn limit",
            "max_turns reached for this session",
        ] {
            let record = RuleTable::standard().classify(line).unwrap();
            assert_eq!(record.kind, ActivityKind::Processing, "{}", line);
            assert_eq!(record.message, "Reached turn limit...", "{}", line);
        }
    }

    #[test]
    fn test_tool_use_extracts_name() {
        let record = RuleTable::standard().classify("[Tool: Bash]").unwrap();
        assert_eq!(record.kind, ActivityKind::ToolUse);
        assert_eq!(record.tool_name.as_deref(), Some("Bash"));
        assert_eq!(record.message, "Using tool: Bash");

        let record = RuleTable::standard()
            .classify("[Tool: mcp__puppeteer__navigate] {\"url\": \"x\"}")
            .unwrap();
        assert_eq!(record.tool_name.as_deref(), Some("mcp__puppeteer__navigate"));
    }

    #[test]
    fn test_tool_use_requires_name() {
        assert_eq!(matched_rule("[Tool: ]"), None);
        assert_eq!(matched_rule("[Tool:]"), None);
    }

    #[test]
    fn test_action_verbs() {
        for verb in ["Processing", "Analyzing", "Reading", "Writing", "Creating", "Updating", "Checking"] {
            let line = format!("{} the feature list", verb);
            let record = RuleTable::standard().classify(&line).unwrap();
            assert_eq!(record.kind, ActivityKind::Processing);
            assert_eq!(record.message, line);
        }
        // Word boundary: "Readings" is not "Reading"
        assert_eq!(matched_rule("Readings are inconsistent"), None);
    }

    #[test]
    fn test_first_person_openers() {
        for line in [
            "I'll start by reading the spec",
            "I will now run the tests",
            "Let me check the server logs",
            "Now I need to fix the login form",
            "First, verify the build",
            "Next, update the README",
        ] {
            let record = RuleTable::standard().classify(line).unwrap();
            assert_eq!(record.kind, ActivityKind::Thinking, "{}", line);
            assert_eq!(record.message, line);
        }
        assert_eq!(matched_rule("Nowhere to go"), None);
        assert_eq!(matched_rule("Illustrating the layout"), None);
    }

    #[test]
    fn test_earlier_rule_wins() {
        // Both turn_limit and action_verb could apply.
        assert_eq!(
            matched_rule("Checking whether we reached the turn limit"),
            Some("turn_limit")
        );
        // Both sending_prompt and nothing else anchored; verbs appear later in the line.
        assert_eq!(
            matched_rule("Sending prompt to agent, reading files next"),
            Some("sending_prompt")
        );
    }

    #[test]
    fn test_rules_anchor_at_line_start() {
        assert_eq!(matched_rule("The SESSION COMPLETE banner"), None);
        assert_eq!(matched_rule("output: [Tool: Bash]"), None);
    }

    #[test]
    fn test_custom_table() {
        let table = RuleTable::new(vec![PatternRule::new(
            "done",
            r"^DONE$",
            ActivityKind::Complete,
            Extract::Fixed("Finished"),
        )]);
        assert_eq!(table.classify("DONE").unwrap().message, "Finished");
        assert!(table.classify("[Tool: Bash]").is_none());
        assert!(table.rule("done").is_some());
    }
}
