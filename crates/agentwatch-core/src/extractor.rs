//! Most-recent-activity extraction over a log sequence.

use crate::ansi::normalize_line;
use crate::narrative::{NarrativeHeuristic, NarrativeThresholds};
use crate::rules::RuleTable;
use agentwatch_types::{ActivityRecord, LogEntry};

/// Composes the rule table and the narrative fallback.
///
/// Classification is a pure function of a line's text; the extractor holds no
/// state between calls.
#[derive(Debug, Clone)]
pub struct ActivityExtractor {
    rules: RuleTable,
    narrative: NarrativeHeuristic,
}

impl Default for ActivityExtractor {
    fn default() -> Self {
        Self::new(NarrativeThresholds::default())
    }
}

impl ActivityExtractor {
    /// Extractor over the standard rule table.
    pub fn new(thresholds: NarrativeThresholds) -> Self {
        Self::with_rules(RuleTable::standard().clone(), thresholds)
    }

    pub fn with_rules(rules: RuleTable, thresholds: NarrativeThresholds) -> Self {
        Self {
            rules,
            narrative: NarrativeHeuristic::new(thresholds),
        }
    }

    pub fn rules(&self) -> &RuleTable {
        &self.rules
    }

    /// Classify a single raw line: rules first, then the narrative fallback.
    pub fn classify_line(&self, text: &str) -> Option<ActivityRecord> {
        let line = normalize_line(text)?;
        self.rules
            .classify(&line)
            .or_else(|| self.narrative.classify(&line))
    }

    /// Most recent classifiable activity, scanning newest to oldest.
    ///
    /// Unclassifiable lines are skipped rather than ending the scan.
    pub fn extract(&self, entries: &[LogEntry]) -> Option<ActivityRecord> {
        entries
            .iter()
            .rev()
            .find_map(|entry| self.classify_line(&entry.text))
    }
}
