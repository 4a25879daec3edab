//! Fallback classification of free-text narration.
//!
//! Applied only when no pattern rule matched. The two thresholds form a dead
//! zone: lines shorter than `min_len` are rejected outright, and a line must be
//! longer than `accept_len` to be accepted, so fragments in between never
//! surface as narrative.

use agentwatch_types::{ActivityKind, ActivityRecord};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::Deserialize;

/// Payload dumps, result markers, separators and bare JSON/array openers.
static STRUCTURED_MARKER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:Input:\s*\{|Output:|\[Done\]|\[Error\]|-{10,}|[\[{])").unwrap()
});

/// Windows drive paths and lowercase absolute unix paths.
static PATH_LIKE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(?:[A-Za-z]:\\|/[a-z])").unwrap());

fn default_min_len() -> usize {
    15
}

fn default_accept_len() -> usize {
    20
}

/// Length cutoffs, in characters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct NarrativeThresholds {
    /// Lines shorter than this are rejected.
    #[serde(default = "default_min_len")]
    pub min_len: usize,
    /// Lines must be longer than this to be accepted.
    #[serde(default = "default_accept_len")]
    pub accept_len: usize,
}

impl Default for NarrativeThresholds {
    fn default() -> Self {
        Self {
            min_len: default_min_len(),
            accept_len: default_accept_len(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct NarrativeHeuristic {
    thresholds: NarrativeThresholds,
}

impl NarrativeHeuristic {
    pub fn new(thresholds: NarrativeThresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> NarrativeThresholds {
        self.thresholds
    }

    /// Whether a normalized line reads like a full sentence of narration.
    pub fn is_narrative(&self, line: &str) -> bool {
        if STRUCTURED_MARKER.is_match(line) || PATH_LIKE.is_match(line) {
            return false;
        }

        let len = line.chars().count();
        if len < self.thresholds.min_len {
            return false;
        }

        let starts_upper = line.chars().next().is_some_and(char::is_uppercase);
        starts_upper && len > self.thresholds.accept_len
    }

    /// Classify a normalized line as narrative, dropping any trailing colon.
    pub fn classify(&self, line: &str) -> Option<ActivityRecord> {
        if !self.is_narrative(line) {
            return None;
        }
        let message = line.trim_end_matches(':').trim_end();
        Some(ActivityRecord::new(ActivityKind::Narrative, message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn heuristic() -> NarrativeHeuristic {
        NarrativeHeuristic::default()
    }

    #[test]
    fn test_too_short_is_rejected() {
        let line = "Hello world!";
        assert_eq!(line.chars().count(), 12);
        assert!(heuristic().classify(line).is_none());
    }

    #[test]
    fn test_dead_zone_is_rejected() {
        let line = "Tests all passing.";
        assert_eq!(line.chars().count(), 18);
        assert!(heuristic().classify(line).is_none());

        // Exactly at the accept threshold is still rejected.
        let line = "Exactly twenty chars";
        assert_eq!(line.chars().count(), 20);
        assert!(!heuristic().is_narrative(line));
        assert!(heuristic().is_narrative("Exactly twenty chars!"));
    }

    #[test]
    fn test_sentence_is_accepted() {
        let line = "The server is now running";
        assert_eq!(line.chars().count(), 25);
        let record = heuristic().classify(line).unwrap();
        assert_eq!(record.kind, ActivityKind::Narrative);
        assert_eq!(record.message, line);
        assert!(record.tool_name.is_none());
    }

    #[test]
    fn test_trailing_colon_stripped() {
        let record = heuristic()
            .classify("Here is what the test run found:")
            .unwrap();
        assert_eq!(record.message, "Here is what the test run found");
    }

    #[test]
    fn test_lowercase_start_rejected() {
        assert!(!heuristic().is_narrative("the build is finishing up now, hold on"));
    }

    #[test]
    fn test_structured_markers_rejected() {
        for line in [
            "Input: {\"file_path\": \"/tmp/app/src/main.rs\"}",
            "Output: All forty two tests passed successfully",
            "[Done] Finished writing the feature list file",
            "[Error] Command failed with exit status one",
            "------------------------------------------",
            "{\"type\": \"result\", \"subtype\": \"success\"}",
            "[ Some bracketed caption that runs long ]",
        ] {
            assert!(!heuristic().is_narrative(line), "{}", line);
        }
    }

    #[test]
    fn test_paths_rejected() {
        assert!(!heuristic().is_narrative("C:\\Users\\Dev\\Projects\\app\\index.html"));
        assert!(!heuristic().is_narrative("/home/dev/projects/app/src/main.rs"));
    }

    #[test]
    fn test_custom_thresholds() {
        let loose = NarrativeHeuristic::new(NarrativeThresholds {
            min_len: 10,
            accept_len: 15,
        });
        let line = "Tests all passing.";
        assert!(loose.is_narrative(line));
        assert!(!heuristic().is_narrative(line));
    }

    #[test]
    fn test_thresholds_deserialize_with_defaults() {
        let t: NarrativeThresholds = serde_json::from_str(r#"{"min_len": 10}"#).unwrap();
        assert_eq!(t.min_len, 10);
        assert_eq!(t.accept_len, 20);
    }
}
