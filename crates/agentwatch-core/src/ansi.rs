//! Line normalization ahead of classification.

use once_cell::sync::Lazy;
use regex::Regex;

/// ANSI escape sequences a worker may emit when it believes it is on a TTY.
/// Matches:
/// - CSI sequences: ESC [ ... letter (colors, cursor, etc.)
/// - OSC sequences: ESC ] ... BEL or ESC \ (window title, hyperlinks)
/// - Character set: ESC ( or ESC ) followed by character
/// - Other escapes: ESC = ESC > ESC M etc.
static ANSI_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(concat!(
        r"\x1b\[[0-9;?]*[A-Za-z]",
        r"|\x1b\][^\x07]*\x07",
        r"|\x1b\][^\x1b]*\x1b\\",
        r"|\x1b[()][A-Z0-9]",
        r"|\x1b[=>MNOP78]",
        r"|\x1b",
    )).unwrap()
});

/// Strip ANSI escape codes from text.
pub fn strip_ansi_codes(text: &str) -> String {
    ANSI_REGEX.replace_all(text, "").into_owned()
}

/// Strip escape codes and surrounding whitespace. Returns `None` for blank lines.
pub fn normalize_line(text: &str) -> Option<String> {
    let stripped = if text.contains('\x1b') {
        strip_ansi_codes(text)
    } else {
        text.to_string()
    };
    let trimmed = stripped.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
