//! Terminal output sanitization
//!
//! Titles, previews and reasons printed by the CLI come straight from log
//! content, which can carry ANSI escape sequences. Anything user-controlled
//! goes through [`sanitize_for_terminal`] before it reaches stdout.

use once_cell::sync::Lazy;
use regex::Regex;

static CSI_SEQUENCE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\x1b\[[0-9;?]*[A-Za-z]").expect("Valid CSI regex"));

/// Strips ANSI CSI sequences and control characters other than tab, newline
/// and carriage return.
///
/// # Examples
///
/// ```
/// use knowledge_sync::utils::terminal::sanitize_for_terminal;
///
/// assert_eq!(sanitize_for_terminal("\x1b[31mRed\x1b[0m text"), "Red text");
/// ```
pub fn sanitize_for_terminal(text: &str) -> String {
    CSI_SEQUENCE
        .replace_all(text, "")
        .chars()
        .filter(|&ch| !ch.is_control() || matches!(ch, '\t' | '\n' | '\r'))
        .collect()
}

/// Sanitized single-line rendering for progress and summary output
pub fn display_line(text: &str) -> String {
    sanitize_for_terminal(text).split_whitespace().collect::<Vec<_>>().join(" ")
}
