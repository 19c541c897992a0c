//! String sanitization utilities
//!
//! Character-level cleanup shared by the prompt sanitizer.

use super::SanitizeResult;
use lazy_static::lazy_static;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

lazy_static! {
    static ref EXCESS_WHITESPACE_REGEX: Regex = Regex::new(r"\s{3,}").unwrap();
}

/// Invisible format characters that can hide payloads from a reader.
fn is_invisible_format_char(c: char) -> bool {
    matches!(c, '\u{200B}'..='\u{200F}' | '\u{202A}'..='\u{202E}' | '\u{2060}'..='\u{2064}' | '\u{FEFF}')
}

/// Remove control and invisible characters, keeping newlines, carriage returns and tabs
pub fn remove_control_chars(input: &str) -> SanitizeResult<String> {
    let sanitized: String = input
        .chars()
        .filter(|&c| {
            matches!(c, '\n' | '\r' | '\t') || !(c.is_control() || is_invisible_format_char(c))
        })
        .collect();

    if sanitized == input {
        SanitizeResult::unmodified(sanitized)
    } else {
        SanitizeResult::modified(sanitized, Some("Removed control characters".to_string()))
    }
}

/// Normalize Unicode text (NFC form)
pub fn normalize_unicode(input: &str) -> SanitizeResult<String> {
    let normalized = input.nfc().collect::<String>();

    if normalized == input {
        SanitizeResult::unmodified(normalized)
    } else {
        SanitizeResult::modified(normalized, Some("Normalized Unicode characters".to_string()))
    }
}

/// Collapse runs of three or more whitespace characters into two spaces
pub fn collapse_whitespace(input: &str) -> SanitizeResult<String> {
    let collapsed = EXCESS_WHITESPACE_REGEX.replace_all(input, "  ").to_string();

    if collapsed == input {
        SanitizeResult::unmodified(collapsed)
    } else {
        SanitizeResult::modified(collapsed, Some("Collapsed whitespace".to_string()))
    }
}

/// Trim whitespace from beginning and end
pub fn trim_whitespace(input: &str) -> SanitizeResult<String> {
    let trimmed = input.trim().to_string();

    if trimmed == input {
        SanitizeResult::unmodified(trimmed)
    } else {
        SanitizeResult::modified(trimmed, Some("Trimmed whitespace".to_string()))
    }
}

/// Cut `input` to at most `max_chars` characters, reserving room for a marker
/// that records how many characters were dropped.
pub fn truncate_with_marker(input: &str, max_chars: usize) -> SanitizeResult<String> {
    let total = input.chars().count();
    if total <= max_chars {
        return SanitizeResult::unmodified(input.to_string());
    }

    let kept = max_chars.saturating_sub(100);
    let head: String = input.chars().take(kept).collect();
    let dropped = total - kept;
    SanitizeResult::modified(
        format!("{}... [truncated {} chars]", head, dropped),
        Some(format!("Truncated {} characters", dropped)),
    )
}
