//! Prompt-injection sanitizers
//!
//! Untrusted text is embedded in prompts between a small set of structural
//! tags. Everything else that looks like markup is escaped, and known
//! injection phrasings are redacted in place rather than rejected.

use super::string::{
    collapse_whitespace, normalize_unicode, remove_control_chars, trim_whitespace,
    truncate_with_marker,
};
use super::{chain_sanitizers, SanitizeResult, StringSanitizer};
use lazy_static::lazy_static;
use regex::{Regex, RegexBuilder};

/// Replacement for a redacted injection attempt
pub const REDACTION_MARKER: &str = "[REDACTED_INJECTION_ATTEMPT]";

/// Replacement for an opening bracket that has no closing counterpart
pub const UNMATCHED_TAG_MARKER: &str = "[UNMATCHED_TAG]";

/// Structural tags the prompt templates use; these survive sanitization.
pub const WHITELISTED_TAGS: [&str; 8] = [
    "user_excuse",
    "historical_context",
    "current_status",
    "conversation_log",
    "promised_tasks",
    "actual_work_done",
    "human_claims",
    "technical_evidence",
];

const INJECTION_PATTERNS: [&str; 8] = [
    r"ignore\s+(all\s+)?(previous|prior|above)\s+instructions",
    r"disregard\s+(all\s+)?(previous|prior|above)\s+(instructions|rules)",
    r"forget\s+(everything|all)\s+(above|before)",
    r"system\s*:\s*",
    r"<\s*system\s*>",
    r"</\s*system\s*>",
    r"\[INST\]",
    r"\[/INST\]",
];

lazy_static! {
    static ref INJECTION_REGEXES: Vec<Regex> = INJECTION_PATTERNS
        .iter()
        .map(|p| RegexBuilder::new(p).case_insensitive(true).build().unwrap())
        .collect();
    static ref EMAIL_REGEX: Regex =
        Regex::new(r"[A-Za-z0-9._%+\-]+@[A-Za-z0-9.\-]+\.[A-Za-z]{2,}").unwrap();
    static ref CHAT_MENTION_REGEX: Regex = Regex::new(r"<@U[A-Z0-9]+>").unwrap();
}

/// Replace every known injection phrasing with the redaction marker
pub fn redact_injection_attempts(input: &str) -> SanitizeResult<String> {
    let mut sanitized = input.to_string();
    let mut hits = 0usize;

    for regex in INJECTION_REGEXES.iter() {
        let count = regex.find_iter(&sanitized).count();
        if count > 0 {
            hits += count;
            sanitized = regex.replace_all(&sanitized, REDACTION_MARKER).into_owned();
        }
    }

    if hits == 0 {
        SanitizeResult::unmodified(sanitized)
    } else {
        log::warn!("Redacted {} prompt injection pattern(s) from input", hits);
        SanitizeResult::modified(sanitized, Some(format!("Redacted {} injection pattern(s)", hits)))
    }
}

/// Escape angle brackets, then restore only the whitelisted structural tags
pub fn escape_markup(input: &str) -> SanitizeResult<String> {
    if !input.contains('<') && !input.contains('>') {
        return SanitizeResult::unmodified(input.to_string());
    }

    let mut sanitized = input.replace('<', "&lt;").replace('>', "&gt;");
    for tag in WHITELISTED_TAGS {
        sanitized = sanitized
            .replace(&format!("&lt;{}&gt;", tag), &format!("<{}>", tag))
            .replace(&format!("&lt;/{}&gt;", tag), &format!("</{}>", tag));
    }

    if sanitized == input {
        SanitizeResult::unmodified(sanitized)
    } else {
        SanitizeResult::modified(sanitized, Some("Escaped markup".to_string()))
    }
}

/// Flag dangling opening brackets left over after escaping
pub fn flag_unmatched_tags(input: &str) -> SanitizeResult<String> {
    if input.contains("&lt;") && !input.contains("&gt;") {
        SanitizeResult::modified(
            input.replace("&lt;", UNMATCHED_TAG_MARKER),
            Some("Flagged unmatched tag".to_string()),
        )
    } else {
        SanitizeResult::unmodified(input.to_string())
    }
}

/// Full sanitization pipeline with a record of what changed
pub fn sanitize_prompt_input_detailed(input: &str) -> SanitizeResult<String> {
    if input.is_empty() {
        return SanitizeResult::unmodified(String::new());
    }

    let steps: Vec<StringSanitizer> = vec![
        |s: String| remove_control_chars(&s),
        |s: String| normalize_unicode(&s),
        |s: String| redact_injection_attempts(&s),
        |s: String| escape_markup(&s),
        |s: String| flag_unmatched_tags(&s),
        |s: String| collapse_whitespace(&s),
        |s: String| trim_whitespace(&s),
    ];
    chain_sanitizers(input.to_string(), steps)
}

/// Sanitize untrusted text before it is embedded in any prompt.
///
/// Control characters are stripped, text NFC-normalized, injection phrasings redacted, markup
/// escaped except for [`WHITELISTED_TAGS`], and excess whitespace collapsed.
pub fn sanitize_prompt_input(input: &str) -> String {
    sanitize_prompt_input_detailed(input).sanitized
}

/// Truncate text to `max_chars`, appending a `... [truncated N chars]` marker
pub fn truncate_text(input: &str, max_chars: usize) -> String {
    truncate_with_marker(input, max_chars).sanitized
}

/// Replace e-mail addresses and chat mention ids with placeholders
pub fn scrub_pii(input: &str) -> String {
    let without_email = EMAIL_REGEX.replace_all(input, "[EMAIL]");
    CHAT_MENTION_REGEX
        .replace_all(&without_email, "[SLACK_ID]")
        .into_owned()
}
