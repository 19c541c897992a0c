//! Input sanitization utilities
//!
//! Sanitizers never reject input; they return a cleaned copy plus a note of
//! what was changed.

pub mod prompt;
pub mod string;

pub use prompt::*;
pub use string::*;

/// A single sanitization step over owned strings.
pub type StringSanitizer = fn(String) -> SanitizeResult<String>;

/// Sanitization result containing the sanitized content and information
/// about whether changes were made during sanitization
#[derive(Debug, Clone, PartialEq)]
pub struct SanitizeResult<T> {
    /// Sanitized content
    pub sanitized: T,
    /// Whether any changes were made during sanitization
    pub was_modified: bool,
    /// Optional details about what was modified
    pub details: Option<String>,
}

impl<T> SanitizeResult<T> {
    /// Create a result with unmodified content
    pub fn unmodified(content: T) -> Self {
        Self {
            sanitized: content,
            was_modified: false,
            details: None,
        }
    }

    /// Create a result with modified content
    pub fn modified(content: T, details: Option<String>) -> Self {
        Self {
            sanitized: content,
            was_modified: true,
            details,
        }
    }

    /// Map the sanitized content
    pub fn map<U, F>(self, f: F) -> SanitizeResult<U>
    where
        F: FnOnce(T) -> U,
    {
        SanitizeResult {
            sanitized: f(self.sanitized),
            was_modified: self.was_modified,
            details: self.details,
        }
    }
}

/// Run multiple sanitizers in sequence, joining the details of every step that changed the input
pub fn chain_sanitizers<T, F>(input: T, sanitizers: Vec<F>) -> SanitizeResult<T>
where
    F: FnOnce(T) -> SanitizeResult<T>,
{
    let mut result = SanitizeResult::unmodified(input);
    let mut all_details = Vec::new();

    for sanitizer in sanitizers {
        let current_result = sanitizer(result.sanitized);

        result.sanitized = current_result.sanitized;

        if current_result.was_modified {
            result.was_modified = true;
            if let Some(details) = current_result.details {
                all_details.push(details);
            }
        }
    }

    if !all_details.is_empty() {
        result.details = Some(all_details.join("; "));
    }

    result
}
