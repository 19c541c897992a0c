//! Field validators
//!
//! Checks applied to a check-in request before it enters the pipeline.

use crate::errors::{ValidationError, ValidationResult};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref LANGUAGE_CODE_REGEX: Regex = Regex::new(r"^[a-z]{2}(-[A-Z]{2})?$").unwrap();
    static ref USER_ID_REGEX: Regex = Regex::new(r"^[A-Za-z0-9_.@:\-]+$").unwrap();
}

/// Validate that a string is not empty after trimming
pub fn not_empty(field: &str, s: &str) -> ValidationResult<()> {
    if s.trim().is_empty() {
        Err(ValidationError::TooShort(format!("{} must not be empty", field)))
    } else {
        Ok(())
    }
}

/// Validate that a string does not exceed a maximum number of characters
pub fn max_length(field: &str, s: &str, max: usize) -> ValidationResult<()> {
    let len = s.chars().count();
    if len > max {
        Err(ValidationError::TooLong(format!(
            "{} length ({}) exceeds maximum length ({})",
            field, len, max
        )))
    } else {
        Ok(())
    }
}

/// Whether `code` looks like `en` or `en-UK`
pub fn is_language_code(code: &str) -> bool {
    LANGUAGE_CODE_REGEX.is_match(code)
}

/// Validate a language or locale code such as `de` or `pt-BR`
pub fn language_code(code: &str) -> ValidationResult<()> {
    if is_language_code(code) {
        Ok(())
    } else {
        Err(ValidationError::InvalidFormat(format!(
            "'{}' is not a language code (expected xx or xx-YY)",
            code
        )))
    }
}

/// Validate a user identifier
pub fn user_id(id: &str) -> ValidationResult<()> {
    not_empty("user_id", id)?;
    max_length("user_id", id, crate::DEFAULT_MAX_USER_ID_LENGTH)?;
    if USER_ID_REGEX.is_match(id) {
        Ok(())
    } else {
        Err(ValidationError::InvalidCharacters(format!(
            "user_id '{}' may only contain letters, digits and _.@:-",
            id
        )))
    }
}

/// Validate the fields of one check-in request, reporting every failure.
///
/// The check-in text itself has no upper bound here; over-long text is
/// truncated later rather than rejected.
pub fn check_in_fields(
    user: &str,
    commitment: &str,
    check_in: &str,
    lang: Option<&str>,
) -> ValidationResult<()> {
    let mut errors = Vec::new();

    if let Err(e) = user_id(user) {
        errors.push(e);
    }
    if let Err(e) = not_empty("commitment", commitment)
        .and_then(|_| max_length("commitment", commitment, crate::DEFAULT_MAX_COMMITMENT_LENGTH))
    {
        errors.push(e);
    }
    if let Err(e) = not_empty("check_in", check_in) {
        errors.push(e);
    }
    if let Some(code) = lang {
        if let Err(e) = language_code(code) {
            errors.push(e);
        }
    }

    match ValidationError::composite(errors) {
        Some(err) => Err(err),
        None => Ok(()),
    }
}
