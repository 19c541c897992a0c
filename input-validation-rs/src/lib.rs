//! # Input Validation Library
//!
//! Validation and sanitization of untrusted check-in text before it is
//! embedded in any language-model prompt.
//!
//! ## Features
//!
//! - Field validators for check-in requests (user ids, language codes, text)
//! - Prompt-injection redaction with a strict structural-tag whitelist
//! - Length truncation with an explicit marker
//! - PII scrubbing for text sent to context sensing

mod errors;
pub mod sanitizers;
pub mod validators;

pub use errors::{CompositeError, ValidationError, ValidationResult};
pub use sanitizers::prompt::{sanitize_prompt_input, scrub_pii, truncate_text, WHITELISTED_TAGS};

/// Default maximum length of a user identifier
pub const DEFAULT_MAX_USER_ID_LENGTH: usize = 128;

/// Default maximum length of a commitment description
pub const DEFAULT_MAX_COMMITMENT_LENGTH: usize = 2_000;
