// shared-types-rs/src/structured.rs
// Contracts for model-produced values and for success-or-fallback lookups.

use serde::de::DeserializeOwned;

/// A type a language model can be asked to produce.
///
/// `SCHEMA_NAME` tags the request so providers (including the hermetic mock)
/// know which shape is expected; `SCHEMA_HINT` is the JSON shape embedded in
/// the prompt. `validate` enforces value ranges serde cannot express.
pub trait StructuredOutput: DeserializeOwned + Send + 'static {
    const SCHEMA_NAME: &'static str;
    const SCHEMA_HINT: &'static str;

    fn validate(&self) -> Result<(), String> {
        Ok(())
    }
}

/// Outcome of a step that never fails outward but may degrade to a default.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution<T> {
    /// The value was produced by the primary path.
    Detected(T),
    /// The primary path failed; `value` is the documented default.
    Fallback { value: T, reason: String },
}

impl<T> Resolution<T> {
    pub fn fallback(value: T, reason: impl Into<String>) -> Self {
        Self::Fallback {
            value,
            reason: reason.into(),
        }
    }

    pub fn value(&self) -> &T {
        match self {
            Self::Detected(value) => value,
            Self::Fallback { value, .. } => value,
        }
    }

    pub fn into_value(self) -> T {
        match self {
            Self::Detected(value) => value,
            Self::Fallback { value, .. } => value,
        }
    }

    pub fn is_fallback(&self) -> bool {
        matches!(self, Self::Fallback { .. })
    }

    pub fn fallback_reason(&self) -> Option<&str> {
        match self {
            Self::Detected(_) => None,
            Self::Fallback { reason, .. } => Some(reason.as_str()),
        }
    }

    pub fn map<U, F>(self, f: F) -> Resolution<U>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            Self::Detected(value) => Resolution::Detected(f(value)),
            Self::Fallback { value, reason } => Resolution::Fallback {
                value: f(value),
                reason,
            },
        }
    }
}

/// Range check shared by the confidence-like fields.
pub(crate) fn check_unit_interval(field: &str, value: f64) -> Result<(), String> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        Err(format!("{} must be within [0, 1], got {}", field, value))
    }
}
