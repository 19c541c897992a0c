//! Check-in field errors
//!
//! Every failed field of a request is collected and reported together.

use std::fmt;
use thiserror::Error;

pub type ValidationResult<T> = Result<T, ValidationError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    #[error("Field too long: {0}")]
    TooLong(String),

    #[error("Field empty: {0}")]
    TooShort(String),

    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    #[error("Contains invalid characters: {0}")]
    InvalidCharacters(String),

    /// More than one field failed
    #[error("{0}")]
    Composite(CompositeError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompositeError {
    pub errors: Vec<ValidationError>,
}

impl fmt::Display for CompositeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let rendered: Vec<String> = self.errors.iter().map(ToString::to_string).collect();
        write!(f, "{} fields rejected: {}", self.errors.len(), rendered.join("; "))
    }
}

impl ValidationError {
    /// Collapse collected errors; `None` when there were none, the error
    /// itself when there was exactly one.
    pub fn composite<I>(errors: I) -> Option<Self>
    where
        I: IntoIterator<Item = ValidationError>,
    {
        let mut errors: Vec<ValidationError> = errors.into_iter().collect();
        match errors.len() {
            0 => None,
            1 => errors.pop(),
            _ => Some(ValidationError::Composite(CompositeError { errors })),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_composite_collapses_small_lists() {
        assert_eq!(ValidationError::composite(Vec::new()), None);

        let single = ValidationError::TooShort("check_in must not be empty".to_string());
        assert_eq!(
            ValidationError::composite(vec![single.clone()]),
            Some(single)
        );
    }

    #[test]
    fn test_composite_lists_every_field() {
        let composite = ValidationError::composite(vec![
            ValidationError::TooShort("user_id must not be empty".to_string()),
            ValidationError::InvalidFormat("'english' is not a language code".to_string()),
        ]);
        match composite {
            Some(ValidationError::Composite(comp)) => {
                assert_eq!(comp.errors.len(), 2);
                assert_eq!(
                    comp.to_string(),
                    "2 fields rejected: Field empty: user_id must not be empty; \
                     Invalid format: 'english' is not a language code"
                );
            }
            other => panic!("Expected composite error, got {:?}", other),
        }
    }
}
