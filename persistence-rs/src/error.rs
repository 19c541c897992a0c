// persistence-rs/src/error.rs

use thiserror::Error;

/// Store error type.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum StoreError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
}
