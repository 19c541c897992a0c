// llm-client-rs/src/error.rs
//
// Error type for model invocations. The variants separate transient failures,
// which the HTTP provider retries with backoff, from failures that need
// intervention and from responses that do not fit the requested schema.

use thiserror::Error;

#[derive(Debug, Clone, Error, PartialEq)]
pub enum LLMError {
    // Non-retryable: 400, 401, 403, 404 and missing credentials
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
    // 429, retried with growing delays
    #[error("Rate limit exceeded: {0}")]
    RateLimitExceeded(String),
    // Deprecated model, content policy rejection
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    // Retryable: 500, 502, 503, 504
    #[error("Server error: {0}")]
    ServerError(String),
    // Connection failures and request timeouts
    #[error("Network error: {0}")]
    NetworkError(String),

    // The response body was not JSON
    #[error("Parse error: {0}")]
    ParseError(String),
    // The JSON did not match the requested schema or its value ranges
    #[error("Schema violation for '{schema}': {reason}")]
    SchemaViolation { schema: String, reason: String },
    #[error("Unknown error: {0}")]
    UnknownError(String),
}

impl LLMError {
    /// Whether the transport layer should try the call again.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            LLMError::ServerError(_) | LLMError::NetworkError(_) | LLMError::RateLimitExceeded(_)
        )
    }

    pub fn schema_violation(schema: &str, reason: impl Into<String>) -> Self {
        LLMError::SchemaViolation {
            schema: schema.to_string(),
            reason: reason.into(),
        }
    }

    /// Classify a non-success HTTP status.
    pub fn from_status(status: u16, body: &str) -> Self {
        match status {
            400 => LLMError::InvalidRequest(format!("Bad request: {}", body)),
            401 => LLMError::InvalidRequest(format!("Unauthorized: {}", body)),
            403 => LLMError::InvalidRequest(format!("Forbidden: {}", body)),
            404 => LLMError::InvalidRequest(format!("Not found: {}", body)),
            429 => LLMError::RateLimitExceeded(body.to_string()),
            500 | 502 | 503 | 504 => {
                LLMError::ServerError(format!("Server error ({}): {}", status, body))
            }
            _ => LLMError::UnknownError(format!("Unknown error ({}): {}", status, body)),
        }
    }
}
