//! Supervisor error type.

use llm_client::LLMError;
use persistence::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SupervisorError {
    #[error("Audit call failed: {0}")]
    Audit(#[from] LLMError),

    #[error("Policy lookup failed: {0}")]
    Policy(#[from] StoreError),
}
