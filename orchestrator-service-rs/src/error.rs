// orchestrator-service-rs/src/error.rs

use input_validation_rs::ValidationError;
use llm_client::LLMError;
use persistence::StoreError;
use safety_supervisor::SupervisorError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Invalid check-in: {0}")]
    InvalidInput(#[from] ValidationError),

    #[error("Model call failed: {0}")]
    Model(#[from] LLMError),

    #[error("Safety supervision failed: {0}")]
    Supervisor(#[from] SupervisorError),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Evaluation worker is not running")]
    WorkerStopped,
}
