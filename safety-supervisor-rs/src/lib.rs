//! # Safety Supervisor
//!
//! Audits every synthesized accountability message before delivery.
//!
//! ## Components
//!
//! - [`PolicyBundle`]: industry rule resolution plus the non-overridable global baseline
//! - [`MessageAuditor`] / [`LlmAuditor`]: one audit pass over a proposed message
//! - [`SafetySupervisor`]: the block / correct / re-audit / review state machine

pub mod auditor;
pub mod error;
pub mod policy;
pub mod supervisor;

pub use auditor::{AuditRequest, LlmAuditor, MessageAuditor};
pub use error::SupervisorError;
pub use policy::{PolicyBundle, GLOBAL_BASELINE};
pub use supervisor::{
    capitalize_first, SafetySupervisor, SupervisionContext, SupervisionOutcome, SupervisionState,
    HARD_BLOCK_NOTICE, SAFETY_VALVE_NOTICE,
};

#[cfg(test)]
mod tests;
