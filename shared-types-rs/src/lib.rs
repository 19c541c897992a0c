// shared-types-rs/src/lib.rs
// Data model shared by every crate of the accountability pipeline.

pub mod agents;
pub mod context;
pub mod performance;
pub mod records;
pub mod structured;

pub use agents::{
    AgentDecision, BurnoutDetection, CheckIn, CorrectionType, ExcuseAnalysis, ExcuseCategory,
    InterventionType, LanguageResponse, PersonaDraft, PipelineEvaluation, RiskAssessment,
    RiskLevel, SafetyAudit, SafetyIntervention, ToneType, ACTION_ESCALATE, ACTION_NONE,
};
pub use context::{ContextProfile, CulturalContext, DynamicSafetyRule, FormalityLevel};
pub use performance::{CommitmentRecord, SlippageAnalysis, SlippageStatus, TruthGapAnalysis};
pub use records::{
    CulturalPersona, FeedbackAction, PersonaSource, ReliabilitySnapshot, SafetyFeedback,
    SafetyRule, UserReliabilityRecord, WILDCARD_DEPARTMENT,
};
pub use structured::{Resolution, StructuredOutput};

/// Industry key used when nothing more specific is known.
pub const GENERIC_INDUSTRY: &str = "generic";

/// Caller-supplied industry value that asks for automatic context sensing.
pub const AUTO_INDUSTRY: &str = "AUTO";
