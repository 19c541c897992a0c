// orchestrator-service-rs/src/lib.rs
// Behavioral-accountability evaluation pipeline: classifiers, language and
// context resolution, decision synthesis, safety supervision and the
// synchronous and enqueue-and-poll entry points around them, plus commitment
// extraction and delivery audits.

pub mod app_context;
pub mod classifiers;
pub mod context_scout;
pub mod error;
pub mod language;
pub mod notifier;
pub mod orchestrator;
pub mod performance;
pub mod scheduler;
pub mod synthesizer;
pub mod telemetry;
pub mod worker;

pub use app_context::AppContext;
pub use classifiers::ClassifierStage;
pub use context_scout::ContextResolver;
pub use error::PipelineError;
pub use language::{apply_regional_heuristics, normalize_code, LanguageResolver};
pub use notifier::{format_message, Notifier, SlackNotifier};
pub use orchestrator::Orchestrator;
pub use performance::{DeliveryAudit, PerformanceAuditor};
pub use scheduler::{follow_up_text, FollowUpScheduler};
pub use synthesizer::{industry_guardrails, DecisionSynthesizer, COOLING_OFF_THRESHOLD};
pub use telemetry::init_logging;
pub use worker::{EvaluationWorker, JobId, JobStatus};
