// orchestrator-service-rs/src/orchestrator.rs
// The evaluation pipeline: context, concurrent classification under one
// timeout, decision synthesis, safety supervision, ledger update and
// follow-up scheduling.

use std::sync::Arc;
use std::time::Duration;

use input_validation_rs::{truncate_text, validators};
use persistence::ReliabilityLedger;
use safety_supervisor::{SafetySupervisor, SupervisionContext};
use shared_types::{CheckIn, PipelineEvaluation, Resolution};

use crate::classifiers::ClassifierStage;
use crate::context_scout::ContextResolver;
use crate::error::PipelineError;
use crate::language::{normalize_code, LanguageResolver};
use crate::scheduler::FollowUpScheduler;
use crate::synthesizer::DecisionSynthesizer;

pub struct Orchestrator {
    pub(crate) classifiers: ClassifierStage,
    pub(crate) language: LanguageResolver,
    pub(crate) context: ContextResolver,
    pub(crate) synthesizer: DecisionSynthesizer,
    pub(crate) supervisor: SafetySupervisor,
    pub(crate) ledger: Arc<dyn ReliabilityLedger>,
    pub(crate) scheduler: Arc<FollowUpScheduler>,
    pub(crate) classification_timeout: Duration,
    pub(crate) max_input_chars: usize,
}

impl Orchestrator {
    /// Evaluate with reliability inputs read from the ledger.
    pub async fn evaluate_check_in(
        &self,
        check_in: &CheckIn,
    ) -> Result<PipelineEvaluation, PipelineError> {
        let snapshot = self.ledger.get(&check_in.user_id).await?;
        self.evaluate_participation(check_in, snapshot.score, snapshot.consecutive_firm)
            .await
    }

    /// Run the full pipeline for one check-in.
    ///
    /// A classification stage that times out or fails yields the fixed delay
    /// fallback and leaves the ledger untouched. Failures after classification
    /// propagate to the caller.
    pub async fn evaluate_participation(
        &self,
        check_in: &CheckIn,
        reliability_score: f64,
        consecutive_firm: u32,
    ) -> Result<PipelineEvaluation, PipelineError> {
        validators::check_in_fields(
            &check_in.user_id,
            &check_in.commitment,
            &check_in.check_in,
            check_in.lang.as_deref(),
        )?;
        let user_id = check_in.user_id.as_str();
        let text = truncate_text(&check_in.check_in, self.max_input_chars);

        let context = self
            .context
            .resolve(user_id, &text, check_in.industry.as_deref())
            .await;
        if let Some(reason) = context.fallback_reason() {
            tracing::warn!(user_id, reason, "context_fallback");
        }
        let context = context.into_value();

        let history = format!(
            "Commitment: {}. Reliability score {:.1}% with {} consecutive strict interventions.",
            check_in.commitment, reliability_score, consecutive_firm
        );
        let explicit_lang = check_in.lang.clone();

        let classification = async {
            let language = async {
                match explicit_lang {
                    Some(code) => Resolution::Detected(code),
                    None => self.language.detect_language(&text).await,
                }
            };
            let judgments = async {
                tokio::try_join!(
                    self.classifiers.analyze_excuse(&text),
                    self.classifiers.detect_burnout(&text),
                    self.classifiers.assess_risk(&history, &text),
                )
            };
            let (judgments, language) = tokio::join!(judgments, language);
            judgments.map(|(excuse, burnout, risk)| (excuse, burnout, risk, language))
        };

        let (excuse, burnout, risk, language) =
            match tokio::time::timeout(self.classification_timeout, classification).await {
                Ok(Ok(gathered)) => gathered,
                Ok(Err(e)) => {
                    tracing::error!(user_id, error = %e, "classification_failed");
                    return Ok(PipelineEvaluation::delayed_fallback(&format!(
                        "classification failed: {}",
                        e
                    )));
                }
                Err(_) => {
                    tracing::warn!(
                        user_id,
                        timeout_secs = self.classification_timeout.as_secs(),
                        "classification_timeout"
                    );
                    return Ok(PipelineEvaluation::delayed_fallback(&format!(
                        "classification exceeded {}s timeout",
                        self.classification_timeout.as_secs()
                    )));
                }
            };

        let detected_language = match language.fallback_reason() {
            Some(reason) => {
                tracing::debug!(user_id, reason, "language_fallback");
                None
            }
            None => Some(normalize_code(language.value())),
        };
        let persona = self
            .language
            .get_or_create_persona(language.value())
            .await;
        if let Some(reason) = persona.fallback_reason() {
            tracing::warn!(user_id, reason, "persona_fallback");
        }
        let persona = persona.into_value();

        let decision = self
            .synthesizer
            .adapt_tone(
                &excuse,
                &risk,
                &burnout,
                reliability_score,
                consecutive_firm,
                &persona,
                &context,
            )
            .await?;

        let supervision = self
            .supervisor
            .supervise(
                decision,
                SupervisionContext {
                    industry: context.industry.clone(),
                    department: context.department.clone(),
                    dynamic_rules: context.dynamic_safety_rules.clone(),
                    user_context: format!(
                        "Reliability {:.1}%, {} consecutive strict interventions, excuse {}, risk {:?}",
                        reliability_score, consecutive_firm, excuse.category, risk.level
                    ),
                    persona: Some(persona),
                },
            )
            .await?;
        tracing::info!(
            user_id,
            state = %supervision.final_state(),
            audit_calls = supervision.audit_calls,
            "supervision_complete"
        );

        let record = self
            .ledger
            .update_with_language(
                user_id,
                excuse.is_failure(),
                supervision.decision.tone,
                detected_language.as_deref(),
            )
            .await?;

        if risk.level.needs_follow_up() {
            self.scheduler
                .schedule(user_id, record.external_chat_id.clone(), &check_in.commitment)
                .await;
        }

        Ok(PipelineEvaluation {
            decision: supervision.decision,
            excuse,
            risk,
            burnout,
            safety_audit: supervision.intervention,
        })
    }
}
