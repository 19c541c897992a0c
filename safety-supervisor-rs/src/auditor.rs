//! Message Auditor
//!
//! One supervisor pass over a proposed message. `LlmAuditor` is the
//! model-backed implementation; the state machine only sees the trait.

use std::sync::Arc;

use async_trait::async_trait;
use input_validation_rs::sanitize_prompt_input;
use llm_client::{complete_structured, ChatMessage, LLMError, LanguageModel};
use serde_json::json;
use shared_types::{SafetyAudit, ToneType};

use crate::policy::PolicyBundle;

/// Everything the supervisor knows when auditing one message.
#[derive(Debug, Clone)]
pub struct AuditRequest {
    pub message: String,
    pub tone: ToneType,
    pub user_context: String,
    pub persona_instruction: Option<String>,
    pub policy: PolicyBundle,
    pub acceptance_rate: f64,
    /// Set for unverified policy sets; asks the auditor to lean toward review.
    pub conservative: bool,
    /// True for the single re-audit of a supervisor-generated correction.
    pub is_re_audit: bool,
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MessageAuditor: Send + Sync {
    async fn audit_message(&self, request: &AuditRequest) -> Result<SafetyAudit, LLMError>;
}

pub struct LlmAuditor {
    model: Arc<dyn LanguageModel>,
    confidence_threshold: f64,
    low_acceptance_threshold: f64,
}

impl LlmAuditor {
    pub fn new(
        model: Arc<dyn LanguageModel>,
        confidence_threshold: f64,
        low_acceptance_threshold: f64,
    ) -> Self {
        Self {
            model,
            confidence_threshold,
            low_acceptance_threshold,
        }
    }

    pub fn from_settings(
        model: Arc<dyn LanguageModel>,
        settings: &config_rs::PipelineSettings,
    ) -> Self {
        Self::new(
            model,
            settings.safety_confidence_threshold,
            settings.low_acceptance_threshold,
        )
    }

    pub fn system_prompt(&self, policy: &PolicyBundle) -> String {
        format!(
            "You are a specialized {} Ethics & Morale Safety Supervisor. \
             You audit outgoing accountability messages before they reach an employee.\n\n{}",
            crate::supervisor::capitalize_first(&policy.industry),
            policy.render()
        )
    }

    pub fn audit_prompt(&self, request: &AuditRequest) -> String {
        let mut prompt = format!(
            "AUDIT REQUEST:\n\
             Proposed Message: \"{}\"\n\
             Intended Tone: {}\n\
             User Context (Reliability/History): {}\n\
             Cultural Persona: {}\n\
             Historical manager acceptance rate: {:.2}\n\n\
             CRITICAL TASK:\n\
             - If the message is too harsh (tone drift) or culturally insensitive, set is_safe to false and supply suggested_correction.\n\
             - If the message touches HR territory (performance reviews, salary, firing) or a restricted keyword, set is_hard_blocked to true.\n\
             - If your confidence in this analysis is below {:.2}, set requires_human_review to true.\n",
            sanitize_prompt_input(&request.message),
            request.tone,
            sanitize_prompt_input(&request.user_context),
            request
                .persona_instruction
                .as_deref()
                .unwrap_or("Standard global professional tone."),
            request.acceptance_rate,
            self.confidence_threshold,
        );

        let hits = request.policy.keyword_hits(&request.message);
        if !hits.is_empty() {
            prompt.push_str(&format!(
                "- Restricted keywords present in the message: {}.\n",
                hits.join(", ")
            ));
        }
        if request.acceptance_rate < self.low_acceptance_threshold {
            prompt.push_str(
                "- Managers have rejected many recent interventions. When in doubt, set requires_human_review to true.\n",
            );
        }
        if request.conservative {
            prompt.push_str(
                "- This policy set is UNVERIFIED. Be conservative and prefer requires_human_review over approving borderline content.\n",
            );
        }
        if request.is_re_audit {
            prompt.push_str(
                "- This message is itself a correction. Do not suggest another correction; only judge it.\n",
            );
        }
        prompt
    }
}

#[async_trait]
impl MessageAuditor for LlmAuditor {
    async fn audit_message(&self, request: &AuditRequest) -> Result<SafetyAudit, LLMError> {
        let messages = vec![
            ChatMessage::system(self.system_prompt(&request.policy)),
            ChatMessage::user(self.audit_prompt(request)),
        ];
        let metadata = json!({
            "message": request.message,
            "tone": request.tone.to_string(),
            "industry": request.policy.industry,
            "re_audit": request.is_re_audit,
        });
        complete_structured::<SafetyAudit>(self.model.as_ref(), messages, metadata).await
    }
}
