//! Supervision State Machine
//!
//! Audits a synthesized decision and decides, in strict precedence order:
//! hard block, correction with exactly one re-audit, human review, or pass.
//! The auditor is called at most twice per supervision.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use shared_types::{
    AgentDecision, CulturalPersona, DynamicSafetyRule, InterventionType, SafetyAudit,
    SafetyIntervention, ACTION_ESCALATE,
};

use persistence::{FeedbackLoop, SafetyRuleStore};

use crate::auditor::{AuditRequest, MessageAuditor};
use crate::error::SupervisorError;
use crate::policy::PolicyBundle;

pub const HARD_BLOCK_NOTICE: &str = "⚠️ This message touched HR or legal boundaries and has been blocked for manual manager review.";

pub const SAFETY_VALVE_NOTICE: &str = "⚠️ An automated correction of this message failed its safety re-check. It has been held for manual manager review.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SupervisionState {
    AuditedSafe,
    Correcting,
    ReAuditing,
    HardBlocked,
    NeedsReview,
}

impl fmt::Display for SupervisionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::AuditedSafe => write!(f, "AUDITED_SAFE"),
            Self::Correcting => write!(f, "CORRECTING"),
            Self::ReAuditing => write!(f, "RE_AUDITING"),
            Self::HardBlocked => write!(f, "HARD_BLOCKED"),
            Self::NeedsReview => write!(f, "NEEDS_REVIEW"),
        }
    }
}

/// Inputs describing who the message is for.
#[derive(Debug, Clone, Default)]
pub struct SupervisionContext {
    pub industry: String,
    pub department: String,
    pub dynamic_rules: Vec<DynamicSafetyRule>,
    pub user_context: String,
    pub persona: Option<CulturalPersona>,
}

#[derive(Debug, Clone)]
pub struct SupervisionOutcome {
    pub decision: AgentDecision,
    pub intervention: Option<SafetyIntervention>,
    /// States visited, ending with the terminal one.
    pub trail: Vec<SupervisionState>,
    pub audit_calls: u8,
}

impl SupervisionOutcome {
    pub fn final_state(&self) -> SupervisionState {
        self.trail
            .last()
            .copied()
            .unwrap_or(SupervisionState::AuditedSafe)
    }
}

/// Uppercase the first character, leaving the rest untouched.
pub fn capitalize_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub struct SafetySupervisor {
    auditor: Arc<dyn MessageAuditor>,
    rules: Arc<dyn SafetyRuleStore>,
    feedback: Arc<dyn FeedbackLoop>,
    confidence_threshold: f64,
    acceptance_window_days: i64,
}

impl SafetySupervisor {
    pub fn new(
        auditor: Arc<dyn MessageAuditor>,
        rules: Arc<dyn SafetyRuleStore>,
        feedback: Arc<dyn FeedbackLoop>,
        confidence_threshold: f64,
        acceptance_window_days: i64,
    ) -> Self {
        Self {
            auditor,
            rules,
            feedback,
            confidence_threshold,
            acceptance_window_days,
        }
    }

    pub fn from_settings(
        auditor: Arc<dyn MessageAuditor>,
        rules: Arc<dyn SafetyRuleStore>,
        feedback: Arc<dyn FeedbackLoop>,
        settings: &config_rs::PipelineSettings,
    ) -> Self {
        Self::new(
            auditor,
            rules,
            feedback,
            settings.safety_confidence_threshold,
            settings.acceptance_window_days,
        )
    }

    async fn acceptance_rate(&self) -> f64 {
        match self.feedback.acceptance_rate(self.acceptance_window_days).await {
            Ok(rate) => rate,
            Err(e) => {
                tracing::warn!(error = %e, "acceptance_rate_unavailable");
                1.0
            }
        }
    }

    pub async fn supervise(
        &self,
        decision: AgentDecision,
        context: SupervisionContext,
    ) -> Result<SupervisionOutcome, SupervisorError> {
        let policy = PolicyBundle::resolve(
            self.rules.as_ref(),
            &context.industry,
            &context.department,
            context.dynamic_rules,
        )
        .await?;
        let acceptance_rate = self.acceptance_rate().await;
        let conservative = !policy.is_verified;
        if conservative {
            tracing::info!(
                industry = %policy.industry,
                department = %policy.department,
                "unverified_policy_conservative_mode"
            );
        }

        let mut request = AuditRequest {
            message: decision.message.clone(),
            tone: decision.tone,
            user_context: context.user_context,
            persona_instruction: context.persona.map(|p| p.effective_instruction()),
            policy,
            acceptance_rate,
            conservative,
            is_re_audit: false,
        };

        let audit = self.auditor.audit_message(&request).await?;
        let mut audit_calls = 1;

        if audit.is_hard_blocked {
            return Ok(self.hard_block(decision, &audit, audit_calls));
        }

        if !audit.is_safe {
            let corrected = audit
                .suggested_correction
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(capitalize_first)
                .unwrap_or_else(|| decision.message.clone());

            request.message = corrected.clone();
            request.is_re_audit = true;
            let re_audit = self.auditor.audit_message(&request).await;
            audit_calls += 1;

            return Ok(self.finish_correction(
                decision,
                &audit,
                corrected,
                re_audit,
                audit_calls,
            ));
        }

        let low_confidence = audit.supervisor_confidence < self.confidence_threshold;
        if audit.requires_human_review || low_confidence || conservative {
            let reasoning = if low_confidence {
                format!(
                    "Confidence below threshold ({:.2} < {:.2}): {}",
                    audit.supervisor_confidence, self.confidence_threshold, audit.reasoning
                )
            } else if audit.requires_human_review {
                format!("Supervisor requested human review: {}", audit.reasoning)
            } else {
                format!(
                    "Unverified policy for {}/{}; routed to a manager: {}",
                    request.policy.industry, request.policy.department, audit.reasoning
                )
            };
            return Ok(self.review(decision, reasoning, vec![], audit_calls, None));
        }

        tracing::debug!(confidence = audit.supervisor_confidence, "message_audited_safe");
        Ok(SupervisionOutcome {
            decision,
            intervention: None,
            trail: vec![SupervisionState::AuditedSafe],
            audit_calls,
        })
    }

    fn hard_block(
        &self,
        mut decision: AgentDecision,
        audit: &SafetyAudit,
        audit_calls: u8,
    ) -> SupervisionOutcome {
        let intervention = SafetyIntervention::new(
            decision.message.clone(),
            None,
            audit.reasoning.clone(),
            InterventionType::Block,
        );
        tracing::warn!(
            intervention_id = %intervention.id,
            reasoning = %audit.reasoning,
            "safety_hard_block"
        );

        decision.action = ACTION_ESCALATE.to_string();
        decision.message = HARD_BLOCK_NOTICE.to_string();
        decision.analysis_summary = format!(
            "{} | Safety block: {}",
            decision.analysis_summary, audit.reasoning
        );

        SupervisionOutcome {
            decision,
            intervention: Some(intervention),
            trail: vec![SupervisionState::HardBlocked],
            audit_calls,
        }
    }

    fn finish_correction(
        &self,
        mut decision: AgentDecision,
        audit: &SafetyAudit,
        corrected: String,
        re_audit: Result<SafetyAudit, llm_client::LLMError>,
        audit_calls: u8,
    ) -> SupervisionOutcome {
        let passed = match &re_audit {
            Ok(second) => second.is_safe && !second.is_hard_blocked,
            Err(e) => {
                tracing::error!(error = %e, "safety_re_audit_failed");
                false
            }
        };

        if !passed {
            let detail = match re_audit {
                Ok(second) => second.reasoning,
                Err(e) => e.to_string(),
            };
            return self.review(
                decision,
                format!("Correction failed re-audit: {}", detail),
                vec![SupervisionState::Correcting, SupervisionState::ReAuditing],
                audit_calls,
                Some(SAFETY_VALVE_NOTICE),
            );
        }

        let intervention = SafetyIntervention::new(
            decision.message.clone(),
            Some(corrected.clone()),
            audit.reasoning.clone(),
            InterventionType::Correction,
        );
        tracing::info!(
            intervention_id = %intervention.id,
            correction_type = ?audit.correction_type,
            "safety_correction_applied"
        );

        decision.message = corrected;
        decision.analysis_summary = format!(
            "{} | Safety correction: {}",
            decision.analysis_summary, audit.reasoning
        );

        SupervisionOutcome {
            decision,
            intervention: Some(intervention),
            trail: vec![
                SupervisionState::Correcting,
                SupervisionState::ReAuditing,
                SupervisionState::AuditedSafe,
            ],
            audit_calls,
        }
    }

    // `notice` replaces the message; without it the message passes through unchanged.
    fn review(
        &self,
        mut decision: AgentDecision,
        reasoning: String,
        mut trail: Vec<SupervisionState>,
        audit_calls: u8,
        notice: Option<&str>,
    ) -> SupervisionOutcome {
        let intervention = SafetyIntervention::new(
            decision.message.clone(),
            None,
            reasoning.clone(),
            InterventionType::Review,
        );
        tracing::warn!(
            intervention_id = %intervention.id,
            reasoning = %reasoning,
            "safety_human_review"
        );

        decision.action = ACTION_ESCALATE.to_string();
        if let Some(notice) = notice {
            decision.message = notice.to_string();
        }
        decision.analysis_summary = format!(
            "{} | Safety review: {}",
            decision.analysis_summary, reasoning
        );
        trail.push(SupervisionState::NeedsReview);

        SupervisionOutcome {
            decision,
            intervention: Some(intervention),
            trail,
            audit_calls,
        }
    }
}
