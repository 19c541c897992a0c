// orchestrator-service-rs/src/synthesizer.rs
// Tone-adapted reply generation. The tone policy lives in the prompt; the
// hermetic provider reproduces rules 1 to 3 from the request metadata.

use std::sync::Arc;

use config_rs::CulturalDirectness;
use input_validation_rs::sanitize_prompt_input;
use llm_client::{complete_structured, ChatMessage, LLMError, LanguageModel};
use serde_json::json;
use shared_types::{
    AgentDecision, BurnoutDetection, ContextProfile, CulturalPersona, ExcuseAnalysis,
    RiskAssessment,
};

/// Consecutive strict interventions after which the tone must soften.
pub const COOLING_OFF_THRESHOLD: u32 = 3;

/// Advisory content constraints for regulated industries.
pub fn industry_guardrails(industry: &str) -> &'static str {
    match industry {
        "healthcare" => "Never reference patients, diagnoses or treatments. Do not imply clinical judgement.",
        "finance" => "Do not imply financial advice or legally binding commitments. Avoid market-sensitive wording.",
        "legal" => "Do not imply legally binding commitments or legal advice. Never reference case details.",
        _ => "Keep the message professional and free of HR topics such as salary or performance reviews.",
    }
}

/// Drafted instructions are model output and get the same cleaning as user text.
fn persona_instruction(persona: &CulturalPersona) -> String {
    if persona.is_verified {
        persona.effective_instruction()
    } else {
        format!(
            "{}{}",
            sanitize_prompt_input(&persona.instruction),
            CulturalPersona::UNVERIFIED_SUFFIX
        )
    }
}

pub struct DecisionSynthesizer {
    model: Arc<dyn LanguageModel>,
    directness: CulturalDirectness,
}

impl DecisionSynthesizer {
    pub fn new(model: Arc<dyn LanguageModel>, directness: CulturalDirectness) -> Self {
        Self { model, directness }
    }

    fn policy_prompt(
        &self,
        reliability_score: f64,
        consecutive_firm_calls: u32,
        persona: &CulturalPersona,
        context: &ContextProfile,
    ) -> String {
        format!(
            "Determine action and tone for a reply to a team member's status update.\n\
             User Reliability: {:.1}%\n\
             Consecutive Strict Interventions: {}\n\
             Manager's Cultural Directness Setting: {}\n\
             Industry: {} (department {})\n\n\
             CULTURAL PERSONA ({}):\n{}\n\n\
             RULES, in priority order:\n\
             1. If burnout risk is detected, the tone MUST be supportive and the action MUST be escalate_to_manager.\n\
             2. If Consecutive Strict Interventions >= {}, you MUST use a supportive or neutral tone to avoid morale damage, even when reliability is low.\n\
             3. Reliability below 20% calls for a confrontational tone; 20% to 50% calls for firm; otherwise stay supportive. \
             Respect the Cultural Directness: if 'low', soften all firm feedback.\n\
             4. Respect the Cultural Persona above ALL else. When it prefers indirect phrasing, use it even where rule 3 suggests firmness.\n\
             5. Industry guardrail: {}",
            reliability_score,
            consecutive_firm_calls,
            self.directness,
            context.industry,
            context.department,
            persona.name,
            persona_instruction(persona),
            COOLING_OFF_THRESHOLD,
            industry_guardrails(&context.industry),
        )
    }

    #[allow(clippy::too_many_arguments)]
    pub async fn adapt_tone(
        &self,
        excuse: &ExcuseAnalysis,
        risk: &RiskAssessment,
        burnout: &BurnoutDetection,
        reliability_score: f64,
        consecutive_firm_calls: u32,
        persona: &CulturalPersona,
        context: &ContextProfile,
    ) -> Result<AgentDecision, LLMError> {
        let messages = vec![
            ChatMessage::system(self.policy_prompt(
                reliability_score,
                consecutive_firm_calls,
                persona,
                context,
            )),
            ChatMessage::user(format!(
                "Excuse: {} (confidence {:.2}) - {}\n\
                 Risk: {:?} ({:.2}), predicted slip {} days, mitigation: {}\n\
                 Burnout: at_risk={}, indicators=[{}], recommendation: {}",
                excuse.category,
                excuse.confidence_score,
                sanitize_prompt_input(&excuse.reasoning),
                risk.level,
                risk.risk_score,
                risk.predicted_latency_days,
                sanitize_prompt_input(&risk.mitigation_strategy),
                burnout.is_at_risk,
                sanitize_prompt_input(&burnout.sentiment_indicators.join(", ")),
                sanitize_prompt_input(&burnout.recommendation),
            )),
        ];
        let metadata = json!({
            "burnout_at_risk": burnout.is_at_risk,
            "burnout_recommendation": burnout.recommendation,
            "reliability_score": reliability_score,
            "consecutive_firm_calls": consecutive_firm_calls,
            "directness": self.directness.to_string(),
            "persona": persona.code,
            "industry": context.industry,
        });

        let decision: AgentDecision =
            complete_structured(self.model.as_ref(), messages, metadata).await?;
        tracing::info!(
            tone = %decision.tone,
            action = %decision.action,
            reliability_score,
            consecutive_firm_calls,
            "decision_synthesized"
        );
        Ok(decision)
    }
}
