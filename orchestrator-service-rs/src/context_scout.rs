// orchestrator-service-rs/src/context_scout.rs
// Organisational context for one evaluation: locked (verified on the user's
// record), sensed from the check-in text, or declared by the caller.

use std::sync::Arc;

use input_validation_rs::{sanitize_prompt_input, scrub_pii};
use llm_client::{complete_structured, ChatMessage, LanguageModel};
use persistence::ReliabilityLedger;
use serde_json::json;
use shared_types::{ContextProfile, Resolution, AUTO_INDUSTRY, WILDCARD_DEPARTMENT};

const SCOUT_PROMPT: &str = "Role: Forensic Context Scout\n\
Task: Analyze the communication sample and determine the organizational and departmental profile.\n\
Return a profile including:\n\
1. industry: the industry name (e.g. 'aerospace', 'biotech', 'finance'). Be specific.\n\
2. department: the department name (e.g. 'R&D', 'Logistics', 'Customer Success').\n\
3. confidence: a number from 0.0 to 1.0 for your certainty of the industry/department classification.\n\
4. culture: the communication culture (language code, formality, high or low context).\n\
5. key_entities: industry or department specific keywords you detected.\n\
6. dynamic_safety_rules: two or three specific rules that should be enforced in this context.";

pub struct ContextResolver {
    model: Arc<dyn LanguageModel>,
    ledger: Arc<dyn ReliabilityLedger>,
    default_industry: String,
}

impl ContextResolver {
    pub fn new(
        model: Arc<dyn LanguageModel>,
        ledger: Arc<dyn ReliabilityLedger>,
        default_industry: impl Into<String>,
    ) -> Self {
        Self {
            model,
            ledger,
            default_industry: default_industry.into(),
        }
    }

    pub async fn resolve(
        &self,
        user_id: &str,
        text: &str,
        industry: Option<&str>,
    ) -> Resolution<ContextProfile> {
        match self.ledger.record(user_id).await {
            Ok(Some(record)) if record.is_context_verified => {
                tracing::debug!(
                    user_id,
                    industry = %record.industry_type,
                    department = %record.department,
                    "context_locked"
                );
                return Resolution::Detected(ContextProfile::declared(
                    record.industry_type,
                    record.department,
                    "Locked: verified user context",
                ));
            }
            Ok(_) => {}
            Err(e) => tracing::warn!(user_id, error = %e, "context_record_lookup_failed"),
        }

        match industry.map(str::trim) {
            Some(requested) if requested.eq_ignore_ascii_case(AUTO_INDUSTRY) => {
                self.sense_context(text).await
            }
            Some(requested) if !requested.is_empty() => Resolution::Detected(
                ContextProfile::declared(requested, WILDCARD_DEPARTMENT, "Declared by caller"),
            ),
            _ => Resolution::Detected(ContextProfile::declared(
                self.default_industry.as_str(),
                WILDCARD_DEPARTMENT,
                "Configured default industry",
            )),
        }
    }

    pub async fn sense_context(&self, text: &str) -> Resolution<ContextProfile> {
        let sample = sanitize_prompt_input(&scrub_pii(text));
        let messages = vec![
            ChatMessage::system(SCOUT_PROMPT),
            ChatMessage::user(format!("<current_status>{}</current_status>", sample)),
        ];

        match complete_structured::<ContextProfile>(
            self.model.as_ref(),
            messages,
            json!({ "text": sample }),
        )
        .await
        {
            Ok(mut profile) => {
                profile.industry = profile.industry.trim().to_lowercase();
                if profile.department.trim().is_empty() {
                    profile.department = WILDCARD_DEPARTMENT.to_string();
                }
                tracing::info!(
                    industry = %profile.industry,
                    department = %profile.department,
                    confidence = profile.confidence,
                    dynamic_rules = profile.dynamic_safety_rules.len(),
                    "context_sensed"
                );
                Resolution::Detected(profile)
            }
            Err(e) => {
                tracing::warn!(error = %e, "context_sensing_failed");
                let reason = e.to_string();
                Resolution::fallback(ContextProfile::generic_fallback(&reason), reason)
            }
        }
    }
}
