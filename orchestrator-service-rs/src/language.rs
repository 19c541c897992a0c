// orchestrator-service-rs/src/language.rs
// Language detection and cultural persona resolution. Neither step ever fails
// outward: both degrade to a documented default and say so in the result.

use std::sync::Arc;

use input_validation_rs::{sanitize_prompt_input, validators::is_language_code};
use llm_client::{complete_structured, ChatMessage, LanguageModel};
use persistence::{builtin_instruction, PersonaStore};
use serde_json::json;
use shared_types::{CulturalPersona, LanguageResponse, PersonaDraft, PersonaSource, Resolution};

/// Phrases that mark British English when the detected language is plain `en`.
const UK_MARKERS: [&str; 8] = [
    "cheers mate",
    "sorted",
    "brilliant",
    "fortnight",
    "knackered",
    "gutted",
    "cuppa",
    "whilst",
];

const LANGUAGE_SYSTEM_PROMPT: &str = "Identify the language of the text. \
Answer with its two-letter ISO 639-1 code, adding a region suffix only when the text is clearly regional.";

const FALLBACK_INSTRUCTION: &str = "Standard global professional tone. Clear and direct.";

/// Lowercase the language part and uppercase the region: `EN-gb` -> `en-GB`.
pub fn normalize_code(raw: &str) -> String {
    let raw = raw.trim().replace('_', "-");
    match raw.split_once('-') {
        Some((base, region)) => format!("{}-{}", base.to_lowercase(), region.to_uppercase()),
        None => raw.to_lowercase(),
    }
}

/// Re-map a bare parent language to a regional variant when marker phrases appear.
pub fn apply_regional_heuristics(code: &str, text: &str) -> String {
    if code != "en" {
        return code.to_string();
    }
    let lowered = text.to_lowercase();
    if UK_MARKERS.iter().any(|marker| lowered.contains(marker)) {
        "en-UK".to_string()
    } else {
        code.to_string()
    }
}

pub struct LanguageResolver {
    model: Arc<dyn LanguageModel>,
    personas: Arc<dyn PersonaStore>,
    default_language: String,
}

impl LanguageResolver {
    pub fn new(
        model: Arc<dyn LanguageModel>,
        personas: Arc<dyn PersonaStore>,
        default_language: impl Into<String>,
    ) -> Self {
        Self {
            model,
            personas,
            default_language: default_language.into(),
        }
    }

    pub fn default_language(&self) -> &str {
        &self.default_language
    }

    pub async fn detect_language(&self, text: &str) -> Resolution<String> {
        if text.trim().is_empty() {
            return Resolution::fallback(self.default_language.clone(), "empty input");
        }

        let sanitized = sanitize_prompt_input(text);
        let messages = vec![
            ChatMessage::system(LANGUAGE_SYSTEM_PROMPT),
            ChatMessage::user(format!("<user_excuse>{}</user_excuse>", sanitized)),
        ];
        let response: LanguageResponse = match complete_structured(
            self.model.as_ref(),
            messages,
            json!({ "text": sanitized }),
        )
        .await
        {
            Ok(response) => response,
            Err(e) => {
                tracing::warn!(error = %e, "language_detection_failed");
                return Resolution::fallback(self.default_language.clone(), e.to_string());
            }
        };

        let code = normalize_code(&response.code);
        if !is_language_code(&code) {
            tracing::debug!(code = %response.code, "language_code_unrecognized");
            return Resolution::fallback(
                self.default_language.clone(),
                format!("unrecognized code '{}'", response.code),
            );
        }

        let code = apply_regional_heuristics(&code, text);
        tracing::debug!(code = %code, "language_detected");
        Resolution::Detected(code)
    }

    fn system_default_persona(&self) -> CulturalPersona {
        CulturalPersona {
            code: self.default_language.to_lowercase(),
            name: "Standard Global Persona".to_string(),
            instruction: builtin_instruction(&self.default_language)
                .unwrap_or(FALLBACK_INSTRUCTION)
                .to_string(),
            is_verified: true,
            source: PersonaSource::System,
        }
    }

    pub async fn get_or_create_persona(&self, code: &str) -> Resolution<CulturalPersona> {
        match self.personas.get(code).await {
            Ok(Some(persona)) => return Resolution::Detected(persona),
            Ok(None) => {}
            Err(e) => tracing::warn!(code, error = %e, "persona_lookup_failed"),
        }

        if code.eq_ignore_ascii_case(&self.default_language) {
            return Resolution::Detected(self.system_default_persona());
        }

        tracing::info!(code, "persona_drafting");
        let messages = vec![
            ChatMessage::system(
                "You are an expert in cross-cultural professional communication.",
            ),
            ChatMessage::user(format!(
                "Write a single instructive paragraph describing professional-communication norms \
                 for people whose locale is '{}': directness, formality, how to ask for status \
                 updates and how to deliver firm feedback respectfully. Also give the persona a short name.",
                sanitize_prompt_input(code)
            )),
        ];
        let draft: PersonaDraft =
            match complete_structured(self.model.as_ref(), messages, json!({ "code": code })).await
            {
                Ok(draft) => draft,
                Err(e) => {
                    tracing::warn!(code, error = %e, "persona_drafting_failed");
                    return Resolution::fallback(
                        CulturalPersona {
                            code: code.to_lowercase(),
                            name: "Fallback Persona".to_string(),
                            instruction: FALLBACK_INSTRUCTION.to_string(),
                            is_verified: false,
                            source: PersonaSource::Fallback,
                        },
                        e.to_string(),
                    );
                }
            };

        let persona = CulturalPersona {
            code: code.to_lowercase(),
            name: draft.name,
            instruction: draft.instruction,
            is_verified: false,
            source: PersonaSource::AutoAgent,
        };
        match self.personas.create(persona.clone()).await {
            Ok(stored) => Resolution::Detected(stored),
            Err(e) => {
                tracing::warn!(code, error = %e, "persona_persist_failed");
                Resolution::fallback(persona, format!("draft not persisted: {}", e))
            }
        }
    }
}
