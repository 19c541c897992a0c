// llm-client-rs/src/provider.rs
//
// Provider selection: an explicit LLM_PROVIDER wins when its key is present,
// otherwise the first available key decides, otherwise the hermetic mock.

use std::sync::Arc;

use config_rs::PipelineSettings;

use crate::llm_client::{
    HttpLanguageModel, HttpModelConfig, GROQ_API_URL, GROQ_DEFAULT_MODEL, OPENAI_API_URL,
};
use crate::mock::MockLanguageModel;
use crate::structured::LanguageModel;

/// Which backend `provider_from_settings` picked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    OpenAi,
    Groq,
    Mock,
}

/// Decide the backend without building it.
pub fn select_provider(settings: &PipelineSettings) -> ProviderKind {
    let has_openai = settings.openai_api_key.is_some();
    let has_groq = settings.groq_api_key.is_some();

    match settings.llm_provider.as_deref() {
        Some("openai") if has_openai => return ProviderKind::OpenAi,
        Some("groq") if has_groq => return ProviderKind::Groq,
        Some("mock") => return ProviderKind::Mock,
        Some(other) => log::warn!(
            "LLM_PROVIDER={} requested but unusable, falling back to auto-detection",
            other
        ),
        None => {}
    }

    if has_openai {
        log::info!("Auto-detected LLM provider: OpenAI");
        ProviderKind::OpenAi
    } else if has_groq {
        log::info!("Auto-detected LLM provider: Groq");
        ProviderKind::Groq
    } else {
        log::warn!("No LLM API keys available, falling back to hermetic mock provider");
        ProviderKind::Mock
    }
}

fn http_config(
    settings: &PipelineSettings,
    default_url: &str,
    api_key: String,
    model: String,
) -> HttpModelConfig {
    let api_url = settings
        .llm_api_url
        .clone()
        .unwrap_or_else(|| default_url.to_string());
    HttpModelConfig {
        provider: HttpLanguageModel::determine_provider(&api_url).to_string(),
        api_url,
        api_key,
        model,
        max_retries: settings.llm_max_retries,
        initial_retry_delay_ms: settings.llm_initial_retry_delay_ms,
        max_retry_delay_ms: settings.llm_max_retry_delay_ms,
        request_timeout: std::time::Duration::from_secs(settings.llm_request_timeout_secs),
    }
}

/// Build the model client the settings ask for.
pub fn provider_from_settings(settings: &PipelineSettings) -> Arc<dyn LanguageModel> {
    match select_provider(settings) {
        ProviderKind::OpenAi => {
            let key = settings.openai_api_key.clone().unwrap_or_default();
            Arc::new(HttpLanguageModel::new(http_config(
                settings,
                OPENAI_API_URL,
                key,
                settings.model_name.clone(),
            )))
        }
        ProviderKind::Groq => {
            let key = settings.groq_api_key.clone().unwrap_or_default();
            // gpt-* names mean nothing to Groq
            let model = if settings.model_name.starts_with("gpt-") {
                GROQ_DEFAULT_MODEL.to_string()
            } else {
                settings.model_name.clone()
            };
            Arc::new(HttpLanguageModel::new(http_config(
                settings,
                GROQ_API_URL,
                key,
                model,
            )))
        }
        ProviderKind::Mock => Arc::new(MockLanguageModel::new()),
    }
}
