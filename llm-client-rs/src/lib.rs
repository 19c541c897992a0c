// llm-client-rs/src/lib.rs
//
// Model invocation boundary for the pipeline: "given a message list and a
// target schema, return a validated instance of that schema".

mod error;
mod llm_client;
mod mock;
mod provider;
mod structured;

pub use error::LLMError;
pub use llm_client::{HttpLanguageModel, HttpModelConfig, GROQ_API_URL, OPENAI_API_URL};
pub use mock::MockLanguageModel;
pub use provider::{provider_from_settings, select_provider, ProviderKind};
pub use structured::{
    complete_structured, extract_json, ChatMessage, CompletionRequest, LanguageModel,
};

#[cfg(test)]
mod tests;
