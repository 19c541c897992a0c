// llm-client-rs/src/structured.rs
//
// The model invocation boundary: a provider turns a message list into a JSON
// value, and `complete_structured` turns that value into a validated instance
// of the requested schema type.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use shared_types::StructuredOutput;

use crate::error::LLMError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// One structured completion call.
///
/// `metadata` carries the typed inputs the prompt was rendered from. Remote
/// providers ignore it; the deterministic provider decides from it.
#[derive(Debug, Clone)]
pub struct CompletionRequest {
    pub schema: &'static str,
    pub messages: Vec<ChatMessage>,
    pub metadata: Value,
}

#[async_trait]
pub trait LanguageModel: Send + Sync {
    fn provider_name(&self) -> &str;

    fn is_mock(&self) -> bool {
        false
    }

    /// Return the raw JSON object produced for `request.schema`.
    async fn complete(&self, request: &CompletionRequest) -> Result<Value, LLMError>;
}

/// Ask `model` for a `T` and validate the answer.
///
/// A response that does not deserialize into `T`, or that fails `T::validate`,
/// is a hard failure of the call.
pub async fn complete_structured<T: StructuredOutput>(
    model: &dyn LanguageModel,
    mut messages: Vec<ChatMessage>,
    metadata: Value,
) -> Result<T, LLMError> {
    messages.push(ChatMessage::system(format!(
        "Respond ONLY with a single JSON object of this shape: {}",
        T::SCHEMA_HINT
    )));

    let request = CompletionRequest {
        schema: T::SCHEMA_NAME,
        messages,
        metadata,
    };

    let value = model.complete(&request).await?;
    let parsed: T = serde_json::from_value(value)
        .map_err(|e| LLMError::schema_violation(T::SCHEMA_NAME, e.to_string()))?;
    parsed
        .validate()
        .map_err(|reason| LLMError::schema_violation(T::SCHEMA_NAME, reason))?;

    log::debug!(
        "Structured completion '{}' succeeded via {}",
        T::SCHEMA_NAME,
        model.provider_name()
    );
    Ok(parsed)
}

/// Pull a JSON object out of a model reply, tolerating markdown fences and
/// surrounding prose.
pub fn extract_json(content: &str) -> Result<Value, LLMError> {
    let trimmed = content.trim();
    if let Ok(value) = serde_json::from_str::<Value>(trimmed) {
        return Ok(value);
    }

    match (trimmed.find('{'), trimmed.rfind('}')) {
        (Some(start), Some(end)) if end > start => serde_json::from_str(&trimmed[start..=end])
            .map_err(|e| LLMError::ParseError(format!("Invalid JSON in response: {}", e))),
        _ => Err(LLMError::ParseError(
            "Response does not contain a JSON object".to_string(),
        )),
    }
}
