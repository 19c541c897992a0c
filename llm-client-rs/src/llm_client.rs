// llm-client-rs/src/llm_client.rs
//
// HTTP client for OpenAI-compatible chat completion endpoints
//
// This module provides:
// - Real HTTP calls to the provider via reqwest, asking for a JSON object reply
// - Exponential backoff retry with jitter for transient failures
// - Classification of retryable vs. non-retryable errors by status code
//
// Configuration comes from `PipelineSettings`:
// - LLM_API_URL: endpoint override (defaults per provider)
// - LLM_MODEL: model to use
// - LLM_MAX_RETRIES: maximum number of retry attempts (default: 3)
// - LLM_INITIAL_RETRY_DELAY_MS: initial delay between retries in ms (default: 1000)
// - LLM_MAX_RETRY_DELAY_MS: maximum delay between retries in ms (default: 10000)

use async_trait::async_trait;
use backoff::{backoff::Backoff, ExponentialBackoff, ExponentialBackoffBuilder};
use rand::Rng;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::time::Duration;

use crate::error::LLMError;
use crate::structured::{extract_json, ChatMessage, CompletionRequest, LanguageModel};

pub const OPENAI_API_URL: &str = "https://api.openai.com/v1/chat/completions";
pub const GROQ_API_URL: &str = "https://api.groq.com/openai/v1/chat/completions";
pub const GROQ_DEFAULT_MODEL: &str = "llama-3.3-70b-versatile";

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    response_format: Value,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<ChatChoice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct Usage {
    total_tokens: u32,
}

/// Connection and retry parameters for one HTTP provider.
#[derive(Debug, Clone)]
pub struct HttpModelConfig {
    pub provider: String,
    pub api_url: String,
    pub api_key: String,
    pub model: String,
    pub max_retries: u32,
    pub initial_retry_delay_ms: u64,
    pub max_retry_delay_ms: u64,
    pub request_timeout: Duration,
}

#[derive(Debug)]
pub struct HttpLanguageModel {
    client: Client,
    config: HttpModelConfig,
}

impl HttpLanguageModel {
    pub fn new(config: HttpModelConfig) -> Self {
        let client = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .unwrap_or_default();

        log::info!(
            "LLM client initialized for provider {} (model: {}, max retries: {})",
            config.provider,
            config.model,
            config.max_retries
        );

        Self { client, config }
    }

    /// Provider label for logs; `LLM_API_URL` overrides report as "default"
    pub fn determine_provider(api_url: &str) -> &'static str {
        if api_url.contains("openai.com") {
            "openai"
        } else if api_url.contains("groq.com") {
            "groq"
        } else {
            "default"
        }
    }

    pub fn is_configured(&self) -> bool {
        !self.config.api_key.is_empty()
    }

    /// Exponential backoff policy with jitter
    ///
    /// Starts at the initial delay, doubles after each failed attempt, adds
    /// randomization, and caps both the single delay and the total elapsed time.
    fn create_backoff(&self) -> ExponentialBackoff {
        ExponentialBackoffBuilder::new()
            .with_initial_interval(Duration::from_millis(self.config.initial_retry_delay_ms))
            .with_max_interval(Duration::from_millis(self.config.max_retry_delay_ms))
            .with_multiplier(2.0)
            .with_max_elapsed_time(Some(Duration::from_secs(120)))
            .with_randomization_factor(0.5)
            .build()
    }

    // Execute a single request attempt
    async fn execute_request(&self, body: &ChatCompletionRequest<'_>) -> Result<Value, LLMError> {
        if !self.is_configured() {
            return Err(LLMError::InvalidRequest("API key is not set".to_string()));
        }

        let response = self
            .client
            .post(&self.config.api_url)
            .header("Authorization", format!("Bearer {}", self.config.api_key))
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|err| {
                if err.is_timeout() {
                    LLMError::NetworkError(format!("Request timed out: {}", err))
                } else if err.is_connect() {
                    LLMError::NetworkError(format!("Connection failed: {}", err))
                } else {
                    LLMError::NetworkError(format!("Network error: {}", err))
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(LLMError::from_status(status.as_u16(), &text));
        }

        let data: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|err| LLMError::ParseError(format!("Failed to parse response: {}", err)))?;

        if let Some(usage) = &data.usage {
            log::info!("LLM request completed. Used {} tokens", usage.total_tokens);
        }

        let choice = data
            .choices
            .first()
            .ok_or_else(|| LLMError::ParseError("No choices returned in response".to_string()))?;
        extract_json(&choice.message.content)
    }
}

#[async_trait]
impl LanguageModel for HttpLanguageModel {
    fn provider_name(&self) -> &str {
        &self.config.provider
    }

    /// Runs the request with exponential backoff on retryable errors.
    async fn complete(&self, request: &CompletionRequest) -> Result<Value, LLMError> {
        let mut backoff = self.create_backoff();
        let mut attempt = 0;

        let body = ChatCompletionRequest {
            model: &self.config.model,
            messages: &request.messages,
            temperature: 0.2,
            response_format: json!({ "type": "json_object" }),
        };

        log::info!(
            "Preparing LLM request '{}' to {} (model: {})",
            request.schema,
            self.config.api_url,
            self.config.model
        );

        loop {
            attempt += 1;

            if attempt > 1 {
                log::info!("Retry attempt {} for LLM request '{}'", attempt, request.schema);
            }

            match self.execute_request(&body).await {
                Ok(value) => return Ok(value),
                Err(err) => {
                    if !err.is_retryable() || attempt > self.config.max_retries {
                        log::error!("LLM request failed after {} attempts: {}", attempt, err);
                        return Err(err);
                    }

                    match backoff.next_backoff() {
                        Some(backoff_duration) => {
                            let jitter = rand::thread_rng().gen_range(0..=200);
                            let jittered = backoff_duration + Duration::from_millis(jitter);
                            log::warn!("Retryable error: {}. Retrying in {:?}", err, jittered);
                            tokio::time::sleep(jittered).await;
                        }
                        None => {
                            log::error!("Exceeded maximum backoff time: {}", err);
                            return Err(err);
                        }
                    }
                }
            }
        }
    }
}
