// orchestrator-service-rs/src/notifier.rs
// Outbound chat notifications. Delivery is fire-and-forget: failures are
// logged and never reach the caller.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn send(&self, text: &str, mention: Option<&str>);
}

/// Render the webhook text, prefixing a chat mention when one is known.
pub fn format_message(text: &str, mention: Option<&str>) -> String {
    match mention {
        Some(id) if !id.trim().is_empty() => format!("<@{}> {}", id.trim(), text),
        _ => text.to_string(),
    }
}

/// Posts `{"text": ...}` to an incoming-webhook URL.
pub struct SlackNotifier {
    client: reqwest::Client,
    webhook_url: Option<String>,
}

impl SlackNotifier {
    pub fn new(webhook_url: Option<String>) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self {
            client,
            webhook_url,
        }
    }

    pub fn from_settings(settings: &config_rs::PipelineSettings) -> Self {
        Self::new(settings.slack_webhook_url.clone())
    }
}

#[async_trait]
impl Notifier for SlackNotifier {
    async fn send(&self, text: &str, mention: Option<&str>) {
        let Some(url) = self.webhook_url.as_deref() else {
            tracing::warn!("slack_webhook_missing_skipping_notification");
            return;
        };

        let payload = json!({ "text": format_message(text, mention) });
        match self.client.post(url).json(&payload).send().await {
            Ok(response) if response.status().is_success() => {
                tracing::info!(mention = ?mention, "slack_notification_sent");
            }
            Ok(response) => {
                tracing::error!(status = %response.status(), "slack_notification_rejected");
            }
            Err(e) => {
                tracing::error!(error = %e, "slack_notification_failed");
            }
        }
    }
}
