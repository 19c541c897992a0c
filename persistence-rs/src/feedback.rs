// persistence-rs/src/feedback.rs
// Manager feedback on supervisor interventions, and the acceptance-rate signal
// derived from it.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use shared_types::{FeedbackAction, SafetyFeedback};
use tokio::sync::RwLock;

use crate::cache::TtlCache;
use crate::error::StoreError;

#[async_trait]
pub trait FeedbackLoop: Send + Sync {
    /// Record a manager decision; `action` must be accepted, rejected or modified.
    async fn log_decision(
        &self,
        intervention_id: &str,
        user_id: &str,
        manager_id: &str,
        action: &str,
        final_message: Option<String>,
        notes: Option<String>,
    ) -> Result<SafetyFeedback, StoreError>;

    /// Share of accepted interventions over the last `window_days`, rounded to
    /// two decimals; 1.0 when there is no feedback.
    async fn acceptance_rate(&self, window_days: i64) -> Result<f64, StoreError>;

    /// Latest manager decision recorded for an intervention.
    async fn audit_trail(&self, intervention_id: &str)
        -> Result<Option<SafetyFeedback>, StoreError>;
}

pub struct InMemoryFeedbackLoop {
    entries: RwLock<Vec<SafetyFeedback>>,
    rate_cache: TtlCache<f64>,
}

/// Acceptance over `entries` newer than `now - window_days`.
pub fn compute_acceptance_rate(
    entries: &[SafetyFeedback],
    window_days: i64,
    now: DateTime<Utc>,
) -> f64 {
    let cutoff = now - chrono::Duration::days(window_days);
    let (total, accepted) = entries
        .iter()
        .filter(|entry| entry.created_at >= cutoff)
        .fold((0u32, 0u32), |(total, accepted), entry| {
            let hit = u32::from(entry.action == FeedbackAction::Accepted);
            (total + 1, accepted + hit)
        });

    if total == 0 {
        return 1.0;
    }
    (f64::from(accepted) / f64::from(total) * 100.0).round() / 100.0
}

impl InMemoryFeedbackLoop {
    pub fn new(cache_ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(Vec::new()),
            rate_cache: TtlCache::new(cache_ttl),
        }
    }

    /// Append an already-built entry (history import, tests).
    pub async fn record(&self, feedback: SafetyFeedback) {
        self.entries.write().await.push(feedback);
    }
}

#[async_trait]
impl FeedbackLoop for InMemoryFeedbackLoop {
    async fn log_decision(
        &self,
        intervention_id: &str,
        user_id: &str,
        manager_id: &str,
        action: &str,
        final_message: Option<String>,
        notes: Option<String>,
    ) -> Result<SafetyFeedback, StoreError> {
        let action: FeedbackAction = action.parse().map_err(StoreError::InvalidInput)?;
        if intervention_id.trim().is_empty() {
            return Err(StoreError::InvalidInput(
                "intervention_id must not be empty".to_string(),
            ));
        }

        let feedback = SafetyFeedback {
            intervention_id: intervention_id.to_string(),
            user_id: user_id.to_string(),
            manager_id: manager_id.to_string(),
            action,
            final_message,
            notes,
            created_at: Utc::now(),
        };
        self.record(feedback.clone()).await;

        tracing::info!(
            intervention_id,
            manager_id,
            action = %action,
            "safety_feedback_logged"
        );
        Ok(feedback)
    }

    async fn acceptance_rate(&self, window_days: i64) -> Result<f64, StoreError> {
        let key = window_days.to_string();
        if let Some(rate) = self.rate_cache.get(&key) {
            return Ok(rate);
        }

        let rate = {
            let entries = self.entries.read().await;
            compute_acceptance_rate(&entries, window_days, Utc::now())
        };
        self.rate_cache.insert(key, rate);
        tracing::debug!(window_days, rate, "acceptance_rate_recomputed");
        Ok(rate)
    }

    async fn audit_trail(
        &self,
        intervention_id: &str,
    ) -> Result<Option<SafetyFeedback>, StoreError> {
        let entries = self.entries.read().await;
        Ok(entries
            .iter()
            .rev()
            .find(|entry| entry.intervention_id == intervention_id)
            .cloned())
    }
}
