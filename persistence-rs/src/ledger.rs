// persistence-rs/src/ledger.rs
// Reliability ledger: per-user commitment counters and tone-damping state.
//
// Every update is a read-modify-write under a per-row lock, so concurrent
// evaluations for one user never lose an increment.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use shared_types::{ReliabilitySnapshot, ToneType, UserReliabilityRecord};
use tokio::sync::Mutex;

use crate::error::StoreError;

#[async_trait]
pub trait ReliabilityLedger: Send + Sync {
    /// Score, chat id and consecutive firm count; `(100, None, 0)` for unknown users.
    async fn get(&self, user_id: &str) -> Result<ReliabilitySnapshot, StoreError>;

    /// Full record, if the user has one.
    async fn record(&self, user_id: &str) -> Result<Option<UserReliabilityRecord>, StoreError>;

    /// Apply one evaluation outcome at `now`.
    async fn update_at(
        &self,
        user_id: &str,
        was_failure: bool,
        tone_used: ToneType,
        now: DateTime<Utc>,
    ) -> Result<UserReliabilityRecord, StoreError>;

    async fn update(
        &self,
        user_id: &str,
        was_failure: bool,
        tone_used: ToneType,
    ) -> Result<UserReliabilityRecord, StoreError> {
        self.update_at(user_id, was_failure, tone_used, Utc::now()).await
    }

    /// Apply one evaluation outcome and, in the same write, remember the
    /// language the user wrote in when it is known.
    async fn update_with_language(
        &self,
        user_id: &str,
        was_failure: bool,
        tone_used: ToneType,
        language: Option<&str>,
    ) -> Result<UserReliabilityRecord, StoreError>;

    async fn set_chat_id(&self, user_id: &str, chat_id: &str) -> Result<(), StoreError>;

    /// Pin the user's organisational context; `verified` locks it against overrides.
    async fn set_context(
        &self,
        user_id: &str,
        industry: &str,
        department: &str,
        verified: bool,
    ) -> Result<(), StoreError>;
}

/// Apply counter and cooling-off rules to one record.
///
/// A stale strict streak (older than `cooling_off`) resets before the new
/// tone is counted, so a strict tone after a long pause yields a streak of 1.
pub fn apply_outcome(
    record: &mut UserReliabilityRecord,
    was_failure: bool,
    tone_used: ToneType,
    now: DateTime<Utc>,
    cooling_off: Duration,
) {
    record.total_commitments += 1;
    if was_failure {
        record.failed_commitments += 1;
    }

    if let Some(last) = record.last_intervention_at {
        if now - last > cooling_off && record.consecutive_firm_interventions > 0 {
            tracing::info!(
                user_id = %record.user_id,
                previous_streak = record.consecutive_firm_interventions,
                "cooling_off_reset"
            );
            record.consecutive_firm_interventions = 0;
        }
    }

    if tone_used.is_strict() {
        record.consecutive_firm_interventions += 1;
        record.last_intervention_at = Some(now);
    } else {
        record.consecutive_firm_interventions = 0;
    }
}

type Row = Arc<Mutex<UserReliabilityRecord>>;

/// Process-local ledger keyed by user id.
#[derive(Debug)]
pub struct InMemoryLedger {
    rows: DashMap<String, Row>,
    cooling_off: Duration,
}

impl InMemoryLedger {
    pub fn new(cooling_off: Duration) -> Self {
        Self {
            rows: DashMap::new(),
            cooling_off,
        }
    }

    pub fn from_settings(settings: &config_rs::PipelineSettings) -> Self {
        Self::new(settings.cooling_off_period())
    }

    /// Insert or replace a whole record, e.g. when importing history.
    pub async fn upsert_record(&self, record: UserReliabilityRecord) {
        let row = self.row(&record.user_id);
        let mut guard = row.lock().await;
        *guard = record;
    }

    pub fn user_count(&self) -> usize {
        self.rows.len()
    }

    async fn apply(
        &self,
        user_id: &str,
        was_failure: bool,
        tone_used: ToneType,
        language: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<UserReliabilityRecord, StoreError> {
        if user_id.trim().is_empty() {
            return Err(StoreError::InvalidInput("user_id must not be empty".to_string()));
        }

        let row = self.row(user_id);
        let mut record = row.lock().await;
        apply_outcome(&mut record, was_failure, tone_used, now, self.cooling_off);
        if let Some(code) = language {
            record.language_preference = Some(code.to_string());
        }

        tracing::info!(
            user_id,
            new_score = record.reliability_score(),
            consecutive_firm = record.consecutive_firm_interventions,
            was_failure,
            tone = %tone_used,
            "reliability_updated"
        );
        Ok(record.clone())
    }

    fn existing_row(&self, user_id: &str) -> Option<Row> {
        self.rows.get(user_id).map(|row| Arc::clone(row.value()))
    }

    // The map guard is released before the caller awaits the row lock.
    fn row(&self, user_id: &str) -> Row {
        Arc::clone(
            self.rows
                .entry(user_id.to_string())
                .or_insert_with(|| Arc::new(Mutex::new(UserReliabilityRecord::new(user_id))))
                .value(),
        )
    }
}

#[async_trait]
impl ReliabilityLedger for InMemoryLedger {
    async fn get(&self, user_id: &str) -> Result<ReliabilitySnapshot, StoreError> {
        let Some(row) = self.existing_row(user_id) else {
            return Ok(ReliabilitySnapshot::default());
        };
        let snapshot = row.lock().await.snapshot();
        Ok(snapshot)
    }

    async fn record(&self, user_id: &str) -> Result<Option<UserReliabilityRecord>, StoreError> {
        let Some(row) = self.existing_row(user_id) else {
            return Ok(None);
        };
        let record = row.lock().await.clone();
        Ok(Some(record))
    }

    async fn update_at(
        &self,
        user_id: &str,
        was_failure: bool,
        tone_used: ToneType,
        now: DateTime<Utc>,
    ) -> Result<UserReliabilityRecord, StoreError> {
        self.apply(user_id, was_failure, tone_used, None, now).await
    }

    async fn update_with_language(
        &self,
        user_id: &str,
        was_failure: bool,
        tone_used: ToneType,
        language: Option<&str>,
    ) -> Result<UserReliabilityRecord, StoreError> {
        self.apply(user_id, was_failure, tone_used, language, Utc::now())
            .await
    }

    async fn set_chat_id(&self, user_id: &str, chat_id: &str) -> Result<(), StoreError> {
        let row = self.row(user_id);
        row.lock().await.external_chat_id = Some(chat_id.to_string());
        Ok(())
    }


    async fn set_context(
        &self,
        user_id: &str,
        industry: &str,
        department: &str,
        verified: bool,
    ) -> Result<(), StoreError> {
        let row = self.row(user_id);
        let mut record = row.lock().await;
        record.industry_type = industry.to_lowercase();
        record.department = department.to_lowercase();
        record.is_context_verified = verified;
        tracing::info!(user_id, industry, department, verified, "user_context_set");
        Ok(())
    }
}
