// persistence-rs/src/tests.rs

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use shared_types::{
    CulturalPersona, FeedbackAction, PersonaSource, SafetyFeedback, SafetyRule, ToneType,
    UserReliabilityRecord,
};

use crate::*;

const CACHE_TTL: Duration = Duration::from_secs(3600);

fn ledger() -> InMemoryLedger {
    InMemoryLedger::new(chrono::Duration::hours(48))
}

fn rule(industry: &str, department: &str, rules: &str) -> SafetyRule {
    SafetyRule {
        industry: industry.to_string(),
        department: department.to_string(),
        hr_keywords: vec![],
        semantic_rules: rules.to_string(),
        is_active: true,
        is_verified: true,
        onboarded_by: "ops@example.com".to_string(),
    }
}

fn feedback(id: &str, action: FeedbackAction, age_days: i64) -> SafetyFeedback {
    SafetyFeedback {
        intervention_id: id.to_string(),
        user_id: "dev-1".to_string(),
        manager_id: "mgr-1".to_string(),
        action,
        final_message: None,
        notes: None,
        created_at: Utc::now() - chrono::Duration::days(age_days),
    }
}

#[tokio::test]
async fn unknown_user_gets_default_snapshot() {
    let snapshot = ledger().get("nobody").await.unwrap();
    assert_eq!(snapshot.score, 100.0);
    assert_eq!(snapshot.external_chat_id, None);
    assert_eq!(snapshot.consecutive_firm, 0);
}

#[tokio::test]
async fn score_tracks_failure_ratio() {
    let ledger = ledger();

    let first = ledger.update("dev-1", true, ToneType::Firm).await.unwrap();
    assert_eq!(first.reliability_score(), 0.0);

    let second = ledger.update("dev-1", false, ToneType::Supportive).await.unwrap();
    assert_eq!(second.reliability_score(), 50.0);

    let third = ledger.update("dev-1", true, ToneType::Neutral).await.unwrap();
    assert!((third.reliability_score() - 33.33).abs() < 0.01);
    assert_eq!(third.total_commitments, 3);
    assert_eq!(third.failed_commitments, 2);
}

#[tokio::test]
async fn strict_tones_build_a_streak_and_soft_tones_reset_it() {
    let ledger = ledger();
    ledger.update("dev-1", true, ToneType::Firm).await.unwrap();
    let record = ledger.update("dev-1", true, ToneType::Confrontational).await.unwrap();
    assert_eq!(record.consecutive_firm_interventions, 2);
    assert!(record.last_intervention_at.is_some());

    let record = ledger.update("dev-1", false, ToneType::Neutral).await.unwrap();
    assert_eq!(record.consecutive_firm_interventions, 0);
    assert_eq!(ledger.get("dev-1").await.unwrap().consecutive_firm, 0);
}

#[tokio::test]
async fn stale_streak_resets_before_counting() {
    let ledger = ledger();
    let now = Utc::now();
    let mut record = UserReliabilityRecord::new("dev-1");
    record.total_commitments = 5;
    record.failed_commitments = 5;
    record.consecutive_firm_interventions = 5;
    record.last_intervention_at = Some(now - chrono::Duration::hours(49));
    ledger.upsert_record(record).await;

    let updated = ledger.update_at("dev-1", true, ToneType::Firm, now).await.unwrap();
    assert_eq!(updated.consecutive_firm_interventions, 1);
    assert_eq!(updated.last_intervention_at, Some(now));
}

#[tokio::test]
async fn streak_inside_cooling_off_window_keeps_growing() {
    let ledger = ledger();
    let now = Utc::now();
    let mut record = UserReliabilityRecord::new("dev-1");
    record.consecutive_firm_interventions = 2;
    record.last_intervention_at = Some(now - chrono::Duration::hours(47));
    ledger.upsert_record(record).await;

    let updated = ledger.update_at("dev-1", true, ToneType::Firm, now).await.unwrap();
    assert_eq!(updated.consecutive_firm_interventions, 3);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_updates_never_lose_increments() {
    let ledger = Arc::new(ledger());
    let mut handles = Vec::new();
    for i in 0..50 {
        let ledger = Arc::clone(&ledger);
        handles.push(tokio::spawn(async move {
            ledger
                .update("dev-1", i % 2 == 0, ToneType::Neutral)
                .await
                .unwrap();
        }));
    }
    for handle in handles {
        handle.await.unwrap();
    }

    let record = ledger.record("dev-1").await.unwrap().unwrap();
    assert_eq!(record.total_commitments, 50);
    assert_eq!(record.failed_commitments, 25);
    assert_eq!(ledger.user_count(), 1);
}

#[tokio::test]
async fn empty_user_id_is_rejected() {
    let err = ledger().update(" ", true, ToneType::Firm).await.unwrap_err();
    assert!(matches!(err, StoreError::InvalidInput(_)));
}

#[tokio::test]
async fn language_is_recorded_with_the_outcome() {
    let ledger = ledger();
    let record = ledger
        .update_with_language("dev-2", true, ToneType::Firm, Some("de"))
        .await
        .unwrap();
    assert_eq!(record.language_preference.as_deref(), Some("de"));
    assert_eq!(record.total_commitments, 1);
    assert_eq!(record.consecutive_firm_interventions, 1);

    let record = ledger
        .update_with_language("dev-2", false, ToneType::Supportive, None)
        .await
        .unwrap();
    assert_eq!(record.language_preference.as_deref(), Some("de"));
    assert_eq!(record.total_commitments, 2);
}

#[tokio::test]
async fn chat_id_and_context_create_the_row_lazily() {
    let ledger = ledger();
    ledger.set_chat_id("dev-1", "U123").await.unwrap();
    ledger.set_context("dev-1", "Finance", "Trading", true).await.unwrap();

    let record = ledger.record("dev-1").await.unwrap().unwrap();
    assert_eq!(record.external_chat_id.as_deref(), Some("U123"));
    assert_eq!(record.industry_type, "finance");
    assert_eq!(record.department, "trading");
    assert!(record.is_context_verified);
    assert_eq!(record.total_commitments, 0);
}

#[tokio::test]
async fn rule_lookup_falls_back_to_generic() {
    let store = InMemorySafetyRuleStore::new(CACHE_TTL);
    store.seed(vec![rule("generic", "*", "baseline")]);

    let found = store.get("finance", "trading").await.unwrap().unwrap();
    assert_eq!(found.industry, "generic");
}

#[tokio::test]
async fn setting_an_industry_rule_invalidates_cached_fallbacks() {
    let store = InMemorySafetyRuleStore::new(CACHE_TTL);
    store.seed(vec![rule("generic", "*", "baseline")]);
    assert_eq!(
        store.get("finance", "trading").await.unwrap().unwrap().industry,
        "generic"
    );

    store.set(rule("Finance", "*", "no advice")).await.unwrap();

    let found = store.get("finance", "trading").await.unwrap().unwrap();
    assert_eq!(found.industry, "finance");
    assert_eq!(found.department, "*");
    assert_eq!(found.semantic_rules, "no advice");
}

#[tokio::test]
async fn department_rule_beats_industry_wildcard() {
    let store = InMemorySafetyRuleStore::new(CACHE_TTL);
    store.seed(default_rules());
    store.set(rule("finance", "trading", "desk rules")).await.unwrap();

    let desk = store.get("FINANCE", "Trading").await.unwrap().unwrap();
    assert_eq!(desk.semantic_rules, "desk rules");

    let other = store.get("finance", "ops").await.unwrap().unwrap();
    assert_eq!(other.department, "*");
    assert!(other.hr_keywords.contains(&"FINRA".to_string()));
}

#[tokio::test]
async fn inactive_rules_are_skipped() {
    let store = InMemorySafetyRuleStore::new(CACHE_TTL);
    store.seed(default_rules());
    let mut disabled = rule("legal", "*", "disabled");
    disabled.is_active = false;
    store.set(disabled).await.unwrap();

    let found = store.get("legal", "contracts").await.unwrap().unwrap();
    assert_eq!(found.industry, "generic");
}

#[tokio::test]
async fn rule_without_onboarder_is_rejected() {
    let store = InMemorySafetyRuleStore::new(CACHE_TTL);
    let mut anonymous = rule("legal", "*", "x");
    anonymous.onboarded_by = String::new();
    assert!(matches!(
        store.set(anonymous).await,
        Err(StoreError::InvalidInput(_))
    ));
}

#[tokio::test]
async fn seeding_is_idempotent() {
    let store = InMemorySafetyRuleStore::new(CACHE_TTL);
    assert_eq!(store.seed(default_rules()), 4);
    assert_eq!(store.seed(default_rules()), 0);

    let generic = store.get("", "").await.unwrap().unwrap();
    assert_eq!(generic.onboarded_by, SYSTEM_ONBOARDER);
    assert!(generic.is_verified);
}

#[tokio::test]
async fn persona_lookup_is_case_insensitive() {
    let store = InMemoryPersonaStore::new(CACHE_TTL);
    assert_eq!(store.seed(system_personas()), 11);

    let british = store.get("EN-uk").await.unwrap().unwrap();
    assert_eq!(british.code, "en-uk");
    assert!(british.instruction.starts_with("British professional tone"));
    assert!(british.is_verified);

    let japanese = store.get("ja").await.unwrap().unwrap();
    assert_eq!(japanese.name, "Japanese (Wa)");
    assert!(store.get("xx").await.unwrap().is_none());
}

#[tokio::test]
async fn created_persona_replaces_cached_copy() {
    let store = InMemoryPersonaStore::new(CACHE_TTL);
    store.seed(system_personas());
    store.get("de").await.unwrap();

    let replacement = CulturalPersona {
        code: "DE".to_string(),
        name: "German (Custom)".to_string(),
        instruction: "Be brief.".to_string(),
        is_verified: false,
        source: PersonaSource::AutoAgent,
    };
    let stored = store.create(replacement).await.unwrap();
    assert_eq!(stored.code, "de");

    let fetched = store.get("de").await.unwrap().unwrap();
    assert_eq!(fetched.name, "German (Custom)");
    assert!(fetched.effective_instruction().ends_with(CulturalPersona::UNVERIFIED_SUFFIX));
}

#[test]
fn builtin_instruction_ignores_case() {
    assert!(builtin_instruction("PT-br").unwrap().contains("Jeitinho"));
    assert!(builtin_instruction("tlh").is_none());
}

#[tokio::test]
async fn acceptance_rate_defaults_to_one_without_feedback() {
    let loop_ = InMemoryFeedbackLoop::new(CACHE_TTL);
    assert_eq!(loop_.acceptance_rate(30).await.unwrap(), 1.0);
}

#[tokio::test]
async fn acceptance_rate_rounds_to_two_decimals() {
    let loop_ = InMemoryFeedbackLoop::new(CACHE_TTL);
    loop_.record(feedback("a", FeedbackAction::Accepted, 1)).await;
    loop_.record(feedback("b", FeedbackAction::Accepted, 2)).await;
    loop_.record(feedback("c", FeedbackAction::Rejected, 3)).await;
    loop_.record(feedback("d", FeedbackAction::Rejected, 45)).await;

    assert_eq!(loop_.acceptance_rate(30).await.unwrap(), 0.67);
    assert_eq!(loop_.acceptance_rate(60).await.unwrap(), 0.5);
}

#[tokio::test]
async fn acceptance_rate_is_cached_per_window() {
    let loop_ = InMemoryFeedbackLoop::new(CACHE_TTL);
    loop_.record(feedback("a", FeedbackAction::Rejected, 1)).await;
    assert_eq!(loop_.acceptance_rate(30).await.unwrap(), 0.0);

    loop_
        .log_decision("b", "dev-1", "mgr-1", "accepted", None, None)
        .await
        .unwrap();
    assert_eq!(loop_.acceptance_rate(30).await.unwrap(), 0.0);
    assert_eq!(loop_.acceptance_rate(7).await.unwrap(), 0.5);
}

#[tokio::test]
async fn audit_trail_returns_latest_decision() {
    let loop_ = InMemoryFeedbackLoop::new(CACHE_TTL);
    loop_
        .log_decision("int-1", "dev-1", "mgr-1", "rejected", None, Some("too harsh".into()))
        .await
        .unwrap();
    loop_
        .log_decision(
            "int-1",
            "dev-1",
            "mgr-2",
            "Modified",
            Some("Could you share an update?".into()),
            None,
        )
        .await
        .unwrap();

    let latest = loop_.audit_trail("int-1").await.unwrap().unwrap();
    assert_eq!(latest.action, FeedbackAction::Modified);
    assert_eq!(latest.manager_id, "mgr-2");
    assert!(loop_.audit_trail("int-2").await.unwrap().is_none());
}

#[tokio::test]
async fn unknown_feedback_action_is_rejected() {
    let loop_ = InMemoryFeedbackLoop::new(CACHE_TTL);
    let err = loop_
        .log_decision("int-1", "dev-1", "mgr-1", "ignored", None, None)
        .await
        .unwrap_err();
    assert!(matches!(err, StoreError::InvalidInput(_)));
    assert_eq!(loop_.acceptance_rate(30).await.unwrap(), 1.0);
}
