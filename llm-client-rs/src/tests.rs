// llm-client-rs/src/tests.rs
// Tests for provider selection, error classification and the hermetic provider

use async_trait::async_trait;
use config_rs::PipelineSettings;
use serde_json::{json, Value};
use shared_types::{
    AgentDecision, BurnoutDetection, CommitmentRecord, ExcuseAnalysis, ExcuseCategory,
    RiskAssessment, RiskLevel, SlippageAnalysis, SlippageStatus, ToneType, TruthGapAnalysis,
};
use std::time::Duration;

use crate::*;

struct FixedModel(Value);

#[async_trait]
impl LanguageModel for FixedModel {
    fn provider_name(&self) -> &str {
        "fixed"
    }

    async fn complete(&self, _request: &CompletionRequest) -> Result<Value, LLMError> {
        Ok(self.0.clone())
    }
}

async fn mock_decision(burnout: bool, reliability: f64, consecutive: u32) -> AgentDecision {
    mock_decision_with(burnout, reliability, consecutive, "high").await
}

async fn mock_decision_with(
    burnout: bool,
    reliability: f64,
    consecutive: u32,
    directness: &str,
) -> AgentDecision {
    complete_structured::<AgentDecision>(
        &MockLanguageModel::new(),
        vec![ChatMessage::user("decide")],
        json!({
            "burnout_at_risk": burnout,
            "burnout_recommendation": "Suggest time off",
            "reliability_score": reliability,
            "consecutive_firm_calls": consecutive,
            "directness": directness,
        }),
    )
    .await
    .unwrap()
}

#[test]
fn test_error_classification() {
    assert!(LLMError::from_status(503, "busy").is_retryable());
    assert!(LLMError::from_status(429, "slow down").is_retryable());
    assert!(LLMError::NetworkError("reset".into()).is_retryable());
    assert!(!LLMError::from_status(401, "bad key").is_retryable());
    assert!(!LLMError::from_status(400, "bad body").is_retryable());
    assert!(!LLMError::schema_violation("excuse_analysis", "missing field").is_retryable());
    assert!(matches!(
        LLMError::from_status(418, "teapot"),
        LLMError::UnknownError(_)
    ));
}

#[test]
fn test_provider_selection() {
    let mut settings = PipelineSettings::default();
    assert_eq!(select_provider(&settings), ProviderKind::Mock);

    settings.groq_api_key = Some("gsk".into());
    assert_eq!(select_provider(&settings), ProviderKind::Groq);

    settings.openai_api_key = Some("sk".into());
    assert_eq!(select_provider(&settings), ProviderKind::OpenAi);

    settings.llm_provider = Some("groq".into());
    assert_eq!(select_provider(&settings), ProviderKind::Groq);

    settings.llm_provider = Some("mock".into());
    assert_eq!(select_provider(&settings), ProviderKind::Mock);
    assert!(provider_from_settings(&settings).is_mock());
}

#[test]
fn test_determine_provider() {
    assert_eq!(HttpLanguageModel::determine_provider(OPENAI_API_URL), "openai");
    assert_eq!(HttpLanguageModel::determine_provider(GROQ_API_URL), "groq");
    assert_eq!(
        HttpLanguageModel::determine_provider("http://example.internal/v1"),
        "default"
    );
    assert_eq!(
        HttpLanguageModel::determine_provider("https://openrouter.ai/api/v1/chat/completions"),
        "default"
    );
}

#[test]
fn test_extract_json_tolerates_fences() {
    let value = extract_json("```json\n{\"code\": \"de\"}\n```").unwrap();
    assert_eq!(value, json!({"code": "de"}));
    assert!(matches!(
        extract_json("no json here"),
        Err(LLMError::ParseError(_))
    ));
}

#[tokio::test]
async fn test_missing_key_fails_without_retrying() {
    let model = HttpLanguageModel::new(HttpModelConfig {
        provider: "openai".into(),
        api_url: OPENAI_API_URL.into(),
        api_key: String::new(),
        model: "gpt-4o".into(),
        max_retries: 3,
        initial_retry_delay_ms: 1000,
        max_retry_delay_ms: 10_000,
        request_timeout: Duration::from_secs(5),
    });
    assert!(!model.is_configured());

    let request = CompletionRequest {
        schema: "excuse_analysis",
        messages: vec![ChatMessage::user("hi")],
        metadata: Value::Null,
    };
    let err = model.complete(&request).await.unwrap_err();
    assert!(matches!(err, LLMError::InvalidRequest(_)));
}

#[tokio::test]
async fn test_shape_mismatch_is_schema_violation() {
    let model = FixedModel(json!({"category": "legitimate"}));
    let err = complete_structured::<ExcuseAnalysis>(&model, vec![], Value::Null)
        .await
        .unwrap_err();
    assert!(matches!(err, LLMError::SchemaViolation { ref schema, .. } if schema == "excuse_analysis"));
}

#[tokio::test]
async fn test_out_of_range_value_is_schema_violation() {
    let model = FixedModel(json!({
        "risk_score": 3.0,
        "level": "high",
        "predicted_latency_days": 2,
        "mitigation_strategy": "pair up"
    }));
    let err = complete_structured::<RiskAssessment>(&model, vec![], Value::Null)
        .await
        .unwrap_err();
    match err {
        LLMError::SchemaViolation { reason, .. } => assert!(reason.contains("risk_score")),
        other => panic!("expected schema violation, got {:?}", other),
    }
}

#[tokio::test]
async fn test_mock_excuse_keywords() {
    let model = MockLanguageModel::new();
    for (text, expected) in [
        ("My family had an emergency", ExcuseCategory::Legitimate),
        ("I'm so tired, I want to give up", ExcuseCategory::BurnoutSignal),
        ("The dog ate my laptop", ExcuseCategory::Deflection),
    ] {
        let excuse: ExcuseAnalysis =
            complete_structured(&model, vec![], json!({ "text": text })).await.unwrap();
        assert_eq!(excuse.category, expected, "text: {}", text);
        assert_eq!(excuse.confidence_score, 0.95);
    }
}

#[tokio::test]
async fn test_mock_burnout_and_risk() {
    let model = MockLanguageModel::new();
    let burnout: BurnoutDetection =
        complete_structured(&model, vec![], json!({"text": "This is too much, I cannot cope"}))
            .await
            .unwrap();
    assert!(burnout.is_at_risk);
    assert_eq!(burnout.sentiment_indicators, vec!["high_fatigue".to_string()]);

    let risk: RiskAssessment = complete_structured(
        &model,
        vec![],
        json!({"history": "", "status": "The release is delayed again"}),
    )
    .await
    .unwrap();
    assert_eq!(risk.level, RiskLevel::High);

    let calm: RiskAssessment =
        complete_structured(&model, vec![], json!({"history": "", "status": "All done"}))
            .await
            .unwrap();
    assert_eq!(calm.level, RiskLevel::Low);
}

#[tokio::test]
async fn test_mock_decision_burnout_override_dominates() {
    for (reliability, consecutive) in [(5.0, 0), (35.0, 1), (90.0, 5)] {
        let decision = mock_decision(true, reliability, consecutive).await;
        assert_eq!(decision.tone, ToneType::Supportive);
        assert!(decision.escalates());
        assert_eq!(
            decision.message,
            "I hear you. It sounds like you're reaching your limit. Suggest time off."
        );
    }
}

#[tokio::test]
async fn test_mock_decision_cooling_off_damping() {
    for reliability in [5.0, 35.0, 90.0] {
        let decision = mock_decision(false, reliability, 3).await;
        assert_eq!(decision.tone, ToneType::Neutral, "reliability: {}", reliability);
        assert_eq!(
            decision.message,
            "Let's reset and focus on a small, achievable win today. No pressure."
        );
    }
}

#[tokio::test]
async fn test_mock_decision_low_directness_softens_firm_language() {
    for reliability in [35.0, 10.0] {
        let direct = mock_decision_with(false, reliability, 0, "high").await;
        let soft = mock_decision_with(false, reliability, 0, "low").await;
        assert_ne!(direct.message, soft.message);
        assert_eq!(soft.tone, ToneType::Firm);
        assert!(soft.tone.severity() <= direct.tone.severity());
        assert!(soft.escalates());
    }
}

#[tokio::test]
async fn test_mock_decision_reliability_scaling_is_monotonic() {
    let mut previous = 0;
    for score in [100.0, 50.0, 49.9, 20.0, 19.9, 0.0] {
        let decision = mock_decision(false, score, 0).await;
        let severity = decision.tone.severity();
        assert!(severity >= previous, "severity dropped at score {}", score);
        previous = severity;
    }

    assert_eq!(mock_decision(false, 50.0, 0).await.tone, ToneType::Supportive);
    assert_eq!(mock_decision(false, 35.0, 0).await.tone, ToneType::Firm);
    assert_eq!(mock_decision(false, 10.0, 0).await.tone, ToneType::Confrontational);
    assert_eq!(mock_decision(false, 80.0, 0).await.action, "none");
}

#[tokio::test]
async fn test_mock_commitment_extraction() {
    let model = MockLanguageModel::new();
    let record: CommitmentRecord = complete_structured(
        &model,
        vec![],
        json!({ "text": "bob: can someone own the report? alice: I'll ship the quarterly report by Friday" }),
    )
    .await
    .unwrap();
    assert!(record.commitment_found);
    assert_eq!(record.who.as_deref(), Some("alice"));
    assert_eq!(record.what.as_deref(), Some("ship the quarterly report"));
    assert_eq!(record.when.as_deref(), Some("Friday"));

    let chatter: CommitmentRecord =
        complete_structured(&model, vec![], json!({ "text": "lunch anyone? sure, noon works" }))
            .await
            .unwrap();
    assert_eq!(chatter, CommitmentRecord::none());
}

#[tokio::test]
async fn test_mock_slippage_flags_shadow_debt() {
    let model = MockLanguageModel::new();
    let slipping: SlippageAnalysis = complete_structured(
        &model,
        vec![],
        json!({
            "promised": ["Refactor API", "Fix CSS", "Update Docs"],
            "delivered": "Only updated some typos in README. No major code changes detected.",
        }),
    )
    .await
    .unwrap();
    assert_eq!(slipping.status, SlippageStatus::ShadowDebt);
    assert!(slipping.intervention_required);
    assert!((slipping.fulfillment_ratio - 1.0 / 3.0).abs() < 1e-9);

    let delivered: SlippageAnalysis = complete_structured(
        &model,
        vec![],
        json!({
            "promised": ["Update Docs"],
            "delivered": "Updated docs for the billing module",
        }),
    )
    .await
    .unwrap();
    assert_eq!(delivered.status, SlippageStatus::OnTrack);
    assert!(!delivered.intervention_required);
}

#[tokio::test]
async fn test_mock_truth_gap() {
    let model = MockLanguageModel::new();
    let gap: TruthGapAnalysis = complete_structured(
        &model,
        vec![],
        json!({
            "claims": "I am 90% done with the refactor",
            "evidence": "Only updated some typos in README",
        }),
    )
    .await
    .unwrap();
    assert!(gap.gap_detected);
    assert_eq!(gap.recommended_tone, ToneType::Firm);

    let honest: TruthGapAnalysis = complete_structured(
        &model,
        vec![],
        json!({ "claims": "Still working on it", "evidence": "Two commits to the parser" }),
    )
    .await
    .unwrap();
    assert!(!honest.gap_detected);
}

#[tokio::test]
async fn test_mock_rejects_unknown_schema() {
    let request = CompletionRequest {
        schema: "weather_report",
        messages: vec![],
        metadata: Value::Null,
    };
    assert!(MockLanguageModel::new().complete(&request).await.is_err());
}
