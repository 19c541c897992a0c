// shared-types-rs/src/agents.rs
// Classifier outputs, decisions and supervision records for one evaluation.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::structured::{check_unit_interval, StructuredOutput};

pub const ACTION_NONE: &str = "none";
pub const ACTION_ESCALATE: &str = "escalate_to_manager";

/// One self-reported status update against a prior commitment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CheckIn {
    pub user_id: String,
    pub commitment: String,
    pub check_in: String,
    /// Explicit language code; detected from the text when absent.
    #[serde(default)]
    pub lang: Option<String>,
    /// Explicit industry, or `AUTO` to sense it from the text.
    #[serde(default)]
    pub industry: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExcuseCategory {
    Legitimate,
    Deflection,
    BurnoutSignal,
}

impl fmt::Display for ExcuseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Legitimate => write!(f, "legitimate"),
            Self::Deflection => write!(f, "deflection"),
            Self::BurnoutSignal => write!(f, "burnout_signal"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExcuseAnalysis {
    pub category: ExcuseCategory,
    pub confidence_score: f64,
    pub reasoning: String,
}

impl ExcuseAnalysis {
    /// A non-legitimate excuse counts as a failed commitment.
    pub fn is_failure(&self) -> bool {
        self.category != ExcuseCategory::Legitimate
    }
}

impl StructuredOutput for ExcuseAnalysis {
    const SCHEMA_NAME: &'static str = "excuse_analysis";
    const SCHEMA_HINT: &'static str = r#"{"category": "legitimate" | "deflection" | "burnout_signal", "confidence_score": number in [0,1], "reasoning": string}"#;

    fn validate(&self) -> Result<(), String> {
        check_unit_interval("confidence_score", self.confidence_score)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl RiskLevel {
    /// High and critical risk schedule a proactive follow-up.
    pub fn needs_follow_up(&self) -> bool {
        matches!(self, Self::High | Self::Critical)
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
            Self::Critical => write!(f, "critical"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    pub risk_score: f64,
    pub level: RiskLevel,
    pub predicted_latency_days: i64,
    pub mitigation_strategy: String,
}

impl StructuredOutput for RiskAssessment {
    const SCHEMA_NAME: &'static str = "risk_assessment";
    const SCHEMA_HINT: &'static str = r#"{"risk_score": number in [0,1], "level": "low" | "medium" | "high" | "critical", "predicted_latency_days": integer, "mitigation_strategy": string}"#;

    fn validate(&self) -> Result<(), String> {
        check_unit_interval("risk_score", self.risk_score)?;
        if self.predicted_latency_days < 0 {
            return Err(format!(
                "predicted_latency_days must not be negative, got {}",
                self.predicted_latency_days
            ));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BurnoutDetection {
    pub is_at_risk: bool,
    #[serde(default)]
    pub sentiment_indicators: Vec<String>,
    pub recommendation: String,
}

impl StructuredOutput for BurnoutDetection {
    const SCHEMA_NAME: &'static str = "burnout_detection";
    const SCHEMA_HINT: &'static str = r#"{"is_at_risk": boolean, "sentiment_indicators": [string], "recommendation": string}"#;
}

/// Tone of a generated reply, ordered by severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToneType {
    Supportive,
    Neutral,
    Firm,
    Confrontational,
}

impl ToneType {
    /// Firm and confrontational tones count towards the cooling-off counter.
    pub fn is_strict(&self) -> bool {
        matches!(self, Self::Firm | Self::Confrontational)
    }

    pub fn severity(&self) -> u8 {
        match self {
            Self::Supportive => 0,
            Self::Neutral => 1,
            Self::Firm => 2,
            Self::Confrontational => 3,
        }
    }
}

impl fmt::Display for ToneType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Supportive => write!(f, "supportive"),
            Self::Neutral => write!(f, "neutral"),
            Self::Firm => write!(f, "firm"),
            Self::Confrontational => write!(f, "confrontational"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentDecision {
    pub action: String,
    pub tone: ToneType,
    pub message: String,
    pub analysis_summary: String,
}

impl AgentDecision {
    pub fn escalates(&self) -> bool {
        self.action == ACTION_ESCALATE
    }
}

impl StructuredOutput for AgentDecision {
    const SCHEMA_NAME: &'static str = "agent_decision";
    const SCHEMA_HINT: &'static str = r#"{"action": "none" | "notified" | "escalate_to_manager", "tone": "supportive" | "neutral" | "firm" | "confrontational", "message": string, "analysis_summary": string}"#;

    fn validate(&self) -> Result<(), String> {
        if self.action.trim().is_empty() {
            return Err("action must not be empty".to_string());
        }
        if self.message.trim().is_empty() {
            return Err("message must not be empty".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrectionType {
    #[default]
    None,
    Surgical,
    FullRewrite,
}

/// Verdict of one supervisor pass over a proposed message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafetyAudit {
    pub is_safe: bool,
    #[serde(default)]
    pub requires_human_review: bool,
    #[serde(default)]
    pub is_hard_blocked: bool,
    pub risk_of_morale_damage: f64,
    pub supervisor_confidence: f64,
    #[serde(default)]
    pub suggested_correction: Option<String>,
    #[serde(default)]
    pub correction_type: CorrectionType,
    pub reasoning: String,
}

impl StructuredOutput for SafetyAudit {
    const SCHEMA_NAME: &'static str = "safety_audit";
    const SCHEMA_HINT: &'static str = r#"{"is_safe": boolean, "requires_human_review": boolean, "is_hard_blocked": boolean, "risk_of_morale_damage": number in [0,1], "supervisor_confidence": number in [0,1], "suggested_correction": string | null, "correction_type": "none" | "surgical" | "full_rewrite", "reasoning": string}"#;

    fn validate(&self) -> Result<(), String> {
        check_unit_interval("risk_of_morale_damage", self.risk_of_morale_damage)?;
        check_unit_interval("supervisor_confidence", self.supervisor_confidence)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InterventionType {
    Correction,
    Block,
    Review,
}

impl fmt::Display for InterventionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Correction => write!(f, "correction"),
            Self::Block => write!(f, "block"),
            Self::Review => write!(f, "review"),
        }
    }
}

/// Durable record of what the supervisor changed; the id correlates manager feedback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafetyIntervention {
    pub id: String,
    pub original_message: String,
    pub corrected_message: Option<String>,
    pub reasoning: String,
    pub intervention_type: InterventionType,
}

impl SafetyIntervention {
    pub fn new(
        original_message: impl Into<String>,
        corrected_message: Option<String>,
        reasoning: impl Into<String>,
        intervention_type: InterventionType,
    ) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            original_message: original_message.into(),
            corrected_message,
            reasoning: reasoning.into(),
            intervention_type,
        }
    }
}

/// Externally visible outcome of one orchestrator run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineEvaluation {
    pub decision: AgentDecision,
    pub excuse: ExcuseAnalysis,
    pub risk: RiskAssessment,
    pub burnout: BurnoutDetection,
    pub safety_audit: Option<SafetyIntervention>,
}

impl PipelineEvaluation {
    pub const DELAY_MESSAGE: &'static str =
        "We're experiencing a short delay processing your update. Your manager has been looped in, so no action is needed from you right now.";

    /// Fixed result used when the pipeline cannot produce a judgment in time.
    ///
    /// Gives the benefit of the doubt: legitimate excuse, low risk, no burnout.
    pub fn delayed_fallback(reason: &str) -> Self {
        Self {
            decision: AgentDecision {
                action: ACTION_ESCALATE.to_string(),
                tone: ToneType::Neutral,
                message: Self::DELAY_MESSAGE.to_string(),
                analysis_summary: format!("Fallback evaluation: {}", reason),
            },
            excuse: ExcuseAnalysis {
                category: ExcuseCategory::Legitimate,
                confidence_score: 0.0,
                reasoning: "Defaulted to legitimate (benefit of the doubt).".to_string(),
            },
            risk: RiskAssessment {
                risk_score: 0.0,
                level: RiskLevel::Low,
                predicted_latency_days: 0,
                mitigation_strategy: "none".to_string(),
            },
            burnout: BurnoutDetection {
                is_at_risk: false,
                sentiment_indicators: Vec::new(),
                recommendation: "Continue monitoring".to_string(),
            },
            safety_audit: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanguageResponse {
    pub code: String,
}

impl StructuredOutput for LanguageResponse {
    const SCHEMA_NAME: &'static str = "language_response";
    const SCHEMA_HINT: &'static str = r#"{"code": two-letter ISO 639-1 code, optionally with a region suffix such as "en-UK"}"#;

    fn validate(&self) -> Result<(), String> {
        if self.code.trim().is_empty() {
            Err("code must not be empty".to_string())
        } else {
            Ok(())
        }
    }
}

/// Autonomously drafted persona text for a previously unknown locale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersonaDraft {
    pub name: String,
    pub instruction: String,
}

impl StructuredOutput for PersonaDraft {
    const SCHEMA_NAME: &'static str = "persona_draft";
    const SCHEMA_HINT: &'static str = r#"{"name": short persona label, "instruction": one instructive paragraph}"#;

    fn validate(&self) -> Result<(), String> {
        if self.instruction.trim().is_empty() {
            Err("instruction must not be empty".to_string())
        } else {
            Ok(())
        }
    }
}
