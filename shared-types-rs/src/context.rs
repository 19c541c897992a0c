// shared-types-rs/src/context.rs
// Organisational and cultural context attached to a check-in.

use serde::{Deserialize, Serialize};

use crate::records::WILDCARD_DEPARTMENT;
use crate::structured::{check_unit_interval, StructuredOutput};
use crate::GENERIC_INDUSTRY;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormalityLevel {
    Casual,
    #[default]
    Professional,
    Formal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CulturalContext {
    #[serde(default = "default_culture_code")]
    pub code: String,
    #[serde(default)]
    pub formality: FormalityLevel,
    #[serde(default)]
    pub high_context: bool,
}

fn default_culture_code() -> String {
    "en".to_string()
}

impl Default for CulturalContext {
    fn default() -> Self {
        Self {
            code: default_culture_code(),
            formality: FormalityLevel::default(),
            high_context: false,
        }
    }
}

/// A context-specific guardrail proposed while sensing a check-in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DynamicSafetyRule {
    pub rule_name: String,
    #[serde(default)]
    pub target_tokens: Vec<String>,
    #[serde(default = "default_rule_action")]
    pub action: String,
    #[serde(default)]
    pub reasoning: String,
}

fn default_rule_action() -> String {
    "review".to_string()
}

impl DynamicSafetyRule {
    /// Renders the rule as one line of audit policy text.
    pub fn as_policy_line(&self) -> String {
        if self.target_tokens.is_empty() {
            format!("- {} ({}): {}", self.rule_name, self.action, self.reasoning)
        } else {
            format!(
                "- {} ({}): watch for [{}]. {}",
                self.rule_name,
                self.action,
                self.target_tokens.join(", "),
                self.reasoning
            )
        }
    }
}

/// Resolved (industry, department) for one evaluation, plus sensing metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContextProfile {
    #[serde(default = "default_industry")]
    pub industry: String,
    #[serde(default = "default_department")]
    pub department: String,
    #[serde(default = "default_confidence")]
    pub confidence: f64,
    #[serde(default)]
    pub culture: CulturalContext,
    #[serde(default)]
    pub urgency_level: Option<String>,
    #[serde(default)]
    pub key_entities: Vec<String>,
    #[serde(default)]
    pub dynamic_safety_rules: Vec<DynamicSafetyRule>,
    #[serde(default)]
    pub reasoning: String,
}

fn default_industry() -> String {
    GENERIC_INDUSTRY.to_string()
}

fn default_department() -> String {
    WILDCARD_DEPARTMENT.to_string()
}

fn default_confidence() -> f64 {
    1.0
}

impl ContextProfile {
    /// Profile for a caller-declared or stored (industry, department) pair.
    pub fn declared(
        industry: impl Into<String>,
        department: impl Into<String>,
        reasoning: impl Into<String>,
    ) -> Self {
        Self {
            industry: industry.into().to_lowercase(),
            department: department.into(),
            confidence: 1.0,
            culture: CulturalContext::default(),
            urgency_level: None,
            key_entities: Vec::new(),
            dynamic_safety_rules: Vec::new(),
            reasoning: reasoning.into(),
        }
    }

    /// Generic profile used when sensing fails.
    pub fn generic_fallback(reason: &str) -> Self {
        Self {
            confidence: 0.0,
            ..Self::declared(
                GENERIC_INDUSTRY,
                WILDCARD_DEPARTMENT,
                format!("Context sensing failed: {}", reason),
            )
        }
    }
}

impl Default for ContextProfile {
    fn default() -> Self {
        Self::declared(GENERIC_INDUSTRY, WILDCARD_DEPARTMENT, "default profile")
    }
}

impl StructuredOutput for ContextProfile {
    const SCHEMA_NAME: &'static str = "context_profile";
    const SCHEMA_HINT: &'static str = r#"{"industry": string, "department": string, "confidence": number in [0,1], "culture": {"code": string, "formality": "casual" | "professional" | "formal", "high_context": boolean}, "urgency_level": string | null, "key_entities": [string], "dynamic_safety_rules": [{"rule_name": string, "target_tokens": [string], "action": string, "reasoning": string}], "reasoning": string}"#;

    fn validate(&self) -> Result<(), String> {
        if self.industry.trim().is_empty() {
            return Err("industry must not be empty".to_string());
        }
        check_unit_interval("confidence", self.confidence)
    }
}
