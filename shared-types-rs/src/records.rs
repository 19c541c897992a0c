// shared-types-rs/src/records.rs
// Persistent records: reliability ledger rows, policy rules, personas and manager feedback.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Department key matching every department of an industry.
pub const WILDCARD_DEPARTMENT: &str = "*";

/// Per-user accountability history.
///
/// The reliability score is always derived from the two counters and is
/// therefore not a field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserReliabilityRecord {
    pub user_id: String,
    pub total_commitments: u32,
    pub failed_commitments: u32,
    pub consecutive_firm_interventions: u32,
    pub last_intervention_at: Option<DateTime<Utc>>,
    pub external_chat_id: Option<String>,
    pub department: String,
    pub industry_type: String,
    pub is_context_verified: bool,
    pub language_preference: Option<String>,
}

impl UserReliabilityRecord {
    pub fn new(user_id: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            total_commitments: 0,
            failed_commitments: 0,
            consecutive_firm_interventions: 0,
            last_intervention_at: None,
            external_chat_id: None,
            department: WILDCARD_DEPARTMENT.to_string(),
            industry_type: crate::GENERIC_INDUSTRY.to_string(),
            is_context_verified: false,
            language_preference: None,
        }
    }

    /// `(total - failed) / total * 100`, or 100 for a user with no history.
    pub fn reliability_score(&self) -> f64 {
        if self.total_commitments == 0 {
            return 100.0;
        }
        let succeeded = self.total_commitments.saturating_sub(self.failed_commitments);
        f64::from(succeeded) / f64::from(self.total_commitments) * 100.0
    }

    pub fn snapshot(&self) -> ReliabilitySnapshot {
        ReliabilitySnapshot {
            score: self.reliability_score(),
            external_chat_id: self.external_chat_id.clone(),
            consecutive_firm: self.consecutive_firm_interventions,
        }
    }
}

/// What the pipeline needs from the ledger before an evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReliabilitySnapshot {
    pub score: f64,
    pub external_chat_id: Option<String>,
    pub consecutive_firm: u32,
}

impl Default for ReliabilitySnapshot {
    fn default() -> Self {
        Self {
            score: 100.0,
            external_chat_id: None,
            consecutive_firm: 0,
        }
    }
}

/// Industry and department specific audit policy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafetyRule {
    pub industry: String,
    pub department: String,
    pub hr_keywords: Vec<String>,
    pub semantic_rules: String,
    pub is_active: bool,
    pub is_verified: bool,
    pub onboarded_by: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PersonaSource {
    System,
    AutoAgent,
    Fallback,
}

impl fmt::Display for PersonaSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::System => write!(f, "system"),
            Self::AutoAgent => write!(f, "auto_agent"),
            Self::Fallback => write!(f, "fallback"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CulturalPersona {
    pub code: String,
    pub name: String,
    pub instruction: String,
    pub is_verified: bool,
    pub source: PersonaSource,
}

impl CulturalPersona {
    pub const UNVERIFIED_SUFFIX: &'static str =
        " NOTE: This persona was auto-generated and is not yet verified. Be extremely strict about professional boundaries and avoid any culturally ambiguous phrasing.";

    /// Instruction text to embed in prompts; unverified personas carry the strictness suffix.
    pub fn effective_instruction(&self) -> String {
        if self.is_verified {
            self.instruction.clone()
        } else {
            format!("{}{}", self.instruction, Self::UNVERIFIED_SUFFIX)
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackAction {
    Accepted,
    Rejected,
    Modified,
}

impl fmt::Display for FeedbackAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Accepted => write!(f, "accepted"),
            Self::Rejected => write!(f, "rejected"),
            Self::Modified => write!(f, "modified"),
        }
    }
}

impl FromStr for FeedbackAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "accepted" => Ok(Self::Accepted),
            "rejected" => Ok(Self::Rejected),
            "modified" => Ok(Self::Modified),
            other => Err(format!("unknown feedback action '{}'", other)),
        }
    }
}

/// A manager's verdict on one supervisor intervention.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SafetyFeedback {
    pub intervention_id: String,
    pub user_id: String,
    pub manager_id: String,
    pub action: FeedbackAction,
    pub final_message: Option<String>,
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}
