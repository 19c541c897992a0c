// shared-types-rs/src/performance.rs
// Promise-versus-delivery judgments: commitments pulled out of a conversation,
// slippage between promised and delivered work, and the gap between what a
// user claims and what the evidence shows.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::agents::ToneType;
use crate::structured::{check_unit_interval, StructuredOutput};

/// The primary promise found in a conversation log, if any.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommitmentRecord {
    pub commitment_found: bool,
    #[serde(default)]
    pub who: Option<String>,
    #[serde(default)]
    pub what: Option<String>,
    #[serde(default)]
    pub when: Option<String>,
}

impl CommitmentRecord {
    pub fn none() -> Self {
        Self {
            commitment_found: false,
            who: None,
            what: None,
            when: None,
        }
    }
}

impl StructuredOutput for CommitmentRecord {
    const SCHEMA_NAME: &'static str = "commitment_record";
    const SCHEMA_HINT: &'static str = r#"{"commitment_found": boolean, "who": string | null, "what": string | null, "when": string | null}"#;

    fn validate(&self) -> Result<(), String> {
        let has_task = self.what.as_deref().is_some_and(|what| !what.trim().is_empty());
        if self.commitment_found && !has_task {
            return Err("what must name the task when commitment_found is true".to_string());
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlippageStatus {
    OnTrack,
    Slipping,
    Broken,
    /// Promised structural work replaced by quick fixes.
    ShadowDebt,
}

impl fmt::Display for SlippageStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::OnTrack => write!(f, "on_track"),
            Self::Slipping => write!(f, "slipping"),
            Self::Broken => write!(f, "broken"),
            Self::ShadowDebt => write!(f, "shadow_debt"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlippageAnalysis {
    pub status: SlippageStatus,
    pub fulfillment_ratio: f64,
    pub detected_gap: String,
    pub risk_to_system_stability: f64,
    pub intervention_required: bool,
}

impl StructuredOutput for SlippageAnalysis {
    const SCHEMA_NAME: &'static str = "slippage_analysis";
    const SCHEMA_HINT: &'static str = r#"{"status": "on_track" | "slipping" | "broken" | "shadow_debt", "fulfillment_ratio": number in [0,1], "detected_gap": string, "risk_to_system_stability": number in [0,1], "intervention_required": boolean}"#;

    fn validate(&self) -> Result<(), String> {
        check_unit_interval("fulfillment_ratio", self.fulfillment_ratio)?;
        check_unit_interval("risk_to_system_stability", self.risk_to_system_stability)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TruthGapAnalysis {
    pub gap_detected: bool,
    /// 1.0 means the claims and the evidence agree completely.
    pub truth_score: f64,
    pub explanation: String,
    pub recommended_tone: ToneType,
}

impl StructuredOutput for TruthGapAnalysis {
    const SCHEMA_NAME: &'static str = "truth_gap_analysis";
    const SCHEMA_HINT: &'static str = r#"{"gap_detected": boolean, "truth_score": number in [0,1], "explanation": string, "recommended_tone": "supportive" | "neutral" | "firm" | "confrontational"}"#;

    fn validate(&self) -> Result<(), String> {
        check_unit_interval("truth_score", self.truth_score)
    }
}
