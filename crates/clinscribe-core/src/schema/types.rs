//! Clinical output types.
//!
//! Fields are private: a `ClinicalOutput` only comes out of the strict
//! decoder in [`super::decode`], so holding one means every constraint held.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::decode::DecodeError;

/// Minimum length of `analysis`, in characters.
pub const ANALYSIS_MIN_CHARS: usize = 50;

/// Inclusive item-count bounds for `themes`.
pub const THEMES_BOUNDS: (usize, usize) = (3, 6);

/// Inclusive item-count bounds for `signifiers`.
pub const SIGNIFIERS_BOUNDS: (usize, usize) = (3, 8);

/// Inclusive item-count bounds for `hypotheses`.
pub const HYPOTHESES_BOUNDS: (usize, usize) = (2, 4);

/// Inclusive item-count bounds for `questions`.
pub const QUESTIONS_BOUNDS: (usize, usize) = (3, 6);

/// Clinical risk tier. Ordered by severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    #[serde(rename = "baixo")]
    Low,
    #[serde(rename = "médio")]
    Medium,
    #[serde(rename = "alto")]
    High,
}

impl RiskLevel {
    /// Wire labels, lowest severity first.
    pub const LABELS: &'static [&'static str] = &["baixo", "médio", "alto"];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "baixo",
            Self::Medium => "médio",
            Self::High => "alto",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RiskLevel {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "baixo" => Ok(Self::Low),
            "médio" => Ok(Self::Medium),
            "alto" => Ok(Self::High),
            _ => Err(()),
        }
    }
}

/// Risk tier plus the signals that justify it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RiskAssessment {
    pub(crate) level: RiskLevel,
    pub(crate) signals: Vec<String>,
}

impl RiskAssessment {
    pub fn level(&self) -> RiskLevel {
        self.level
    }

    /// Never empty.
    pub fn signals(&self) -> &[String] {
        &self.signals
    }
}

/// Whether a formal clinical report is needed, and its summary.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClinicalReport {
    pub(crate) required: bool,
    pub(crate) summary: String,
}

impl ClinicalReport {
    pub fn required(&self) -> bool {
        self.required
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }
}

/// A fully validated clinical analysis.
///
/// Deserializing goes through the same checks as
/// [`decode_clinical_output`](super::decode_clinical_output), so an invalid
/// document never yields a partially populated value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "serde_json::Value")]
pub struct ClinicalOutput {
    pub(crate) analysis: String,
    pub(crate) themes: Vec<String>,
    pub(crate) signifiers: Vec<String>,
    pub(crate) hypotheses: Vec<String>,
    pub(crate) questions: Vec<String>,
    pub(crate) risk_assessment: RiskAssessment,
    pub(crate) clinical_report: ClinicalReport,
}

impl ClinicalOutput {
    /// Structured analysis of the discourse (at least 50 characters).
    pub fn analysis(&self) -> &str {
        &self.analysis
    }

    pub fn themes(&self) -> &[String] {
        &self.themes
    }

    pub fn signifiers(&self) -> &[String] {
        &self.signifiers
    }

    pub fn hypotheses(&self) -> &[String] {
        &self.hypotheses
    }

    pub fn questions(&self) -> &[String] {
        &self.questions
    }

    pub fn risk_assessment(&self) -> &RiskAssessment {
        &self.risk_assessment
    }

    pub fn clinical_report(&self) -> &ClinicalReport {
        &self.clinical_report
    }
}

impl TryFrom<serde_json::Value> for ClinicalOutput {
    type Error = DecodeError;

    fn try_from(value: serde_json::Value) -> Result<Self, Self::Error> {
        super::decode::decode_value(&value).map_err(DecodeError::Invalid)
    }
}
