//! Strict decoder for model output.
//!
//! Parses raw text as JSON, then checks every field of the clinical output
//! contract. All violations are collected so a caller sees the whole picture
//! in one pass, and a value is built only when the list is empty.

use serde_json::{Map, Value};
use std::fmt;
use thiserror::Error;

use super::types::{
    ClinicalOutput, ClinicalReport, RiskAssessment, RiskLevel, ANALYSIS_MIN_CHARS,
    HYPOTHESES_BOUNDS, QUESTIONS_BOUNDS, SIGNIFIERS_BOUNDS, THEMES_BOUNDS,
};

/// A single broken rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Constraint {
    /// Required key absent.
    Missing,

    /// JSON type differs from the contract.
    WrongType {
        expected: &'static str,
        found: &'static str,
    },

    /// String shorter than the minimum (in characters).
    TooShort { min: usize, actual: usize },

    /// List with fewer items than allowed.
    TooFewItems { min: usize, actual: usize },

    /// List with more items than allowed.
    TooManyItems { max: usize, actual: usize },

    /// Value outside an enumeration.
    NotAllowed {
        allowed: &'static [&'static str],
        actual: String,
    },
}

impl fmt::Display for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constraint::Missing => write!(f, "field required"),
            Constraint::WrongType { expected, found } => {
                write!(f, "input should be a valid {}, found {}", expected, found)
            }
            Constraint::TooShort { min, actual } => write!(
                f,
                "string should have at least {} characters, got {}",
                min, actual
            ),
            Constraint::TooFewItems { min, actual } => {
                write!(f, "list should have at least {} items, got {}", min, actual)
            }
            Constraint::TooManyItems { max, actual } => {
                write!(f, "list should have at most {} items, got {}", max, actual)
            }
            Constraint::NotAllowed { allowed, actual } => {
                let options = allowed
                    .iter()
                    .map(|a| format!("'{}'", a))
                    .collect::<Vec<_>>()
                    .join(", ");
                write!(f, "input should be one of {}, got '{}'", options, actual)
            }
        }
    }
}

/// A constraint violation located by its dotted field path
/// (`themes`, `risk_assessment.level`, `signifiers.2`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldViolation {
    pub path: String,
    pub constraint: Constraint,
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at {}", self.constraint, self.path)
    }
}

/// Why raw model text did not decode.
#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("{0}")]
    Syntax(#[from] serde_json::Error),

    #[error("{}", join_violations(.0))]
    Invalid(Vec<FieldViolation>),
}

fn join_violations(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Decode raw model text into a validated [`ClinicalOutput`].
pub fn decode_clinical_output(raw: &str) -> Result<ClinicalOutput, DecodeError> {
    let value: Value = serde_json::from_str(raw)?;
    decode_value(&value).map_err(|violations| {
        tracing::debug!(violations = violations.len(), "Clinical output rejected");
        DecodeError::Invalid(violations)
    })
}

/// Check an already parsed JSON value against the contract.
pub fn decode_value(value: &Value) -> Result<ClinicalOutput, Vec<FieldViolation>> {
    let mut checker = Checker::default();

    let Some(root) = checker.object(value, "(root)") else {
        return Err(checker.violations);
    };

    let analysis = checker
        .field(root, "analysis", "")
        .and_then(|v| checker.string_min_chars(v, "analysis", ANALYSIS_MIN_CHARS));
    let themes = checker.bounded_list(root, "themes", THEMES_BOUNDS);
    let signifiers = checker.bounded_list(root, "signifiers", SIGNIFIERS_BOUNDS);
    let hypotheses = checker.bounded_list(root, "hypotheses", HYPOTHESES_BOUNDS);
    let questions = checker.bounded_list(root, "questions", QUESTIONS_BOUNDS);
    let risk_assessment = checker.risk_assessment(root);
    let clinical_report = checker.clinical_report(root);

    match (
        analysis,
        themes,
        signifiers,
        hypotheses,
        questions,
        risk_assessment,
        clinical_report,
    ) {
        (
            Some(analysis),
            Some(themes),
            Some(signifiers),
            Some(hypotheses),
            Some(questions),
            Some(risk_assessment),
            Some(clinical_report),
        ) if checker.violations.is_empty() => Ok(ClinicalOutput {
            analysis,
            themes,
            signifiers,
            hypotheses,
            questions,
            risk_assessment,
            clinical_report,
        }),
        _ => Err(checker.violations),
    }
}

/// Accumulates violations while walking the document.
#[derive(Default)]
struct Checker {
    violations: Vec<FieldViolation>,
}

impl Checker {
    fn violate(&mut self, path: impl Into<String>, constraint: Constraint) {
        self.violations.push(FieldViolation {
            path: path.into(),
            constraint,
        });
    }

    fn object<'v>(&mut self, value: &'v Value, path: &str) -> Option<&'v Map<String, Value>> {
        match value {
            Value::Object(map) => Some(map),
            other => {
                self.violate(
                    path,
                    Constraint::WrongType {
                        expected: "object",
                        found: json_type(other),
                    },
                );
                None
            }
        }
    }

    fn field<'v>(
        &mut self,
        map: &'v Map<String, Value>,
        name: &str,
        parent: &str,
    ) -> Option<&'v Value> {
        let value = map.get(name);
        if value.is_none() {
            self.violate(join_path(parent, name), Constraint::Missing);
        }
        value
    }

    fn string(&mut self, value: &Value, path: &str) -> Option<String> {
        match value {
            Value::String(s) => Some(s.clone()),
            other => {
                self.violate(
                    path,
                    Constraint::WrongType {
                        expected: "string",
                        found: json_type(other),
                    },
                );
                None
            }
        }
    }

    fn string_min_chars(&mut self, value: &Value, path: &str, min: usize) -> Option<String> {
        let s = self.string(value, path)?;
        let actual = s.chars().count();
        if actual < min {
            self.violate(path, Constraint::TooShort { min, actual });
            return None;
        }
        Some(s)
    }

    fn boolean(&mut self, value: &Value, path: &str) -> Option<bool> {
        match value {
            Value::Bool(b) => Some(*b),
            other => {
                self.violate(
                    path,
                    Constraint::WrongType {
                        expected: "boolean",
                        found: json_type(other),
                    },
                );
                None
            }
        }
    }

    /// A list of strings whose length lies in `[min, max]` (`max` optional).
    fn string_list(
        &mut self,
        value: &Value,
        path: &str,
        min: usize,
        max: Option<usize>,
    ) -> Option<Vec<String>> {
        let Value::Array(items) = value else {
            self.violate(
                path,
                Constraint::WrongType {
                    expected: "list",
                    found: json_type(value),
                },
            );
            return None;
        };

        let before = self.violations.len();
        let actual = items.len();
        if actual < min {
            self.violate(path, Constraint::TooFewItems { min, actual });
        }
        if let Some(max) = max.filter(|max| actual > *max) {
            self.violate(path, Constraint::TooManyItems { max, actual });
        }

        let strings: Vec<String> = items
            .iter()
            .enumerate()
            .filter_map(|(i, item)| self.string(item, &format!("{}.{}", path, i)))
            .collect();

        (self.violations.len() == before).then_some(strings)
    }

    fn bounded_list(
        &mut self,
        root: &Map<String, Value>,
        name: &str,
        (min, max): (usize, usize),
    ) -> Option<Vec<String>> {
        let value = self.field(root, name, "")?;
        self.string_list(value, name, min, Some(max))
    }

    fn risk_assessment(&mut self, root: &Map<String, Value>) -> Option<RiskAssessment> {
        let value = self.field(root, "risk_assessment", "")?;
        let map = self.object(value, "risk_assessment")?;

        let level = self
            .field(map, "level", "risk_assessment")
            .and_then(|v| self.risk_level(v, "risk_assessment.level"));
        let signals = self
            .field(map, "signals", "risk_assessment")
            .and_then(|v| self.string_list(v, "risk_assessment.signals", 1, None));

        Some(RiskAssessment {
            level: level?,
            signals: signals?,
        })
    }

    fn risk_level(&mut self, value: &Value, path: &str) -> Option<RiskLevel> {
        let label = self.string(value, path)?;
        match label.parse() {
            Ok(level) => Some(level),
            Err(()) => {
                self.violate(
                    path,
                    Constraint::NotAllowed {
                        allowed: RiskLevel::LABELS,
                        actual: label,
                    },
                );
                None
            }
        }
    }

    fn clinical_report(&mut self, root: &Map<String, Value>) -> Option<ClinicalReport> {
        let value = self.field(root, "clinical_report", "")?;
        let map = self.object(value, "clinical_report")?;

        let required = self
            .field(map, "required", "clinical_report")
            .and_then(|v| self.boolean(v, "clinical_report.required"));
        let summary = self
            .field(map, "summary", "clinical_report")
            .and_then(|v| self.string(v, "clinical_report.summary"));

        Some(ClinicalReport {
            required: required?,
            summary: summary?,
        })
    }
}

fn join_path(parent: &str, name: &str) -> String {
    if parent.is_empty() {
        name.to_string()
    } else {
        format!("{}.{}", parent, name)
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "list",
        Value::Object(_) => "object",
    }
}
