//! The clinical output contract.
//!
//! Model output is accepted only if it decodes into a [`ClinicalOutput`]
//! under every field constraint. The contract also exists as a JSON Schema
//! document for providers and tooling.

mod decode;
mod json_schema;
mod types;

pub use decode::{decode_clinical_output, decode_value, Constraint, DecodeError, FieldViolation};
pub use json_schema::{check_against_schema, clinical_output_schema, SchemaError};
pub use types::{
    ClinicalOutput, ClinicalReport, RiskAssessment, RiskLevel, ANALYSIS_MIN_CHARS,
    HYPOTHESES_BOUNDS, QUESTIONS_BOUNDS, SIGNIFIERS_BOUNDS, THEMES_BOUNDS,
};
