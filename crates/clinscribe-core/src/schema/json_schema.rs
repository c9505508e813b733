//! JSON Schema form of the clinical output contract.
//!
//! The same rules the decoder enforces, expressed as a JSON Schema document.
//! Providers that support structured output receive this document as the
//! response format; the CLI uses it to check saved documents.

use serde_json::Value;
use std::sync::OnceLock;
use thiserror::Error;

/// Embedded schema (loaded at compile time).
const CLINICAL_OUTPUT_SCHEMA_JSON: &str = include_str!("../../schema/clinical_output.schema.json");

/// Parsed document and compiled validator (initialized once, reused).
static COMPILED_SCHEMA: OnceLock<Result<(Value, jsonschema::Validator), String>> = OnceLock::new();

/// Errors from schema loading.
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("Failed to load schema: {0}")]
    LoadError(String),
}

fn compiled() -> Result<&'static (Value, jsonschema::Validator), SchemaError> {
    let result = COMPILED_SCHEMA.get_or_init(|| {
        let document: Value = serde_json::from_str(CLINICAL_OUTPUT_SCHEMA_JSON)
            .map_err(|e| format!("Invalid schema JSON: {}", e))?;
        let validator = jsonschema::options()
            .build(&document)
            .map_err(|e| format!("Failed to compile schema: {}", e))?;
        Ok((document, validator))
    });

    result
        .as_ref()
        .map_err(|e| SchemaError::LoadError(e.clone()))
}

/// The clinical output JSON Schema document.
pub fn clinical_output_schema() -> Result<&'static Value, SchemaError> {
    compiled().map(|(document, _)| document)
}

/// Check a JSON value against the schema.
///
/// Returns every validation error as `"<message> at <instance path>"`.
pub fn check_against_schema(instance: &Value) -> Result<(), Vec<String>> {
    let (_, validator) = compiled().map_err(|e| vec![e.to_string()])?;

    let errors: Vec<String> = validator
        .iter_errors(instance)
        .map(|e| format!("{} at {}", e, e.instance_path))
        .collect();

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
