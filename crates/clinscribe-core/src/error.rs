//! Error taxonomy for per-item pipeline failures.
//!
//! Nothing here aborts a run. Each failure is rendered to a message and
//! stored in the item's error list; the prefix names the category.

use thiserror::Error;

use crate::schema::{DecodeError, FieldViolation};

/// A failure recorded against one input item.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StageError {
    /// The text-generation call (or template load) failed.
    #[error("Generation Error: {0}")]
    Generation(String),

    /// Output parsed as JSON but broke a field constraint.
    #[error("Validation Error: {0}")]
    Validation(FieldViolation),

    /// Output was not parseable JSON.
    #[error("JSON Parse Error: {0}")]
    Syntax(String),

    /// Anything else raised while decoding.
    #[error("Unknown Error: {0}")]
    Unknown(String),

    /// Escaped both steps; caught at the batch boundary.
    #[error("Runtime Error: {0}")]
    Runtime(String),
}

impl StageError {
    /// Category name, stable across message contents.
    pub fn category(&self) -> ErrorCategory {
        match self {
            StageError::Generation(_) => ErrorCategory::Generation,
            StageError::Validation(_) => ErrorCategory::Validation,
            StageError::Syntax(_) => ErrorCategory::Syntax,
            StageError::Unknown(_) => ErrorCategory::Unknown,
            StageError::Runtime(_) => ErrorCategory::Runtime,
        }
    }

    /// One entry per violation for schema failures, a single entry otherwise.
    pub fn from_decode(error: DecodeError) -> Vec<StageError> {
        match error {
            DecodeError::Syntax(e) => vec![StageError::Syntax(e.to_string())],
            DecodeError::Invalid(violations) => {
                violations.into_iter().map(StageError::Validation).collect()
            }
        }
    }
}

/// Error categories as they appear in run reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Generation,
    Validation,
    Syntax,
    Unknown,
    Runtime,
}

impl ErrorCategory {
    const PREFIXES: [(&'static str, ErrorCategory); 5] = [
        ("Generation Error: ", ErrorCategory::Generation),
        ("Validation Error: ", ErrorCategory::Validation),
        ("JSON Parse Error: ", ErrorCategory::Syntax),
        ("Unknown Error: ", ErrorCategory::Unknown),
        ("Runtime Error: ", ErrorCategory::Runtime),
    ];

    /// Every category, in the order reports list them.
    pub const ALL: [ErrorCategory; 5] = [
        ErrorCategory::Generation,
        ErrorCategory::Validation,
        ErrorCategory::Syntax,
        ErrorCategory::Unknown,
        ErrorCategory::Runtime,
    ];

    /// Classify a rendered error message by its prefix.
    pub fn of(message: &str) -> Option<ErrorCategory> {
        Self::PREFIXES
            .iter()
            .find(|(prefix, _)| message.starts_with(prefix))
            .map(|(_, category)| *category)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCategory::Generation => "generation",
            ErrorCategory::Validation => "validation",
            ErrorCategory::Syntax => "json_parse",
            ErrorCategory::Unknown => "unknown",
            ErrorCategory::Runtime => "runtime",
        }
    }
}

impl std::fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
