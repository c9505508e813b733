//! # clinscribe-core
//!
//! The clinical output contract and the values a pipeline run produces.
//!
//! This crate makes no model calls and does no I/O. It provides:
//! - [`schema`]: the [`ClinicalOutput`] type, its strict decoder and the
//!   equivalent JSON Schema document
//! - [`state`]: input items and immutable per-item pipeline state
//! - [`report`]: the [`RunReport`] aggregated over a batch
//! - [`error`]: the per-item error taxonomy
//!
//! ## Example
//!
//! ```rust,ignore
//! use clinscribe_core::{decode_clinical_output, StageError};
//!
//! match decode_clinical_output(raw) {
//!     Ok(output) => println!("risk: {}", output.risk_assessment().level()),
//!     Err(e) => {
//!         for error in StageError::from_decode(e) {
//!             eprintln!("{}", error);
//!         }
//!     }
//! }
//! ```

pub mod error;
pub mod report;
pub mod schema;
pub mod state;

pub use error::{ErrorCategory, StageError};
pub use report::{ItemResult, RunReport};
pub use schema::{
    check_against_schema, clinical_output_schema, decode_clinical_output, ClinicalOutput,
    ClinicalReport, Constraint, DecodeError, FieldViolation, RiskAssessment, RiskLevel,
};
pub use state::{InputError, InputItem, PipelineState, StateUpdate};
