//! The validated-generation pipeline.
//!
//! Two steps per item, always both, in order:
//!
//! ```text
//! InputItem ──► generation ──► validation ──► ItemResult ──► RunReport
//!               (template +     (strict
//!                provider)       decoder)
//! ```
//!
//! Steps never fail: every error becomes a message in the item's error
//! list. Items run one at a time in input order.

mod batch;
mod generation;
mod orchestrator;
mod validation;

#[cfg(test)]
pub(crate) mod test_support;

pub use batch::BatchRunner;
pub use generation::{generate, GenerationError};
pub use orchestrator::{ClinicalPipeline, ClinicalPipelineBuilder, PipelineRun};
pub use validation::validate;

use std::any::Any;

/// Best-effort text of a panic payload.
pub(crate) fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
