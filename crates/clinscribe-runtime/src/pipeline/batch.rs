//! Batch runner: every item through the pipeline, one at a time.

use std::panic::AssertUnwindSafe;

use futures::FutureExt;

use clinscribe_core::{InputItem, ItemResult, PipelineState, RunReport, StageError};

use super::{panic_message, ClinicalPipeline};

/// Runs a list of items and aggregates a [`RunReport`].
///
/// Items are processed sequentially in input order, each from a fresh state.
/// A panic while processing one item is recorded as a `Runtime Error` for
/// that item and the batch moves on.
pub struct BatchRunner {
    pipeline: ClinicalPipeline,
}

impl BatchRunner {
    pub fn new(pipeline: ClinicalPipeline) -> Self {
        Self { pipeline }
    }

    pub async fn run(&self, items: &[InputItem], prompt_version: &str) -> RunReport {
        tracing::info!(
            items = items.len(),
            prompt_version,
            provider = self.pipeline.provider_name(),
            "Starting batch"
        );

        let mut report = RunReport::new(prompt_version);
        for (index, item) in items.iter().enumerate() {
            let result = self.run_item(item, prompt_version).await;
            tracing::info!(
                file = %result.file,
                ok = result.ok,
                errors = result.errors.len(),
                "[{}/{}] processed",
                index + 1,
                items.len()
            );
            report.push(result);
        }

        tracing::info!(
            total = report.total,
            ok = report.ok,
            failed = report.failed,
            "Batch complete"
        );
        report
    }

    async fn run_item(&self, item: &InputItem, prompt_version: &str) -> ItemResult {
        let state = PipelineState::new(item.clone(), prompt_version);

        match AssertUnwindSafe(self.pipeline.run(state)).catch_unwind().await {
            Ok(run) => run.into_result(),
            Err(payload) => {
                let message = panic_message(payload.as_ref());
                tracing::error!(file = %item.name(), error = %message, "Item processing panicked");
                ItemResult::failed(item.name(), StageError::Runtime(message).to_string())
            }
        }
    }
}
