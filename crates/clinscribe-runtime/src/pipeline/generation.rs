//! Generation step: template + item text → prompt → raw model text.

use clinscribe_core::{PipelineState, StageError, StateUpdate};
use thiserror::Error;

use crate::prompts::{load_template, render_prompt, TemplateError, TemplateSource};
use crate::providers::{ChatMessage, CompletionConfig, LlmProvider, ProviderError};

/// Anything that stops the step from producing raw text.
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error(transparent)]
    Template(#[from] TemplateError),

    #[error(transparent)]
    Provider(#[from] ProviderError),
}

/// Run the generation step for one item.
///
/// On success the update sets `raw_response` and leaves errors alone. On
/// failure it clears `raw_response` and appends a `Generation Error`. The
/// error never propagates past this function.
pub async fn generate(
    state: &PipelineState,
    templates: &dyn TemplateSource,
    provider: &dyn LlmProvider,
    config: &CompletionConfig,
) -> StateUpdate {
    let name = state.item().name();
    tracing::debug!(file = %name, provider = provider.name(), "Generation step");

    match call_model(state, templates, provider, config).await {
        Ok(raw) => StateUpdate::new().raw_response(Some(raw)),
        Err(e) => {
            tracing::warn!(file = %name, error = %e, "Generation failed");
            let mut errors = state.errors().to_vec();
            errors.push(StageError::Generation(e.to_string()).to_string());
            StateUpdate::new().raw_response(None).errors(errors)
        }
    }
}

async fn call_model(
    state: &PipelineState,
    templates: &dyn TemplateSource,
    provider: &dyn LlmProvider,
    config: &CompletionConfig,
) -> Result<String, GenerationError> {
    let template = load_template(templates, state.prompt_version())?;
    let prompt = render_prompt(&template, state.item().text());

    let messages = vec![ChatMessage::user(prompt)];
    let response = tokio::time::timeout(config.timeout, provider.complete(messages, config))
        .await
        .map_err(|_| ProviderError::Timeout(config.timeout))??;

    tracing::debug!(
        model = %response.model,
        prompt_tokens = response.usage.prompt_tokens,
        completion_tokens = response.usage.completion_tokens,
        stop_reason = ?response.stop_reason,
        "Model responded"
    );

    Ok(response.content)
}
