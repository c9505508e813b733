//! Two-step pipeline for a single item.

use std::sync::Arc;

use clinscribe_core::{ItemResult, PipelineState};

use super::{generate, validate};
use crate::config::RuntimeConfig;
use crate::prompts::{DirectoryTemplates, InMemoryTemplates, TemplateSource};
use crate::providers::{CompletionConfig, LlmProvider, ProviderRegistry};
use crate::RuntimeError;

/// Outcome of running both steps on one item.
///
/// Validation replaces the state's error list, so errors recorded by the
/// generation step are kept here alongside the terminal state.
#[derive(Debug, Clone)]
pub struct PipelineRun {
    /// State after validation
    pub state: PipelineState,

    /// Errors recorded by generation (empty when it succeeded)
    pub generation_errors: Vec<String>,
}

impl PipelineRun {
    /// Generation errors followed by validation errors.
    pub fn errors(&self) -> Vec<String> {
        self.generation_errors
            .iter()
            .chain(self.state.errors())
            .cloned()
            .collect()
    }

    pub fn is_success(&self) -> bool {
        self.generation_errors.is_empty() && self.state.is_success()
    }

    /// Report entry for this item.
    pub fn into_result(self) -> ItemResult {
        let errors = self.errors();
        let (item, output, _) = self.state.into_parts();
        ItemResult::new(item.name(), output, errors)
    }
}

/// Generation then validation, always both, in that order.
pub struct ClinicalPipeline {
    provider: Arc<dyn LlmProvider>,
    templates: Arc<dyn TemplateSource>,
    completion: CompletionConfig,
}

impl ClinicalPipeline {
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        templates: Arc<dyn TemplateSource>,
        completion: CompletionConfig,
    ) -> Self {
        Self {
            provider,
            templates,
            completion,
        }
    }

    /// Build from configuration, creating the provider through `registry`.
    pub fn from_config(
        config: &RuntimeConfig,
        registry: &ProviderRegistry,
    ) -> Result<Self, RuntimeError> {
        let provider = registry.create(&config.provider, &config.provider_config)?;
        Ok(Self::new(
            provider,
            Arc::new(DirectoryTemplates::new(&config.prompts_dir)),
            config.completion_config(),
        ))
    }

    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }

    /// Whether the provider is usable before any item is sent.
    pub async fn health_check(&self) -> bool {
        self.provider.health_check().await
    }

    /// Run one item. Never fails; every problem ends up in the error lists.
    pub async fn run(&self, state: PipelineState) -> PipelineRun {
        let update = generate(
            &state,
            self.templates.as_ref(),
            self.provider.as_ref(),
            &self.completion,
        )
        .await;
        let state = state.apply(update);
        let generation_errors = state.errors().to_vec();

        let update = validate(&state);
        PipelineRun {
            state: state.apply(update),
            generation_errors,
        }
    }
}

/// Builder for [`ClinicalPipeline`].
pub struct ClinicalPipelineBuilder {
    provider: Option<Arc<dyn LlmProvider>>,
    templates: Arc<dyn TemplateSource>,
    completion: CompletionConfig,
}

impl ClinicalPipelineBuilder {
    pub fn new() -> Self {
        Self {
            provider: None,
            templates: Arc::new(InMemoryTemplates::new()),
            completion: CompletionConfig::default(),
        }
    }

    pub fn provider(mut self, provider: Arc<dyn LlmProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    pub fn templates(mut self, templates: Arc<dyn TemplateSource>) -> Self {
        self.templates = templates;
        self
    }

    pub fn completion(mut self, completion: CompletionConfig) -> Self {
        self.completion = completion;
        self
    }

    pub fn build(self) -> Result<ClinicalPipeline, RuntimeError> {
        let provider = self
            .provider
            .ok_or_else(|| RuntimeError::ProviderNotConfigured("No provider set".to_string()))?;

        Ok(ClinicalPipeline::new(provider, self.templates, self.completion))
    }
}

impl Default for ClinicalPipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::test_support::{FailingProvider, FixedProvider, VALID_OUTPUT};
    use clinscribe_core::{ErrorCategory, InputItem};

    fn state() -> PipelineState {
        let item = InputItem::new("case1.txt", "patient reports anxiety").unwrap();
        PipelineState::new(item, "v2")
    }

    fn pipeline(provider: Arc<dyn LlmProvider>) -> ClinicalPipeline {
        ClinicalPipelineBuilder::new().provider(provider).build().unwrap()
    }

    #[test]
    fn test_builder_requires_provider() {
        let result = ClinicalPipelineBuilder::new().build();
        assert!(matches!(result, Err(RuntimeError::ProviderNotConfigured(_))));
    }

    #[tokio::test]
    async fn test_successful_run() {
        let run = pipeline(Arc::new(FixedProvider(VALID_OUTPUT.to_string())))
            .run(state())
            .await;

        assert!(run.is_success());
        assert!(run.errors().is_empty());
        let result = run.into_result();
        assert!(result.ok);
        assert_eq!(result.file, "case1.txt");
        assert!(result.output.is_some());
    }

    #[tokio::test]
    async fn test_generation_failure_keeps_both_errors() {
        let run = pipeline(Arc::new(FailingProvider)).run(state()).await;

        assert!(!run.is_success());
        assert!(run.state.raw_response().is_none());
        let categories: Vec<_> = run
            .errors()
            .iter()
            .map(|e| ErrorCategory::of(e))
            .collect();
        assert_eq!(
            categories,
            [Some(ErrorCategory::Generation), Some(ErrorCategory::Syntax)]
        );

        let result = run.into_result();
        assert!(!result.ok);
        assert!(result.output.is_none());
    }

    #[tokio::test]
    async fn test_invalid_output_fails_item() {
        let run = pipeline(Arc::new(FixedProvider("[1, 2, 3]".to_string())))
            .run(state())
            .await;

        assert!(run.generation_errors.is_empty());
        let result = run.into_result();
        assert!(!result.ok);
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].starts_with("Validation Error: "));
    }

    #[tokio::test]
    async fn test_health_check_reflects_provider() {
        assert!(pipeline(Arc::new(FixedProvider(VALID_OUTPUT.to_string())))
            .health_check()
            .await);
        assert!(!pipeline(Arc::new(FailingProvider)).health_check().await);
    }

    #[test]
    fn test_from_config_unknown_provider() {
        let config = RuntimeConfig {
            provider: "nope".to_string(),
            ..Default::default()
        };
        let result = ClinicalPipeline::from_config(&config, &ProviderRegistry::new());
        assert!(matches!(result, Err(RuntimeError::Provider(_))));
    }
}
