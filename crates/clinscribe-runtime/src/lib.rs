//! # clinscribe-runtime
//!
//! Runs clinical free-text items through a text-generation model and the
//! strict output decoder from `clinscribe-core`.
//!
//! The core crate owns the output contract and never talks to a model. This
//! crate adds the moving parts:
//!
//! - [`prompts`]: versioned prompt templates
//! - [`providers`]: the text-generation seam and an OpenAI implementation
//! - [`pipeline`]: generation step, validation step, per-item orchestration
//!   and the sequential batch runner
//! - [`config`]: YAML/JSON runtime configuration
//!
//! ## Example
//!
//! ```rust,ignore
//! use clinscribe_runtime::{BatchRunner, ClinicalPipeline, ProviderRegistry, RuntimeConfig};
//!
//! let config = RuntimeConfig::from_file("clinscribe.yaml")?;
//! let pipeline = ClinicalPipeline::from_config(&config, &ProviderRegistry::with_defaults())?;
//! let report = BatchRunner::new(pipeline).run(&items, "v2").await;
//! println!("{}", report.to_json_pretty()?);
//! ```

use thiserror::Error;

pub mod config;
pub mod pipeline;
pub mod prompts;
pub mod providers;

pub use config::{ConfigError, RuntimeConfig};
pub use pipeline::{
    generate, validate, BatchRunner, ClinicalPipeline, ClinicalPipelineBuilder, GenerationError,
    PipelineRun,
};
pub use prompts::{
    load_template, render_prompt, DirectoryTemplates, InMemoryTemplates, TemplateError,
    TemplateSource, DEFAULT_TEMPLATE, INPUT_PLACEHOLDER,
};
pub use providers::{
    ChatMessage, CompletionConfig, CompletionResponse, LlmProvider, ProviderError,
    ProviderRegistry, TokenUsage,
};

/// Errors setting up a pipeline. Per-item failures never surface here.
#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error("Provider not configured: {0}")]
    ProviderNotConfigured(String),

    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
