//! Runtime configuration.
//!
//! Loaded from YAML or JSON; every field has a default, so an empty file
//! (or no file) gives a working OpenAI setup that reads `OPENAI_API_KEY`.
//!
//! ```yaml
//! provider: openai
//! provider_config:
//!   base_url: https://api.openai.com/v1
//! model: gpt-4.1-mini
//! temperature: 0.3
//! max_output_tokens: 800
//! timeout: 60s
//! structured_output: false
//! prompts_dir: prompts
//! ```

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value as JsonValue;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::providers::CompletionConfig;

/// Errors loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse YAML config: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON config: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Configuration for a pipeline run.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RuntimeConfig {
    /// Registered provider type
    pub provider: String,

    /// Provider-specific settings (`api_key`, `base_url`)
    pub provider_config: JsonValue,

    pub model: String,

    pub temperature: f32,

    pub max_output_tokens: u32,

    /// Per-call timeout, human readable ("60s", "2m")
    #[serde(
        serialize_with = "serialize_duration",
        deserialize_with = "deserialize_duration"
    )]
    pub timeout: Duration,

    /// Send the clinical output JSON Schema as the response format
    pub structured_output: bool,

    /// Directory holding `prompt_<version>.txt` templates
    pub prompts_dir: PathBuf,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        let completion = CompletionConfig::default();
        Self {
            provider: "openai".to_string(),
            provider_config: JsonValue::Object(Default::default()),
            model: completion.model,
            temperature: completion.temperature,
            max_output_tokens: completion.max_output_tokens,
            timeout: completion.timeout,
            structured_output: false,
            prompts_dir: PathBuf::from("prompts"),
        }
    }
}

impl RuntimeConfig {
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: RuntimeConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: RuntimeConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Load from a file; `.json` is parsed as JSON, anything else as YAML.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        match path.extension().and_then(|e| e.to_str()) {
            Some("json") => Self::from_json(&contents),
            _ => Self::from_yaml(&contents),
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.provider.is_empty() {
            return Err(ConfigError::Invalid("provider must not be empty".to_string()));
        }
        if !(0.0..=2.0).contains(&self.temperature) {
            return Err(ConfigError::Invalid(format!(
                "temperature {} outside [0, 2]",
                self.temperature
            )));
        }
        if self.max_output_tokens == 0 {
            return Err(ConfigError::Invalid(
                "max_output_tokens must be positive".to_string(),
            ));
        }
        if self.timeout.is_zero() {
            return Err(ConfigError::Invalid("timeout must be positive".to_string()));
        }
        if !self.provider_config.is_object() {
            return Err(ConfigError::Invalid(
                "provider_config must be a mapping".to_string(),
            ));
        }
        Ok(())
    }

    /// Completion settings for the generation step.
    pub fn completion_config(&self) -> CompletionConfig {
        let response_schema = if self.structured_output {
            match clinscribe_core::clinical_output_schema() {
                Ok(schema) => Some(schema.clone()),
                Err(e) => {
                    tracing::warn!(error = %e, "Structured output disabled");
                    None
                }
            }
        } else {
            None
        };

        CompletionConfig {
            model: self.model.clone(),
            max_output_tokens: self.max_output_tokens,
            temperature: self.temperature,
            timeout: self.timeout,
            response_schema,
        }
    }
}

fn serialize_duration<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&humantime::format_duration(*duration).to_string())
}

fn deserialize_duration<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
    let text = String::deserialize(deserializer)?;
    humantime::parse_duration(&text).map_err(serde::de::Error::custom)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = RuntimeConfig::default();
        assert_eq!(config.provider, "openai");
        assert_eq!(config.max_output_tokens, 800);
        assert_eq!(config.timeout, Duration::from_secs(60));
        assert_eq!(config.prompts_dir, PathBuf::from("prompts"));
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = RuntimeConfig::from_yaml("timeout: 2m 30s\nmodel: gpt-4.1\n").unwrap();
        assert_eq!(config.timeout, Duration::from_secs(150));
        assert_eq!(config.model, "gpt-4.1");
        assert_eq!(config.max_output_tokens, 800);
    }

    #[test]
    fn test_json_config() {
        let config = RuntimeConfig::from_json(
            r#"{"provider_config": {"base_url": "http://localhost:8080/v1"}, "structured_output": true}"#,
        )
        .unwrap();
        assert_eq!(config.provider_config["base_url"], "http://localhost:8080/v1");

        let completion = config.completion_config();
        let schema = completion.response_schema.unwrap();
        assert_eq!(schema["title"], "ClinicalOutput");
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(matches!(
            RuntimeConfig::from_yaml("temperature: 3.5"),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            RuntimeConfig::from_yaml("timeout: soon"),
            Err(ConfigError::Yaml(_))
        ));
        assert!(matches!(
            RuntimeConfig::from_yaml("unknown_key: 1"),
            Err(ConfigError::Yaml(_))
        ));
    }

    #[test]
    fn test_duration_serializes_human_readable() {
        let yaml = serde_yaml::to_string(&RuntimeConfig::default()).unwrap();
        assert!(yaml.contains("timeout: 1m"), "{}", yaml);
    }

    #[test]
    fn test_completion_config_without_schema() {
        let completion = RuntimeConfig::default().completion_config();
        assert!(completion.response_schema.is_none());
        assert_eq!(completion.model, "gpt-4.1-mini");
    }
}
