//! Scripted providers for pipeline tests.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::time::Duration;

use crate::providers::{
    ChatMessage, CompletionConfig, CompletionResponse, LlmProvider, ProviderError, TokenUsage,
};

pub const VALID_OUTPUT: &str = r#"{
  "analysis": "O paciente relata ansiedade recorrente, com preocupação excessiva e dificuldade para dormir.",
  "themes": ["ansiedade", "sono", "preocupação"],
  "signifiers": ["nervoso", "noite", "cabeça cheia"],
  "hypotheses": ["ansiedade generalizada", "insônia inicial"],
  "questions": ["Quando começou?", "O que costuma piorar?", "Como é a rotina à noite?"],
  "risk_assessment": { "level": "médio", "signals": ["insônia persistente", "ruminação"] },
  "clinical_report": { "required": false, "summary": "" }
}"#;

fn response(content: impl Into<String>) -> CompletionResponse {
    CompletionResponse {
        content: content.into(),
        usage: TokenUsage {
            prompt_tokens: 10,
            completion_tokens: 20,
        },
        model: "scripted".to_string(),
        stop_reason: Some("completed".to_string()),
    }
}

fn prompt_of(messages: &[ChatMessage]) -> String {
    messages.last().map(|m| m.content.clone()).unwrap_or_default()
}

/// Returns the same text for every prompt.
pub struct FixedProvider(pub String);

#[async_trait]
impl LlmProvider for FixedProvider {
    async fn complete(
        &self,
        _messages: Vec<ChatMessage>,
        _config: &CompletionConfig,
    ) -> Result<CompletionResponse, ProviderError> {
        Ok(response(self.0.clone()))
    }

    async fn health_check(&self) -> bool {
        true
    }

    fn name(&self) -> &str {
        "fixed"
    }
}

/// Picks the output whose key appears in the prompt; fails otherwise.
pub struct KeyedProvider(pub Vec<(&'static str, String)>);

#[async_trait]
impl LlmProvider for KeyedProvider {
    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        _config: &CompletionConfig,
    ) -> Result<CompletionResponse, ProviderError> {
        let prompt = prompt_of(&messages);
        self.0
            .iter()
            .find(|(key, _)| prompt.contains(key))
            .map(|(_, output)| response(output.clone()))
            .ok_or_else(|| ProviderError::ApiError {
                status: 400,
                message: "malformed request".to_string(),
            })
    }

    async fn health_check(&self) -> bool {
        true
    }

    fn name(&self) -> &str {
        "keyed"
    }
}

/// Always fails with a quota error.
pub struct FailingProvider;

#[async_trait]
impl LlmProvider for FailingProvider {
    async fn complete(
        &self,
        _messages: Vec<ChatMessage>,
        _config: &CompletionConfig,
    ) -> Result<CompletionResponse, ProviderError> {
        Err(ProviderError::ApiError {
            status: 429,
            message: "insufficient_quota".to_string(),
        })
    }

    async fn health_check(&self) -> bool {
        false
    }

    fn name(&self) -> &str {
        "failing"
    }
}

/// Panics when the prompt contains the trigger.
pub struct PanickingProvider {
    pub trigger: &'static str,
}

#[async_trait]
impl LlmProvider for PanickingProvider {
    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        _config: &CompletionConfig,
    ) -> Result<CompletionResponse, ProviderError> {
        if prompt_of(&messages).contains(self.trigger) {
            panic!("provider exploded");
        }
        Ok(response(VALID_OUTPUT))
    }

    async fn health_check(&self) -> bool {
        true
    }

    fn name(&self) -> &str {
        "panicking"
    }
}

/// Sleeps before answering.
pub struct SlowProvider(pub Duration);

#[async_trait]
impl LlmProvider for SlowProvider {
    async fn complete(
        &self,
        _messages: Vec<ChatMessage>,
        _config: &CompletionConfig,
    ) -> Result<CompletionResponse, ProviderError> {
        tokio::time::sleep(self.0).await;
        Ok(response(VALID_OUTPUT))
    }

    async fn health_check(&self) -> bool {
        true
    }

    fn name(&self) -> &str {
        "slow"
    }
}

/// Records every prompt and the config it was sent with.
#[derive(Default)]
pub struct RecordingProvider {
    pub prompts: Mutex<Vec<String>>,
    pub temperatures: Mutex<Vec<f32>>,
}

#[async_trait]
impl LlmProvider for RecordingProvider {
    async fn complete(
        &self,
        messages: Vec<ChatMessage>,
        config: &CompletionConfig,
    ) -> Result<CompletionResponse, ProviderError> {
        self.prompts.lock().push(prompt_of(&messages));
        self.temperatures.lock().push(config.temperature);
        Ok(response(VALID_OUTPUT))
    }

    async fn health_check(&self) -> bool {
        true
    }

    fn name(&self) -> &str {
        "recording"
    }
}
