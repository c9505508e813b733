//! Input items and per-item pipeline state.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::schema::ClinicalOutput;

/// Errors constructing an input item.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InputError {
    #[error("Input '{0}' has empty text")]
    EmptyText(String),
}

/// A named piece of free text to analyse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputItem {
    name: String,
    text: String,
}

impl InputItem {
    /// Create an item. Whitespace-only text is rejected.
    pub fn new(name: impl Into<String>, text: impl Into<String>) -> Result<Self, InputError> {
        let name = name.into();
        let text = text.into();
        if text.trim().is_empty() {
            return Err(InputError::EmptyText(name));
        }
        Ok(Self { name, text })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// State of one item as it moves through generation and validation.
///
/// Immutable: steps return a [`StateUpdate`] and [`PipelineState::apply`]
/// produces the next state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineState {
    item: InputItem,
    prompt_version: String,
    raw_response: Option<String>,
    parsed_output: Option<ClinicalOutput>,
    errors: Vec<String>,
}

impl PipelineState {
    /// Fresh state: no response, no output, no errors.
    pub fn new(item: InputItem, prompt_version: impl Into<String>) -> Self {
        Self {
            item,
            prompt_version: prompt_version.into(),
            raw_response: None,
            parsed_output: None,
            errors: Vec::new(),
        }
    }

    pub fn item(&self) -> &InputItem {
        &self.item
    }

    pub fn prompt_version(&self) -> &str {
        &self.prompt_version
    }

    pub fn raw_response(&self) -> Option<&str> {
        self.raw_response.as_deref()
    }

    pub fn parsed_output(&self) -> Option<&ClinicalOutput> {
        self.parsed_output.as_ref()
    }

    pub fn errors(&self) -> &[String] {
        &self.errors
    }

    /// Validated output present and no errors recorded.
    pub fn is_success(&self) -> bool {
        self.parsed_output.is_some() && self.errors.is_empty()
    }

    /// Merge an update over this state. Fields the update leaves unset keep
    /// their current value.
    pub fn apply(self, update: StateUpdate) -> Self {
        Self {
            raw_response: update.raw_response.unwrap_or(self.raw_response),
            parsed_output: update.parsed_output.unwrap_or(self.parsed_output),
            errors: update.errors.unwrap_or(self.errors),
            ..self
        }
    }

    pub fn into_parts(self) -> (InputItem, Option<ClinicalOutput>, Vec<String>) {
        (self.item, self.parsed_output, self.errors)
    }
}

/// Partial update returned by a pipeline step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StateUpdate {
    raw_response: Option<Option<String>>,
    parsed_output: Option<Option<ClinicalOutput>>,
    errors: Option<Vec<String>>,
}

impl StateUpdate {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raw_response(mut self, raw: Option<String>) -> Self {
        self.raw_response = Some(raw);
        self
    }

    pub fn parsed_output(mut self, output: Option<ClinicalOutput>) -> Self {
        self.parsed_output = Some(output);
        self
    }

    /// Replace the error list.
    pub fn errors(mut self, errors: Vec<String>) -> Self {
        self.errors = Some(errors);
        self
    }
}
