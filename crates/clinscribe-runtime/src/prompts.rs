//! Prompt templates, resolved by version tag.
//!
//! A template is plain text containing the [`INPUT_PLACEHOLDER`] marker.
//! Lookup never fails for a missing template: the built-in
//! [`DEFAULT_TEMPLATE`] is used instead, so a missing file degrades output
//! quality rather than halting the batch. A template that exists but cannot
//! be read is an error.

use std::collections::BTreeMap;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Marker replaced by the item text.
pub const INPUT_PLACEHOLDER: &str = "{INPUT}";

/// Minimal template used when no template exists for a version.
pub const DEFAULT_TEMPLATE: &str = "Analise o texto: {INPUT}";

/// Errors reading a template that exists.
#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("Failed to read template {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Where templates come from.
pub trait TemplateSource: Send + Sync {
    /// `Ok(None)` when no template exists for `version`.
    fn lookup(&self, version: &str) -> Result<Option<String>, TemplateError>;
}

/// Templates stored as `<dir>/prompt_<version>.txt` (UTF-8).
#[derive(Debug, Clone)]
pub struct DirectoryTemplates {
    dir: PathBuf,
}

impl DirectoryTemplates {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Path the template for `version` would live at.
    pub fn path_for(&self, version: &str) -> PathBuf {
        self.dir.join(format!("prompt_{}.txt", version))
    }
}

impl TemplateSource for DirectoryTemplates {
    fn lookup(&self, version: &str) -> Result<Option<String>, TemplateError> {
        let path = self.path_for(version);
        if !path.exists() {
            return Ok(None);
        }
        std::fs::read_to_string(&path)
            .map(Some)
            .map_err(|source| TemplateError::Io { path, source })
    }
}

/// Templates held in memory, keyed by version.
#[derive(Debug, Clone, Default)]
pub struct InMemoryTemplates {
    templates: BTreeMap<String, String>,
}

impl InMemoryTemplates {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, version: impl Into<String>, template: impl Into<String>) -> Self {
        self.templates.insert(version.into(), template.into());
        self
    }
}

impl TemplateSource for InMemoryTemplates {
    fn lookup(&self, version: &str) -> Result<Option<String>, TemplateError> {
        Ok(self.templates.get(version).cloned())
    }
}

/// Resolve the template for `version`, falling back to [`DEFAULT_TEMPLATE`].
pub fn load_template(source: &dyn TemplateSource, version: &str) -> Result<String, TemplateError> {
    match source.lookup(version)? {
        Some(template) => Ok(template),
        None => {
            tracing::warn!(version, "No template for version, using default");
            Ok(DEFAULT_TEMPLATE.to_string())
        }
    }
}

/// Substitute every placeholder with the item text.
pub fn render_prompt(template: &str, input_text: &str) -> String {
    template.replace(INPUT_PLACEHOLDER, input_text)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_template_has_placeholder() {
        assert!(DEFAULT_TEMPLATE.contains(INPUT_PLACEHOLDER));
    }

    #[test]
    fn test_missing_version_falls_back_to_default() {
        let source = InMemoryTemplates::new().with("v1", "Texto: {INPUT}");
        assert_eq!(load_template(&source, "v9").unwrap(), DEFAULT_TEMPLATE);
        assert_eq!(load_template(&source, "v1").unwrap(), "Texto: {INPUT}");
    }

    #[test]
    fn test_render_replaces_every_placeholder() {
        let prompt = render_prompt("{INPUT}\n---\n{INPUT}", "olá");
        assert_eq!(prompt, "olá\n---\nolá");
    }

    #[test]
    fn test_directory_templates_follow_filename_convention() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("prompt_v2.txt"), "Análise v2: {INPUT}").unwrap();

        let source = DirectoryTemplates::new(dir.path());
        assert_eq!(
            load_template(&source, "v2").unwrap(),
            "Análise v2: {INPUT}"
        );
        assert_eq!(load_template(&source, "v3").unwrap(), DEFAULT_TEMPLATE);
    }

    #[test]
    fn test_unreadable_template_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        // A directory where the file should be: exists, but cannot be read as text.
        std::fs::create_dir(dir.path().join("prompt_v2.txt")).unwrap();

        let source = DirectoryTemplates::new(dir.path());
        let err = load_template(&source, "v2").unwrap_err();
        assert!(err.to_string().contains("prompt_v2.txt"));
    }
}
