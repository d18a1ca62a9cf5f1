//! Static prompt templates.
//!
//! The rephrase and synthesis instructions live in external files named in
//! configuration; this module only loads and serves them. A missing template
//! is fatal at construction, never silently defaulted.

use std::fs;

use news_rag_config::PromptConfig;

use crate::LlmError;

/// Loaded prompt templates, read once at startup.
#[derive(Debug, Clone)]
pub struct PromptLibrary {
    rephrase: String,
    synthesis: String,
}

impl PromptLibrary {
    /// Read both templates from the configured paths.
    pub fn load(config: &PromptConfig) -> Result<Self, LlmError> {
        let rephrase = read_template(&config.rephrase_template_path)?;
        let synthesis = read_template(&config.synthesis_template_path)?;
        Ok(Self { rephrase, synthesis })
    }

    /// Build a library from in-memory template text (tests, embedding hosts).
    pub fn from_parts(rephrase: impl Into<String>, synthesis: impl Into<String>) -> Self {
        Self {
            rephrase: rephrase.into(),
            synthesis: synthesis.into(),
        }
    }

    /// Rephrasing instruction, verbatim.
    pub fn rephrase_prompt(&self) -> &str {
        &self.rephrase
    }

    /// Answer-synthesis instruction, verbatim.
    pub fn synthesis_prompt(&self) -> &str {
        &self.synthesis
    }
}

fn read_template(path: &str) -> Result<String, LlmError> {
    let text = fs::read_to_string(path).map_err(|e| {
        LlmError::Configuration(format!("failed to read prompt template {path}: {e}"))
    })?;
    if text.trim().is_empty() {
        return Err(LlmError::Configuration(format!(
            "prompt template {path} is empty"
        )));
    }
    Ok(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn loads_templates_verbatim() {
        let mut rephrase = tempfile::NamedTempFile::new().unwrap();
        let mut synthesis = tempfile::NamedTempFile::new().unwrap();
        write!(rephrase, "Rephrase the following query.").unwrap();
        write!(synthesis, "Answer using only the provided articles.").unwrap();

        let config = PromptConfig {
            rephrase_template_path: rephrase.path().to_string_lossy().into_owned(),
            synthesis_template_path: synthesis.path().to_string_lossy().into_owned(),
        };

        let library = PromptLibrary::load(&config).unwrap();
        assert_eq!(library.rephrase_prompt(), "Rephrase the following query.");
        assert_eq!(
            library.synthesis_prompt(),
            "Answer using only the provided articles."
        );
    }

    #[test]
    fn missing_template_is_configuration_error() {
        let config = PromptConfig {
            rephrase_template_path: "/nonexistent/rephrase.txt".to_string(),
            synthesis_template_path: "/nonexistent/synthesis.txt".to_string(),
        };

        assert!(matches!(
            PromptLibrary::load(&config),
            Err(LlmError::Configuration(_))
        ));
    }

    #[test]
    fn empty_template_is_configuration_error() {
        let rephrase = tempfile::NamedTempFile::new().unwrap();
        let mut synthesis = tempfile::NamedTempFile::new().unwrap();
        write!(synthesis, "Answer.").unwrap();

        let config = PromptConfig {
            rephrase_template_path: rephrase.path().to_string_lossy().into_owned(),
            synthesis_template_path: synthesis.path().to_string_lossy().into_owned(),
        };

        assert!(matches!(
            PromptLibrary::load(&config),
            Err(LlmError::Configuration(_))
        ));
    }
}
