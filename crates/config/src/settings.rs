//! Main settings module.
//!
//! Settings load from a TOML file layered with `NEWS_RAG_`-prefixed
//! environment variables. Required options without defaults (model names,
//! dimensions, collection name, template paths) fail at load time, never per
//! request.

use std::path::Path;

use config::{Config, Environment, File};
use serde::{Deserialize, Serialize};

use crate::ConfigError;

/// Embedding quantization mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuantizationMode {
    #[default]
    None,
    /// Binarize each component against the vector's own mean.
    Binary,
}

/// Distance metric for the vector collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceMetric {
    #[default]
    Cosine,
    Euclid,
    Dot,
}

/// Embedding provider configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingModelConfig {
    /// Model name, e.g. "text-embedding-3-large". Also keys the tokenizer.
    pub name: String,
    /// Output dimensionality; must match the collection config.
    pub dimensions: usize,
    #[serde(default)]
    pub quantization: QuantizationMode,
    /// Input ceiling for the embedding model's tokenizer.
    #[serde(default = "default_embedding_input_tokens")]
    pub max_input_tokens: usize,
    /// Provider endpoint (OpenAI-compatible).
    #[serde(default = "default_openai_endpoint")]
    pub endpoint: String,
}

/// Vector search configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    pub collection_name: String,
    #[serde(default)]
    pub distance_metric: DistanceMetric,
    #[serde(default = "default_top_k")]
    pub default_top_k: usize,
    #[serde(default = "default_max_top_k")]
    pub max_top_k: usize,
    /// Qdrant endpoint.
    #[serde(default = "default_qdrant_url")]
    pub qdrant_url: String,
}

/// Chat model configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatModelConfig {
    /// Model name, e.g. "gpt-4o". Also keys the tokenizer for context trims.
    pub name: String,
    /// Context ceiling applied to the grounding document block.
    #[serde(default = "default_chat_context_tokens")]
    pub max_context_tokens: usize,
    #[serde(default = "default_openai_endpoint")]
    pub endpoint: String,
}

/// Static prompt template locations.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptConfig {
    pub rephrase_template_path: String,
    pub synthesis_template_path: String,
}

/// Retry behavior for collaborator calls.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
        }
    }
}

/// Main application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub embedding_model: EmbeddingModelConfig,
    pub search: SearchConfig,
    pub chat_model: ChatModelConfig,
    pub prompts: PromptConfig,
    #[serde(default)]
    pub retry: RetryConfig,
}

impl Settings {
    /// Load settings from `path` plus `NEWS_RAG_`-prefixed environment
    /// variables (`NEWS_RAG_SEARCH__MAX_TOP_K=50` style overrides).
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();

        let config = Config::builder()
            .add_source(File::from(path))
            .add_source(Environment::with_prefix("NEWS_RAG").separator("__"))
            .build()
            .map_err(|e| ConfigError::Load(e.to_string()))?;

        let settings: Settings = config
            .try_deserialize()
            .map_err(|e| ConfigError::Load(e.to_string()))?;

        settings.validate()?;
        tracing::info!(
            embedding_model = %settings.embedding_model.name,
            chat_model = %settings.chat_model.name,
            collection = %settings.search.collection_name,
            "settings loaded"
        );
        Ok(settings)
    }

    /// Semantic checks beyond what deserialization enforces.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.embedding_model.name.is_empty() {
            return Err(ConfigError::Missing("embedding_model.name"));
        }
        if self.embedding_model.dimensions == 0 {
            return Err(ConfigError::Invalid(
                "embedding_model.dimensions must be > 0".to_string(),
            ));
        }
        if self.search.collection_name.is_empty() {
            return Err(ConfigError::Missing("search.collection_name"));
        }
        if self.search.default_top_k == 0 || self.search.max_top_k == 0 {
            return Err(ConfigError::Invalid(
                "search top_k values must be > 0".to_string(),
            ));
        }
        if self.search.default_top_k > self.search.max_top_k {
            return Err(ConfigError::Invalid(format!(
                "search.default_top_k {} exceeds search.max_top_k {}",
                self.search.default_top_k, self.search.max_top_k
            )));
        }
        if self.chat_model.name.is_empty() {
            return Err(ConfigError::Missing("chat_model.name"));
        }
        if self.prompts.rephrase_template_path.is_empty() {
            return Err(ConfigError::Missing("prompts.rephrase_template_path"));
        }
        if self.prompts.synthesis_template_path.is_empty() {
            return Err(ConfigError::Missing("prompts.synthesis_template_path"));
        }
        Ok(())
    }
}

fn default_embedding_input_tokens() -> usize {
    8191
}

fn default_chat_context_tokens() -> usize {
    100_000
}

fn default_openai_endpoint() -> String {
    "https://api.openai.com".to_string()
}

fn default_qdrant_url() -> String {
    "http://localhost:6334".to_string()
}

fn default_top_k() -> usize {
    5
}

fn default_max_top_k() -> usize {
    30
}

fn default_max_attempts() -> u32 {
    3
}

fn default_base_delay_ms() -> u64 {
    200
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn base_settings() -> Settings {
        Settings {
            embedding_model: EmbeddingModelConfig {
                name: "text-embedding-3-large".to_string(),
                dimensions: 1024,
                quantization: QuantizationMode::None,
                max_input_tokens: default_embedding_input_tokens(),
                endpoint: default_openai_endpoint(),
            },
            search: SearchConfig {
                collection_name: "news".to_string(),
                distance_metric: DistanceMetric::Cosine,
                default_top_k: 5,
                max_top_k: 30,
                qdrant_url: default_qdrant_url(),
            },
            chat_model: ChatModelConfig {
                name: "gpt-4o".to_string(),
                max_context_tokens: default_chat_context_tokens(),
                endpoint: default_openai_endpoint(),
            },
            prompts: PromptConfig {
                rephrase_template_path: "prompts/rephrase.txt".to_string(),
                synthesis_template_path: "prompts/synthesis.txt".to_string(),
            },
            retry: RetryConfig::default(),
        }
    }

    #[test]
    fn valid_settings_pass() {
        assert!(base_settings().validate().is_ok());
    }

    #[test]
    fn zero_dimensions_rejected() {
        let mut settings = base_settings();
        settings.embedding_model.dimensions = 0;
        assert!(matches!(
            settings.validate(),
            Err(ConfigError::Invalid(_))
        ));
    }

    #[test]
    fn default_top_k_cannot_exceed_max() {
        let mut settings = base_settings();
        settings.search.default_top_k = 50;
        settings.search.max_top_k = 30;
        assert!(settings.validate().is_err());
    }

    #[test]
    fn missing_template_path_rejected() {
        let mut settings = base_settings();
        settings.prompts.rephrase_template_path.clear();
        assert!(matches!(
            settings.validate(),
            Err(ConfigError::Missing("prompts.rephrase_template_path"))
        ));
    }

    #[test]
    fn loads_from_toml_file() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        write!(
            file,
            r#"
[embedding_model]
name = "text-embedding-3-large"
dimensions = 1024
quantization = "binary"

[search]
collection_name = "science_articles"
max_top_k = 50

[chat_model]
name = "gpt-4o"

[prompts]
rephrase_template_path = "prompts/rephrase.txt"
synthesis_template_path = "prompts/synthesis.txt"
"#
        )
        .unwrap();

        let settings = Settings::load(file.path()).unwrap();
        assert_eq!(settings.embedding_model.quantization, QuantizationMode::Binary);
        assert_eq!(settings.search.max_top_k, 50);
        assert_eq!(settings.search.default_top_k, 5);
        assert_eq!(settings.chat_model.max_context_tokens, 100_000);
    }

    #[test]
    fn missing_required_field_fails_load() {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .unwrap();
        write!(
            file,
            r#"
[search]
collection_name = "news"
"#
        )
        .unwrap();

        assert!(Settings::load(file.path()).is_err());
    }
}
