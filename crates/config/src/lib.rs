//! Typed settings for the news RAG search pipeline.

pub mod settings;

pub use settings::{
    ChatModelConfig, DistanceMetric, EmbeddingModelConfig, PromptConfig, QuantizationMode,
    RetryConfig, SearchConfig, Settings,
};

use thiserror::Error;

/// Configuration errors. Fatal at startup; never retried.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(String),

    #[error("missing required option: {0}")]
    Missing(&'static str),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

impl From<ConfigError> for news_rag_core::Error {
    fn from(err: ConfigError) -> Self {
        news_rag_core::Error::Configuration(err.to_string())
    }
}
