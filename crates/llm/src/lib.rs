//! LLM integration for the news RAG pipeline.
//!
//! Features:
//! - OpenAI-compatible chat-completion backend over HTTP
//! - Role-tagged message handling (order preserved)
//! - Static prompt template library (rephrase + synthesis)

pub mod openai;
pub mod prompt;

pub use openai::{OpenAiChatBackend, OpenAiChatConfig};
pub use prompt::PromptLibrary;

use news_rag_core::Transient;
use thiserror::Error;

/// LLM provider errors.
#[derive(Error, Debug)]
pub enum LlmError {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("network error: {0}")]
    Network(String),

    #[error("request timed out")]
    Timeout,

    #[error("rate limit exceeded")]
    RateLimited,

    #[error("API error (HTTP {status}): {message}")]
    Api { status: u16, message: String },

    #[error("invalid response: {0}")]
    InvalidResponse(String),
}

impl Transient for LlmError {
    fn is_transient(&self) -> bool {
        match self {
            LlmError::RateLimited | LlmError::Timeout | LlmError::Network(_) => true,
            LlmError::Api { status, .. } => *status >= 500,
            _ => false,
        }
    }
}

impl From<reqwest::Error> for LlmError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            LlmError::Timeout
        } else {
            LlmError::Network(err.to_string())
        }
    }
}

impl From<LlmError> for news_rag_core::Error {
    fn from(err: LlmError) -> Self {
        match err {
            LlmError::Configuration(msg) => news_rag_core::Error::Configuration(msg),
            other => news_rag_core::Error::LlmProvider(other.to_string()),
        }
    }
}
