//! Error taxonomy shared across the pipeline crates.

use thiserror::Error;

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type.
///
/// Provider-specific errors (embedding, vector index, chat model) carry the
/// collaborator's own message after local retries are exhausted. `NotFound`
/// and `NoRelevantDocuments` are distinct on purpose: the former means the
/// structural prefilter matched nothing, the latter that documents matched
/// the filters but none were semantically relevant.
#[derive(Error, Debug)]
pub enum Error {
    #[error("configuration error: {0}")]
    Configuration(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("no relevant documents: {0}")]
    NoRelevantDocuments(String),

    #[error("embedding error: {0}")]
    Embedding(String),

    #[error("vector index error: {0}")]
    VectorIndex(String),

    #[error("llm provider error: {0}")]
    LlmProvider(String),

    #[error("datastore error: {0}")]
    Datastore(String),

    #[error("invalid request: {0}")]
    InvalidRequest(String),
}

impl Error {
    /// Whether this error came from missing or broken static configuration.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Error::Configuration(_))
    }
}
