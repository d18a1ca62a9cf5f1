//! Multi-query RAG retrieval for the news archive.
//!
//! Features:
//! - Token-budget prompt trimming (tiktoken encodings, model-name keyed)
//! - OpenAI embeddings with optional binary quantization
//! - Dense vector search via Qdrant with id allow-listing
//! - Semantic index composing embedder + vector index
//! - Multi-round paraphrase-and-retrieve orchestration with max-score
//!   deduplication and grounded answer synthesis

pub mod embeddings;
pub mod orchestrator;
pub mod semantic_index;
pub mod tokens;
pub mod vector_store;

pub use embeddings::{binary_quantize, OpenAiEmbedder, OpenAiEmbedderConfig};
pub use orchestrator::{OrchestratorConfig, RetrievalOrchestrator};
pub use semantic_index::SemanticIndex;
pub use tokens::{count_tokens, trim_to_tokens};
pub use vector_store::{QdrantIndex, QdrantIndexConfig};

use news_rag_core::Transient;
use thiserror::Error;

/// Retrieval errors.
#[derive(Error, Debug)]
pub enum RagError {
    #[error("embedding error: {0}")]
    Embedding(String),

    #[error("embedding rate limit exceeded")]
    RateLimited,

    #[error("request timed out")]
    Timeout,

    #[error("network error: {0}")]
    Network(String),

    #[error("vector store error: {0}")]
    VectorStore(String),

    #[error("search error: {0}")]
    Search(String),

    #[error("connection error: {0}")]
    Connection(String),

    #[error("tokenizer error: {0}")]
    Tokenizer(String),

    #[error("configuration error: {0}")]
    Configuration(String),
}

/// `Connection` is the only retryable Qdrant failure; `Search` and
/// `VectorStore` carry final engine responses (bad vector dimension, missing
/// collection) that retrying cannot fix.
impl Transient for RagError {
    fn is_transient(&self) -> bool {
        matches!(
            self,
            RagError::RateLimited
                | RagError::Timeout
                | RagError::Network(_)
                | RagError::Connection(_)
        )
    }
}

impl From<reqwest::Error> for RagError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            RagError::Timeout
        } else {
            RagError::Network(err.to_string())
        }
    }
}

impl From<RagError> for news_rag_core::Error {
    fn from(err: RagError) -> Self {
        match err {
            RagError::Embedding(_)
            | RagError::RateLimited
            | RagError::Timeout
            | RagError::Network(_) => news_rag_core::Error::Embedding(err.to_string()),
            RagError::VectorStore(_) | RagError::Search(_) | RagError::Connection(_) => {
                news_rag_core::Error::VectorIndex(err.to_string())
            }
            RagError::Tokenizer(_) | RagError::Configuration(_) => {
                news_rag_core::Error::Configuration(err.to_string())
            }
        }
    }
}
