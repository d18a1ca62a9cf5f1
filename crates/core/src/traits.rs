//! Collaborator traits at the pipeline boundary.
//!
//! Concrete providers (OpenAI embeddings, Qdrant, chat-completion backends,
//! the relational store) are composed behind these traits and injected into
//! the orchestrator at construction. No trait carries shared implementation
//! state.

use std::collections::HashMap;

use async_trait::async_trait;

use crate::document::{Document, DocumentFilter};
use crate::error::Result;
use crate::message::Message;
use crate::request::ScoredPoint;

/// Converts text into a fixed-dimension embedding vector.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a single text. Transient provider failures are retried inside
    /// the implementation; the error that escapes is final.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Configured output dimensionality.
    fn dimensions(&self) -> usize;
}

/// Approximate nearest-neighbor store of `(id, vector, payload)` points.
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Idempotent collection creation; no-op when the collection exists.
    async fn ensure_collection(&self) -> Result<()>;

    /// Insert or replace the point at `id`. Visible to subsequent searches.
    async fn upsert(
        &self,
        id: i64,
        vector: Vec<f32>,
        payload: HashMap<String, serde_json::Value>,
    ) -> Result<()>;

    /// Up to `top_k` points by descending similarity. When `allowed_ids` is
    /// given the filter is pushed into the engine so `top_k` is satisfied
    /// from the filtered universe.
    async fn search(
        &self,
        vector: &[f32],
        top_k: usize,
        allowed_ids: Option<&[i64]>,
    ) -> Result<Vec<ScoredPoint>>;

    /// Non-throwing liveness probe.
    async fn health_check(&self) -> bool;
}

/// Chat-completion model.
#[async_trait]
pub trait ChatModel: Send + Sync {
    /// Send messages in order, roles preserved; return the top completion.
    async fn complete(&self, messages: &[Message]) -> Result<String>;

    /// Wrap a single user-role message.
    async fn simple_answer(&self, prompt: &str) -> Result<String> {
        self.complete(&[Message::user(prompt)]).await
    }
}

/// Read-only view of the relational article store.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Ids of all documents matching the structural filter. The result is
    /// the search universe for one whole request.
    async fn find_ids_by_filter(&self, filter: &DocumentFilter) -> Result<Vec<i64>>;

    /// Full rows for the ranked ids, in the order the store returns them.
    async fn fetch_by_ids(&self, ids: &[i64]) -> Result<Vec<Document>>;
}
