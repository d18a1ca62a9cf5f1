//! Semantic index: an embedder and a vector index behind one object.
//!
//! Ingestion stores `(id, embed(text), payload)`; retrieval embeds the query
//! and searches the same collection. Point ids always equal datastore
//! document ids.

use std::collections::HashMap;
use std::sync::Arc;

use news_rag_core::{Embedder, Result, ScoredPoint, VectorIndex};

/// Embedder + vector index composition.
#[derive(Clone)]
pub struct SemanticIndex {
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn VectorIndex>,
}

impl SemanticIndex {
    pub fn new(embedder: Arc<dyn Embedder>, index: Arc<dyn VectorIndex>) -> Self {
        Self { embedder, index }
    }

    /// Idempotent collection setup; call once at startup.
    pub async fn ensure_collection(&self) -> Result<()> {
        self.index.ensure_collection().await
    }

    /// Embed `text` and upsert it under `id`. The document id is always
    /// carried in the payload alongside any caller metadata.
    pub async fn store(
        &self,
        id: i64,
        text: &str,
        mut payload: HashMap<String, serde_json::Value>,
    ) -> Result<()> {
        let vector = self.embedder.embed(text).await?;
        payload.insert("document_id".to_string(), serde_json::json!(id));
        self.index.upsert(id, vector, payload).await
    }

    /// Embed `text` and search, restricted to `allowed_ids` when given.
    pub async fn search_similar(
        &self,
        text: &str,
        top_k: usize,
        allowed_ids: Option<&[i64]>,
    ) -> Result<Vec<ScoredPoint>> {
        let vector = self.embedder.embed(text).await?;
        self.index.search(&vector, top_k, allowed_ids).await
    }

    pub async fn health_check(&self) -> bool {
        self.index.health_check().await
    }

    pub fn dimensions(&self) -> usize {
        self.embedder.dimensions()
    }
}
