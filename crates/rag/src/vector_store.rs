//! Vector index backed by Qdrant.
//!
//! Stores one point per document (point id == document id) and runs dense
//! similarity search with the candidate allow-list pushed into the engine
//! filter, so `top_k` is satisfied from the filtered universe.

use std::collections::HashMap;

use async_trait::async_trait;
use qdrant_client::qdrant::{
    Condition, CreateCollectionBuilder, Distance, Filter, PointId, PointStruct,
    SearchPointsBuilder, UpsertPointsBuilder, VectorParamsBuilder,
};
use qdrant_client::{Payload, Qdrant, QdrantError};

use news_rag_config::DistanceMetric;
use news_rag_core::{Result, RetryPolicy, ScoredPoint, VectorIndex};

use crate::RagError;

/// Vector index configuration.
#[derive(Debug, Clone)]
pub struct QdrantIndexConfig {
    /// Qdrant endpoint.
    pub url: String,
    /// Collection name.
    pub collection: String,
    /// Vector dimensionality; must match the embedder.
    pub dimensions: usize,
    pub distance: DistanceMetric,
    /// API key (optional).
    pub api_key: Option<String>,
}

impl QdrantIndexConfig {
    pub fn new(
        url: impl Into<String>,
        collection: impl Into<String>,
        dimensions: usize,
        distance: DistanceMetric,
    ) -> Self {
        Self {
            url: url.into(),
            collection: collection.into(),
            dimensions,
            distance,
            api_key: None,
        }
    }
}

/// Classify a Qdrant failure: transport-level gRPC statuses (deadline
/// exceeded, resource exhausted, unavailable) become the retryable
/// [`RagError::Connection`]; everything else, such as a dimension mismatch or
/// a missing collection, goes through `fatal` and surfaces immediately.
fn classify_qdrant_error(err: QdrantError, fatal: fn(String) -> RagError) -> RagError {
    match err {
        QdrantError::ResponseError { status } => match status.code() as i32 {
            // gRPC codes: 4 DEADLINE_EXCEEDED, 8 RESOURCE_EXHAUSTED, 14 UNAVAILABLE
            4 | 8 | 14 => RagError::Connection(status.to_string()),
            _ => fatal(status.to_string()),
        },
        other => fatal(other.to_string()),
    }
}

fn to_qdrant_distance(metric: DistanceMetric) -> Distance {
    match metric {
        DistanceMetric::Cosine => Distance::Cosine,
        DistanceMetric::Euclid => Distance::Euclid,
        DistanceMetric::Dot => Distance::Dot,
    }
}

/// Qdrant-backed implementation of [`VectorIndex`].
pub struct QdrantIndex {
    client: Qdrant,
    config: QdrantIndexConfig,
    retry: RetryPolicy,
}

impl QdrantIndex {
    /// Connect to Qdrant. The collection is not touched here; call
    /// [`VectorIndex::ensure_collection`] during startup.
    pub fn connect(config: QdrantIndexConfig, retry: RetryPolicy) -> Result<Self> {
        let mut builder = Qdrant::from_url(&config.url);
        if let Some(ref api_key) = config.api_key {
            builder = builder.api_key(api_key.clone());
            tracing::info!("Qdrant connection using API key authentication");
        }

        let client = builder
            .build()
            .map_err(|e| RagError::Connection(e.to_string()))?;

        Ok(Self {
            client,
            config,
            retry,
        })
    }

    async fn ensure_collection_once(&self) -> std::result::Result<(), RagError> {
        let exists = self
            .client
            .collection_exists(&self.config.collection)
            .await
            .map_err(|e| classify_qdrant_error(e, RagError::VectorStore))?;

        if !exists {
            self.client
                .create_collection(
                    CreateCollectionBuilder::new(&self.config.collection).vectors_config(
                        VectorParamsBuilder::new(
                            self.config.dimensions as u64,
                            to_qdrant_distance(self.config.distance),
                        ),
                    ),
                )
                .await
                .map_err(|e| classify_qdrant_error(e, RagError::VectorStore))?;
            tracing::info!(collection = %self.config.collection, "created collection");
        }

        Ok(())
    }

    async fn search_once(
        &self,
        vector: &[f32],
        top_k: usize,
        allowed_ids: Option<&[i64]>,
    ) -> std::result::Result<Vec<ScoredPoint>, RagError> {
        let mut builder =
            SearchPointsBuilder::new(&self.config.collection, vector.to_vec(), top_k as u64);

        if let Some(ids) = allowed_ids {
            if let Some(&bad) = ids.iter().find(|&&id| id < 0) {
                return Err(RagError::VectorStore(format!(
                    "negative document id {bad} cannot address a point"
                )));
            }
            let filter = Filter::must([Condition::has_id(
                ids.iter().map(|&id| PointId::from(id as u64)),
            )]);
            builder = builder.filter(filter);
        }

        let response = self
            .client
            .search_points(builder)
            .await
            .map_err(|e| classify_qdrant_error(e, RagError::Search))?;

        let mut points = Vec::with_capacity(response.result.len());
        for point in response.result {
            let id = match point.id.and_then(|pid| pid.point_id_options) {
                Some(qdrant_client::qdrant::point_id::PointIdOptions::Num(n)) => n as i64,
                other => {
                    tracing::warn!(?other, "skipping point with non-numeric id");
                    continue;
                }
            };
            points.push(ScoredPoint::new(id, point.score));
        }

        Ok(points)
    }
}

#[async_trait]
impl VectorIndex for QdrantIndex {
    async fn ensure_collection(&self) -> Result<()> {
        self.retry
            .run("ensure_collection", || self.ensure_collection_once())
            .await?;
        Ok(())
    }

    async fn upsert(
        &self,
        id: i64,
        vector: Vec<f32>,
        payload: HashMap<String, serde_json::Value>,
    ) -> Result<()> {
        if id < 0 {
            return Err(RagError::VectorStore(format!(
                "negative document id {id} cannot address a point"
            ))
            .into());
        }

        let payload_map: serde_json::Map<String, serde_json::Value> =
            payload.into_iter().collect();
        let payload = Payload::try_from(serde_json::Value::Object(payload_map))
            .map_err(|e| RagError::VectorStore(format!("invalid payload: {e}")))?;

        let point = PointStruct::new(id as u64, vector, payload);

        self.client
            .upsert_points(UpsertPointsBuilder::new(&self.config.collection, vec![point]))
            .await
            .map_err(|e| classify_qdrant_error(e, RagError::VectorStore))?;

        tracing::debug!(id, collection = %self.config.collection, "upserted point");
        Ok(())
    }

    async fn search(
        &self,
        vector: &[f32],
        top_k: usize,
        allowed_ids: Option<&[i64]>,
    ) -> Result<Vec<ScoredPoint>> {
        let points = self
            .retry
            .run("vector_search", || {
                self.search_once(vector, top_k, allowed_ids)
            })
            .await?;
        Ok(points)
    }

    async fn health_check(&self) -> bool {
        match self.client.health_check().await {
            Ok(_) => true,
            Err(e) => {
                tracing::error!(error = %e, "Qdrant health check failed");
                false
            }
        }
    }
}
