//! Text embeddings via an OpenAI-compatible provider.
//!
//! Transient provider failures (rate limits, 5xx, timeouts) are retried with
//! exponential backoff through the injected policy; everything else escapes
//! immediately as an embedding error.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use news_rag_config::{EmbeddingModelConfig, QuantizationMode};
use news_rag_core::{Embedder, Result, RetryPolicy};

use crate::RagError;

/// Binarize each component against the vector's own mean: components at or
/// above the mean become 1.0, the rest 0.0. Lossy, fast, length-preserving.
pub fn binary_quantize(vector: &[f32]) -> Vec<f32> {
    if vector.is_empty() {
        return Vec::new();
    }
    let mean = vector.iter().sum::<f32>() / vector.len() as f32;
    vector
        .iter()
        .map(|&v| if v >= mean { 1.0 } else { 0.0 })
        .collect()
}

/// Embedder configuration.
#[derive(Debug, Clone)]
pub struct OpenAiEmbedderConfig {
    /// API key (from OPENAI_API_KEY or direct).
    pub api_key: String,
    /// Model name, e.g. "text-embedding-3-large".
    pub model: String,
    /// Requested output dimensionality.
    pub dimensions: usize,
    pub quantization: QuantizationMode,
    /// Provider endpoint.
    pub endpoint: String,
    /// Per-call timeout.
    pub timeout: Duration,
}

impl Default for OpenAiEmbedderConfig {
    fn default() -> Self {
        Self {
            api_key: std::env::var("OPENAI_API_KEY").unwrap_or_default(),
            model: "text-embedding-3-large".to_string(),
            dimensions: 1024,
            quantization: QuantizationMode::None,
            endpoint: "https://api.openai.com".to_string(),
            timeout: Duration::from_secs(30),
        }
    }
}

impl OpenAiEmbedderConfig {
    /// Build from the settings section, taking the key from the environment.
    pub fn from_settings(config: &EmbeddingModelConfig) -> Self {
        Self {
            model: config.name.clone(),
            dimensions: config.dimensions,
            quantization: config.quantization,
            endpoint: config.endpoint.clone(),
            ..Default::default()
        }
    }
}

/// OpenAI-compatible embedding client.
pub struct OpenAiEmbedder {
    config: OpenAiEmbedderConfig,
    client: Client,
    retry: RetryPolicy,
}

impl OpenAiEmbedder {
    pub fn new(config: OpenAiEmbedderConfig, retry: RetryPolicy) -> Result<Self> {
        if config.api_key.is_empty() {
            return Err(RagError::Configuration(
                "OPENAI_API_KEY not set; provide it via environment or config".to_string(),
            )
            .into());
        }
        if config.dimensions == 0 {
            return Err(
                RagError::Configuration("embedding dimensions must be > 0".to_string()).into(),
            );
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| RagError::Configuration(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            config,
            client,
            retry,
        })
    }

    async fn request_embedding(&self, text: &str) -> std::result::Result<Vec<f32>, RagError> {
        let request = EmbeddingRequest {
            model: &self.config.model,
            input: text,
            dimensions: self.config.dimensions,
            encoding_format: "float",
        };

        let response = self
            .client
            .post(format!("{}/v1/embeddings", self.config.endpoint))
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if status.as_u16() == 429 {
            tracing::warn!(model = %self.config.model, "embedding provider rate limited");
            return Err(RagError::RateLimited);
        }
        if status.is_server_error() {
            return Err(RagError::Network(format!("provider returned HTTP {status}")));
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(RagError::Embedding(format!("HTTP {status}: {message}")));
        }

        let body: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| RagError::Embedding(format!("invalid response: {e}")))?;

        body.data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| RagError::Embedding("response contained no embedding".to_string()))
    }
}

#[async_trait]
impl Embedder for OpenAiEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let vector = self
            .retry
            .run("embed", || self.request_embedding(text))
            .await?;

        if vector.len() != self.config.dimensions {
            return Err(RagError::Embedding(format!(
                "provider returned {} dimensions, expected {}",
                vector.len(),
                self.config.dimensions
            ))
            .into());
        }

        Ok(match self.config.quantization {
            QuantizationMode::Binary => binary_quantize(&vector),
            QuantizationMode::None => vector,
        })
    }

    fn dimensions(&self) -> usize {
        self.config.dimensions
    }
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
    dimensions: usize,
    encoding_format: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}
