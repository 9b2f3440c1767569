//! Embedding capability.
//!
//! Maps text to a fixed-length float vector through an external backend. The
//! retrieval core stays deterministic: it only ever sees the vectors this
//! capability produces, never the network.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::time::Duration;
use thiserror::Error;

/// Errors from the embedding backend.
#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("embedding request timed out")]
    Timeout,
    #[error("embedding backend unreachable: {0}")]
    Connect(String),
    #[error("embedding backend error: {0}")]
    Upstream(String),
    #[error("malformed embedding response: {0}")]
    MalformedResponse(String),
    #[error("embedding backend returned dimension {actual}, expected {expected}")]
    Dimension { expected: usize, actual: usize },
}

impl From<reqwest::Error> for EmbeddingError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            EmbeddingError::Timeout
        } else if err.is_connect() {
            EmbeddingError::Connect(err.to_string())
        } else {
            EmbeddingError::Upstream(err.to_string())
        }
    }
}

/// External capability mapping text to a fixed-length vector.
///
/// Assumed deterministic for identical input within one process lifetime;
/// all vectors live in one agreed embedding space.
#[async_trait]
pub trait Embedder: Send + Sync {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;

    /// Embeds a batch, returning vectors in input order.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError>;

    /// The process-wide embedding dimensionality.
    fn dimension(&self) -> usize;
}

#[derive(Debug, Deserialize)]
struct OllamaEmbeddingResponse {
    embedding: Vec<f32>,
}

/// Embedder backed by an Ollama-style `/api/embeddings` endpoint.
pub struct OllamaEmbedder {
    client: reqwest::Client,
    base_url: String,
    model: String,
    dimension: usize,
}

impl OllamaEmbedder {
    pub fn new(
        base_url: &str,
        model: &str,
        dimension: usize,
        timeout: Duration,
    ) -> Result<Self, EmbeddingError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| EmbeddingError::Upstream(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            dimension,
        })
    }
}

#[async_trait]
impl Embedder for OllamaEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let url = format!("{}/api/embeddings", self.base_url);
        let response = self
            .client
            .post(&url)
            .json(&json!({ "model": self.model, "prompt": text }))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(EmbeddingError::Upstream(format!("{status}: {body}")));
        }

        let parsed: OllamaEmbeddingResponse = response
            .json()
            .await
            .map_err(|e| EmbeddingError::MalformedResponse(e.to_string()))?;

        if parsed.embedding.len() != self.dimension {
            return Err(EmbeddingError::Dimension {
                expected: self.dimension,
                actual: parsed.embedding.len(),
            });
        }
        Ok(parsed.embedding)
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        // The endpoint embeds one prompt per call; sequential requests keep
        // the output aligned with the input order.
        let mut vectors = Vec::with_capacity(texts.len());
        for text in texts {
            vectors.push(self.embed(text).await?);
        }
        Ok(vectors)
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}
