//! Embedding Generator: converts free text into fixed-length vectors.
//!
//! `EmbeddingService` is constructed once at startup and cloned into every
//! consumer; clones share the same backend through an `Arc`.

pub mod hashing;
pub mod handlers;
pub mod http;
pub mod maintenance;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::debug;

pub use hashing::HashingEmbedder;
pub use http::HttpEmbedder;
pub use maintenance::EmbeddingMaintenance;

#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("embedding API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("embedding response contained no vectors")]
    EmptyResponse,

    #[error("expected {expected}-dimensional embedding, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },
}

/// A text-embedding model. Implementations must be deterministic for a
/// given model version and safe to call concurrently.
#[async_trait]
pub trait EmbeddingBackend: Send + Sync {
    /// Model identifier, recorded alongside generated vectors.
    fn model_name(&self) -> &str;

    fn dimensions(&self) -> usize;

    /// Encodes non-empty text. Empty input is filtered out by `EmbeddingService`.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;
}

/// Process-wide embedding service.
#[derive(Clone)]
pub struct EmbeddingService {
    backend: Arc<dyn EmbeddingBackend>,
}

impl EmbeddingService {
    pub fn new(backend: Arc<dyn EmbeddingBackend>) -> Self {
        Self { backend }
    }

    pub fn model_name(&self) -> &str {
        self.backend.model_name()
    }

    pub fn dimensions(&self) -> usize {
        self.backend.dimensions()
    }

    /// Encodes `text`. Missing or blank text yields an empty vector, the
    /// "no embedding" sentinel, rather than an error.
    pub async fn encode(&self, text: Option<&str>) -> Result<Vec<f32>, EmbeddingError> {
        let text = match text.map(str::trim) {
            Some(t) if !t.is_empty() => t,
            _ => return Ok(Vec::new()),
        };

        let vector = self.backend.embed(text).await?;
        if vector.len() != self.backend.dimensions() {
            return Err(EmbeddingError::DimensionMismatch {
                expected: self.backend.dimensions(),
                actual: vector.len(),
            });
        }

        debug!(
            text_len = text.len(),
            dims = vector.len(),
            model = self.backend.model_name(),
            "Encoded text"
        );
        Ok(vector)
    }
}
