//! Offline feature-hashing embedder.
//!
//! Each lowercase alphanumeric token is hashed with blake3; the first eight
//! bytes pick a bucket and the ninth byte picks a sign. The accumulated vector
//! is L2-normalized so cosine similarity reflects shared vocabulary.

use async_trait::async_trait;

use super::{EmbeddingBackend, EmbeddingError};

pub struct HashingEmbedder {
    dimensions: usize,
}

impl HashingEmbedder {
    pub fn new(dimensions: usize) -> Self {
        Self {
            dimensions: dimensions.max(1),
        }
    }

    fn embed_sync(&self, text: &str) -> Vec<f32> {
        let mut vector = vec![0.0_f32; self.dimensions];

        for token in text
            .split(|c: char| !c.is_alphanumeric() && c != '+' && c != '#')
            .filter(|t| !t.is_empty())
        {
            let hash = blake3::hash(token.to_lowercase().as_bytes());
            let bytes = hash.as_bytes();
            let mut bucket_bytes = [0u8; 8];
            bucket_bytes.copy_from_slice(&bytes[..8]);
            let bucket = (u64::from_le_bytes(bucket_bytes) % self.dimensions as u64) as usize;
            let sign = if bytes[8] & 1 == 0 { 1.0 } else { -1.0 };
            vector[bucket] += sign;
        }

        let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for x in &mut vector {
                *x /= norm;
            }
        }
        vector
    }
}

#[async_trait]
impl EmbeddingBackend for HashingEmbedder {
    fn model_name(&self) -> &str {
        "feature-hashing-blake3"
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        Ok(self.embed_sync(text))
    }
}
