//! LLM-free cosine ranking of job postings.
//!
//! Similarities are reported on a 0 to 100 scale with negative cosine clamped to 0.

pub mod handlers;
pub mod index;
pub mod scoring;

use serde::{Deserialize, Serialize};

pub use index::JobIndex;
pub use scoring::VectorScorer;

/// Cosine similarity in [-1, 1]. Mismatched, empty or zero vectors yield 0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let dot: f64 = a.iter().zip(b).map(|(x, y)| *x as f64 * *y as f64).sum();
    let norm_a = a.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();
    let norm_b = b.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        0.0
    } else {
        dot / (norm_a * norm_b)
    }
}

/// Cosine similarity rescaled to [0, 100].
pub fn similarity_score(a: &[f32], b: &[f32]) -> f64 {
    to_score(cosine_similarity(a, b))
}

pub(crate) fn to_score(cosine: f64) -> f64 {
    (cosine * 100.0).clamp(0.0, 100.0)
}

/// Presentation bucket for a similarity score. Never used for gating.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Confidence {
    High,
    Medium,
    Low,
    #[serde(rename = "Very Low")]
    VeryLow,
}

impl Confidence {
    pub fn from_score(score: f64) -> Self {
        if score >= 70.0 {
            Self::High
        } else if score >= 50.0 {
            Self::Medium
        } else if score >= 30.0 {
            Self::Low
        } else {
            Self::VeryLow
        }
    }
}
