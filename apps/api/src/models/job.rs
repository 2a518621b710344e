use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sqlx::FromRow;
use uuid::Uuid;

pub const JOB_STATUS_ACTIVE: &str = "active";

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JobPosting {
    pub id: Uuid,
    pub title: String,
    pub company_name: String,
    pub industry: Option<String>,
    pub description: String,
    pub requirements: Vec<String>,
    pub responsibilities: Vec<String>,
    pub location: Option<String>,
    pub job_type: String,
    pub remote_option: String,
    pub salary_min: Option<i32>,
    pub salary_max: Option<i32>,
    pub status: String,
    pub embedding: Option<Vec<f32>>,
    /// Employer-supplied raw axis weights. Resolved by `analysis::weights`.
    pub matching_weights: Option<Value>,
    pub updated_at: DateTime<Utc>,
}

impl JobPosting {
    pub fn embedding(&self) -> Option<&[f32]> {
        self.embedding.as_deref().filter(|v| !v.is_empty())
    }

    /// Text the posting's embedding is computed from.
    pub fn embedding_text(&self) -> String {
        let mut parts = vec![self.title.as_str(), self.description.as_str()];
        parts.extend(self.requirements.iter().map(String::as_str));
        parts.extend(self.responsibilities.iter().map(String::as_str));
        parts
            .into_iter()
            .filter(|p| !p.trim().is_empty())
            .collect::<Vec<_>>()
            .join("\n")
    }
}
