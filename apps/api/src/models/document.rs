use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Structured career preferences stored on the candidate profile.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CareerPreferences {
    #[serde(default)]
    pub industries: Vec<String>,
    #[serde(default)]
    pub locations: Vec<String>,
    #[serde(default)]
    pub work_types: Vec<String>,
    #[serde(default, alias = "preferred_roles")]
    pub roles: Vec<String>,
}

/// A candidate's parsed resume and its embedding.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CandidateDocument {
    pub id: Uuid,
    pub candidate_id: Uuid,
    pub parsed_text: Option<String>,
    pub embedding: Option<Vec<f32>>,
    pub is_primary: bool,
    #[sqlx(json)]
    pub career_preferences: CareerPreferences,
    pub updated_at: DateTime<Utc>,
}

impl CandidateDocument {
    /// The embedding if one has been computed. An empty vector counts as absent.
    pub fn embedding(&self) -> Option<&[f32]> {
        self.embedding.as_deref().filter(|v| !v.is_empty())
    }
}
