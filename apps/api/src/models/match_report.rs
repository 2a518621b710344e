use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::analysis::schema::MatchReportPayload;

/// Persisted match analysis for one (document, job) pair.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MatchReport {
    pub id: Uuid,
    pub document_id: Uuid,
    pub job_id: Uuid,
    pub overall_score: i32,
    #[sqlx(json)]
    pub report_data: MatchReportPayload,
    pub report_version: String,
    pub model_name: String,
    pub is_stale: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Values written by an upsert. The store assigns ids and timestamps.
#[derive(Debug, Clone)]
pub struct NewMatchReport {
    pub document_id: Uuid,
    pub job_id: Uuid,
    pub overall_score: i32,
    pub report_data: MatchReportPayload,
    pub report_version: String,
    pub model_name: String,
    pub is_stale: bool,
}
