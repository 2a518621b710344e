//! Persistence seam for the five matching/interview entities.
//!
//! `PgStore` is the production backend. `MemoryStore` backs the unit tests.
//! Both enforce the same uniqueness rules:
//! one match report per (document, job), one session per application, one
//! interview report per session.

#[cfg(test)]
pub mod memory;
pub mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use thiserror::Error;
use uuid::Uuid;

use crate::models::document::CandidateDocument;
use crate::models::interview::{
    Application, InterviewQuestion, InterviewReport, InterviewSession, NewInterviewReport,
};
use crate::models::job::JobPosting;
use crate::models::match_report::{MatchReport, NewMatchReport};

#[cfg(test)]
pub use memory::MemoryStore;
pub use postgres::PgStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("{entity} {id} not found")]
    Missing { entity: &'static str, id: Uuid },
}

/// Which match reports to invalidate after content changes.
#[derive(Debug, Clone, Copy)]
pub enum StaleScope {
    Document(Uuid),
    Job(Uuid),
}

#[async_trait]
pub trait Store: Send + Sync {
    async fn get_document(&self, id: Uuid) -> Result<Option<CandidateDocument>, StoreError>;

    async fn get_job(&self, id: Uuid) -> Result<Option<JobPosting>, StoreError>;

    /// `(job_id, embedding)` for every active posting with a non-empty embedding.
    async fn active_job_embeddings(&self) -> Result<Vec<(Uuid, Vec<f32>)>, StoreError>;

    /// `(job_id, embedding)` for the requested postings that have one.
    async fn job_embeddings(&self, ids: &[Uuid]) -> Result<Vec<(Uuid, Vec<f32>)>, StoreError>;

    async fn set_document_embedding(&self, id: Uuid, embedding: &[f32]) -> Result<(), StoreError>;

    async fn set_job_embedding(&self, id: Uuid, embedding: &[f32]) -> Result<(), StoreError>;

    async fn find_match_report(
        &self,
        document_id: Uuid,
        job_id: Uuid,
    ) -> Result<Option<MatchReport>, StoreError>;

    /// Inserts or replaces the report for `(document_id, job_id)`.
    async fn upsert_match_report(&self, report: NewMatchReport) -> Result<MatchReport, StoreError>;

    /// Returns the number of reports newly marked stale.
    async fn mark_reports_stale(&self, scope: StaleScope) -> Result<u64, StoreError>;

    async fn get_application(&self, id: Uuid) -> Result<Option<Application>, StoreError>;

    async fn set_application_status(&self, id: Uuid, status: &str) -> Result<(), StoreError>;

    async fn get_session(&self, id: Uuid) -> Result<Option<InterviewSession>, StoreError>;

    /// Creates the application's session, or resets an existing one, to
    /// IN_PROGRESS with a single opening question and no answers.
    /// A COMPLETED session is never reset; `None` is returned instead.
    async fn start_session(
        &self,
        application_id: Uuid,
        first_question: &InterviewQuestion,
        started_at: DateTime<Utc>,
    ) -> Result<Option<InterviewSession>, StoreError>;

    async fn find_session_by_application(
        &self,
        application_id: Uuid,
    ) -> Result<Option<InterviewSession>, StoreError>;

    /// Writes status, questions, answers and timestamps of an existing session.
    async fn save_session(&self, session: &InterviewSession) -> Result<(), StoreError>;

    async fn find_interview_report(
        &self,
        session_id: Uuid,
    ) -> Result<Option<InterviewReport>, StoreError>;

    /// Inserts the report unless one already exists for the session, in which
    /// case the existing report is returned untouched.
    async fn insert_interview_report(
        &self,
        report: NewInterviewReport,
    ) -> Result<InterviewReport, StoreError>;

    async fn mark_report_generated(&self, session_id: Uuid) -> Result<(), StoreError>;
}
