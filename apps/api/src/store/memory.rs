use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::Mutex;
use uuid::Uuid;

use super::{StaleScope, Store, StoreError};
use crate::models::document::CandidateDocument;
use crate::models::interview::{
    Application, InterviewQuestion, InterviewReport, InterviewSession, InterviewStatus,
    NewInterviewReport,
};
use crate::models::job::{JobPosting, JOB_STATUS_ACTIVE};
use crate::models::match_report::{MatchReport, NewMatchReport};

#[derive(Default)]
struct Tables {
    documents: HashMap<Uuid, CandidateDocument>,
    jobs: HashMap<Uuid, JobPosting>,
    applications: HashMap<Uuid, Application>,
    match_reports: HashMap<(Uuid, Uuid), MatchReport>,
    sessions: HashMap<Uuid, InterviewSession>,
    interview_reports: HashMap<Uuid, InterviewReport>,
}

/// In-process store with the same uniqueness rules as the SQL schema.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_document(&self, document: CandidateDocument) {
        self.tables.lock().await.documents.insert(document.id, document);
    }

    pub async fn insert_job(&self, job: JobPosting) {
        self.tables.lock().await.jobs.insert(job.id, job);
    }

    pub async fn insert_application(&self, application: Application) {
        self.tables
            .lock()
            .await
            .applications
            .insert(application.id, application);
    }

    pub async fn match_report_count(&self) -> usize {
        self.tables.lock().await.match_reports.len()
    }

    pub async fn interview_report_count(&self) -> usize {
        self.tables.lock().await.interview_reports.len()
    }
}

fn non_empty(embedding: &Option<Vec<f32>>) -> Option<Vec<f32>> {
    embedding.clone().filter(|v| !v.is_empty())
}

#[async_trait]
impl Store for MemoryStore {
    async fn get_document(&self, id: Uuid) -> Result<Option<CandidateDocument>, StoreError> {
        Ok(self.tables.lock().await.documents.get(&id).cloned())
    }

    async fn get_job(&self, id: Uuid) -> Result<Option<JobPosting>, StoreError> {
        Ok(self.tables.lock().await.jobs.get(&id).cloned())
    }

    async fn active_job_embeddings(&self) -> Result<Vec<(Uuid, Vec<f32>)>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(tables
            .jobs
            .values()
            .filter(|j| j.status == JOB_STATUS_ACTIVE)
            .filter_map(|j| non_empty(&j.embedding).map(|e| (j.id, e)))
            .collect())
    }

    async fn job_embeddings(&self, ids: &[Uuid]) -> Result<Vec<(Uuid, Vec<f32>)>, StoreError> {
        let tables = self.tables.lock().await;
        Ok(ids
            .iter()
            .filter_map(|id| tables.jobs.get(id))
            .filter_map(|j| non_empty(&j.embedding).map(|e| (j.id, e)))
            .collect())
    }

    async fn set_document_embedding(&self, id: Uuid, embedding: &[f32]) -> Result<(), StoreError> {
        let mut tables = self.tables.lock().await;
        let document = tables.documents.get_mut(&id).ok_or(StoreError::Missing {
            entity: "document",
            id,
        })?;
        document.embedding = Some(embedding.to_vec());
        document.updated_at = Utc::now();
        Ok(())
    }

    async fn set_job_embedding(&self, id: Uuid, embedding: &[f32]) -> Result<(), StoreError> {
        let mut tables = self.tables.lock().await;
        let job = tables
            .jobs
            .get_mut(&id)
            .ok_or(StoreError::Missing { entity: "job", id })?;
        job.embedding = Some(embedding.to_vec());
        job.updated_at = Utc::now();
        Ok(())
    }

    async fn find_match_report(
        &self,
        document_id: Uuid,
        job_id: Uuid,
    ) -> Result<Option<MatchReport>, StoreError> {
        Ok(self
            .tables
            .lock()
            .await
            .match_reports
            .get(&(document_id, job_id))
            .cloned())
    }

    async fn upsert_match_report(&self, report: NewMatchReport) -> Result<MatchReport, StoreError> {
        let mut tables = self.tables.lock().await;
        let now = Utc::now();
        let key = (report.document_id, report.job_id);
        let (id, created_at) = tables
            .match_reports
            .get(&key)
            .map(|existing| (existing.id, existing.created_at))
            .unwrap_or_else(|| (Uuid::new_v4(), now));

        let row = MatchReport {
            id,
            document_id: report.document_id,
            job_id: report.job_id,
            overall_score: report.overall_score,
            report_data: report.report_data,
            report_version: report.report_version,
            model_name: report.model_name,
            is_stale: report.is_stale,
            created_at,
            updated_at: now,
        };
        tables.match_reports.insert(key, row.clone());
        Ok(row)
    }

    async fn mark_reports_stale(&self, scope: StaleScope) -> Result<u64, StoreError> {
        let mut tables = self.tables.lock().await;
        let mut count = 0;
        for report in tables.match_reports.values_mut() {
            let in_scope = match scope {
                StaleScope::Document(id) => report.document_id == id,
                StaleScope::Job(id) => report.job_id == id,
            };
            if in_scope && !report.is_stale {
                report.is_stale = true;
                report.updated_at = Utc::now();
                count += 1;
            }
        }
        Ok(count)
    }

    async fn get_application(&self, id: Uuid) -> Result<Option<Application>, StoreError> {
        Ok(self.tables.lock().await.applications.get(&id).cloned())
    }

    async fn set_application_status(&self, id: Uuid, status: &str) -> Result<(), StoreError> {
        if let Some(application) = self.tables.lock().await.applications.get_mut(&id) {
            application.status = status.to_string();
        }
        Ok(())
    }

    async fn get_session(&self, id: Uuid) -> Result<Option<InterviewSession>, StoreError> {
        Ok(self.tables.lock().await.sessions.get(&id).cloned())
    }

    async fn start_session(
        &self,
        application_id: Uuid,
        first_question: &InterviewQuestion,
        started_at: DateTime<Utc>,
    ) -> Result<Option<InterviewSession>, StoreError> {
        let mut tables = self.tables.lock().await;
        let now = Utc::now();
        let existing = tables
            .sessions
            .values()
            .find(|s| s.application_id == application_id);
        if existing.is_some_and(|s| s.status == InterviewStatus::Completed) {
            return Ok(None);
        }
        let (id, created_at) = existing
            .map(|s| (s.id, s.created_at))
            .unwrap_or_else(|| (Uuid::new_v4(), now));

        let session = InterviewSession {
            id,
            application_id,
            status: InterviewStatus::InProgress,
            questions: vec![first_question.clone()],
            answers: Vec::new(),
            started_at: Some(started_at),
            completed_at: None,
            report_generated: false,
            created_at,
            updated_at: now,
        };
        tables.sessions.insert(id, session.clone());
        Ok(Some(session))
    }

    async fn find_session_by_application(
        &self,
        application_id: Uuid,
    ) -> Result<Option<InterviewSession>, StoreError> {
        Ok(self
            .tables
            .lock()
            .await
            .sessions
            .values()
            .find(|s| s.application_id == application_id)
            .cloned())
    }

    async fn save_session(&self, session: &InterviewSession) -> Result<(), StoreError> {
        let mut tables = self.tables.lock().await;
        let stored = tables
            .sessions
            .get_mut(&session.id)
            .ok_or(StoreError::Missing {
                entity: "interview session",
                id: session.id,
            })?;
        *stored = InterviewSession {
            updated_at: Utc::now(),
            ..session.clone()
        };
        Ok(())
    }

    async fn find_interview_report(
        &self,
        session_id: Uuid,
    ) -> Result<Option<InterviewReport>, StoreError> {
        Ok(self
            .tables
            .lock()
            .await
            .interview_reports
            .get(&session_id)
            .cloned())
    }

    async fn insert_interview_report(
        &self,
        report: NewInterviewReport,
    ) -> Result<InterviewReport, StoreError> {
        let mut tables = self.tables.lock().await;
        let row = tables
            .interview_reports
            .entry(report.session_id)
            .or_insert_with(|| InterviewReport {
                id: Uuid::new_v4(),
                session_id: report.session_id,
                report_data: report.report_data,
                report_version: report.report_version,
                model_name: report.model_name,
                overall_score: report.overall_score,
                created_at: Utc::now(),
            });
        Ok(row.clone())
    }

    async fn mark_report_generated(&self, session_id: Uuid) -> Result<(), StoreError> {
        if let Some(session) = self.tables.lock().await.sessions.get_mut(&session_id) {
            session.report_generated = true;
            session.updated_at = Utc::now();
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::schema::MatchReportPayload;

    fn new_report(document_id: Uuid, job_id: Uuid, score: i32) -> NewMatchReport {
        NewMatchReport {
            document_id,
            job_id,
            overall_score: score,
            report_data: MatchReportPayload::placeholder(),
            report_version: "4.0".to_string(),
            model_name: "test-model".to_string(),
            is_stale: false,
        }
    }

    #[tokio::test]
    async fn test_upsert_keeps_one_report_per_pair() {
        let store = MemoryStore::new();
        let (d, j) = (Uuid::new_v4(), Uuid::new_v4());

        let first = store.upsert_match_report(new_report(d, j, 10)).await.unwrap();
        let second = store.upsert_match_report(new_report(d, j, 70)).await.unwrap();

        assert_eq!(store.match_report_count().await, 1);
        assert_eq!(first.id, second.id);
        assert_eq!(second.overall_score, 70);
        assert_eq!(first.created_at, second.created_at);
    }

    #[tokio::test]
    async fn test_mark_stale_only_touches_scope() {
        let store = MemoryStore::new();
        let (d1, d2, j) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        store.upsert_match_report(new_report(d1, j, 10)).await.unwrap();
        store.upsert_match_report(new_report(d2, j, 10)).await.unwrap();

        let marked = store.mark_reports_stale(StaleScope::Document(d1)).await.unwrap();
        assert_eq!(marked, 1);
        assert!(store.find_match_report(d1, j).await.unwrap().unwrap().is_stale);
        assert!(!store.find_match_report(d2, j).await.unwrap().unwrap().is_stale);

        // Already stale reports are not counted twice.
        assert_eq!(store.mark_reports_stale(StaleScope::Document(d1)).await.unwrap(), 0);
        assert_eq!(store.mark_reports_stale(StaleScope::Job(j)).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_start_session_reuses_row_for_application() {
        let store = MemoryStore::new();
        let app = Uuid::new_v4();
        let q = InterviewQuestion {
            question_text: "Why Rust?".to_string(),
            kind: "technical".to_string(),
        };
        let first = store.start_session(app, &q, Utc::now()).await.unwrap().unwrap();
        let again = store.start_session(app, &q, Utc::now()).await.unwrap().unwrap();
        assert_eq!(first.id, again.id);
        assert_eq!(again.questions.len(), 1);
        assert!(again.answers.is_empty());
    }

    #[tokio::test]
    async fn test_start_session_never_resets_completed_session() {
        let store = MemoryStore::new();
        let app = Uuid::new_v4();
        let q = InterviewQuestion {
            question_text: "Why Rust?".to_string(),
            kind: "technical".to_string(),
        };
        let mut session = store.start_session(app, &q, Utc::now()).await.unwrap().unwrap();
        session.status = InterviewStatus::Completed;
        store.save_session(&session).await.unwrap();

        assert!(store.start_session(app, &q, Utc::now()).await.unwrap().is_none());
        let stored = store.get_session(session.id).await.unwrap().unwrap();
        assert_eq!(stored.status, InterviewStatus::Completed);
    }

    #[tokio::test]
    async fn test_set_embedding_on_missing_job_errors() {
        let store = MemoryStore::new();
        let err = store.set_job_embedding(Uuid::new_v4(), &[1.0]).await.unwrap_err();
        assert!(matches!(err, StoreError::Missing { entity: "job", .. }));
    }
}
