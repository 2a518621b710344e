use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::debug;
use uuid::Uuid;

use super::{StaleScope, Store, StoreError};
use crate::models::document::CandidateDocument;
use crate::models::interview::{
    Application, InterviewQuestion, InterviewReport, InterviewSession, NewInterviewReport,
};
use crate::models::job::{JobPosting, JOB_STATUS_ACTIVE};
use crate::models::match_report::{MatchReport, NewMatchReport};

/// PostgreSQL-backed store. Schema lives in `migrations/`.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl Store for PgStore {
    async fn get_document(&self, id: Uuid) -> Result<Option<CandidateDocument>, StoreError> {
        Ok(sqlx::query_as::<_, CandidateDocument>(
            r#"
            SELECT d.id, d.candidate_id, d.parsed_text, d.embedding, d.is_primary,
                   COALESCE(p.career_preferences, '{}'::jsonb) AS career_preferences,
                   d.updated_at
            FROM candidate_documents d
            LEFT JOIN candidate_profiles p ON p.id = d.candidate_id
            WHERE d.id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn get_job(&self, id: Uuid) -> Result<Option<JobPosting>, StoreError> {
        Ok(
            sqlx::query_as::<_, JobPosting>("SELECT * FROM job_postings WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn active_job_embeddings(&self) -> Result<Vec<(Uuid, Vec<f32>)>, StoreError> {
        Ok(sqlx::query_as::<_, (Uuid, Vec<f32>)>(
            r#"
            SELECT id, embedding FROM job_postings
            WHERE status = $1
              AND embedding IS NOT NULL
              AND cardinality(embedding) > 0
            "#,
        )
        .bind(JOB_STATUS_ACTIVE)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn job_embeddings(&self, ids: &[Uuid]) -> Result<Vec<(Uuid, Vec<f32>)>, StoreError> {
        Ok(sqlx::query_as::<_, (Uuid, Vec<f32>)>(
            r#"
            SELECT id, embedding FROM job_postings
            WHERE id = ANY($1)
              AND embedding IS NOT NULL
              AND cardinality(embedding) > 0
            "#,
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?)
    }

    async fn set_document_embedding(&self, id: Uuid, embedding: &[f32]) -> Result<(), StoreError> {
        let result = sqlx::query(
            "UPDATE candidate_documents SET embedding = $2, updated_at = now() WHERE id = $1",
        )
        .bind(id)
        .bind(embedding)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::Missing {
                entity: "document",
                id,
            });
        }
        Ok(())
    }

    async fn set_job_embedding(&self, id: Uuid, embedding: &[f32]) -> Result<(), StoreError> {
        let result =
            sqlx::query("UPDATE job_postings SET embedding = $2, updated_at = now() WHERE id = $1")
                .bind(id)
                .bind(embedding)
                .execute(&self.pool)
                .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::Missing { entity: "job", id });
        }
        Ok(())
    }

    async fn find_match_report(
        &self,
        document_id: Uuid,
        job_id: Uuid,
    ) -> Result<Option<MatchReport>, StoreError> {
        Ok(sqlx::query_as::<_, MatchReport>(
            "SELECT * FROM match_reports WHERE document_id = $1 AND job_id = $2",
        )
        .bind(document_id)
        .bind(job_id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn upsert_match_report(&self, report: NewMatchReport) -> Result<MatchReport, StoreError> {
        let shared = &report.report_data.shared;
        let row = sqlx::query_as::<_, MatchReport>(
            r#"
            INSERT INTO match_reports
                (id, document_id, job_id, overall_score,
                 skills_score, experience_score, culture_fit_score,
                 growth_potential_score, preferences_bonus,
                 report_data, report_version, model_name, is_stale)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13)
            ON CONFLICT (document_id, job_id) DO UPDATE SET
                overall_score = EXCLUDED.overall_score,
                skills_score = EXCLUDED.skills_score,
                experience_score = EXCLUDED.experience_score,
                culture_fit_score = EXCLUDED.culture_fit_score,
                growth_potential_score = EXCLUDED.growth_potential_score,
                preferences_bonus = EXCLUDED.preferences_bonus,
                report_data = EXCLUDED.report_data,
                report_version = EXCLUDED.report_version,
                model_name = EXCLUDED.model_name,
                is_stale = EXCLUDED.is_stale,
                updated_at = now()
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(report.document_id)
        .bind(report.job_id)
        .bind(report.overall_score)
        .bind(i32::from(shared.skills_score))
        .bind(i32::from(shared.experience_score))
        .bind(i32::from(shared.culture_fit_score))
        .bind(i32::from(shared.growth_potential_score))
        .bind(i32::from(shared.preferences_bonus))
        .bind(Json(&report.report_data))
        .bind(&report.report_version)
        .bind(&report.model_name)
        .bind(report.is_stale)
        .fetch_one(&self.pool)
        .await?;

        debug!(
            "Upserted match report {} for document {} / job {}",
            row.id, row.document_id, row.job_id
        );
        Ok(row)
    }

    async fn mark_reports_stale(&self, scope: StaleScope) -> Result<u64, StoreError> {
        let (sql, id) = match scope {
            StaleScope::Document(id) => (
                "UPDATE match_reports SET is_stale = true, updated_at = now() \
                 WHERE document_id = $1 AND NOT is_stale",
                id,
            ),
            StaleScope::Job(id) => (
                "UPDATE match_reports SET is_stale = true, updated_at = now() \
                 WHERE job_id = $1 AND NOT is_stale",
                id,
            ),
        };
        let result = sqlx::query(sql).bind(id).execute(&self.pool).await?;
        Ok(result.rows_affected())
    }

    async fn get_application(&self, id: Uuid) -> Result<Option<Application>, StoreError> {
        Ok(sqlx::query_as::<_, Application>(
            "SELECT id, document_id, job_id, status FROM applications WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn set_application_status(&self, id: Uuid, status: &str) -> Result<(), StoreError> {
        sqlx::query("UPDATE applications SET status = $2, updated_at = now() WHERE id = $1")
            .bind(id)
            .bind(status)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn get_session(&self, id: Uuid) -> Result<Option<InterviewSession>, StoreError> {
        Ok(
            sqlx::query_as::<_, InterviewSession>("SELECT * FROM interview_sessions WHERE id = $1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?,
        )
    }

    async fn start_session(
        &self,
        application_id: Uuid,
        first_question: &InterviewQuestion,
        started_at: DateTime<Utc>,
    ) -> Result<Option<InterviewSession>, StoreError> {
        Ok(sqlx::query_as::<_, InterviewSession>(
            r#"
            INSERT INTO interview_sessions
                (id, application_id, status, questions, answers,
                 started_at, completed_at, report_generated)
            VALUES ($1, $2, 'IN_PROGRESS', $3, '[]'::jsonb, $4, NULL, false)
            ON CONFLICT (application_id) DO UPDATE SET
                status = 'IN_PROGRESS',
                questions = EXCLUDED.questions,
                answers = '[]'::jsonb,
                started_at = EXCLUDED.started_at,
                completed_at = NULL,
                report_generated = false,
                updated_at = now()
            WHERE interview_sessions.status <> 'COMPLETED'
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(application_id)
        .bind(Json(vec![first_question]))
        .bind(started_at)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn find_session_by_application(
        &self,
        application_id: Uuid,
    ) -> Result<Option<InterviewSession>, StoreError> {
        Ok(sqlx::query_as::<_, InterviewSession>(
            "SELECT * FROM interview_sessions WHERE application_id = $1",
        )
        .bind(application_id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn save_session(&self, session: &InterviewSession) -> Result<(), StoreError> {
        let result = sqlx::query(
            r#"
            UPDATE interview_sessions SET
                status = $2,
                questions = $3,
                answers = $4,
                started_at = $5,
                completed_at = $6,
                report_generated = $7,
                updated_at = now()
            WHERE id = $1
            "#,
        )
        .bind(session.id)
        .bind(session.status.as_str())
        .bind(Json(&session.questions))
        .bind(Json(&session.answers))
        .bind(session.started_at)
        .bind(session.completed_at)
        .bind(session.report_generated)
        .execute(&self.pool)
        .await?;
        if result.rows_affected() == 0 {
            return Err(StoreError::Missing {
                entity: "interview session",
                id: session.id,
            });
        }
        Ok(())
    }

    async fn find_interview_report(
        &self,
        session_id: Uuid,
    ) -> Result<Option<InterviewReport>, StoreError> {
        Ok(sqlx::query_as::<_, InterviewReport>(
            "SELECT * FROM interview_reports WHERE session_id = $1",
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await?)
    }

    async fn insert_interview_report(
        &self,
        report: NewInterviewReport,
    ) -> Result<InterviewReport, StoreError> {
        let inserted = sqlx::query_as::<_, InterviewReport>(
            r#"
            INSERT INTO interview_reports
                (id, session_id, report_data, report_version, model_name, overall_score)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (session_id) DO NOTHING
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(report.session_id)
        .bind(Json(&report.report_data))
        .bind(&report.report_version)
        .bind(&report.model_name)
        .bind(report.overall_score)
        .fetch_optional(&self.pool)
        .await?;

        match inserted {
            Some(row) => Ok(row),
            None => self
                .find_interview_report(report.session_id)
                .await?
                .ok_or(StoreError::Missing {
                    entity: "interview report for session",
                    id: report.session_id,
                }),
        }
    }

    async fn mark_report_generated(&self, session_id: Uuid) -> Result<(), StoreError> {
        sqlx::query(
            "UPDATE interview_sessions SET report_generated = true, updated_at = now() WHERE id = $1",
        )
        .bind(session_id)
        .execute(&self.pool)
        .await?;
        Ok(())
    }
}
