//! Match Analysis: get-or-create the dual-audience report for a (document, job) pair.
//!
//! Flow: load pair → reuse fresh report → resolve weights → prompt → parse
//!       and normalize → overall score → upsert.
//!
//! Model failures never surface to callers. The all-placeholder report is
//! persisted instead, marked stale so the next request tries the model again.

use std::sync::Arc;

use tracing::{error, info, warn};
use uuid::Uuid;

use super::normalize::parse_model_output;
use super::prompts::build_match_prompt;
use super::schema::{MatchReportPayload, MATCH_REPORT_VERSION};
use super::weights::AxisWeights;
use crate::errors::AppError;
use crate::llm_client::prompts::JSON_ONLY_SYSTEM;
use crate::llm_client::LanguageModel;
use crate::models::document::CandidateDocument;
use crate::models::job::JobPosting;
use crate::models::match_report::{MatchReport, NewMatchReport};
use crate::store::{StaleScope, Store};

#[derive(Clone)]
pub struct MatchAnalysisEngine {
    store: Arc<dyn Store>,
    llm: Arc<dyn LanguageModel>,
}

impl MatchAnalysisEngine {
    pub fn new(store: Arc<dyn Store>, llm: Arc<dyn LanguageModel>) -> Self {
        Self { store, llm }
    }

    /// Returns the cached report for the pair unless it is stale; otherwise
    /// runs one model analysis and persists the result.
    pub async fn get_or_create_analysis(
        &self,
        document_id: Uuid,
        job_id: Uuid,
    ) -> Result<MatchReport, AppError> {
        let document = self
            .store
            .get_document(document_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Document {document_id} not found")))?;
        let job = self
            .store
            .get_job(job_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Job {job_id} not found")))?;

        if let Some(existing) = self.store.find_match_report(document_id, job_id).await? {
            if !existing.is_stale {
                return Ok(existing);
            }
            info!("Match report for {document_id}/{job_id} is stale; regenerating");
        }

        self.create_analysis(&document, &job).await
    }

    pub async fn mark_stale_for_job(&self, job_id: Uuid) -> Result<u64, AppError> {
        let count = self.store.mark_reports_stale(StaleScope::Job(job_id)).await?;
        info!("Marked {count} match reports stale for job {job_id}");
        Ok(count)
    }

    pub async fn mark_stale_for_document(&self, document_id: Uuid) -> Result<u64, AppError> {
        let count = self
            .store
            .mark_reports_stale(StaleScope::Document(document_id))
            .await?;
        info!("Marked {count} match reports stale for document {document_id}");
        Ok(count)
    }

    async fn create_analysis(
        &self,
        document: &CandidateDocument,
        job: &JobPosting,
    ) -> Result<MatchReport, AppError> {
        let weights = AxisWeights::resolve(job.matching_weights.as_ref());
        let prompt = build_match_prompt(document, job);

        let (sections, degraded) = match self.llm.complete(&prompt, JSON_ONLY_SYSTEM).await {
            Ok(text) => match parse_model_output(&text) {
                Ok(sections) => (Some(sections), false),
                Err(e) => {
                    error!(
                        "Unparseable match analysis for {}/{}: {e}",
                        document.id, job.id
                    );
                    (None, true)
                }
            },
            Err(e) => {
                error!("Match analysis model call failed for {}/{}: {e}", document.id, job.id);
                (None, true)
            }
        };

        let payload = match sections {
            Some(sections) => MatchReportPayload::assemble(sections, weights),
            None => MatchReportPayload::placeholder_with(weights),
        };
        let overall = payload.shared.overall_score;
        if degraded {
            warn!(
                "Persisting placeholder match report for {}/{} as stale",
                document.id, job.id
            );
        }

        let report = self
            .store
            .upsert_match_report(NewMatchReport {
                document_id: document.id,
                job_id: job.id,
                overall_score: i32::from(overall),
                report_data: payload,
                report_version: MATCH_REPORT_VERSION.to_string(),
                model_name: self.llm.model_name().to_string(),
                is_stale: degraded,
            })
            .await?;

        info!(
            "Match analysis for {}/{}: overall {overall}/100",
            document.id, job.id
        );
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::scripted::ScriptedModel;
    use crate::store::MemoryStore;
    use crate::testing::{job_with_weights, seeded_store};
    use serde_json::json;

    fn analysis_reply() -> String {
        json!({
            "shared": {
                "skills_score": 80,
                "experience_score": 60,
                "culture_fit_score": 70,
                "growth_potential_score": 90,
                "preferences_bonus": 5,
                "overall_score": 12,
                "skills_analysis": {"matching_skills": ["Rust"], "missing_skills": ["Kafka"], "summary": "Strong"}
            },
            "candidate_view": {"encouragement": "Apply"},
            "evaluator_view": {"fit_summary": "Good fit"}
        })
        .to_string()
    }

    fn engine(store: Arc<MemoryStore>, llm: Arc<ScriptedModel>) -> MatchAnalysisEngine {
        MatchAnalysisEngine::new(store, llm)
    }

    #[tokio::test]
    async fn test_creates_report_with_recomputed_overall() {
        let (store, d, j, _) = seeded_store().await;
        let llm = Arc::new(ScriptedModel::new().reply(analysis_reply()));
        let report = engine(store, llm.clone()).get_or_create_analysis(d, j).await.unwrap();

        // Default weights: 74.21 + bonus 5, ignoring the model's own overall.
        assert_eq!(report.overall_score, 79);
        assert_eq!(report.report_data.shared.overall_score, 79);
        assert_eq!(report.report_version, "4.0");
        assert_eq!(report.model_name, "scripted-test-model");
        assert!(!report.is_stale);
        assert_eq!(report.report_data.evaluator_view.fit_summary, "Good fit");
        assert!(llm.prompts()[0].contains("Backend Engineer"));
    }

    #[tokio::test]
    async fn test_second_call_returns_cached_report() {
        let (store, d, j, _) = seeded_store().await;
        let llm = Arc::new(ScriptedModel::new().reply(analysis_reply()));
        let engine = engine(store.clone(), llm.clone());

        let first = engine.get_or_create_analysis(d, j).await.unwrap();
        let second = engine.get_or_create_analysis(d, j).await.unwrap();

        assert_eq!(llm.call_count(), 1);
        assert_eq!(first.id, second.id);
        assert_eq!(first.report_data, second.report_data);
        assert_eq!(store.match_report_count().await, 1);
    }

    #[tokio::test]
    async fn test_employer_weights_change_overall() {
        let (store, d, _, _) = seeded_store().await;
        let weighted = Uuid::new_v4();
        store
            .insert_job(job_with_weights(weighted, json!({"skills": 1, "experience": 0, "culture_fit": 0, "growth_potential": 0})))
            .await;
        let llm = Arc::new(ScriptedModel::new().reply(analysis_reply()));

        let report = engine(store, llm).get_or_create_analysis(d, weighted).await.unwrap();
        // skills only: 80 + 5
        assert_eq!(report.overall_score, 85);
        assert!((report.report_data.axis_weights.skills - 1.0).abs() < 1e-9);
    }

    #[tokio::test]
    async fn test_backend_failure_persists_stale_placeholder_then_retries() {
        let (store, d, j, _) = seeded_store().await;
        let llm = Arc::new(ScriptedModel::new().fail().reply(analysis_reply()));
        let engine = engine(store.clone(), llm.clone());

        let fallback = engine.get_or_create_analysis(d, j).await.unwrap();
        assert!(fallback.is_stale);
        assert_eq!(fallback.overall_score, 0);
        assert_eq!(
            fallback.report_data.shared,
            MatchReportPayload::placeholder().shared
        );

        let retried = engine.get_or_create_analysis(d, j).await.unwrap();
        assert!(!retried.is_stale);
        assert_eq!(retried.overall_score, 79);
        assert_eq!(retried.id, fallback.id);
        assert_eq!(llm.call_count(), 2);
    }

    #[tokio::test]
    async fn test_unparseable_output_falls_back() {
        let (store, d, j, _) = seeded_store().await;
        let llm = Arc::new(ScriptedModel::new().reply("Sorry, I cannot help with that."));
        let report = engine(store, llm).get_or_create_analysis(d, j).await.unwrap();
        assert!(report.is_stale);
        assert_eq!(report.report_data.candidate_view.encouragement, "No encouragement provided.");
    }

    #[tokio::test]
    async fn test_unknown_ids_are_not_found() {
        let (store, d, _, _) = seeded_store().await;
        let llm = Arc::new(ScriptedModel::new());
        let err = engine(store, llm.clone())
            .get_or_create_analysis(d, Uuid::new_v4())
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
        assert_eq!(llm.call_count(), 0);
    }

    #[tokio::test]
    async fn test_stale_marking_forces_regeneration() {
        let (store, d, j, _) = seeded_store().await;
        let llm = Arc::new(ScriptedModel::new().reply(analysis_reply()).reply(analysis_reply()));
        let engine = engine(store, llm.clone());

        engine.get_or_create_analysis(d, j).await.unwrap();
        assert_eq!(engine.mark_stale_for_job(j).await.unwrap(), 1);
        engine.get_or_create_analysis(d, j).await.unwrap();
        assert_eq!(llm.call_count(), 2);

        assert_eq!(engine.mark_stale_for_document(d).await.unwrap(), 1);
    }
}
