//! Interview Report Generator: one evaluator-facing report per completed session.
//!
//! Generation is idempotent. An existing report is returned untouched, and a
//! concurrent second writer gets the first stored report back from the store.

use std::sync::Arc;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::{error, info};
use uuid::Uuid;

use super::prompts::build_report_prompt;
use crate::analysis::normalize::{coerce_score, lenient, lenient_list, ModelOutputError};
use crate::errors::AppError;
use crate::llm_client::prompts::JSON_ONLY_SYSTEM;
use crate::llm_client::{strip_json_fences, LanguageModel};
use crate::models::interview::{
    InterviewReport, InterviewStatus, NewInterviewReport, APPLICATION_STATUS_INTERVIEWED,
};
use crate::store::Store;

pub const INTERVIEW_REPORT_VERSION: &str = "1.0";
const SCORE_MAX: u8 = 100;

/// Recommended outcome. Anything the model says outside these three maps to
/// `FurtherInterview`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum NextStep {
    Offer,
    Reject,
    #[serde(rename = "Further Interview")]
    FurtherInterview,
}

impl NextStep {
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_lowercase().as_str() {
            "offer" => Self::Offer,
            "reject" => Self::Reject,
            _ => Self::FurtherInterview,
        }
    }
}

impl<'de> Deserialize<'de> for NextStep {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = Value::deserialize(deserializer)?;
        Ok(value.as_str().map_or(Self::FurtherInterview, Self::parse))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterviewReportPayload {
    pub summary: String,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub fit_score: u8,
    pub culture_fit_score: u8,
    pub communication_score: u8,
    pub technical_depth_score: u8,
    pub suggested_next_step: NextStep,
    pub rationale: String,
    pub follow_up_questions: Vec<String>,
    pub version: String,
}

impl InterviewReportPayload {
    /// Stored when the model is unreachable or its output cannot be parsed.
    pub fn error_default() -> Self {
        Self {
            summary: "Error generating report.".to_string(),
            strengths: Vec::new(),
            weaknesses: Vec::new(),
            fit_score: 0,
            culture_fit_score: 0,
            communication_score: 0,
            technical_depth_score: 0,
            suggested_next_step: NextStep::FurtherInterview,
            rationale: "LLM error.".to_string(),
            follow_up_questions: Vec::new(),
            version: INTERVIEW_REPORT_VERSION.to_string(),
        }
    }

    /// Parses a completion (code fences allowed), clamping scores to 0..=100.
    pub fn from_model_output(text: &str) -> Result<Self, ModelOutputError> {
        let value: Value = serde_json::from_str(strip_json_fences(text))?;
        if !value.is_object() {
            return Err(ModelOutputError::NotAnObject);
        }
        let raw: RawInterviewReport = serde_json::from_value(value)?;
        Ok(raw.normalize())
    }
}

#[derive(Default, Deserialize)]
#[serde(default)]
struct RawInterviewReport {
    #[serde(deserialize_with = "lenient")]
    summary: Option<String>,
    #[serde(deserialize_with = "lenient_list")]
    strengths: Vec<String>,
    #[serde(deserialize_with = "lenient_list")]
    weaknesses: Vec<String>,
    fit_score: Value,
    culture_fit_score: Value,
    communication_score: Value,
    technical_depth_score: Value,
    suggested_next_step: Value,
    #[serde(deserialize_with = "lenient")]
    rationale: Option<String>,
    #[serde(deserialize_with = "lenient_list")]
    follow_up_questions: Vec<String>,
    #[serde(deserialize_with = "lenient")]
    version: Option<String>,
}

impl RawInterviewReport {
    fn normalize(self) -> InterviewReportPayload {
        let text = |value: Option<String>, fallback: &str| {
            value
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .unwrap_or_else(|| fallback.to_string())
        };
        let list = |values: Vec<String>| -> Vec<String> {
            values
                .into_iter()
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        };

        InterviewReportPayload {
            summary: text(self.summary, "No summary provided."),
            strengths: list(self.strengths),
            weaknesses: list(self.weaknesses),
            fit_score: coerce_score(&self.fit_score, SCORE_MAX),
            culture_fit_score: coerce_score(&self.culture_fit_score, SCORE_MAX),
            communication_score: coerce_score(&self.communication_score, SCORE_MAX),
            technical_depth_score: coerce_score(&self.technical_depth_score, SCORE_MAX),
            suggested_next_step: self
                .suggested_next_step
                .as_str()
                .map_or(NextStep::FurtherInterview, NextStep::parse),
            rationale: text(self.rationale, "No rationale provided."),
            follow_up_questions: list(self.follow_up_questions),
            version: text(self.version, INTERVIEW_REPORT_VERSION),
        }
    }
}

#[derive(Clone)]
pub struct InterviewReportGenerator {
    store: Arc<dyn Store>,
    llm: Arc<dyn LanguageModel>,
}

impl InterviewReportGenerator {
    pub fn new(store: Arc<dyn Store>, llm: Arc<dyn LanguageModel>) -> Self {
        Self { store, llm }
    }

    /// Returns the session's report, generating and storing it on first call.
    pub async fn generate(&self, session_id: Uuid) -> Result<InterviewReport, AppError> {
        let session = self
            .store
            .get_session(session_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Interview session {session_id} not found")))?;

        if let Some(existing) = self.store.find_interview_report(session_id).await? {
            return Ok(existing);
        }

        if session.status != InterviewStatus::Completed {
            return Err(AppError::InvalidState(format!(
                "Interview session {session_id} is {}, not COMPLETED",
                session.status.as_str()
            )));
        }

        let application = self
            .store
            .get_application(session.application_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Application {} not found", session.application_id))
            })?;
        let document = self
            .store
            .get_document(application.document_id)
            .await?
            .ok_or_else(|| {
                AppError::NotFound(format!("Document {} not found", application.document_id))
            })?;
        let job = self
            .store
            .get_job(application.job_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Job {} not found", application.job_id)))?;
        let match_report = self.store.find_match_report(document.id, job.id).await?;

        let prompt = build_report_prompt(
            &job,
            &document,
            match_report.as_ref().map(|r| &r.report_data),
            &session,
        );

        let payload = match self.llm.complete(&prompt, JSON_ONLY_SYSTEM).await {
            Ok(text) => InterviewReportPayload::from_model_output(&text).unwrap_or_else(|e| {
                error!("Unparseable interview report for session {session_id}: {e}");
                InterviewReportPayload::error_default()
            }),
            Err(e) => {
                error!("Interview report model call failed for session {session_id}: {e}");
                InterviewReportPayload::error_default()
            }
        };

        let report = self
            .store
            .insert_interview_report(NewInterviewReport {
                session_id,
                overall_score: i32::from(payload.fit_score),
                report_version: payload.version.clone(),
                model_name: self.llm.model_name().to_string(),
                report_data: payload,
            })
            .await?;

        self.store.mark_report_generated(session_id).await?;
        if application.status != APPLICATION_STATUS_INTERVIEWED {
            self.store
                .set_application_status(application.id, APPLICATION_STATUS_INTERVIEWED)
                .await?;
        }

        info!(
            "Interview report {} for session {session_id}: fit {}/100, next step {:?}",
            report.id, report.overall_score, report.report_data.suggested_next_step
        );
        Ok(report)
    }
}
