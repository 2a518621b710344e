use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use thiserror::Error;
use uuid::Uuid;

use crate::interview::report::InterviewReportPayload;

pub const APPLICATION_STATUS_INTERVIEWED: &str = "interviewed";

/// A candidate's application to a job posting. Owned by the outer CRUD layer;
/// this service only reads it and advances its status to `interviewed`.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Application {
    pub id: Uuid,
    pub document_id: Uuid,
    pub job_id: Uuid,
    pub status: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InterviewStatus {
    Pending,
    InProgress,
    Completed,
    Error,
}

#[derive(Debug, Error)]
#[error("unknown interview status '{0}'")]
pub struct UnknownStatus(pub String);

impl InterviewStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "PENDING",
            Self::InProgress => "IN_PROGRESS",
            Self::Completed => "COMPLETED",
            Self::Error => "ERROR",
        }
    }
}

impl TryFrom<String> for InterviewStatus {
    type Error = UnknownStatus;

    fn try_from(value: String) -> Result<Self, UnknownStatus> {
        match value.as_str() {
            "PENDING" => Ok(Self::Pending),
            "IN_PROGRESS" => Ok(Self::InProgress),
            "COMPLETED" => Ok(Self::Completed),
            "ERROR" => Ok(Self::Error),
            _ => Err(UnknownStatus(value)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterviewQuestion {
    pub question_text: String,
    /// e.g. "deep-dive", "technical", "behavioral"
    #[serde(rename = "type", default = "default_question_type")]
    pub kind: String,
}

fn default_question_type() -> String {
    "deep-dive".to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InterviewAnswer {
    pub text: String,
    pub audio_url: Option<String>,
    pub submitted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct InterviewSession {
    pub id: Uuid,
    pub application_id: Uuid,
    #[sqlx(try_from = "String")]
    pub status: InterviewStatus,
    #[sqlx(json)]
    pub questions: Vec<InterviewQuestion>,
    #[sqlx(json)]
    pub answers: Vec<InterviewAnswer>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub report_generated: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl InterviewSession {
    /// `answers[i]` answers `questions[i]`; at most one question is unanswered.
    pub fn is_consistent(&self) -> bool {
        let (q, a) = (self.questions.len(), self.answers.len());
        a == q || a + 1 == q
    }

    /// Answered question/answer pairs, in order.
    pub fn transcript(&self) -> impl Iterator<Item = (&InterviewQuestion, &InterviewAnswer)> {
        self.questions.iter().zip(self.answers.iter())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct InterviewReport {
    pub id: Uuid,
    pub session_id: Uuid,
    #[sqlx(json)]
    pub report_data: InterviewReportPayload,
    pub report_version: String,
    pub model_name: String,
    pub overall_score: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewInterviewReport {
    pub session_id: Uuid,
    pub report_data: InterviewReportPayload,
    pub report_version: String,
    pub model_name: String,
    pub overall_score: i32,
}
