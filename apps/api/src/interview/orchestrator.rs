//! Interview Orchestrator: a three-question adaptive interview per application.
//!
//! States: PENDING → IN_PROGRESS → COMPLETED, with ERROR as a terminal state
//! for sessions whose question/answer lists no longer line up.
//!
//! `answers[i]` always answers `questions[i]`. While IN_PROGRESS exactly one
//! question is open; after the last answer the session completes and an
//! `InterviewCompleted` event is published.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use tracing::{error, info, warn};
use uuid::Uuid;

use super::events::{EventPublisher, InterviewCompleted};
use super::prompts::{build_follow_up_prompt, build_opening_prompt};
use crate::errors::AppError;
use crate::llm_client::prompts::JSON_ONLY_SYSTEM;
use crate::llm_client::{complete_json, LanguageModel};
use crate::models::document::CandidateDocument;
use crate::models::interview::{
    Application, InterviewAnswer, InterviewQuestion, InterviewSession, InterviewStatus,
};
use crate::models::job::JobPosting;
use crate::store::Store;

/// Questions per interview; the answer to the last one completes the session.
pub const MAX_QUESTIONS: usize = 3;

const FOLLOW_UP_TEMPLATES: &[&str] = &[
    "Can you provide a specific example of how you've applied that skill in a professional project?",
    "What was the hardest problem you ran into in that work, and how did you approach it?",
    "Which requirement of the {title} role would be the biggest stretch for you, and how would you close that gap?",
];

/// A candidate's answer as submitted by the client.
#[derive(Debug, Clone, Deserialize)]
pub struct SubmitAnswer {
    pub text: String,
    pub audio_url: Option<String>,
    /// Defaults to the time the server receives the answer.
    pub submitted_at: Option<DateTime<Utc>>,
}

#[derive(Clone)]
pub struct InterviewOrchestrator {
    store: Arc<dyn Store>,
    llm: Arc<dyn LanguageModel>,
    events: EventPublisher,
}

impl InterviewOrchestrator {
    pub fn new(store: Arc<dyn Store>, llm: Arc<dyn LanguageModel>, events: EventPublisher) -> Self {
        Self { store, llm, events }
    }

    /// Starts, or restarts, the interview for an application with a single
    /// opening question. A completed interview cannot be restarted.
    pub async fn start(&self, application_id: Uuid) -> Result<InterviewSession, AppError> {
        let application = self.application(application_id).await?;

        if let Some(existing) = self.store.find_session_by_application(application_id).await? {
            if existing.status == InterviewStatus::Completed {
                return Err(AppError::InvalidState(format!(
                    "Interview for application {application_id} is already completed"
                )));
            }
            info!(
                "Restarting interview session {} ({})",
                existing.id,
                existing.status.as_str()
            );
        }

        let (document, job) = self.context(&application).await?;
        let question = self.opening_question(&job, &document).await;
        // The session may have completed while the opening question was generated.
        let session = self
            .store
            .start_session(application_id, &question, Utc::now())
            .await?
            .ok_or_else(|| {
                AppError::InvalidState(format!(
                    "Interview for application {application_id} is already completed"
                ))
            })?;

        info!("Started interview {} for application {application_id}", session.id);
        Ok(session)
    }

    pub async fn get_session(&self, session_id: Uuid) -> Result<InterviewSession, AppError> {
        self.store
            .get_session(session_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Interview session {session_id} not found")))
    }

    /// Records the answer to the open question, then either asks the next
    /// question or completes the interview.
    pub async fn submit_answer(
        &self,
        session_id: Uuid,
        answer: SubmitAnswer,
    ) -> Result<InterviewSession, AppError> {
        let mut session = self.get_session(session_id).await?;

        if session.status != InterviewStatus::InProgress {
            return Err(AppError::InvalidState(format!(
                "Interview session {session_id} is {}, not IN_PROGRESS",
                session.status.as_str()
            )));
        }

        let text = answer.text.trim();
        if text.is_empty() {
            return Err(AppError::Validation("Answer text cannot be empty".to_string()));
        }

        // In progress means exactly one open question.
        if !session.is_consistent() || session.answers.len() == session.questions.len() {
            error!(
                "Interview session {session_id} has {} questions and {} answers; moving to ERROR",
                session.questions.len(),
                session.answers.len()
            );
            session.status = InterviewStatus::Error;
            self.store.save_session(&session).await?;
            return Err(AppError::InvalidState(format!(
                "Interview session {session_id} is inconsistent and was moved to ERROR"
            )));
        }

        session.answers.push(InterviewAnswer {
            text: text.to_string(),
            audio_url: answer.audio_url.filter(|u| !u.trim().is_empty()),
            submitted_at: answer.submitted_at.unwrap_or_else(Utc::now),
        });

        if session.answers.len() >= MAX_QUESTIONS {
            let completed_at = Utc::now();
            session.status = InterviewStatus::Completed;
            session.completed_at = Some(completed_at);
            self.store.save_session(&session).await?;

            info!(
                "Interview {session_id} completed after {} answers",
                session.answers.len()
            );
            self.events.publish(InterviewCompleted {
                session_id,
                application_id: session.application_id,
                completed_at,
            });
            return Ok(session);
        }

        let application = self.application(session.application_id).await?;
        let (_, job) = self.context(&application).await?;
        let next = self.follow_up_question(&job, &session).await;
        session.questions.push(next);
        self.store.save_session(&session).await?;

        info!(
            "Interview {session_id}: answer {} recorded, question {} asked",
            session.answers.len(),
            session.questions.len()
        );
        Ok(session)
    }

    async fn application(&self, application_id: Uuid) -> Result<Application, AppError> {
        self.store
            .get_application(application_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Application {application_id} not found")))
    }

    async fn context(
        &self,
        application: &Application,
    ) -> Result<(CandidateDocument, JobPosting), AppError> {
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
        Ok((document, job))
    }

    async fn opening_question(&self, job: &JobPosting, document: &CandidateDocument) -> InterviewQuestion {
        let prompt = build_opening_prompt(job, document);
        match self.ask(&prompt).await {
            Some(question) if !is_generic_opener(&question.question_text) => question,
            Some(_) => {
                warn!("Model proposed a generic opener for job {}; using template", job.id);
                opening_template(job)
            }
            None => opening_template(job),
        }
    }

    async fn follow_up_question(&self, job: &JobPosting, session: &InterviewSession) -> InterviewQuestion {
        let prompt = build_follow_up_prompt(job, session);
        match self.ask(&prompt).await {
            Some(question) if !already_asked(session, &question.question_text) => question,
            Some(_) => {
                warn!("Model repeated a question in session {}; using template", session.id);
                follow_up_template(job, session)
            }
            None => follow_up_template(job, session),
        }
    }

    /// One model call for a question. `None` on backend or parse failure, or a blank question.
    async fn ask(&self, prompt: &str) -> Option<InterviewQuestion> {
        match complete_json::<InterviewQuestion>(self.llm.as_ref(), prompt, JSON_ONLY_SYSTEM).await {
            Ok(mut question) => {
                question.question_text = question.question_text.trim().to_string();
                if question.question_text.is_empty() {
                    warn!("Model returned an empty interview question");
                    return None;
                }
                if question.kind.trim().is_empty() {
                    question.kind = "deep-dive".to_string();
                }
                Some(question)
            }
            Err(e) => {
                error!("Failed to generate interview question: {e}");
                None
            }
        }
    }
}

fn opening_template(job: &JobPosting) -> InterviewQuestion {
    InterviewQuestion {
        question_text: format!(
            "Based on your resume, walk me through your experience with a key technology required for the {} role.",
            job.title
        ),
        kind: "deep-dive".to_string(),
    }
}

/// The first template not yet asked in this session.
fn follow_up_template(job: &JobPosting, session: &InterviewSession) -> InterviewQuestion {
    let candidates: Vec<String> = FOLLOW_UP_TEMPLATES
        .iter()
        .map(|t| t.replace("{title}", &job.title))
        .collect();
    let text = candidates
        .iter()
        .find(|t| !already_asked(session, t))
        .or_else(|| candidates.first())
        .cloned()
        .unwrap_or_default();
    InterviewQuestion {
        question_text: text,
        kind: "deep-dive".to_string(),
    }
}

fn normalize_question(text: &str) -> String {
    text.trim()
        .trim_end_matches(['?', '.', '!'])
        .to_lowercase()
}

fn already_asked(session: &InterviewSession, text: &str) -> bool {
    let needle = normalize_question(text);
    session
        .questions
        .iter()
        .any(|q| normalize_question(&q.question_text) == needle)
}

fn is_generic_opener(text: &str) -> bool {
    normalize_question(text).contains("tell me about yourself")
}
