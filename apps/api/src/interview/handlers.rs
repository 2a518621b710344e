//! Axum route handlers for the Interview API.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use uuid::Uuid;

use super::orchestrator::SubmitAnswer;
use crate::errors::AppError;
use crate::models::interview::{InterviewReport, InterviewSession};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct StartInterviewRequest {
    pub application_id: Uuid,
}

/// POST /api/v1/interviews
///
/// Starts (or restarts) the interview for an application. Returns the session
/// with its opening question.
pub async fn handle_start_interview(
    State(state): State<AppState>,
    Json(request): Json<StartInterviewRequest>,
) -> Result<(StatusCode, Json<InterviewSession>), AppError> {
    let session = state.interviews.start(request.application_id).await?;
    Ok((StatusCode::CREATED, Json(session)))
}

/// GET /api/v1/interviews/:id
pub async fn handle_get_interview(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<InterviewSession>, AppError> {
    Ok(Json(state.interviews.get_session(session_id).await?))
}

/// POST /api/v1/interviews/:id/answers
///
/// Records an answer. The response carries the next question, or the
/// COMPLETED session after the final answer.
pub async fn handle_submit_answer(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
    Json(answer): Json<SubmitAnswer>,
) -> Result<Json<InterviewSession>, AppError> {
    let session = state.interviews.submit_answer(session_id, answer).await?;
    Ok(Json(session))
}

/// POST /api/v1/interviews/:id/report
///
/// Returns the session's report, generating it if the background worker has
/// not yet done so.
pub async fn handle_generate_report(
    State(state): State<AppState>,
    Path(session_id): Path<Uuid>,
) -> Result<Json<InterviewReport>, AppError> {
    Ok(Json(state.reports.generate(session_id).await?))
}
