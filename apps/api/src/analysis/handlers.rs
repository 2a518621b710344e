//! Axum route handlers for the Match Analysis API.

use axum::{extract::State, Json};
use serde::Deserialize;
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::match_report::MatchReport;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct AnalysisRequest {
    pub document_id: Uuid,
    pub job_id: Uuid,
}

/// POST /api/v1/matches/analysis
///
/// Returns the cached report for the pair, generating it first if absent or stale.
pub async fn handle_get_or_create_analysis(
    State(state): State<AppState>,
    Json(request): Json<AnalysisRequest>,
) -> Result<Json<MatchReport>, AppError> {
    let report = state
        .analysis
        .get_or_create_analysis(request.document_id, request.job_id)
        .await?;
    Ok(Json(report))
}
