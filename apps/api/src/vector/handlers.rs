//! Axum route handlers for vector scoring and the job index.

use std::collections::HashMap;

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::scoring::TopMatch;
use super::Confidence;
use crate::errors::AppError;
use crate::state::AppState;

const DEFAULT_TOP_MATCHES: usize = 10;
const MAX_TOP_MATCHES: usize = 100;

#[derive(Debug, Deserialize)]
pub struct PairScoreQuery {
    pub document_id: Uuid,
    pub job_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct PairScoreResponse {
    pub document_id: Uuid,
    pub job_id: Uuid,
    /// `null` when either side has no embedding yet.
    pub vector_score: Option<f64>,
    pub match_confidence: Option<Confidence>,
}

#[derive(Debug, Deserialize)]
pub struct BatchScoreRequest {
    pub document_id: Uuid,
    pub job_ids: Vec<Uuid>,
}

#[derive(Debug, Serialize)]
pub struct BatchScoreResponse {
    pub document_id: Uuid,
    pub scores: HashMap<Uuid, f64>,
}

#[derive(Debug, Deserialize)]
pub struct TopMatchesQuery {
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize)]
pub struct TopMatchesResponse {
    pub document_id: Uuid,
    pub matches: Vec<TopMatch>,
}

#[derive(Debug, Serialize)]
pub struct IndexRefreshResponse {
    pub indexed: usize,
    pub built_at: Option<DateTime<Utc>>,
}

/// GET /api/v1/matches/score?document_id=..&job_id=..
pub async fn handle_pair_score(
    State(state): State<AppState>,
    Query(query): Query<PairScoreQuery>,
) -> Result<Json<PairScoreResponse>, AppError> {
    let score = state.scorer.pair_score(query.document_id, query.job_id).await?;
    Ok(Json(PairScoreResponse {
        document_id: query.document_id,
        job_id: query.job_id,
        vector_score: score,
        match_confidence: score.map(Confidence::from_score),
    }))
}

/// POST /api/v1/matches/score/batch
///
/// Jobs without an embedding are omitted from `scores`.
pub async fn handle_batch_score(
    State(state): State<AppState>,
    Json(request): Json<BatchScoreRequest>,
) -> Result<Json<BatchScoreResponse>, AppError> {
    let scores = state
        .scorer
        .batch_score(request.document_id, &request.job_ids)
        .await?;
    Ok(Json(BatchScoreResponse {
        document_id: request.document_id,
        scores,
    }))
}

/// GET /api/v1/documents/:id/top-matches?limit=N
pub async fn handle_top_matches(
    State(state): State<AppState>,
    Path(document_id): Path<Uuid>,
    Query(query): Query<TopMatchesQuery>,
) -> Result<Json<TopMatchesResponse>, AppError> {
    let limit = query.limit.unwrap_or(DEFAULT_TOP_MATCHES);
    if limit == 0 || limit > MAX_TOP_MATCHES {
        return Err(AppError::Validation(format!(
            "limit must be between 1 and {MAX_TOP_MATCHES}"
        )));
    }

    let matches = state.scorer.top_matches(document_id, limit).await?;
    Ok(Json(TopMatchesResponse {
        document_id,
        matches,
    }))
}

/// POST /api/v1/index/refresh
///
/// Rebuilds the job index from all active, embedded postings.
pub async fn handle_refresh_index(
    State(state): State<AppState>,
) -> Result<Json<IndexRefreshResponse>, AppError> {
    let indexed = state.index.refresh().await?;
    Ok(Json(IndexRefreshResponse {
        indexed,
        built_at: state.index.built_at().await,
    }))
}
