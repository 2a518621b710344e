//! Axum route handlers for embedding maintenance.

use axum::{
    extract::{Path, State},
    Json,
};
use uuid::Uuid;

use super::maintenance::EmbeddingRefresh;
use crate::errors::AppError;
use crate::state::AppState;

/// POST /api/v1/documents/:id/embedding
///
/// Re-embeds the document's parsed text and marks its match reports stale.
pub async fn handle_refresh_document_embedding(
    State(state): State<AppState>,
    Path(document_id): Path<Uuid>,
) -> Result<Json<EmbeddingRefresh>, AppError> {
    let outcome = state
        .maintenance
        .refresh_document_embedding(document_id)
        .await?;
    Ok(Json(outcome))
}

/// POST /api/v1/jobs/:id/embedding
///
/// Re-embeds the posting, hides it from search until the next index refresh,
/// and marks its match reports stale.
pub async fn handle_refresh_job_embedding(
    State(state): State<AppState>,
    Path(job_id): Path<Uuid>,
) -> Result<Json<EmbeddingRefresh>, AppError> {
    let outcome = state.maintenance.refresh_job_embedding(job_id).await?;
    Ok(Json(outcome))
}
