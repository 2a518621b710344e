pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::analysis::handlers as analysis;
use crate::embedding::handlers as embedding;
use crate::interview::handlers as interview;
use crate::state::AppState;
use crate::vector::handlers as vector;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Matching API
        .route(
            "/api/v1/matches/analysis",
            post(analysis::handle_get_or_create_analysis),
        )
        .route("/api/v1/matches/score", get(vector::handle_pair_score))
        .route("/api/v1/matches/score/batch", post(vector::handle_batch_score))
        .route(
            "/api/v1/documents/:id/top-matches",
            get(vector::handle_top_matches),
        )
        .route("/api/v1/index/refresh", post(vector::handle_refresh_index))
        // Embedding maintenance
        .route(
            "/api/v1/documents/:id/embedding",
            post(embedding::handle_refresh_document_embedding),
        )
        .route(
            "/api/v1/jobs/:id/embedding",
            post(embedding::handle_refresh_job_embedding),
        )
        // Interview API
        .route("/api/v1/interviews", post(interview::handle_start_interview))
        .route("/api/v1/interviews/:id", get(interview::handle_get_interview))
        .route(
            "/api/v1/interviews/:id/answers",
            post(interview::handle_submit_answer),
        )
        .route(
            "/api/v1/interviews/:id/report",
            post(interview::handle_generate_report),
        )
        .with_state(state)
}
