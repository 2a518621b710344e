//! Re-embedding after content changes.
//!
//! Recomputes a document's or posting's vector, writes it back, and marks the
//! affected match reports stale. A re-embedded posting is tombstoned in the job
//! index until the next refresh so it is never ranked on its old vector.

use std::sync::Arc;

use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use super::EmbeddingService;
use crate::analysis::MatchAnalysisEngine;
use crate::errors::AppError;
use crate::store::Store;
use crate::vector::JobIndex;

#[derive(Debug, Clone, Serialize)]
pub struct EmbeddingRefresh {
    pub id: Uuid,
    pub model: String,
    /// 0 when there was no text to embed and the stored vector was cleared.
    pub dimensions: usize,
    pub stale_reports: u64,
}

#[derive(Clone)]
pub struct EmbeddingMaintenance {
    store: Arc<dyn Store>,
    embeddings: EmbeddingService,
    index: Arc<JobIndex>,
    analysis: MatchAnalysisEngine,
}

impl EmbeddingMaintenance {
    pub fn new(
        store: Arc<dyn Store>,
        embeddings: EmbeddingService,
        index: Arc<JobIndex>,
        analysis: MatchAnalysisEngine,
    ) -> Self {
        Self {
            store,
            embeddings,
            index,
            analysis,
        }
    }

    pub async fn refresh_document_embedding(
        &self,
        document_id: Uuid,
    ) -> Result<EmbeddingRefresh, AppError> {
        let document = self
            .store
            .get_document(document_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Document {document_id} not found")))?;

        let vector = self.embeddings.encode(document.parsed_text.as_deref()).await?;
        self.store.set_document_embedding(document_id, &vector).await?;
        let stale_reports = self.analysis.mark_stale_for_document(document_id).await?;

        info!(
            "Re-embedded document {document_id} ({} dims, {stale_reports} reports stale)",
            vector.len()
        );
        Ok(self.outcome(document_id, vector.len(), stale_reports))
    }

    pub async fn refresh_job_embedding(&self, job_id: Uuid) -> Result<EmbeddingRefresh, AppError> {
        let job = self
            .store
            .get_job(job_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Job {job_id} not found")))?;

        let vector = self.embeddings.encode(Some(&job.embedding_text())).await?;
        self.store.set_job_embedding(job_id, &vector).await?;
        self.index.remove(job_id).await;
        let stale_reports = self.analysis.mark_stale_for_job(job_id).await?;

        info!(
            "Re-embedded job {job_id} ({} dims, {stale_reports} reports stale)",
            vector.len()
        );
        Ok(self.outcome(job_id, vector.len(), stale_reports))
    }

    fn outcome(&self, id: Uuid, dimensions: usize, stale_reports: u64) -> EmbeddingRefresh {
        EmbeddingRefresh {
            id,
            model: self.embeddings.model_name().to_string(),
            dimensions,
            stale_reports,
        }
    }
}
