use std::sync::Arc;

use crate::analysis::MatchAnalysisEngine;
use crate::embedding::{EmbeddingMaintenance, EmbeddingService};
use crate::interview::{EventPublisher, InterviewOrchestrator, InterviewReportGenerator};
use crate::llm_client::LanguageModel;
use crate::store::Store;
use crate::vector::{JobIndex, VectorScorer};

/// Shared application state injected into all route handlers via Axum extractors.
///
/// Every service is constructed once here; clones share the same store,
/// model client, embedding backend and job index.
#[derive(Clone)]
pub struct AppState {
    /// Snapshot of active job embeddings. Rebuilt on refresh.
    pub index: Arc<JobIndex>,
    pub scorer: VectorScorer,
    pub analysis: MatchAnalysisEngine,
    pub maintenance: EmbeddingMaintenance,
    pub interviews: InterviewOrchestrator,
    pub reports: InterviewReportGenerator,
}

impl AppState {
    pub fn new(
        store: Arc<dyn Store>,
        llm: Arc<dyn LanguageModel>,
        embeddings: EmbeddingService,
        events: EventPublisher,
    ) -> Self {
        let index = Arc::new(JobIndex::new(store.clone()));
        let analysis = MatchAnalysisEngine::new(store.clone(), llm.clone());
        Self {
            scorer: VectorScorer::new(store.clone(), index.clone()),
            maintenance: EmbeddingMaintenance::new(
                store.clone(),
                embeddings,
                index.clone(),
                analysis.clone(),
            ),
            interviews: InterviewOrchestrator::new(store.clone(), llm.clone(), events),
            reports: InterviewReportGenerator::new(store, llm),
            analysis,
            index,
        }
    }
}
