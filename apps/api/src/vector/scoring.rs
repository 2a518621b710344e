//! Pairwise, batch and top-N vector scoring for already-embedded entities.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, warn};
use uuid::Uuid;

use super::{similarity_score, Confidence, JobIndex};
use crate::errors::AppError;
use crate::models::document::CandidateDocument;
use crate::models::job::JobPosting;
use crate::store::Store;

/// Technology vocabulary scanned for in posting text when enriching top matches.
const TECH_SKILLS: &[&str] = &[
    "Python", "JavaScript", "Java", "React", "Node.js", "SQL", "PostgreSQL", "MongoDB", "AWS",
    "Docker", "Kubernetes", "Git", "Django", "Flask", "TypeScript", "Vue.js", "Angular",
    "Machine Learning", "TensorFlow", "PyTorch", "Redis", "Elasticsearch", "GraphQL",
    "REST API", "Rust", "Go", "Kafka",
];
const MAX_KEY_SKILLS: usize = 5;
const DESCRIPTION_SNIPPET_CHARS: usize = 200;
const REQUIREMENTS_SNIPPET_CHARS: usize = 150;

/// A ranked posting enriched for display.
#[derive(Debug, Clone, Serialize)]
pub struct TopMatch {
    pub job_id: Uuid,
    pub title: String,
    pub company_name: String,
    pub vector_score: f64,
    pub match_confidence: Confidence,
    pub description_snippet: String,
    pub requirements_snippet: String,
    pub key_skills: Vec<String>,
}

#[derive(Clone)]
pub struct VectorScorer {
    store: Arc<dyn Store>,
    index: Arc<JobIndex>,
}

impl VectorScorer {
    pub fn new(store: Arc<dyn Store>, index: Arc<JobIndex>) -> Self {
        Self { store, index }
    }

    /// Similarity for one pair. `None` means "unscored": one side has no embedding.
    pub async fn pair_score(&self, document_id: Uuid, job_id: Uuid) -> Result<Option<f64>, AppError> {
        let document = self.document(document_id).await?;
        let job = self
            .store
            .get_job(job_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Job {job_id} not found")))?;

        match (document.embedding(), job.embedding()) {
            (Some(d), Some(j)) => Ok(Some(similarity_score(d, j))),
            _ => {
                debug!("Pair {document_id}/{job_id} is unscored: missing embedding");
                Ok(None)
            }
        }
    }

    /// Similarity for each requested job that has an embedding. Jobs without
    /// one are absent from the map.
    pub async fn batch_score(
        &self,
        document_id: Uuid,
        job_ids: &[Uuid],
    ) -> Result<HashMap<Uuid, f64>, AppError> {
        let document = self.document(document_id).await?;
        let Some(query) = document.embedding() else {
            warn!("Document {document_id} has no embedding; batch score is empty");
            return Ok(HashMap::new());
        };

        let rows = self.store.job_embeddings(job_ids).await?;
        Ok(rows
            .into_iter()
            .map(|(id, embedding)| (id, similarity_score(query, &embedding)))
            .collect())
    }

    /// Index search for the document, enriched with snippets and key skills.
    pub async fn top_matches(&self, document_id: Uuid, limit: usize) -> Result<Vec<TopMatch>, AppError> {
        let document = self.document(document_id).await?;
        let Some(query) = document.embedding() else {
            return Ok(Vec::new());
        };

        let hits = self.index.search(query, limit).await?;
        let mut matches = Vec::with_capacity(hits.len());
        for (job_id, score) in hits {
            match self.store.get_job(job_id).await? {
                Some(job) => matches.push(enrich(&job, score)),
                None => debug!("Indexed job {job_id} no longer exists; skipping"),
            }
        }
        Ok(matches)
    }

    async fn document(&self, document_id: Uuid) -> Result<CandidateDocument, AppError> {
        self.store
            .get_document(document_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Document {document_id} not found")))
    }
}

fn enrich(job: &JobPosting, score: f64) -> TopMatch {
    let requirements = job.requirements.join(", ");
    TopMatch {
        job_id: job.id,
        title: job.title.clone(),
        company_name: job.company_name.clone(),
        vector_score: score,
        match_confidence: Confidence::from_score(score),
        description_snippet: snippet(&job.description, DESCRIPTION_SNIPPET_CHARS),
        requirements_snippet: snippet(&requirements, REQUIREMENTS_SNIPPET_CHARS),
        key_skills: extract_key_skills(&job.description, &requirements),
    }
}

fn snippet(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        let head: String = text.chars().take(max_chars).collect();
        format!("{head}...")
    } else {
        text.to_string()
    }
}

fn extract_key_skills(description: &str, requirements: &str) -> Vec<String> {
    let haystack = format!("{description} {requirements}").to_lowercase();
    let tokens: Vec<&str> = haystack
        .split(|c: char| !(c.is_alphanumeric() || c == '.' || c == '+' || c == '#'))
        .map(|t| t.trim_end_matches('.'))
        .filter(|t| !t.is_empty())
        .collect();

    TECH_SKILLS
        .iter()
        .filter(|skill| {
            let needle = skill.to_lowercase();
            if needle.contains(' ') {
                haystack.contains(&needle)
            } else {
                tokens.iter().any(|t| *t == needle)
            }
        })
        .take(MAX_KEY_SKILLS)
        .map(|s| s.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::testing::{document_with_embedding, job_with_embedding};

    async fn scorer(
        document: Option<Vec<f32>>,
        jobs: Vec<(Uuid, Option<Vec<f32>>)>,
    ) -> (VectorScorer, Uuid) {
        let store = Arc::new(MemoryStore::new());
        let document_id = Uuid::new_v4();
        store
            .insert_document(document_with_embedding(document_id, document))
            .await;
        for (id, embedding) in jobs {
            store.insert_job(job_with_embedding(id, embedding)).await;
        }
        let index = Arc::new(JobIndex::new(store.clone()));
        (VectorScorer::new(store, index), document_id)
    }

    #[tokio::test]
    async fn test_pair_score_aligned_and_orthogonal() {
        let (j1, j2) = (Uuid::new_v4(), Uuid::new_v4());
        let (scorer, d) = scorer(
            Some(vec![1.0, 0.0, 0.0]),
            vec![(j1, Some(vec![1.0, 0.0, 0.0])), (j2, Some(vec![0.0, 1.0, 0.0]))],
        )
        .await;

        let s1 = scorer.pair_score(d, j1).await.unwrap().unwrap();
        let s2 = scorer.pair_score(d, j2).await.unwrap().unwrap();
        assert!((s1 - 100.0).abs() < 1e-6, "s1 was {s1}");
        assert!(s2.abs() < 1e-6, "s2 was {s2}");
    }

    #[tokio::test]
    async fn test_pair_score_is_none_without_embedding() {
        let (j1, j2) = (Uuid::new_v4(), Uuid::new_v4());
        let (scorer, d) = scorer(
            Some(vec![1.0, 0.0]),
            vec![(j1, None), (j2, Some(Vec::new()))],
        )
        .await;
        assert_eq!(scorer.pair_score(d, j1).await.unwrap(), None);
        assert_eq!(scorer.pair_score(d, j2).await.unwrap(), None);

        let (scorer, d) = scorer_without_document_embedding(j1).await;
        assert_eq!(scorer.pair_score(d, j1).await.unwrap(), None);
    }

    async fn scorer_without_document_embedding(job: Uuid) -> (VectorScorer, Uuid) {
        scorer(None, vec![(job, Some(vec![1.0, 0.0]))]).await
    }

    #[tokio::test]
    async fn test_pair_score_unknown_job_is_not_found() {
        let (scorer, d) = scorer(Some(vec![1.0]), vec![]).await;
        let err = scorer.pair_score(d, Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_pair_score_stays_in_range() {
        let j = Uuid::new_v4();
        let (scorer, d) = scorer(Some(vec![0.3, -0.9, 2.5]), vec![(j, Some(vec![-4.0, 1.0, 0.2]))]).await;
        let s = scorer.pair_score(d, j).await.unwrap().unwrap();
        assert!((0.0..=100.0).contains(&s));
    }

    #[tokio::test]
    async fn test_batch_score_skips_jobs_without_embedding() {
        let (j1, j2, j3) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let (scorer, d) = scorer(
            Some(vec![1.0, 0.0]),
            vec![(j1, Some(vec![1.0, 0.0])), (j2, None)],
        )
        .await;

        let scores = scorer.batch_score(d, &[j1, j2, j3]).await.unwrap();
        assert_eq!(scores.len(), 1);
        assert!((scores[&j1] - 100.0).abs() < 1e-6);
        assert!(!scores.contains_key(&j2));
    }

    #[tokio::test]
    async fn test_batch_score_empty_when_document_unembedded() {
        let j1 = Uuid::new_v4();
        let (scorer, d) = scorer(None, vec![(j1, Some(vec![1.0, 0.0]))]).await;
        assert!(scorer.batch_score(d, &[j1]).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_top_matches_are_enriched_and_ranked() {
        let (j1, j2) = (Uuid::new_v4(), Uuid::new_v4());
        let (scorer, d) = scorer(
            Some(vec![1.0, 0.0]),
            vec![(j1, Some(vec![0.6, 0.8])), (j2, Some(vec![1.0, 0.0]))],
        )
        .await;

        let top = scorer.top_matches(d, 5).await.unwrap();
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].job_id, j2);
        assert_eq!(top[0].match_confidence, Confidence::High);
        assert_eq!(top[1].match_confidence, Confidence::Medium);
        assert!(top[0].key_skills.contains(&"Rust".to_string()));
        assert!(top[0].key_skills.contains(&"PostgreSQL".to_string()));
    }

    #[test]
    fn test_snippet_truncates_on_char_boundary() {
        let text = "é".repeat(250);
        let s = snippet(&text, 200);
        assert_eq!(s.chars().count(), 203);
        assert!(s.ends_with("..."));
        assert_eq!(snippet("short", 200), "short");
    }

    #[test]
    fn test_key_skills_match_whole_words_and_cap_at_five() {
        let skills = extract_key_skills(
            "We use Go, Rust, Docker, Kubernetes, Kafka, Redis and GraphQL.",
            "Google Cloud experience",
        );
        assert_eq!(skills.len(), MAX_KEY_SKILLS);
        assert_eq!(skills[0], "Docker");

        assert_eq!(extract_key_skills("Services written in Go.", ""), vec!["Go".to_string()]);
        let none = extract_key_skills("Google Cloud and a gardening budget", "");
        assert!(!none.contains(&"Go".to_string()));
    }

    #[test]
    fn test_key_skills_multi_word() {
        let skills = extract_key_skills("Experience shipping Machine Learning models", "REST API design");
        assert_eq!(skills, vec!["Machine Learning".to_string(), "REST API".to_string()]);
    }
}
