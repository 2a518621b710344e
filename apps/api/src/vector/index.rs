//! In-memory similarity index over active job-posting embeddings.
//!
//! Built lazily on the first `search`. The index is a snapshot: writes to
//! postings are not reflected until `refresh()` runs. `remove()` tombstones a
//! posting immediately; the next refresh re-admits it only if it is still
//! active and embedded.
//!
//! Vectors are stored pre-normalized and searched exhaustively, so results
//! are exact cosine rankings.

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

use super::to_score;
use crate::store::{Store, StoreError};

struct Snapshot {
    job_ids: Vec<Uuid>,
    vectors: Vec<Vec<f32>>,
    tombstones: HashSet<Uuid>,
    built_at: DateTime<Utc>,
}

pub struct JobIndex {
    store: Arc<dyn Store>,
    snapshot: RwLock<Option<Snapshot>>,
}

impl JobIndex {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self {
            store,
            snapshot: RwLock::new(None),
        }
    }

    /// Scans all active postings with an embedding and replaces the snapshot.
    /// Returns the number of indexed postings.
    pub async fn build(&self) -> Result<usize, StoreError> {
        let mut guard = self.snapshot.write().await;
        let snapshot = self.load().await?;
        let count = snapshot.job_ids.len();
        *guard = Some(snapshot);
        Ok(count)
    }

    /// Rebuilds the index. Callers trigger this after bulk posting writes.
    pub async fn refresh(&self) -> Result<usize, StoreError> {
        let count = self.build().await?;
        info!("Job index refreshed with {count} vectors");
        Ok(count)
    }

    /// Hides a posting from search results until the next refresh.
    pub async fn remove(&self, job_id: Uuid) {
        if let Some(snapshot) = self.snapshot.write().await.as_mut() {
            snapshot.tombstones.insert(job_id);
        }
    }

    pub async fn is_built(&self) -> bool {
        self.snapshot.read().await.is_some()
    }

    pub async fn built_at(&self) -> Option<DateTime<Utc>> {
        self.snapshot.read().await.as_ref().map(|s| s.built_at)
    }

    /// Number of searchable postings (tombstones excluded).
    pub async fn len(&self) -> usize {
        self.snapshot
            .read()
            .await
            .as_ref()
            .map(|s| {
                s.job_ids
                    .iter()
                    .filter(|id| !s.tombstones.contains(*id))
                    .count()
            })
            .unwrap_or(0)
    }

    /// Top `k` postings by similarity to `query`, highest first.
    pub async fn search(&self, query: &[f32], k: usize) -> Result<Vec<(Uuid, f64)>, StoreError> {
        if query.is_empty() || k == 0 {
            return Ok(Vec::new());
        }
        self.ensure_built().await?;

        let Some(query) = normalized(query) else {
            return Ok(Vec::new());
        };

        let guard = self.snapshot.read().await;
        let Some(snapshot) = guard.as_ref() else {
            return Ok(Vec::new());
        };

        let mut hits: Vec<(Uuid, f64)> = snapshot
            .job_ids
            .iter()
            .zip(&snapshot.vectors)
            .filter(|(id, v)| v.len() == query.len() && !snapshot.tombstones.contains(*id))
            .map(|(id, v)| {
                let dot: f64 = v.iter().zip(&query).map(|(a, b)| *a as f64 * *b as f64).sum();
                (*id, to_score(dot))
            })
            .collect();

        hits.sort_by(|a, b| b.1.total_cmp(&a.1));
        hits.truncate(k);
        Ok(hits)
    }

    async fn ensure_built(&self) -> Result<(), StoreError> {
        if self.snapshot.read().await.is_some() {
            return Ok(());
        }
        let mut guard = self.snapshot.write().await;
        // Another request may have finished the first build while we waited.
        if guard.is_none() {
            let snapshot = self.load().await?;
            info!("Job index built lazily with {} vectors", snapshot.job_ids.len());
            *guard = Some(snapshot);
        }
        Ok(())
    }

    async fn load(&self) -> Result<Snapshot, StoreError> {
        let rows = self.store.active_job_embeddings().await?;
        let mut job_ids = Vec::with_capacity(rows.len());
        let mut vectors = Vec::with_capacity(rows.len());

        for (id, embedding) in rows {
            match normalized(&embedding) {
                Some(v) => {
                    job_ids.push(id);
                    vectors.push(v);
                }
                None => debug!("Skipping job {id}: zero-norm embedding"),
            }
        }

        if job_ids.is_empty() {
            info!("No job embeddings found to build the index");
        }

        Ok(Snapshot {
            job_ids,
            vectors,
            tombstones: HashSet::new(),
            built_at: Utc::now(),
        })
    }
}

fn normalized(v: &[f32]) -> Option<Vec<f32>> {
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    (norm > 0.0 && norm.is_finite()).then(|| v.iter().map(|x| x / norm).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use crate::testing::job_with_embedding;

    async fn index_with(jobs: Vec<(Uuid, Vec<f32>, &str)>) -> (Arc<MemoryStore>, JobIndex) {
        let store = Arc::new(MemoryStore::new());
        for (id, embedding, status) in jobs {
            let mut job = job_with_embedding(id, Some(embedding));
            job.status = status.to_string();
            store.insert_job(job).await;
        }
        let index = JobIndex::new(store.clone());
        (store, index)
    }

    #[tokio::test]
    async fn test_search_ranks_highest_first() {
        let (j1, j2, j3) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let (_, index) = index_with(vec![
            (j1, vec![1.0, 0.0, 0.0], "active"),
            (j2, vec![0.0, 1.0, 0.0], "active"),
            (j3, vec![1.0, 1.0, 0.0], "active"),
        ])
        .await;

        let hits = index.search(&[1.0, 0.0, 0.0], 10).await.unwrap();
        let ids: Vec<Uuid> = hits.iter().map(|(id, _)| *id).collect();
        assert_eq!(ids, vec![j1, j3, j2]);
        assert!((hits[0].1 - 100.0).abs() < 1e-4);
        assert!(hits[2].1.abs() < 1e-4);
    }

    #[tokio::test]
    async fn test_search_builds_lazily() {
        let (_, index) = index_with(vec![(Uuid::new_v4(), vec![1.0, 0.0], "active")]).await;
        assert!(!index.is_built().await);
        index.search(&[1.0, 0.0], 5).await.unwrap();
        assert!(index.is_built().await);
        assert_eq!(index.len().await, 1);
    }

    #[tokio::test]
    async fn test_inactive_postings_are_not_indexed() {
        let active = Uuid::new_v4();
        let (_, index) = index_with(vec![
            (active, vec![1.0, 0.0], "active"),
            (Uuid::new_v4(), vec![1.0, 0.0], "closed"),
        ])
        .await;
        let hits = index.search(&[1.0, 0.0], 5).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].0, active);
    }

    #[tokio::test]
    async fn test_index_is_a_snapshot_until_refresh() {
        let (store, index) = index_with(vec![(Uuid::new_v4(), vec![1.0, 0.0], "active")]).await;
        index.build().await.unwrap();

        let late = Uuid::new_v4();
        store.insert_job(job_with_embedding(late, Some(vec![0.0, 1.0]))).await;
        assert_eq!(index.search(&[0.0, 1.0], 5).await.unwrap().len(), 1);

        assert_eq!(index.refresh().await.unwrap(), 2);
        let hits = index.search(&[0.0, 1.0], 5).await.unwrap();
        assert_eq!(hits[0].0, late);
    }

    #[tokio::test]
    async fn test_removed_postings_are_hidden_until_refresh() {
        let gone = Uuid::new_v4();
        let (_, index) = index_with(vec![(gone, vec![1.0, 0.0], "active")]).await;
        index.build().await.unwrap();

        index.remove(gone).await;
        assert!(index.search(&[1.0, 0.0], 5).await.unwrap().is_empty());
        assert_eq!(index.len().await, 0);

        index.refresh().await.unwrap();
        assert_eq!(index.search(&[1.0, 0.0], 5).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_empty_query_and_dimension_mismatch() {
        let (_, index) = index_with(vec![(Uuid::new_v4(), vec![1.0, 0.0, 0.0], "active")]).await;
        assert!(index.search(&[], 5).await.unwrap().is_empty());
        assert!(index.search(&[1.0, 0.0], 5).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_search_truncates_to_k() {
        let jobs = (0..5)
            .map(|i| (Uuid::new_v4(), vec![1.0, i as f32], "active"))
            .collect();
        let (_, index) = index_with(jobs).await;
        assert_eq!(index.search(&[1.0, 0.0], 2).await.unwrap().len(), 2);
    }
}
