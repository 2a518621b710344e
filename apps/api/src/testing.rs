//! Fixtures shared by unit tests across modules.

use std::sync::Arc;

use chrono::Utc;
use serde_json::Value;
use uuid::Uuid;

use crate::models::document::{CandidateDocument, CareerPreferences};
use crate::models::interview::Application;
use crate::models::job::JobPosting;
use crate::store::MemoryStore;

pub fn job_with_embedding(id: Uuid, embedding: Option<Vec<f32>>) -> JobPosting {
    JobPosting {
        id,
        title: "Backend Engineer".to_string(),
        company_name: "Acme Logistics".to_string(),
        industry: Some("Logistics".to_string()),
        description: "Build and operate Rust services that route parcels across Europe."
            .to_string(),
        requirements: vec!["Rust".to_string(), "PostgreSQL".to_string(), "Docker".to_string()],
        responsibilities: vec!["Own the routing service".to_string()],
        location: Some("Berlin".to_string()),
        job_type: "full_time".to_string(),
        remote_option: "hybrid".to_string(),
        salary_min: Some(70_000),
        salary_max: Some(90_000),
        status: "active".to_string(),
        embedding,
        matching_weights: None,
        updated_at: Utc::now(),
    }
}

pub fn job_with_weights(id: Uuid, weights: Value) -> JobPosting {
    JobPosting {
        matching_weights: Some(weights),
        ..job_with_embedding(id, Some(vec![1.0, 0.0, 0.0]))
    }
}

pub fn document_with_embedding(id: Uuid, embedding: Option<Vec<f32>>) -> CandidateDocument {
    CandidateDocument {
        id,
        candidate_id: Uuid::new_v4(),
        parsed_text: Some(
            "Software engineer. Five years of Rust and PostgreSQL. Built a Docker-based \
             deployment pipeline for a freight company."
                .to_string(),
        ),
        embedding,
        is_primary: true,
        career_preferences: CareerPreferences {
            industries: vec!["Logistics".to_string()],
            locations: vec!["Berlin".to_string()],
            work_types: vec!["hybrid".to_string()],
            roles: vec!["Backend Engineer".to_string()],
        },
        updated_at: Utc::now(),
    }
}

/// A store holding one document, one job and one application linking them.
pub async fn seeded_store() -> (Arc<MemoryStore>, Uuid, Uuid, Uuid) {
    let store = Arc::new(MemoryStore::new());
    let (document_id, job_id, application_id) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
    store
        .insert_document(document_with_embedding(document_id, Some(vec![1.0, 0.0, 0.0])))
        .await;
    store
        .insert_job(job_with_embedding(job_id, Some(vec![1.0, 0.0, 0.0])))
        .await;
    store
        .insert_application(Application {
            id: application_id,
            document_id,
            job_id,
            status: "submitted".to_string(),
        })
        .await;
    (store, document_id, job_id, application_id)
}
