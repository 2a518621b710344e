//! OpenAI-compatible `/embeddings` endpoint client.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use super::{EmbeddingBackend, EmbeddingError};

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingDatum>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingDatum {
    embedding: Vec<f32>,
}

pub struct HttpEmbedder {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
    model: String,
    dimensions: usize,
}

impl HttpEmbedder {
    pub fn new(
        base_url: &str,
        api_key: Option<String>,
        model: String,
        dimensions: usize,
    ) -> Result<Self, EmbeddingError> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(Self {
            client,
            endpoint: format!("{}/embeddings", base_url.trim_end_matches('/')),
            api_key,
            model,
            dimensions,
        })
    }
}

#[async_trait]
impl EmbeddingBackend for HttpEmbedder {
    fn model_name(&self) -> &str {
        &self.model
    }

    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let mut request = self.client.post(&self.endpoint).json(&EmbeddingRequest {
            model: &self.model,
            input: text,
        });
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(EmbeddingError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: EmbeddingResponse = response.json().await?;
        body.data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or(EmbeddingError::EmptyResponse)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_joins_base_url() {
        let e = HttpEmbedder::new("http://localhost:9000/v1/", None, "m".to_string(), 3).unwrap();
        assert_eq!(e.endpoint, "http://localhost:9000/v1/embeddings");
    }

    #[test]
    fn test_response_shape_deserializes() {
        let body: EmbeddingResponse =
            serde_json::from_str(r#"{"data":[{"embedding":[0.1,0.2,0.3],"index":0}],"model":"m"}"#)
                .unwrap();
        assert_eq!(body.data[0].embedding.len(), 3);
    }
}
