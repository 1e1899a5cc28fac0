use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use rr_core::{Embedder, Error, Result};

use crate::EmbeddingConfig;

/// Client for an OpenAI-compatible embeddings endpoint. One outbound call
/// per embed; no retries, no caching.
pub struct OpenAiEmbedder {
    client: Client,
    config: EmbeddingConfig,
}

impl OpenAiEmbedder {
    pub fn new(config: EmbeddingConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a str,
    encoding_format: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

#[async_trait]
impl Embedder for OpenAiEmbedder {
    fn name(&self) -> &str {
        "openai"
    }

    fn dimension(&self) -> usize {
        self.config.dimension
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        if text.trim().is_empty() {
            return Err(Error::Embedding("cannot embed empty text".to_string()));
        }

        let request = EmbeddingRequest {
            model: &self.config.model,
            input: text,
            encoding_format: "float",
        };

        let response = self
            .client
            .post(&self.config.url)
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| Error::Embedding(format!("embedding request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Embedding(format!(
                "embedding API returned {status}"
            )));
        }

        let payload: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| Error::Embedding(format!("malformed embedding response: {e}")))?;

        payload
            .data
            .into_iter()
            .next()
            .map(|data| {
                tracing::debug!(dimension = data.embedding.len(), "embedded text");
                data.embedding
            })
            .ok_or_else(|| Error::Embedding("response contained no embedding".to_string()))
    }
}
