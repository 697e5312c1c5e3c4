//! OpenAI Embeddings API provider.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value;

use super::Embedder;
use crate::config::Settings;
use crate::error::{BackendError, Result};
use crate::llms::providers::openai::OpenAIConnection;
use crate::memory::EmbeddingVector;

/// Batch embeddings over `POST /embeddings`.
#[derive(Debug, Clone)]
pub struct OpenAIEmbedding {
    model: String,
    connection: OpenAIConnection,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingItem>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingItem {
    #[serde(default)]
    index: usize,
    embedding: EmbeddingVector,
}

impl OpenAIEmbedding {
    pub fn new(model: impl Into<String>, connection: OpenAIConnection) -> Self {
        Self {
            model: model.into(),
            connection,
        }
    }

    pub fn from_settings(settings: &Settings) -> Result<Self> {
        Ok(Self::new(
            settings.embedding_model.clone(),
            OpenAIConnection::from_settings(settings)?,
        ))
    }

    pub fn build_request_body(&self, texts: &[String]) -> Value {
        let input: Vec<&str> = texts.iter().map(|t| t.trim()).collect();
        serde_json::json!({
            "model": self.model,
            "input": input,
        })
    }

    /// Decode the response, restoring input order by each item's `index`.
    pub fn parse_embedding_response(
        &self,
        response: Value,
        expected: usize,
    ) -> std::result::Result<Vec<EmbeddingVector>, BackendError> {
        let mut parsed: EmbeddingResponse = serde_json::from_value(response)
            .map_err(|e| BackendError::InvalidResponse(format!("malformed embeddings response: {}", e)))?;
        if parsed.data.len() != expected {
            return Err(BackendError::InvalidResponse(format!(
                "expected {} embeddings, got {}",
                expected,
                parsed.data.len()
            )));
        }
        parsed.data.sort_by_key(|item| item.index);
        Ok(parsed.data.into_iter().map(|item| item.embedding).collect())
    }
}

#[async_trait]
impl Embedder for OpenAIEmbedding {
    async fn embed(&self, texts: &[String]) -> std::result::Result<Vec<EmbeddingVector>, BackendError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        log::debug!(
            "OpenAIEmbedding.embed: model={}, inputs={}",
            self.model,
            texts.len()
        );
        let body = self.build_request_body(texts);
        let response = self.connection.post_json("embeddings", &body).await?;
        self.parse_embedding_response(response, texts.len())
    }

    fn model(&self) -> &str {
        &self.model
    }
}
