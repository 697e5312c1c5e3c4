//! `/semantic-search` and `/embed` bodies.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::message::MessageRole;
use crate::memory::{EmbeddingVector, SearchResult, StoredExchange};

/// Rank stored exchanges against a query text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SemanticSearchRequest {
    pub query: String,
    #[serde(default)]
    pub stored_messages: Vec<StoredExchange>,
    /// Defaults to the configured `memory_top_k`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_k: Option<i64>,
    /// Defaults to the configured similarity threshold.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold: Option<f64>,
}

/// A search hit joined back to its exchange.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub exchange_id: String,
    pub rank: usize,
    pub score: f64,
    pub role: MessageRole,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl SearchHit {
    pub fn from_result(result: &SearchResult, exchange: &StoredExchange) -> Self {
        Self {
            exchange_id: result.exchange_id.clone(),
            rank: result.rank,
            score: result.score,
            role: exchange.role,
            content: exchange.content.clone(),
            timestamp: exchange.timestamp,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SemanticSearchResponse {
    pub results: Vec<SearchHit>,
    /// Embedding of the query, for the caller to cache.
    pub query_embedding: EmbeddingVector,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbedRequest {
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbedResponse {
    pub embedding: EmbeddingVector,
}
