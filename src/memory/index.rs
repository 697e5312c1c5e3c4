//! Exact cosine-similarity search over caller-supplied exchanges.
//!
//! Nothing is retained between calls: the candidates arrive with each
//! request and the scan is a linear pass over them.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{MindGlowError, Result};
use crate::types::MessageRole;

/// Embedding vector as produced by the embedding backend.
pub type EmbeddingVector = Vec<f32>;

/// A past exchange with its embedding, supplied by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredExchange {
    /// Caller-assigned identifier; defaults to `msg-<index>` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub role: MessageRole,
    pub content: String,
    pub embedding: EmbeddingVector,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
}

impl StoredExchange {
    /// The identifier reported for this exchange at position `index`.
    pub fn exchange_id(&self, index: usize) -> String {
        match &self.id {
            Some(id) if !id.trim().is_empty() => id.clone(),
            _ => format!("msg-{}", index),
        }
    }
}

/// One ranked search hit.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchResult {
    pub exchange_id: String,
    /// Cosine similarity in `[-1, 1]`.
    pub score: f64,
    /// 1-based position in the result list.
    pub rank: usize,
    /// Position of the exchange in the candidate slice.
    #[serde(skip)]
    pub index: usize,
}

/// Cosine similarity accumulated in `f64`.
///
/// Returns `0.0` when either vector has zero norm. Callers must ensure the
/// dimensions match; extra components of the longer slice are ignored.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    let mut dot = 0.0f64;
    let mut norm_a = 0.0f64;
    let mut norm_b = 0.0f64;
    for (&x, &y) in a.iter().zip(b.iter()) {
        let x = f64::from(x);
        let y = f64::from(y);
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    let denom = norm_a.sqrt() * norm_b.sqrt();
    if denom <= f64::EPSILON {
        return 0.0;
    }
    (dot / denom).clamp(-1.0, 1.0)
}

/// Rank `candidates` by similarity to `query`.
///
/// Keeps scores at or above `threshold`, orders by score descending (ties:
/// newer timestamp first, a present timestamp before an absent one, then
/// input order), truncates to `top_k` and assigns 1-based ranks. A
/// non-positive `top_k` yields no results.
///
/// Any candidate whose embedding dimension differs from the query's is an
/// [`MindGlowError::EmbeddingDimensionMismatch`].
pub fn search(
    query: &[f32],
    candidates: &[StoredExchange],
    top_k: i64,
    threshold: f64,
) -> Result<Vec<SearchResult>> {
    for (index, candidate) in candidates.iter().enumerate() {
        if candidate.embedding.len() != query.len() {
            return Err(MindGlowError::EmbeddingDimensionMismatch {
                exchange_id: candidate.exchange_id(index),
                expected: query.len(),
                found: candidate.embedding.len(),
            });
        }
    }
    if top_k <= 0 || candidates.is_empty() {
        return Ok(Vec::new());
    }

    let mut scored: Vec<(usize, f64)> = candidates
        .iter()
        .enumerate()
        .map(|(index, c)| (index, cosine_similarity(query, &c.embedding)))
        .filter(|(_, score)| *score >= threshold)
        .collect();

    scored.sort_by(|a, b| {
        b.1.partial_cmp(&a.1)
            .unwrap_or(Ordering::Equal)
            // Option orders None < Some, so reversing puts newer and present first.
            .then_with(|| candidates[b.0].timestamp.cmp(&candidates[a.0].timestamp))
            .then_with(|| a.0.cmp(&b.0))
    });
    scored.truncate(usize::try_from(top_k).unwrap_or(usize::MAX));

    Ok(scored
        .into_iter()
        .enumerate()
        .map(|(position, (index, score))| SearchResult {
            exchange_id: candidates[index].exchange_id(index),
            score,
            rank: position + 1,
            index,
        })
        .collect())
}
