//! Embedding capability.
//!
//! An [`Embedder`] turns a batch of texts into one vector per text, in input
//! order. The default implementation is [`OpenAIEmbedding`].

pub mod openai;

use std::fmt;

use async_trait::async_trait;

use crate::error::BackendError;
use crate::memory::EmbeddingVector;

pub use openai::OpenAIEmbedding;

/// Capability: embed a batch of texts.
#[async_trait]
pub trait Embedder: Send + Sync + fmt::Debug {
    /// Embed `texts`, returning exactly one vector per input, in order.
    async fn embed(&self, texts: &[String]) -> Result<Vec<EmbeddingVector>, BackendError>;

    /// Model identifier, for logs.
    fn model(&self) -> &str;
}
