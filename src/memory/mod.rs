//! Semantic memory over caller-supplied exchanges.
//!
//! - [`index`] - cosine-similarity ranking of stored exchanges
//! - [`context`] - rendering hits into the prompt's memory block

pub mod context;
pub mod index;

pub use context::build_memory_context;
pub use index::{cosine_similarity, search, EmbeddingVector, SearchResult, StoredExchange};

/// Memory retrieval parameters for a memory-augmented chat turn.
#[derive(Debug, Clone, Default)]
pub struct MemoryQuery {
    pub stored: Vec<StoredExchange>,
    /// Overrides the configured `memory_top_k`.
    pub top_k: Option<i64>,
    /// Overrides the configured similarity threshold.
    pub threshold: Option<f64>,
}
