//! Chat orchestration.
//!
//! ```text
//! ChatRequest
//!   -> validate
//!   -> resolve language (LanguageRouter)
//!   -> crisis scan ----------------------------> template + resources (no generation)
//!   -> memory retrieval (optional)
//!   -> generate / filter / regenerate (RetryOrchestrator)
//!   -> embed user message + reply
//!   -> exchange summary
//!   -> ChatResponse
//! ```

pub mod backend;
pub mod pipeline;
pub mod prompt;
pub mod retry;
pub mod summary;

pub use backend::{call_with_retry, Collaborators};
pub use pipeline::ChatPipeline;
pub use retry::{FilterTraceEntry, RetryOrchestrator, RetryOutcome};
pub use summary::{LlmSummarizer, Summarizer};
