//! Text generation for the chat pipeline.
//!
//! - [`base_llm`] - the [`TextGenerator`] capability and prompt message types
//! - [`providers`] - backend implementations (OpenAI Chat Completions)

pub mod base_llm;
pub mod providers;

pub use base_llm::{ChatMessage, ChatRole, GenerationRequest, TextGenerator};
pub use providers::openai::OpenAICompletion;
