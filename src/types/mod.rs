//! Request and response models for the HTTP API.

pub mod chat;
pub mod memory;
pub mod message;
pub mod summary;

pub use chat::{ChatRequest, ChatResponse, ChatWithMemoryRequest};
pub use memory::{EmbedRequest, EmbedResponse, SearchHit, SemanticSearchRequest, SemanticSearchResponse};
pub use message::{ConversationHistory, Message, MessageRole, UserInfo};
pub use summary::{SummaryRequest, SummaryResponse};
