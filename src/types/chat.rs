//! `/chat` and `/chat-with-memory` request and response bodies.

use serde::{Deserialize, Serialize};

use super::message::{ConversationHistory, UserInfo};
use crate::chat::FilterTraceEntry;
use crate::error::{MindGlowError, Result};
use crate::memory::{EmbeddingVector, MemoryQuery, StoredExchange};
use crate::persona::Persona;

/// One user turn addressed to a persona.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub chatbot: Persona,
    pub user_info: UserInfo,
    pub message: String,
    #[serde(default)]
    pub conversation_history: ConversationHistory,
    /// Neutral summaries of earlier sessions, oldest first.
    #[serde(default)]
    pub past_summaries: Vec<String>,
}

impl ChatRequest {
    pub fn new(chatbot: Persona, user_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            chatbot,
            user_info: UserInfo {
                user_id: user_id.into(),
                ..UserInfo::default()
            },
            message: message.into(),
            conversation_history: ConversationHistory::default(),
            past_summaries: Vec::new(),
        }
    }

    /// Reject requests with a blank message or user id.
    pub fn validate(&self) -> Result<()> {
        if self.message.trim().is_empty() {
            return Err(MindGlowError::Validation("message must not be empty".to_string()));
        }
        if self.user_info.user_id.trim().is_empty() {
            return Err(MindGlowError::Validation(
                "user_info.user_id must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// A chat turn that also carries stored exchanges for memory retrieval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatWithMemoryRequest {
    #[serde(flatten)]
    pub chat: ChatRequest,
    #[serde(default)]
    pub stored_messages: Vec<StoredExchange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub top_k: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub threshold: Option<f64>,
}

impl ChatWithMemoryRequest {
    /// Split into the chat request and its memory query.
    pub fn into_parts(self) -> (ChatRequest, MemoryQuery) {
        let memory = MemoryQuery {
            stored: self.stored_messages,
            top_k: self.top_k,
            threshold: self.threshold,
        };
        (self.chat, memory)
    }
}

/// The reply to a chat turn plus everything the caller should persist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub reply: String,
    pub detected_language: String,
    pub crisis_detected: bool,
    pub crisis_resources: Option<String>,
    /// True when any generated candidate was blocked by the filter.
    pub response_was_filtered: bool,
    pub filter_log: Option<Vec<FilterTraceEntry>>,
    /// Embedding of the user message.
    pub embedding: Option<EmbeddingVector>,
    pub reply_embedding: Option<EmbeddingVector>,
    /// Neutral one- or two-sentence summary of this exchange.
    pub summary: Option<String>,
}
