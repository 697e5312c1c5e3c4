//! Text-generation capability.
//!
//! [`TextGenerator`] is the single seam between the chat pipeline and any
//! chat-completion backend. Implementations make exactly one backend call
//! per `generate`; timeouts and the transient retry are applied by the
//! caller.

use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::BackendError;
use crate::types::MessageRole;

// ---------------------------------------------------------------------------
// Prompt messages
// ---------------------------------------------------------------------------

/// Role of a prompt message sent to the generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChatRole {
    System,
    User,
    Assistant,
}

impl From<MessageRole> for ChatRole {
    fn from(role: MessageRole) -> Self {
        match role {
            MessageRole::User => Self::User,
            MessageRole::Assistant => Self::Assistant,
        }
    }
}

/// A single prompt message, serialized in the chat-completions shape.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: ChatRole,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: ChatRole::Assistant,
            content: content.into(),
        }
    }
}

/// Everything needed for one generation call.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub messages: Vec<ChatMessage>,
    pub temperature: f64,
    pub max_tokens: u32,
}

impl GenerationRequest {
    pub fn new(messages: Vec<ChatMessage>, temperature: f64, max_tokens: u32) -> Self {
        Self {
            messages,
            temperature,
            max_tokens,
        }
    }

    /// A system instruction followed by one user turn.
    pub fn single_turn(system: &str, user: &str, temperature: f64, max_tokens: u32) -> Self {
        Self::new(
            vec![ChatMessage::system(system), ChatMessage::user(user)],
            temperature,
            max_tokens,
        )
    }
}

// ---------------------------------------------------------------------------
// TextGenerator trait
// ---------------------------------------------------------------------------

/// Capability: produce one reply for a prompt.
#[async_trait]
pub trait TextGenerator: Send + Sync + fmt::Debug {
    /// Generate a reply. The returned text is trimmed.
    async fn generate(&self, request: &GenerationRequest) -> Result<String, BackendError>;

    /// Model identifier, for logs.
    fn model(&self) -> &str;

    /// Provider name, for logs.
    fn provider(&self) -> &str {
        "openai"
    }
}
