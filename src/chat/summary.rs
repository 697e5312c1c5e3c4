//! Neutral summaries of exchanges and sessions.
//!
//! Summaries only name the themes explored; they never track progress or
//! evaluate the user. No filter or crisis logic applies here.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::error::BackendError;
use crate::llms::{GenerationRequest, TextGenerator};
use crate::types::Message;

const SUMMARY_TEMPERATURE: f64 = 0.3;
const EXCHANGE_SUMMARY_MAX_TOKENS: u32 = 100;
const SESSION_SUMMARY_MAX_TOKENS: u32 = 200;

/// Capability: summarise conversations for later continuity.
#[async_trait]
pub trait Summarizer: Send + Sync + fmt::Debug {
    /// One or two sentences describing a single exchange. `persona` is the
    /// companion's display name.
    async fn summarize_exchange(
        &self,
        persona: &str,
        user_message: &str,
        reply: &str,
        language: &str,
    ) -> Result<String, BackendError>;

    /// Two or three sentences describing a whole session.
    async fn summarize_session(
        &self,
        persona: &str,
        messages: &[Message],
        language: &str,
    ) -> Result<String, BackendError>;
}

/// [`Summarizer`] backed by the text generator.
#[derive(Debug, Clone)]
pub struct LlmSummarizer {
    generator: Arc<dyn TextGenerator>,
}

impl LlmSummarizer {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }
}

fn exchange_instructions(persona: &str, language: &str) -> String {
    format!(
        "You are a neutral summarizer for the {} companion in MindGlow. \
         Write a 1-2 sentence neutral summary of this exchange. \
         Do not track progress, evaluate emotions or judge. \
         Only name the theme that was explored. \
         Write in the user's language ({}).",
        persona,
        language
    )
}

fn session_instructions(persona: &str, language: &str) -> String {
    format!(
        "You are a neutral summarizer for the {} companion in MindGlow. \
         Write a 2-3 sentence neutral summary of this session. \
         Do not track progress, score or evaluate, and do not judge emotions. \
         Only describe the themes and areas that were explored. \
         Write in the conversation's language ({}).",
        persona,
        language
    )
}

fn transcript(messages: &[Message]) -> String {
    messages
        .iter()
        .map(|m| format!("{}: {}", m.role.as_str(), m.content))
        .collect::<Vec<_>>()
        .join("\n")
}

#[async_trait]
impl Summarizer for LlmSummarizer {
    async fn summarize_exchange(
        &self,
        persona: &str,
        user_message: &str,
        reply: &str,
        language: &str,
    ) -> Result<String, BackendError> {
        let request = GenerationRequest::single_turn(
            &exchange_instructions(persona, language),
            &format!("User: {}\nAssistant: {}", user_message, reply),
            SUMMARY_TEMPERATURE,
            EXCHANGE_SUMMARY_MAX_TOKENS,
        );
        self.generator.generate(&request).await
    }

    async fn summarize_session(
        &self,
        persona: &str,
        messages: &[Message],
        language: &str,
    ) -> Result<String, BackendError> {
        let request = GenerationRequest::single_turn(
            &session_instructions(persona, language),
            &transcript(messages),
            SUMMARY_TEMPERATURE,
            SESSION_SUMMARY_MAX_TOKENS,
        );
        self.generator.generate(&request).await
    }
}
