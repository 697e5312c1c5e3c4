//! `/summary` bodies.

use serde::{Deserialize, Serialize};

use super::message::Message;
use crate::persona::Persona;

/// Summarise a whole session for continuity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRequest {
    pub chatbot: Persona,
    #[serde(default)]
    pub messages: Vec<Message>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryResponse {
    pub summary: String,
    pub detected_language: String,
}
