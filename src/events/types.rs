//! Safety events emitted by the chat pipeline.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::chat::FilterTraceEntry;
use crate::persona::Persona;

/// A user message matched the crisis lexicon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrisisEvent {
    pub event_id: Uuid,
    pub user_id: String,
    pub persona: Persona,
    pub matched_indicators: BTreeSet<String>,
    pub language: String,
    pub timestamp: DateTime<Utc>,
}

impl CrisisEvent {
    pub fn new(
        user_id: impl Into<String>,
        persona: Persona,
        matched_indicators: BTreeSet<String>,
        language: impl Into<String>,
    ) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            user_id: user_id.into(),
            persona,
            matched_indicators,
            language: language.into(),
            timestamp: Utc::now(),
        }
    }
}

/// At least one generated candidate was blocked for this request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterEvent {
    pub event_id: Uuid,
    pub user_id: String,
    pub persona: Persona,
    /// Generator calls counted against the filter budget.
    pub attempts: u32,
    /// True when every candidate was blocked and the fallback reply was used.
    pub exhausted: bool,
    pub trace: Vec<FilterTraceEntry>,
    pub timestamp: DateTime<Utc>,
}

impl FilterEvent {
    pub fn new(
        user_id: impl Into<String>,
        persona: Persona,
        attempts: u32,
        exhausted: bool,
        trace: Vec<FilterTraceEntry>,
    ) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            user_id: user_id.into(),
            persona,
            attempts,
            exhausted,
            trace,
            timestamp: Utc::now(),
        }
    }

    /// Every phrase matched across the trace, deduplicated and case-folded.
    pub fn matched_phrases(&self) -> BTreeSet<String> {
        self.trace
            .iter()
            .flat_map(|entry| entry.matched.iter().map(|m| m.to_lowercase()))
            .collect()
    }
}
