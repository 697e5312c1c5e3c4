//! Safety event side channel.
//!
//! The pipeline reports crisis detections and filtered responses to a
//! [`SafetyEventSink`] so a review process can pick them up. Emission is
//! fire-and-forget: a sink must not block and cannot fail the request.

pub mod types;

use std::fmt;

pub use types::{CrisisEvent, FilterEvent};

/// Log target for safety records.
pub const SAFETY_LOG_TARGET: &str = "mindglow::safety";

/// Receiver for safety events.
pub trait SafetyEventSink: Send + Sync + fmt::Debug {
    fn crisis_detected(&self, event: &CrisisEvent);

    fn response_filtered(&self, event: &FilterEvent);
}

/// Writes safety events as structured `tracing` records.
///
/// Message and candidate text are never written; only identifiers, matched
/// phrases and counts.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingEventSink;

impl SafetyEventSink for TracingEventSink {
    fn crisis_detected(&self, event: &CrisisEvent) {
        let indicators: Vec<&str> = event.matched_indicators.iter().map(String::as_str).collect();
        tracing::warn!(
            target: SAFETY_LOG_TARGET,
            event_id = %event.event_id,
            user_id = %event.user_id,
            persona = %event.persona,
            language = %event.language,
            indicators = ?indicators,
            timestamp = %event.timestamp.to_rfc3339(),
            "crisis indicators detected"
        );
    }

    fn response_filtered(&self, event: &FilterEvent) {
        let matched: Vec<String> = event.matched_phrases().into_iter().collect();
        tracing::info!(
            target: SAFETY_LOG_TARGET,
            event_id = %event.event_id,
            user_id = %event.user_id,
            persona = %event.persona,
            attempts = event.attempts,
            exhausted = event.exhausted,
            blocked_candidates = event.trace.len(),
            matched = ?matched,
            timestamp = %event.timestamp.to_rfc3339(),
            "generated response filtered"
        );
    }
}
