//! Filter-and-regenerate loop for generated replies.
//!
//! ```text
//! Generating{0} -> Filtering -> Accepted
//!                            -> Regenerating -> Generating{n+1}   (n < max_retries)
//!                            -> Exhausted                          (n == max_retries)
//! ```
//!
//! At most `max_retries + 1` candidates are generated. A transient backend
//! failure is retried inside the same attempt by [`call_with_retry`] and
//! does not consume the filter budget.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::backend::call_with_retry;
use super::prompt::regeneration_directive;
use crate::error::{Collaborator, Result};
use crate::llms::{ChatMessage, GenerationRequest, TextGenerator};
use crate::persona::PersonaRuleSet;

/// A blocked candidate, kept for review.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterTraceEntry {
    /// Zero-based index of the attempt that produced the candidate.
    pub attempt_index: u32,
    pub candidate: String,
    /// Banned phrases found, as they appeared in the candidate.
    pub matched: Vec<String>,
}

/// Result of the loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryOutcome {
    pub reply: String,
    /// True when any candidate was blocked.
    pub filtered: bool,
    /// True when the persona fallback reply was used.
    pub exhausted: bool,
    pub trace: Vec<FilterTraceEntry>,
    /// Generator calls counted against the filter budget.
    pub attempts: u32,
}

#[derive(Debug)]
enum RetryState {
    Generating { attempt: u32 },
    Filtering { attempt: u32, candidate: String },
    Regenerating { attempt: u32, candidate: String, matched: Vec<String> },
    Accepted { attempt: u32, reply: String },
    Exhausted { attempt: u32 },
}

/// Drives one persona's generate/filter loop.
#[derive(Debug, Clone, Copy)]
pub struct RetryOrchestrator<'a> {
    generator: &'a dyn TextGenerator,
    rules: &'a PersonaRuleSet,
    max_retries: u32,
    timeout: Duration,
}

impl<'a> RetryOrchestrator<'a> {
    pub fn new(
        generator: &'a dyn TextGenerator,
        rules: &'a PersonaRuleSet,
        max_retries: u32,
        timeout: Duration,
    ) -> Self {
        Self {
            generator,
            rules,
            max_retries,
            timeout,
        }
    }

    /// Run the loop starting from `prompt`.
    ///
    /// Returns an error only when the generator is unavailable; an
    /// exhausted budget yields the persona fallback reply.
    pub async fn run(&self, prompt: GenerationRequest) -> Result<RetryOutcome> {
        let mut request = prompt;
        let mut trace: Vec<FilterTraceEntry> = Vec::new();
        let mut state = RetryState::Generating { attempt: 0 };

        loop {
            state = match state {
                RetryState::Generating { attempt } => {
                    log::debug!(
                        "Generating candidate {} for persona '{}' via {}/{}",
                        attempt,
                        self.rules.persona,
                        self.generator.provider(),
                        self.generator.model()
                    );
                    let generator = self.generator;
                    let current = &request;
                    let candidate = call_with_retry(Collaborator::Generator, self.timeout, move || {
                        generator.generate(current)
                    })
                    .await?;
                    RetryState::Filtering { attempt, candidate }
                }

                RetryState::Filtering { attempt, candidate } => {
                    let verdict = self.rules.filter().check(&candidate);
                    if !verdict.blocked {
                        RetryState::Accepted { attempt, reply: candidate }
                    } else {
                        log::debug!(
                            "Candidate {} for persona '{}' blocked on '{}' ({} match(es))",
                            attempt,
                            self.rules.persona,
                            verdict.matched_phrase().unwrap_or_default(),
                            verdict.matched.len()
                        );
                        trace.push(FilterTraceEntry {
                            attempt_index: attempt,
                            candidate: candidate.clone(),
                            matched: verdict.matched.clone(),
                        });
                        if attempt < self.max_retries {
                            RetryState::Regenerating {
                                attempt,
                                candidate,
                                matched: verdict.matched,
                            }
                        } else {
                            RetryState::Exhausted { attempt }
                        }
                    }
                }

                RetryState::Regenerating { attempt, candidate, matched } => {
                    request.messages.push(ChatMessage::assistant(candidate));
                    request.messages.push(ChatMessage::system(regeneration_directive(
                        &self.rules.regeneration_hint,
                        &matched,
                    )));
                    RetryState::Generating { attempt: attempt + 1 }
                }

                RetryState::Accepted { attempt, reply } => {
                    return Ok(RetryOutcome {
                        reply,
                        filtered: !trace.is_empty(),
                        exhausted: false,
                        trace,
                        attempts: attempt + 1,
                    });
                }

                RetryState::Exhausted { attempt } => {
                    log::warn!(
                        "All {} candidates for persona '{}' were blocked; using fallback reply",
                        attempt + 1,
                        self.rules.persona
                    );
                    return Ok(RetryOutcome {
                        reply: self.rules.fallback_reply.clone(),
                        filtered: true,
                        exhausted: true,
                        trace,
                        attempts: attempt + 1,
                    });
                }
            };
        }
    }
}
