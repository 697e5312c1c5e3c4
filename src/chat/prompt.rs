//! Prompt assembly for a chat turn.
//!
//! Order: persona system prompt, past-session summaries, memory context,
//! language directive, trimmed history, current user message.

use crate::language::ResolvedLanguage;
use crate::llms::ChatMessage;
use crate::persona::PersonaRuleSet;
use crate::types::ChatRequest;

/// Number of most recent past-session summaries injected.
pub const MAX_PAST_SUMMARIES: usize = 3;

/// Inputs that vary per turn beyond the request itself.
#[derive(Debug, Clone, Copy)]
pub struct PromptContext<'a> {
    pub language: &'a ResolvedLanguage,
    /// Rendered memory block; empty when nothing was retrieved.
    pub memory_context: &'a str,
    pub max_history: usize,
}

/// Build the generator messages for `request` under `rules`.
pub fn assemble_prompt(
    rules: &PersonaRuleSet,
    request: &ChatRequest,
    context: PromptContext<'_>,
) -> Vec<ChatMessage> {
    let mut messages = vec![ChatMessage::system(rules.system_prompt.as_str())];

    if let Some(block) = past_summaries_block(&request.past_summaries) {
        messages.push(ChatMessage::system(block));
    }

    if !context.memory_context.trim().is_empty() {
        messages.push(ChatMessage::system(context.memory_context));
    }

    messages.push(ChatMessage::system(language_directive(context.language)));

    for message in request.conversation_history.recent(context.max_history) {
        messages.push(ChatMessage {
            role: message.role.into(),
            content: message.content.clone(),
        });
    }

    messages.push(ChatMessage::user(request.message.as_str()));
    messages
}

fn past_summaries_block(summaries: &[String]) -> Option<String> {
    let recent: Vec<&str> = summaries
        .iter()
        .map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .collect();
    let start = recent.len().saturating_sub(MAX_PAST_SUMMARIES);
    let recent = &recent[start..];
    if recent.is_empty() {
        return None;
    }

    let body = recent
        .iter()
        .enumerate()
        .map(|(i, s)| format!("[Past session reflection {}]: {}", i + 1, s))
        .collect::<Vec<_>>()
        .join("\n\n");
    Some(format!(
        "[Past session summaries. Weave them in gently and never list them.]\n{}",
        body
    ))
}

/// System turn steering the reply language.
///
/// A detected or preferred code is pinned. A defaulted code says nothing
/// about the user, so the reply mirrors whatever language they wrote in.
pub fn language_directive(language: &ResolvedLanguage) -> String {
    if language.is_defaulted() {
        return "Respond in the same language the user is writing in.".to_string();
    }
    format!(
        "The user is writing in '{}'. Respond only in that language.",
        language.code
    )
}

/// System turn sent after a blocked candidate.
pub fn regeneration_directive(hint: &str, matched: &[String]) -> String {
    if matched.is_empty() {
        return hint.to_string();
    }
    format!("{}\nPhrases that were not allowed: {}.", hint, matched.join(", "))
}
