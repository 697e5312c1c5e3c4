//! Renders retrieved exchanges as a system turn for the generator.

use super::StoredExchange;
use crate::types::MessageRole;

/// Maximum characters of each exchange quoted in the context block.
pub const MAX_QUOTED_CHARS: usize = 300;

const MEMORY_CONTEXT_HEADER: &str =
    "[Relevant context from past conversations. Weave it in gently and never list it back.]";

/// Build the memory-context block, or an empty string when there are no hits.
pub fn build_memory_context<'a, I>(hits: I) -> String
where
    I: IntoIterator<Item = &'a StoredExchange>,
{
    let mut lines = Vec::new();
    for exchange in hits {
        let prefix = match exchange.role {
            MessageRole::User => "User shared",
            MessageRole::Assistant => "You responded",
        };
        let quoted: String = exchange.content.chars().take(MAX_QUOTED_CHARS).collect();
        lines.push(format!("- {}: \"{}\"", prefix, quoted));
    }
    if lines.is_empty() {
        return String::new();
    }
    lines.insert(0, MEMORY_CONTEXT_HEADER.to_string());
    lines.join("\n")
}
