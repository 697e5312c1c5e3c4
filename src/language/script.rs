//! In-process language guess from Unicode script.

use std::collections::HashMap;

use async_trait::async_trait;

use super::{LanguageDetector, LanguageGuess};
use crate::error::BackendError;

/// Classifies text by the dominant Unicode script among its letters.
///
/// Latin script is shared by too many languages to name one, so text whose
/// letters are mostly Latin yields no guess and the router falls back. For
/// other scripts the confidence is the dominant script's share of all
/// classified letters (Latin included), so mixed text reports lower
/// confidence than single-script text.
#[derive(Debug, Clone, Copy, Default)]
pub struct ScriptDetector;

impl ScriptDetector {
    pub fn new() -> Self {
        Self
    }

    /// Synchronous guess; `None` when the text has no classifiable letters
    /// or is mostly Latin.
    pub fn guess(&self, text: &str) -> Option<LanguageGuess> {
        let mut counts: HashMap<&'static str, usize> = HashMap::new();
        let mut latin = 0usize;
        let mut total = 0usize;
        for script in text.chars().filter_map(classify) {
            match script {
                Script::Latin => latin += 1,
                Script::Language(code) => *counts.entry(code).or_insert(0) += 1,
            }
            total += 1;
        }

        // Ties resolve to the lexicographically smaller code so results are stable.
        let (code, count) = counts
            .into_iter()
            .max_by(|a, b| a.1.cmp(&b.1).then_with(|| b.0.cmp(a.0)))?;
        if count <= latin {
            return None;
        }
        Some(LanguageGuess {
            code: code.to_string(),
            confidence: count as f64 / total as f64,
        })
    }
}

#[async_trait]
impl LanguageDetector for ScriptDetector {
    async fn detect(&self, text: &str) -> Result<Option<LanguageGuess>, BackendError> {
        Ok(self.guess(text))
    }

    fn name(&self) -> &str {
        "script"
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Script {
    Latin,
    Language(&'static str),
}

fn classify(ch: char) -> Option<Script> {
    let latin_extended = matches!(ch as u32, 0x00C0..=0x024F) && ch.is_alphabetic();
    if ch.is_ascii_alphabetic() || latin_extended {
        return Some(Script::Latin);
    }
    script_language_tag(ch).map(Script::Language)
}

fn script_language_tag(ch: char) -> Option<&'static str> {
    match ch as u32 {
        // Greek
        0x0370..=0x03FF => Some("el"),
        // Cyrillic
        0x0400..=0x04FF => Some("ru"),
        // Hebrew
        0x0590..=0x05FF => Some("he"),
        // Arabic, Arabic Supplement, Arabic Extended-A
        0x0600..=0x06FF | 0x0750..=0x077F | 0x08A0..=0x08FF => {
            if ch.is_alphabetic() {
                Some("ar")
            } else {
                None
            }
        }
        // Devanagari
        0x0900..=0x097F => Some("hi"),
        // Hiragana + Katakana
        0x3040..=0x30FF => Some("ja"),
        // CJK Unified Ideographs (+ Extension A)
        0x4E00..=0x9FFF | 0x3400..=0x4DBF => Some("zh"),
        // Hangul syllables
        0xAC00..=0xD7AF => Some("ko"),
        _ => None,
    }
}
