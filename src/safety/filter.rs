//! Directive-language filter for generated replies.
//!
//! Each persona's banned-phrase table is compiled once into case-insensitive
//! regexes. Plain phrases match on word boundaries, so `"actually,"` does not
//! fire inside `"factually,"`; `anywhere` entries match as raw substrings and
//! `pattern` entries are regexes in their own right.

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::error::{MindGlowError, Result};

/// How a banned phrase is matched against a candidate reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// Phrase must start and end on a word boundary.
    #[default]
    Boundary,
    /// Phrase may appear anywhere, including inside longer words.
    Anywhere,
    /// The entry is a regular expression.
    Pattern,
}

/// One entry of a persona's banned-phrase table.
///
/// Deserializes from either a bare string (boundary mode) or a map with
/// `phrase` and `mode`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "BannedPhraseSpec")]
pub struct BannedPhrase {
    pub phrase: String,
    pub mode: MatchMode,
}

impl BannedPhrase {
    /// A boundary-matched phrase.
    pub fn boundary(phrase: impl Into<String>) -> Self {
        Self {
            phrase: phrase.into(),
            mode: MatchMode::Boundary,
        }
    }

    /// A regex entry.
    pub fn pattern(pattern: impl Into<String>) -> Self {
        Self {
            phrase: pattern.into(),
            mode: MatchMode::Pattern,
        }
    }

    fn to_regex_source(&self) -> String {
        match self.mode {
            MatchMode::Pattern => self.phrase.clone(),
            MatchMode::Anywhere => flexible_whitespace(&self.phrase),
            MatchMode::Boundary => {
                let trimmed = self.phrase.trim();
                let leading = trimmed.chars().next().is_some_and(is_word_char);
                let trailing = trimmed.chars().last().is_some_and(is_word_char);
                format!(
                    "{}{}{}",
                    if leading { r"\b" } else { "" },
                    flexible_whitespace(trimmed),
                    if trailing { r"\b" } else { "" },
                )
            }
        }
    }

    fn compile(&self) -> Result<Regex> {
        if self.phrase.trim().is_empty() {
            return Err(MindGlowError::Config("banned phrase must not be empty".to_string()));
        }
        RegexBuilder::new(&self.to_regex_source())
            .case_insensitive(true)
            .build()
            .map_err(|e| {
                MindGlowError::Config(format!("invalid banned phrase '{}': {}", self.phrase, e))
            })
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum BannedPhraseSpec {
    Plain(String),
    Detailed {
        phrase: String,
        #[serde(default)]
        mode: MatchMode,
    },
}

impl From<BannedPhraseSpec> for BannedPhrase {
    fn from(spec: BannedPhraseSpec) -> Self {
        match spec {
            BannedPhraseSpec::Plain(phrase) => Self::boundary(phrase),
            BannedPhraseSpec::Detailed { phrase, mode } => Self { phrase, mode },
        }
    }
}

fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Escape a literal phrase, letting any run of whitespace match any other.
fn flexible_whitespace(phrase: &str) -> String {
    phrase
        .split_whitespace()
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join(r"\s+")
}

/// Outcome of checking one candidate reply.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FilterVerdict {
    pub blocked: bool,
    /// Matched text as it appears in the candidate, in table order.
    pub matched: Vec<String>,
}

impl FilterVerdict {
    /// First matched phrase, if any.
    pub fn matched_phrase(&self) -> Option<&str> {
        self.matched.first().map(String::as_str)
    }
}

#[derive(Debug, Clone)]
struct CompiledPhrase {
    regex: Regex,
}

/// A compiled banned-phrase table.
#[derive(Debug, Clone)]
pub struct ResponseFilter {
    phrases: Vec<CompiledPhrase>,
}

impl ResponseFilter {
    /// Compile a table. Empty or invalid entries are configuration errors.
    pub fn new(phrases: &[BannedPhrase]) -> Result<Self> {
        let phrases = phrases
            .iter()
            .map(|p| p.compile().map(|regex| CompiledPhrase { regex }))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { phrases })
    }

    /// Number of compiled entries.
    pub fn len(&self) -> usize {
        self.phrases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.phrases.is_empty()
    }

    /// Scan a generated reply for banned phrases.
    ///
    /// Every entry is tested so the verdict lists all matches, not just the first.
    pub fn check(&self, candidate: &str) -> FilterVerdict {
        // Typographic apostrophes would otherwise slip past "don't"-style phrases.
        let normalized = candidate.replace('\u{2019}', "'");
        let matched: Vec<String> = self
            .phrases
            .iter()
            .filter_map(|p| p.regex.find(&normalized).map(|m| m.as_str().to_string()))
            .collect();
        FilterVerdict {
            blocked: !matched.is_empty(),
            matched,
        }
    }
}
