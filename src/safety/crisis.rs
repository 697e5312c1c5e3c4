//! Lexical crisis detection on user input.
//!
//! Matching is case-insensitive substring containment over a fixed phrase
//! lexicon after whitespace and apostrophe normalisation. All matches are
//! collected. A triggered scan is answered with a fixed template plus the
//! crisis-resource text for the resolved language; no generation call is
//! involved.

use std::collections::{BTreeMap, BTreeSet};

use serde::Serialize;

use crate::error::{MindGlowError, Result};
use crate::persona::CrisisRules;

/// Result of scanning one user message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CrisisScan {
    pub triggered: bool,
    pub matched: BTreeSet<String>,
}

impl CrisisScan {
    /// A scan that found nothing.
    pub fn clear() -> Self {
        Self::default()
    }
}

/// Compiled crisis lexicon and templates for one persona.
#[derive(Debug, Clone)]
pub struct CrisisLexicon {
    phrases: Vec<String>,
    templates: BTreeMap<String, String>,
}

impl CrisisLexicon {
    /// Normalise and validate a persona's crisis rules.
    pub fn from_rules(rules: &CrisisRules) -> Result<Self> {
        let phrases: Vec<String> = rules
            .phrases
            .iter()
            .map(|p| normalize(p))
            .filter(|p| !p.is_empty())
            .collect();
        if phrases.is_empty() {
            return Err(MindGlowError::Config(
                "crisis lexicon must contain at least one phrase".to_string(),
            ));
        }

        let templates: BTreeMap<String, String> = rules
            .templates
            .iter()
            .filter(|(_, text)| !text.trim().is_empty())
            .map(|(lang, text)| (lang.trim().to_lowercase(), text.trim().to_string()))
            .collect();
        if templates.is_empty() {
            return Err(MindGlowError::Config(
                "crisis rules must define at least one reply template".to_string(),
            ));
        }

        Ok(Self { phrases, templates })
    }

    /// Scan user text for every lexicon phrase it contains.
    pub fn scan(&self, user_text: &str) -> CrisisScan {
        let haystack = normalize(user_text);
        let matched: BTreeSet<String> = self
            .phrases
            .iter()
            .filter(|phrase| haystack.contains(phrase.as_str()))
            .cloned()
            .collect();
        CrisisScan {
            triggered: !matched.is_empty(),
            matched,
        }
    }

    /// Template for `language`, then `default_language`, then English, then any.
    pub fn template_for(&self, language: &str, default_language: &str) -> &str {
        [language, default_language, "en"]
            .iter()
            .find_map(|lang| self.templates.get(*lang))
            .or_else(|| self.templates.values().next())
            .map(String::as_str)
            .unwrap_or_default()
    }

    pub fn templates(&self) -> impl Iterator<Item = (&str, &str)> {
        self.templates.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

/// The deterministic reply used when a crisis is detected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrisisReply {
    /// Template followed by the resource text.
    pub reply: String,
    /// Resource text on its own, returned to the caller separately.
    pub resources: String,
}

impl CrisisReply {
    pub fn compose(template: &str, resources: &str) -> Self {
        let reply = if resources.is_empty() {
            template.to_string()
        } else {
            format!("{}\n\n{}", template, resources)
        };
        Self {
            reply,
            resources: resources.to_string(),
        }
    }
}

fn normalize(text: &str) -> String {
    text.replace('\u{2019}', "'")
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}
