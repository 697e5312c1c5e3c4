//! Language resolution for user input.
//!
//! [`LanguageRouter::resolve`] never fails: detector errors, timeouts, empty
//! input and low-confidence guesses all fall back to the request's default
//! language. The result records whether the code was detected, taken from
//! the user's preference, or defaulted, so the prompt only pins a language
//! it actually knows.

pub mod script;

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::BackendError;

pub use script::ScriptDetector;

/// A detector's best guess for a piece of text.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LanguageGuess {
    /// ISO 639-1 code, possibly with a region suffix.
    pub code: String,
    /// Confidence in `[0, 1]`.
    pub confidence: f64,
}

/// Where a resolved language code came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LanguageSource {
    /// A detector guess above the confidence threshold.
    Detected,
    /// The request's `preferred_language`.
    Preferred,
    /// The configured default.
    Default,
}

/// Output of [`LanguageRouter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedLanguage {
    pub code: String,
    pub source: LanguageSource,
}

impl ResolvedLanguage {
    pub fn detected(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            source: LanguageSource::Detected,
        }
    }

    /// True when nothing about the user picked this code.
    pub fn is_defaulted(&self) -> bool {
        self.source == LanguageSource::Default
    }
}

/// Capability: guess the language of a text.
#[async_trait]
pub trait LanguageDetector: Send + Sync + fmt::Debug {
    /// Guess the language. `Ok(None)` means the detector had nothing to go on.
    async fn detect(&self, text: &str) -> Result<Option<LanguageGuess>, BackendError>;

    /// Short name used in logs.
    fn name(&self) -> &str {
        "detector"
    }
}

/// Normalise a language tag to a lowercase ISO 639-1 style code.
///
/// Region suffixes (`en-US`, `pt_BR`) are stripped. Returns `None` for tags
/// that are empty or not alphabetic.
pub fn normalize_language_code(tag: &str) -> Option<String> {
    let primary = tag.trim().split(['-', '_']).next()?.to_ascii_lowercase();
    if primary.is_empty() || !primary.chars().all(|c| c.is_ascii_alphabetic()) {
        return None;
    }
    Some(primary)
}

/// Resolves the reply language for a message.
#[derive(Debug, Clone)]
pub struct LanguageRouter {
    detector: Arc<dyn LanguageDetector>,
    default_language: String,
    min_confidence: f64,
    timeout: Duration,
}

impl LanguageRouter {
    pub fn new(
        detector: Arc<dyn LanguageDetector>,
        default_language: &str,
        min_confidence: f64,
        timeout: Duration,
    ) -> Self {
        Self {
            detector,
            default_language: normalize_language_code(default_language)
                .unwrap_or_else(|| "en".to_string()),
            min_confidence,
            timeout,
        }
    }

    /// The default for a request: its preferred language when usable,
    /// otherwise the configured default.
    pub fn fallback_for(&self, preferred: Option<&str>) -> String {
        self.fallback(preferred).code
    }

    fn fallback(&self, preferred: Option<&str>) -> ResolvedLanguage {
        match preferred.and_then(normalize_language_code) {
            Some(code) => ResolvedLanguage {
                code,
                source: LanguageSource::Preferred,
            },
            None => ResolvedLanguage {
                code: self.default_language.clone(),
                source: LanguageSource::Default,
            },
        }
    }

    /// Resolve with the in-process [`ScriptDetector`] only. Never suspends,
    /// so callers can finish safety work before any cancellable call.
    pub fn resolve_by_script(&self, text: &str, preferred: Option<&str>) -> ResolvedLanguage {
        let fallback = self.fallback(preferred);
        if text.trim().is_empty() {
            return fallback;
        }
        self.accept(ScriptDetector::new().guess(text), fallback)
    }

    /// Resolve the language of `text`, never failing.
    pub async fn resolve(&self, text: &str, preferred: Option<&str>) -> ResolvedLanguage {
        let fallback = self.fallback(preferred);
        if text.trim().is_empty() {
            return fallback;
        }

        let guess = match tokio::time::timeout(self.timeout, self.detector.detect(text)).await {
            Ok(Ok(guess)) => guess,
            Ok(Err(e)) => {
                log::warn!(
                    "Language detector '{}' failed, using '{}': {}",
                    self.detector.name(),
                    fallback.code,
                    e
                );
                return fallback;
            }
            Err(_) => {
                log::warn!(
                    "Language detector '{}' timed out after {:?}, using '{}'",
                    self.detector.name(),
                    self.timeout,
                    fallback.code
                );
                return fallback;
            }
        };

        self.accept(guess, fallback)
    }

    fn accept(&self, guess: Option<LanguageGuess>, fallback: ResolvedLanguage) -> ResolvedLanguage {
        match guess {
            Some(g) if g.confidence >= self.min_confidence => normalize_language_code(&g.code)
                .map(ResolvedLanguage::detected)
                .unwrap_or(fallback),
            Some(g) => {
                log::debug!(
                    "Language guess '{}' below confidence threshold ({:.2} < {:.2})",
                    g.code,
                    g.confidence,
                    self.min_confidence
                );
                fallback
            }
            None => fallback,
        }
    }
}
