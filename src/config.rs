//! Service configuration.
//!
//! Values come from environment variables with the defaults below. Parsing
//! goes through [`Settings::from_lookup`] so the same code path is usable
//! without touching the process environment.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::error::{MindGlowError, Result};

/// Runtime settings shared by the pipeline and the collaborators.
#[derive(Debug, Clone)]
pub struct Settings {
    /// API key for the OpenAI-compatible backend.
    pub openai_api_key: String,
    /// Base URL of the OpenAI-compatible API.
    pub openai_base_url: String,
    /// Chat model used for replies and summaries.
    pub openai_model: String,
    /// Embedding model.
    pub embedding_model: String,
    /// Sampling temperature for replies.
    pub temperature: f64,
    /// Token cap for replies.
    pub max_tokens: u32,
    /// Number of most recent history messages forwarded to the generator.
    pub max_context_messages: usize,
    /// Default minimum cosine similarity for memory retrieval.
    pub similarity_threshold: f64,
    /// Default number of memory hits injected into the prompt.
    pub memory_top_k: i64,
    /// Largest `top_k` accepted from a caller.
    pub max_top_k: i64,
    /// Regenerations allowed after a blocked candidate.
    pub max_filter_retries: u32,
    /// Upper bound on any single collaborator call.
    pub backend_timeout: Duration,
    /// Language used when detection is skipped or inconclusive.
    pub default_language: String,
    /// Detector confidence below which the default language is used.
    pub min_language_confidence: f64,
    /// Whether `/chat` asks for a per-exchange summary.
    pub exchange_summaries: bool,
    /// Optional YAML file replacing the embedded persona rules.
    pub persona_rules_path: Option<PathBuf>,
    /// HTTP port.
    pub port: u16,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            openai_api_key: String::new(),
            openai_base_url: "https://api.openai.com/v1".into(),
            openai_model: "gpt-4o".into(),
            embedding_model: "text-embedding-3-small".into(),
            temperature: 0.7,
            max_tokens: 500,
            max_context_messages: 20,
            similarity_threshold: 0.75,
            memory_top_k: 5,
            max_top_k: 50,
            max_filter_retries: 2,
            backend_timeout: Duration::from_secs(30),
            default_language: "en".into(),
            min_language_confidence: 0.5,
            exchange_summaries: true,
            persona_rules_path: None,
            port: 8000,
        }
    }
}

impl Settings {
    /// Load from environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from an arbitrary key lookup.
    ///
    /// `OPENAI_API_KEY` is required; every other key falls back to its default.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = Self::default();

        let openai_api_key = get("OPENAI_API_KEY").ok_or_else(|| {
            MindGlowError::Config("OPENAI_API_KEY must be set".to_string())
        })?;

        let settings = Self {
            openai_api_key,
            openai_base_url: get("OPENAI_BASE_URL")
                .map(|url| url.trim_end_matches('/').to_string())
                .unwrap_or(defaults.openai_base_url),
            openai_model: get("OPENAI_MODEL").unwrap_or(defaults.openai_model),
            embedding_model: get("EMBEDDING_MODEL").unwrap_or(defaults.embedding_model),
            temperature: parse_or(&get, "GENERATION_TEMPERATURE", defaults.temperature)?,
            max_tokens: parse_or(&get, "GENERATION_MAX_TOKENS", defaults.max_tokens)?,
            max_context_messages: parse_or(
                &get,
                "MAX_CONTEXT_MESSAGES",
                defaults.max_context_messages,
            )?,
            similarity_threshold: parse_or(
                &get,
                "SIMILARITY_THRESHOLD",
                defaults.similarity_threshold,
            )?,
            memory_top_k: parse_or(&get, "MEMORY_TOP_K", defaults.memory_top_k)?,
            max_top_k: parse_or(&get, "MAX_TOP_K", defaults.max_top_k)?,
            max_filter_retries: parse_or(&get, "MAX_FILTER_RETRIES", defaults.max_filter_retries)?,
            backend_timeout: Duration::from_secs(parse_or(
                &get,
                "BACKEND_TIMEOUT_SECS",
                defaults.backend_timeout.as_secs(),
            )?),
            default_language: get("DEFAULT_LANGUAGE")
                .map(|lang| lang.to_lowercase())
                .unwrap_or(defaults.default_language),
            min_language_confidence: parse_or(
                &get,
                "MIN_LANGUAGE_CONFIDENCE",
                defaults.min_language_confidence,
            )?,
            exchange_summaries: parse_or(&get, "EXCHANGE_SUMMARIES", defaults.exchange_summaries)?,
            persona_rules_path: get("PERSONA_RULES_PATH").map(PathBuf::from),
            port: parse_or(&get, "PORT", defaults.port)?,
        };

        if settings.backend_timeout.is_zero() {
            return Err(MindGlowError::Config(
                "BACKEND_TIMEOUT_SECS must be greater than zero".to_string(),
            ));
        }

        Ok(settings)
    }

    /// Address the HTTP server binds to.
    pub fn bind_addr(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}

fn parse_or<T, G>(get: &G, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    match get(key) {
        Some(raw) => raw
            .parse()
            .map_err(|e| MindGlowError::Config(format!("invalid value for {}: '{}' ({})", key, raw, e))),
        None => Ok(default),
    }
}
