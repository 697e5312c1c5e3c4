//! Error types for the MindGlow service.
//!
//! Two layers: [`BackendError`] is what a collaborator (generator, embedder,
//! language detector, summarizer) reports for a single call, and
//! [`MindGlowError`] is what the pipeline surfaces to its caller.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// The external capability a call was made against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Collaborator {
    /// Text generation backend.
    Generator,
    /// Embedding backend.
    Embedder,
    /// Summary generation.
    Summarizer,
}

impl fmt::Display for Collaborator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Generator => "generation backend",
            Self::Embedder => "embedding backend",
            Self::Summarizer => "summary backend",
        };
        f.write_str(name)
    }
}

/// Failure of a single collaborator call.
#[derive(Debug, Clone, Error)]
pub enum BackendError {
    /// The request never produced a response (connection refused, reset, DNS).
    #[error("transport error: {0}")]
    Transport(String),

    /// The call did not complete within the configured timeout.
    #[error("timed out after {0:?}")]
    Timeout(std::time::Duration),

    /// The backend answered with a non-success status.
    #[error("backend returned {status}: {body}")]
    Status { status: u16, body: String },

    /// The backend answered but the payload could not be used.
    #[error("invalid backend response: {0}")]
    InvalidResponse(String),

    /// The collaborator is missing required configuration (e.g. an API key).
    #[error("not configured: {0}")]
    NotConfigured(String),
}

impl BackendError {
    /// Whether retrying the same call could plausibly succeed.
    ///
    /// Rate limiting and server-side failures count as transient; client
    /// errors, bad payloads and missing configuration do not.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(_) | Self::Timeout(_) => true,
            Self::Status { status, .. } => *status == 429 || (500..600).contains(status),
            Self::InvalidResponse(_) | Self::NotConfigured(_) => false,
        }
    }
}

impl From<reqwest::Error> for BackendError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Transport(format!("request timed out: {}", err))
        } else if err.is_decode() {
            Self::InvalidResponse(err.to_string())
        } else if let Some(status) = err.status() {
            Self::Status {
                status: status.as_u16(),
                body: err.to_string(),
            }
        } else {
            Self::Transport(err.to_string())
        }
    }
}

/// Errors surfaced by the chat pipeline and its supporting components.
#[derive(Debug, Error)]
pub enum MindGlowError {
    /// Malformed or missing request fields; nothing ran.
    #[error("validation error: {0}")]
    Validation(String),

    /// A stored exchange's embedding does not have the query's dimension.
    #[error(
        "embedding dimension mismatch for exchange '{exchange_id}': expected {expected}, found {found}"
    )]
    EmbeddingDimensionMismatch {
        exchange_id: String,
        expected: usize,
        found: usize,
    },

    /// A collaborator failed after its single transient retry.
    #[error("{collaborator} unavailable: {message}")]
    BackendUnavailable {
        collaborator: Collaborator,
        message: String,
    },

    /// Settings or persona rules could not be loaded.
    #[error("configuration error: {0}")]
    Config(String),

    /// YAML parsing failed.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// File I/O error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl MindGlowError {
    /// Stable snake_case identifier used in HTTP error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Validation(_) => "validation_error",
            Self::EmbeddingDimensionMismatch { .. } => "embedding_dimension_mismatch",
            Self::BackendUnavailable { .. } => "backend_unavailable",
            Self::Config(_) => "config_error",
            Self::Yaml(_) => "config_error",
            Self::Io(_) => "io_error",
        }
    }

    pub(crate) fn unavailable(collaborator: Collaborator, err: &BackendError) -> Self {
        Self::BackendUnavailable {
            collaborator,
            message: err.to_string(),
        }
    }
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, MindGlowError>;
