//! Collaborator handles and the bounded call wrapper shared by the pipeline.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use crate::chat::summary::Summarizer;
use crate::embeddings::Embedder;
use crate::error::{BackendError, Collaborator, MindGlowError, Result};
use crate::events::SafetyEventSink;
use crate::language::LanguageDetector;
use crate::llms::TextGenerator;

/// The external capabilities a pipeline is wired to.
///
/// Handles are shared across requests and hold no request state.
#[derive(Debug, Clone)]
pub struct Collaborators {
    pub generator: Arc<dyn TextGenerator>,
    pub embedder: Arc<dyn Embedder>,
    pub detector: Arc<dyn LanguageDetector>,
    pub summarizer: Arc<dyn Summarizer>,
    pub events: Arc<dyn SafetyEventSink>,
}

/// Run one collaborator call under `timeout`, retrying once on a transient
/// failure. A second failure, or a non-transient one, becomes
/// [`MindGlowError::BackendUnavailable`].
pub async fn call_with_retry<T, F, Fut>(
    collaborator: Collaborator,
    timeout: Duration,
    mut call: F,
) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = std::result::Result<T, BackendError>>,
{
    let mut retried = false;
    loop {
        let err = match tokio::time::timeout(timeout, call()).await {
            Ok(Ok(value)) => return Ok(value),
            Ok(Err(err)) => err,
            Err(_) => BackendError::Timeout(timeout),
        };

        if err.is_transient() && !retried {
            log::warn!("{} call failed, retrying once: {}", collaborator, err);
            retried = true;
            continue;
        }

        log::error!("{} call failed: {}", collaborator, err);
        return Err(MindGlowError::unavailable(collaborator, &err));
    }
}
