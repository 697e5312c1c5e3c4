//! Deterministic stand-in collaborators for unit tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::chat::{ChatPipeline, Collaborators, Summarizer};
use crate::config::Settings;
use crate::embeddings::Embedder;
use crate::error::BackendError;
use crate::events::{CrisisEvent, FilterEvent, SafetyEventSink};
use crate::language::{LanguageDetector, LanguageGuess, ScriptDetector};
use crate::llms::{GenerationRequest, TextGenerator};
use crate::memory::EmbeddingVector;
use crate::persona::PersonaTable;
use crate::types::Message;

// ---------------------------------------------------------------------------
// Generator
// ---------------------------------------------------------------------------

/// Returns scripted results in order, then a neutral question forever
/// (or never returns, when stalling).
#[derive(Debug, Default)]
pub struct ScriptedGenerator {
    script: Mutex<VecDeque<Result<String, BackendError>>>,
    requests: Mutex<Vec<GenerationRequest>>,
    calls: AtomicUsize,
    stall_when_empty: bool,
}

impl ScriptedGenerator {
    pub const DEFAULT_REPLY: &'static str = "What is on your mind?";

    pub fn new(script: Vec<Result<String, BackendError>>) -> Self {
        Self {
            script: Mutex::new(script.into()),
            ..Self::default()
        }
    }

    pub fn replies(replies: &[&str]) -> Self {
        Self::new(replies.iter().map(|r| Ok(r.to_string())).collect())
    }

    /// Plays `replies`, then hangs on every further call.
    pub fn stalling(replies: &[&str]) -> Self {
        Self {
            stall_when_empty: true,
            ..Self::replies(replies)
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn requests(&self) -> Vec<GenerationRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl TextGenerator for ScriptedGenerator {
    async fn generate(&self, request: &GenerationRequest) -> Result<String, BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().unwrap().push(request.clone());
        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(result) => result,
            None if self.stall_when_empty => std::future::pending().await,
            None => Ok(Self::DEFAULT_REPLY.to_string()),
        }
    }

    fn model(&self) -> &str {
        "scripted"
    }

    fn provider(&self) -> &str {
        "test"
    }
}

// ---------------------------------------------------------------------------
// Embedder
// ---------------------------------------------------------------------------

/// Embeds every text as the same vector, always fails, or never returns.
#[derive(Debug)]
pub struct StubEmbedder {
    vector: EmbeddingVector,
    failure: Option<BackendError>,
    stall: bool,
    inputs: Mutex<Vec<Vec<String>>>,
}

impl StubEmbedder {
    pub fn constant(vector: &[f32]) -> Self {
        Self {
            vector: vector.to_vec(),
            failure: None,
            stall: false,
            inputs: Mutex::new(Vec::new()),
        }
    }

    pub fn stalling() -> Self {
        Self {
            stall: true,
            ..Self::constant(&TestRig::EMBEDDING)
        }
    }

    pub fn failing(error: BackendError) -> Self {
        Self {
            vector: Vec::new(),
            failure: Some(error),
            stall: false,
            inputs: Mutex::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.inputs.lock().unwrap().len()
    }

    /// Texts passed to each call, in call order.
    pub fn inputs(&self) -> Vec<Vec<String>> {
        self.inputs.lock().unwrap().clone()
    }
}

#[async_trait]
impl Embedder for StubEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<EmbeddingVector>, BackendError> {
        self.inputs.lock().unwrap().push(texts.to_vec());
        if self.stall {
            std::future::pending::<()>().await;
        }
        match &self.failure {
            Some(err) => Err(err.clone()),
            None => Ok(texts.iter().map(|_| self.vector.clone()).collect()),
        }
    }

    fn model(&self) -> &str {
        "stub"
    }
}

// ---------------------------------------------------------------------------
// Language detectors
// ---------------------------------------------------------------------------

/// Always returns the same guess.
#[derive(Debug)]
pub struct FixedDetector {
    guess: LanguageGuess,
    calls: AtomicUsize,
}

impl FixedDetector {
    pub fn new(code: &str, confidence: f64) -> Self {
        Self {
            guess: LanguageGuess {
                code: code.to_string(),
                confidence,
            },
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LanguageDetector for FixedDetector {
    async fn detect(&self, _text: &str) -> Result<Option<LanguageGuess>, BackendError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(Some(self.guess.clone()))
    }
}

#[derive(Debug)]
pub struct FailingDetector;

#[async_trait]
impl LanguageDetector for FailingDetector {
    async fn detect(&self, _text: &str) -> Result<Option<LanguageGuess>, BackendError> {
        Err(BackendError::Transport("detector offline".into()))
    }
}

/// Sleeps longer than any test timeout.
#[derive(Debug)]
pub struct SlowDetector(pub Duration);

#[async_trait]
impl LanguageDetector for SlowDetector {
    async fn detect(&self, _text: &str) -> Result<Option<LanguageGuess>, BackendError> {
        tokio::time::sleep(self.0).await;
        Ok(None)
    }
}

// ---------------------------------------------------------------------------
// Summarizer and event sink
// ---------------------------------------------------------------------------

#[derive(Debug, Default)]
pub struct StubSummarizer {
    personas: Mutex<Vec<String>>,
}

impl StubSummarizer {
    pub fn calls(&self) -> usize {
        self.personas.lock().unwrap().len()
    }

    /// Persona names passed to each call, in call order.
    pub fn personas(&self) -> Vec<String> {
        self.personas.lock().unwrap().clone()
    }
}

#[async_trait]
impl Summarizer for StubSummarizer {
    async fn summarize_exchange(
        &self,
        persona: &str,
        _user_message: &str,
        _reply: &str,
        _language: &str,
    ) -> Result<String, BackendError> {
        self.personas.lock().unwrap().push(persona.to_string());
        Ok(TestRig::SUMMARY.to_string())
    }

    async fn summarize_session(
        &self,
        persona: &str,
        _messages: &[Message],
        _language: &str,
    ) -> Result<String, BackendError> {
        self.personas.lock().unwrap().push(persona.to_string());
        Ok(TestRig::SUMMARY.to_string())
    }
}

/// Keeps every event it receives.
#[derive(Debug, Default)]
pub struct RecordingSink {
    crisis: Mutex<Vec<CrisisEvent>>,
    filtered: Mutex<Vec<FilterEvent>>,
}

impl RecordingSink {
    pub fn crisis_events(&self) -> Vec<CrisisEvent> {
        self.crisis.lock().unwrap().clone()
    }

    pub fn filter_events(&self) -> Vec<FilterEvent> {
        self.filtered.lock().unwrap().clone()
    }
}

impl SafetyEventSink for RecordingSink {
    fn crisis_detected(&self, event: &CrisisEvent) {
        self.crisis.lock().unwrap().push(event.clone());
    }

    fn response_filtered(&self, event: &FilterEvent) {
        self.filtered.lock().unwrap().push(event.clone());
    }
}

// ---------------------------------------------------------------------------
// Rig
// ---------------------------------------------------------------------------

/// A pipeline wired to inspectable stand-ins and the embedded persona rules.
#[derive(Debug)]
pub struct TestRig {
    pub generator: Arc<ScriptedGenerator>,
    pub embedder: Arc<StubEmbedder>,
    pub summarizer: Arc<StubSummarizer>,
    pub sink: Arc<RecordingSink>,
    pub personas: Arc<PersonaTable>,
}

impl TestRig {
    pub const EMBEDDING: [f32; 3] = [1.0, 0.0, 0.0];
    pub const SUMMARY: &'static str = "A gentle exploration of the day.";

    pub fn new(replies: &[&str]) -> Self {
        Self::build(
            ScriptedGenerator::replies(replies),
            StubEmbedder::constant(&Self::EMBEDDING),
        )
    }

    pub fn with_generator_results(script: Vec<Result<String, BackendError>>) -> Self {
        Self::build(
            ScriptedGenerator::new(script),
            StubEmbedder::constant(&Self::EMBEDDING),
        )
    }

    pub fn with_failing_embedder(replies: &[&str]) -> Self {
        Self::build(
            ScriptedGenerator::replies(replies),
            StubEmbedder::failing(BackendError::Status {
                status: 400,
                body: "bad input".into(),
            }),
        )
    }

    pub fn build(generator: ScriptedGenerator, embedder: StubEmbedder) -> Self {
        Self {
            generator: Arc::new(generator),
            embedder: Arc::new(embedder),
            summarizer: Arc::new(StubSummarizer::default()),
            sink: Arc::new(RecordingSink::default()),
            personas: Arc::new(PersonaTable::embedded().unwrap()),
        }
    }

    pub fn settings() -> Settings {
        Settings {
            openai_api_key: "sk-test".into(),
            backend_timeout: Duration::from_millis(500),
            ..Settings::default()
        }
    }

    pub fn collaborators(&self) -> Collaborators {
        self.collaborators_with_detector(Arc::new(ScriptDetector::new()))
    }

    pub fn collaborators_with_detector(&self, detector: Arc<dyn LanguageDetector>) -> Collaborators {
        Collaborators {
            generator: self.generator.clone(),
            embedder: self.embedder.clone(),
            detector,
            summarizer: self.summarizer.clone(),
            events: self.sink.clone(),
        }
    }

    pub fn pipeline(&self) -> ChatPipeline {
        self.pipeline_with(Self::settings())
    }

    pub fn pipeline_with(&self, settings: Settings) -> ChatPipeline {
        ChatPipeline::new(settings, self.personas.clone(), self.collaborators())
    }

    pub fn pipeline_with_detector(&self, detector: Arc<dyn LanguageDetector>) -> ChatPipeline {
        ChatPipeline::new(
            Self::settings(),
            self.personas.clone(),
            self.collaborators_with_detector(detector),
        )
    }
}
