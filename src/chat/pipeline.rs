//! The chat pipeline behind every endpoint.
//!
//! A turn runs in strict sequence: validate, resolve language, crisis scan
//! (which short-circuits everything after it), memory retrieval, the
//! generate/filter loop, embeddings, exchange summary, safety events.

use std::sync::Arc;

use super::backend::{call_with_retry, Collaborators};
use super::prompt::{assemble_prompt, PromptContext};
use super::retry::{RetryOrchestrator, RetryOutcome};
use crate::config::Settings;
use crate::error::{BackendError, Collaborator, MindGlowError, Result};
use crate::events::{CrisisEvent, FilterEvent};
use crate::language::LanguageRouter;
use crate::llms::GenerationRequest;
use crate::memory::{self, build_memory_context, EmbeddingVector, MemoryQuery};
use crate::persona::{PersonaRuleSet, PersonaTable};
use crate::safety::CrisisReply;
use crate::types::{
    ChatRequest, ChatResponse, EmbedRequest, EmbedResponse, SearchHit, SemanticSearchRequest,
    SemanticSearchResponse, SummaryRequest, SummaryResponse,
};

// ============================================================================
// ChatPipeline
// ============================================================================

/// Stateless orchestrator shared by all requests.
#[derive(Debug, Clone)]
pub struct ChatPipeline {
    settings: Arc<Settings>,
    personas: Arc<PersonaTable>,
    collaborators: Collaborators,
    language: LanguageRouter,
}

/// Memory retrieval output for one turn.
struct RetrievedMemory {
    context: String,
    query_embedding: Option<EmbeddingVector>,
}

impl ChatPipeline {
    pub fn new(settings: Settings, personas: Arc<PersonaTable>, collaborators: Collaborators) -> Self {
        let language = LanguageRouter::new(
            collaborators.detector.clone(),
            &settings.default_language,
            settings.min_language_confidence,
            settings.backend_timeout,
        );
        Self {
            settings: Arc::new(settings),
            personas,
            collaborators,
            language,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn personas(&self) -> &PersonaTable {
        &self.personas
    }

    // ------------------------------------------------------------------------
    // Chat
    // ------------------------------------------------------------------------

    /// Answer one user turn, optionally with memory retrieval.
    pub async fn respond(&self, request: ChatRequest, memory: Option<MemoryQuery>) -> Result<ChatResponse> {
        request.validate()?;
        if let Some(query) = &memory {
            self.validate_top_k(query.top_k)?;
        }

        let rules = self.personas.get(request.chatbot);
        let preferred = request.user_info.preferred_language.as_deref();

        // Nothing on the crisis path may wait on a collaborator before the
        // safety reply exists and the event is out.
        let scan = rules.scan_crisis(&request.message);
        if scan.triggered {
            let language = self.language.resolve_by_script(&request.message, preferred);
            let fallback_language = self.language.fallback_for(preferred);
            let template = rules
                .crisis_template(&language.code, &fallback_language)
                .unwrap_or(rules.fallback_reply.as_str());
            let resources = self.personas.crisis_resources(&language.code, &fallback_language);
            let crisis = CrisisReply::compose(template, resources);
            self.collaborators.events.crisis_detected(&CrisisEvent::new(
                request.user_info.user_id.as_str(),
                request.chatbot,
                scan.matched,
                language.code.as_str(),
            ));
            return Ok(self.crisis_response(&request, crisis, language.code).await);
        }

        let language = self.language.resolve(&request.message, preferred).await;

        let retrieved = match memory {
            Some(query) => self.retrieve_memory(&request.message, query).await?,
            None => RetrievedMemory {
                context: String::new(),
                query_embedding: None,
            },
        };

        let prompt = assemble_prompt(
            rules,
            &request,
            PromptContext {
                language: &language,
                memory_context: &retrieved.context,
                max_history: self.settings.max_context_messages,
            },
        );
        let outcome = RetryOrchestrator::new(
            self.collaborators.generator.as_ref(),
            rules,
            self.settings.max_filter_retries,
            self.settings.backend_timeout,
        )
        .run(GenerationRequest::new(
            prompt,
            self.settings.temperature,
            self.settings.max_tokens,
        ))
        .await?;

        let (embedding, reply_embedding) = self
            .embed_exchange(&request.message, &outcome.reply, retrieved.query_embedding)
            .await?;

        let summary = if self.settings.exchange_summaries {
            Some(
                self.summarize_exchange(rules, &request.message, &outcome.reply, &language.code)
                    .await?,
            )
        } else {
            None
        };

        self.report_filtering(&request, &outcome);

        let RetryOutcome { reply, filtered, trace, .. } = outcome;
        Ok(ChatResponse {
            reply,
            detected_language: language.code,
            crisis_detected: false,
            crisis_resources: None,
            response_was_filtered: filtered,
            filter_log: if trace.is_empty() { None } else { Some(trace) },
            embedding: Some(embedding),
            reply_embedding: Some(reply_embedding),
            summary,
        })
    }

    async fn crisis_response(&self, request: &ChatRequest, crisis: CrisisReply, language: String) -> ChatResponse {
        // The safety reply is already fixed; embeddings are best effort here.
        let texts = vec![request.message.clone(), crisis.reply.clone()];
        let (embedding, reply_embedding) = match self.embed_texts(&texts).await {
            Ok(mut vectors) => {
                let reply_embedding = vectors.pop();
                (vectors.pop(), reply_embedding)
            }
            Err(e) => {
                log::warn!("Embedding failed on crisis path, returning no embeddings: {}", e);
                (None, None)
            }
        };

        ChatResponse {
            reply: crisis.reply,
            detected_language: language,
            crisis_detected: true,
            crisis_resources: Some(crisis.resources),
            response_was_filtered: false,
            filter_log: None,
            embedding,
            reply_embedding,
            summary: None,
        }
    }

    async fn retrieve_memory(&self, message: &str, query: MemoryQuery) -> Result<RetrievedMemory> {
        if query.stored.is_empty() {
            return Ok(RetrievedMemory {
                context: String::new(),
                query_embedding: None,
            });
        }

        let query_embedding = self.embed_one(message).await?;
        let hits = memory::search(
            &query_embedding,
            &query.stored,
            query.top_k.unwrap_or(self.settings.memory_top_k),
            query.threshold.unwrap_or(self.settings.similarity_threshold),
        )?;
        log::debug!(
            "Memory retrieval: {} of {} stored exchanges relevant",
            hits.len(),
            query.stored.len()
        );

        let context = build_memory_context(hits.iter().map(|hit| &query.stored[hit.index]));
        Ok(RetrievedMemory {
            context,
            query_embedding: Some(query_embedding),
        })
    }

    /// Embeddings for the user message and the reply, reusing the memory
    /// query embedding when one was computed.
    async fn embed_exchange(
        &self,
        message: &str,
        reply: &str,
        query_embedding: Option<EmbeddingVector>,
    ) -> Result<(EmbeddingVector, EmbeddingVector)> {
        match query_embedding {
            Some(message_embedding) => Ok((message_embedding, self.embed_one(reply).await?)),
            None => {
                let mut vectors = self
                    .embed_texts(&[message.to_string(), reply.to_string()])
                    .await?;
                let reply_embedding = vectors.pop();
                match (vectors.pop(), reply_embedding) {
                    (Some(m), Some(r)) => Ok((m, r)),
                    _ => Err(MindGlowError::unavailable(
                        Collaborator::Embedder,
                        &BackendError::InvalidResponse("missing embeddings".to_string()),
                    )),
                }
            }
        }
    }

    async fn summarize_exchange(
        &self,
        rules: &PersonaRuleSet,
        message: &str,
        reply: &str,
        language: &str,
    ) -> Result<String> {
        let summarizer = self.collaborators.summarizer.as_ref();
        let persona = rules.display_name.as_str();
        call_with_retry(Collaborator::Summarizer, self.settings.backend_timeout, move || {
            summarizer.summarize_exchange(persona, message, reply, language)
        })
        .await
    }

    fn report_filtering(&self, request: &ChatRequest, outcome: &RetryOutcome) {
        if outcome.trace.is_empty() {
            return;
        }
        self.collaborators.events.response_filtered(&FilterEvent::new(
            request.user_info.user_id.as_str(),
            request.chatbot,
            outcome.attempts,
            outcome.exhausted,
            outcome.trace.clone(),
        ));
    }

    // ------------------------------------------------------------------------
    // Search, summary, embed
    // ------------------------------------------------------------------------

    /// Rank stored exchanges against a query text.
    pub async fn semantic_search(&self, request: SemanticSearchRequest) -> Result<SemanticSearchResponse> {
        if request.query.trim().is_empty() {
            return Err(MindGlowError::Validation("query must not be empty".to_string()));
        }
        self.validate_top_k(request.top_k)?;

        let query_embedding = self.embed_one(&request.query).await?;
        let results = memory::search(
            &query_embedding,
            &request.stored_messages,
            request.top_k.unwrap_or(self.settings.memory_top_k),
            request.threshold.unwrap_or(self.settings.similarity_threshold),
        )?;

        let results = results
            .iter()
            .map(|r| SearchHit::from_result(r, &request.stored_messages[r.index]))
            .collect();
        Ok(SemanticSearchResponse {
            results,
            query_embedding,
        })
    }

    /// Neutral summary of a whole session.
    pub async fn summarize(&self, request: SummaryRequest) -> Result<SummaryResponse> {
        let first = request
            .messages
            .first()
            .ok_or_else(|| MindGlowError::Validation("no messages to summarize".to_string()))?;
        let language = self.language.resolve(&first.content, None).await.code;

        let summarizer = self.collaborators.summarizer.as_ref();
        let persona = self.personas.get(request.chatbot).display_name.as_str();
        let messages = request.messages.as_slice();
        let lang = language.as_str();
        let summary = call_with_retry(Collaborator::Summarizer, self.settings.backend_timeout, move || {
            summarizer.summarize_session(persona, messages, lang)
        })
        .await?;

        Ok(SummaryResponse {
            summary,
            detected_language: language,
        })
    }

    /// Embed a single text.
    pub async fn embed(&self, request: EmbedRequest) -> Result<EmbedResponse> {
        if request.text.trim().is_empty() {
            return Err(MindGlowError::Validation("text must not be empty".to_string()));
        }
        Ok(EmbedResponse {
            embedding: self.embed_one(&request.text).await?,
        })
    }

    // ------------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------------

    fn validate_top_k(&self, top_k: Option<i64>) -> Result<()> {
        match top_k {
            Some(k) if k > self.settings.max_top_k => Err(MindGlowError::Validation(format!(
                "top_k must be at most {}, got {}",
                self.settings.max_top_k, k
            ))),
            _ => Ok(()),
        }
    }

    async fn embed_texts(&self, texts: &[String]) -> Result<Vec<EmbeddingVector>> {
        let embedder = self.collaborators.embedder.as_ref();
        log::debug!("Embedding {} text(s) with {}", texts.len(), embedder.model());
        let vectors = call_with_retry(Collaborator::Embedder, self.settings.backend_timeout, move || {
            embedder.embed(texts)
        })
        .await?;
        if vectors.len() != texts.len() {
            return Err(MindGlowError::unavailable(
                Collaborator::Embedder,
                &BackendError::InvalidResponse(format!(
                    "expected {} embeddings, got {}",
                    texts.len(),
                    vectors.len()
                )),
            ));
        }
        Ok(vectors)
    }

    async fn embed_one(&self, text: &str) -> Result<EmbeddingVector> {
        let mut vectors = self.embed_texts(&[text.to_string()]).await?;
        vectors.pop().ok_or_else(|| {
            MindGlowError::unavailable(
                Collaborator::Embedder,
                &BackendError::InvalidResponse("empty embeddings response".to_string()),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    use crate::memory::StoredExchange;
    use crate::persona::Persona;
    use crate::test_support::{ScriptedGenerator, SlowDetector, StubEmbedder, TestRig};
    use crate::types::MessageRole;

    fn reflect(message: &str) -> ChatRequest {
        ChatRequest::new(Persona::Reflect, "user-1", message)
    }

    #[tokio::test]
    async fn test_clean_reply_flow() {
        let rig = TestRig::new(&["What feels most present right now?"]);
        let response = rig.pipeline().respond(reflect("I had a long day"), None).await.unwrap();

        assert_eq!(response.reply, "What feels most present right now?");
        assert_eq!(response.detected_language, "en");
        assert!(!response.crisis_detected);
        assert!(!response.response_was_filtered);
        assert!(response.filter_log.is_none());
        assert!(response.embedding.is_some());
        assert!(response.reply_embedding.is_some());
        assert_eq!(response.summary.as_deref(), Some(TestRig::SUMMARY));
        assert_eq!(rig.embedder.calls(), 1);
        assert!(rig.sink.filter_events().is_empty());
    }

    #[tokio::test]
    async fn test_regenerated_reply_reports_filtering() {
        let rig = TestRig::new(&[
            "You should try meditating",
            "I recommend deep breaths",
            "What does that overwhelm feel like for you?",
        ]);
        let response = rig
            .pipeline()
            .respond(reflect("I feel overwhelmed"), None)
            .await
            .unwrap();

        assert_eq!(response.reply, "What does that overwhelm feel like for you?");
        assert!(response.response_was_filtered);
        assert_eq!(response.filter_log.as_ref().map(Vec::len), Some(2));
        assert_eq!(rig.generator.calls(), 3);

        let events = rig.sink.filter_events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].attempts, 3);
        assert!(!events[0].exhausted);
    }

    #[tokio::test]
    async fn test_always_blocked_uses_fallback() {
        let rig = TestRig::new(&["You should rest."; 6]);
        let pipeline = rig.pipeline();
        let response = pipeline.respond(reflect("I can't sleep"), None).await.unwrap();

        assert_eq!(response.reply, pipeline.personas().get(Persona::Reflect).fallback_reply);
        assert!(response.response_was_filtered);
        assert_eq!(response.filter_log.as_ref().map(Vec::len), Some(3));
        assert!(rig.generator.calls() <= 3);
        assert!(rig.sink.filter_events()[0].exhausted);
    }

    #[tokio::test]
    async fn test_crisis_short_circuits_generation() {
        let rig = TestRig::new(&["should never be used"]);
        let response = rig.pipeline().respond(reflect("I want to die"), None).await.unwrap();

        assert!(response.crisis_detected);
        assert!(!response.response_was_filtered);
        let resources = response.crisis_resources.as_deref().unwrap();
        assert!(resources.contains("988"));
        assert!(response.reply.ends_with(resources));
        assert!(response.reply.contains("\n\n"));
        assert!(response.summary.is_none());
        assert!(response.embedding.is_some());
        assert_eq!(rig.generator.calls(), 0);
        assert_eq!(rig.summarizer.calls(), 0);

        let events = rig.sink.crisis_events();
        assert_eq!(events.len(), 1);
        assert!(events[0].matched_indicators.contains("want to die"));
        assert_eq!(events[0].user_id, "user-1");
    }

    #[tokio::test]
    async fn test_crisis_event_survives_cancellation() {
        let rig = TestRig::build(ScriptedGenerator::replies(&[]), StubEmbedder::stalling());
        let pipeline = rig.pipeline_with_detector(Arc::new(SlowDetector(Duration::from_secs(2))));

        let result =
            tokio::time::timeout(Duration::from_millis(100), pipeline.respond(reflect("I want to die"), None))
                .await;

        assert!(result.is_err());
        let events = rig.sink.crisis_events();
        assert_eq!(events.len(), 1);
        assert!(events[0].matched_indicators.contains("want to die"));
        assert_eq!(rig.generator.calls(), 0);
    }

    #[tokio::test]
    async fn test_crisis_path_skips_slow_detector() {
        let rig = TestRig::new(&[]);
        let pipeline = rig.pipeline_with_detector(Arc::new(SlowDetector(Duration::from_secs(2))));
        let response =
            tokio::time::timeout(Duration::from_millis(200), pipeline.respond(reflect("I want to die"), None))
                .await
                .expect("crisis reply does not wait on the detector")
                .unwrap();
        assert!(response.crisis_detected);
    }

    #[tokio::test]
    async fn test_crisis_reply_in_arabic() {
        let rig = TestRig::new(&[]);
        let response = rig.pipeline().respond(reflect("أريد أن أموت"), None).await.unwrap();
        assert!(response.crisis_detected);
        assert_eq!(response.detected_language, "ar");
        assert!(response.reply.starts_with("ما تشاركه"));
    }

    #[tokio::test]
    async fn test_latin_text_does_not_pin_english() {
        let rig = TestRig::new(&["¿Qué sientes ahora mismo?"]);
        let response = rig
            .pipeline()
            .respond(reflect("Me siento muy triste y cansada hoy"), None)
            .await
            .unwrap();
        assert_eq!(response.detected_language, "en");

        let prompt = &rig.generator.requests()[0].messages;
        assert!(prompt.iter().all(|m| !m.content.contains("writing in 'en'")));
        assert!(prompt
            .iter()
            .any(|m| m.content == "Respond in the same language the user is writing in."));
    }

    #[tokio::test]
    async fn test_crisis_survives_embedding_failure() {
        let rig = TestRig::with_failing_embedder(&[]);
        let response = rig.pipeline().respond(reflect("I want to die"), None).await.unwrap();
        assert!(response.crisis_detected);
        assert!(response.embedding.is_none());
        assert!(response.reply_embedding.is_none());
    }

    #[tokio::test]
    async fn test_inner_learning_always_blocked_uses_its_fallback() {
        let rig = TestRig::new(&["The answer is 4"; 3]);
        let pipeline = rig.pipeline();
        let request = ChatRequest::new(Persona::InnerLearning, "u1", "what is 2 + 2?");
        let response = pipeline.respond(request, None).await.unwrap();

        assert_eq!(response.reply, pipeline.personas().get(Persona::InnerLearning).fallback_reply);
        assert!(response.response_was_filtered);
        assert_eq!(response.filter_log.as_ref().map(Vec::len), Some(3));
        assert_eq!(rig.generator.calls(), 3);

        let events = rig.sink.filter_events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].persona, Persona::InnerLearning);
        assert!(events[0].exhausted);
    }

    #[tokio::test]
    async fn test_dropped_request_reports_nothing() {
        let rig = TestRig::build(
            ScriptedGenerator::stalling(&["You should rest."]),
            StubEmbedder::constant(&TestRig::EMBEDDING),
        );
        let pipeline = rig.pipeline();

        let result =
            tokio::time::timeout(Duration::from_millis(100), pipeline.respond(reflect("I can't sleep"), None))
                .await;
        assert!(result.is_err());
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(rig.generator.calls(), 2);
        assert!(rig.sink.filter_events().is_empty());
        assert_eq!(rig.embedder.calls(), 0);
        assert_eq!(rig.summarizer.calls(), 0);
    }

    #[tokio::test]
    async fn test_summarizer_receives_display_name() {
        let rig = TestRig::new(&["What would you like to explore?"]);
        let request = ChatRequest::new(Persona::InnerLearning, "u1", "how do magnets work?");
        rig.pipeline().respond(request, None).await.unwrap();
        assert_eq!(rig.summarizer.personas(), vec!["Inner Learning".to_string()]);
    }

    #[tokio::test]
    async fn test_inner_learning_has_no_crisis_scan() {
        let rig = TestRig::new(&["What makes you ask about that?"]);
        let request = ChatRequest::new(Persona::InnerLearning, "u1", "I want to die of curiosity");
        let response = rig.pipeline().respond(request, None).await.unwrap();
        assert!(!response.crisis_detected);
        assert_eq!(rig.generator.calls(), 1);
    }

    #[tokio::test]
    async fn test_validation_runs_first() {
        let rig = TestRig::new(&["unused"]);
        let err = rig.pipeline().respond(reflect("  "), None).await.unwrap_err();
        assert!(matches!(err, MindGlowError::Validation(_)));
        assert_eq!(rig.generator.calls(), 0);
        assert_eq!(rig.embedder.calls(), 0);
    }

    #[tokio::test]
    async fn test_generator_outage_is_backend_unavailable() {
        let rig = TestRig::with_generator_results(vec![
            Err(BackendError::Status { status: 500, body: String::new() }),
            Err(BackendError::Status { status: 500, body: String::new() }),
        ]);
        let err = rig.pipeline().respond(reflect("hello"), None).await.unwrap_err();
        assert!(matches!(
            err,
            MindGlowError::BackendUnavailable { collaborator: Collaborator::Generator, .. }
        ));
        assert!(rig.sink.filter_events().is_empty());
    }

    #[tokio::test]
    async fn test_summaries_can_be_disabled() {
        let rig = TestRig::new(&["What do you notice?"]);
        let mut settings = TestRig::settings();
        settings.exchange_summaries = false;
        let response = rig.pipeline_with(settings).respond(reflect("hi"), None).await.unwrap();
        assert!(response.summary.is_none());
        assert_eq!(rig.summarizer.calls(), 0);
    }

    fn stored(content: &str, embedding: Vec<f32>) -> StoredExchange {
        StoredExchange {
            id: None,
            role: MessageRole::User,
            content: content.to_string(),
            embedding,
            timestamp: None,
        }
    }

    #[tokio::test]
    async fn test_memory_context_injected_and_query_embedding_reused() {
        let rig = TestRig::new(&["What about work feels heaviest?"]);
        let memory = MemoryQuery {
            stored: vec![
                stored("my manager keeps criticizing me", TestRig::EMBEDDING.to_vec()),
                stored("I like painting", vec![0.0, 0.0, 1.0]),
            ],
            top_k: None,
            threshold: None,
        };
        let response = rig
            .pipeline()
            .respond(reflect("work is stressful"), Some(memory))
            .await
            .unwrap();

        let prompt = &rig.generator.requests()[0].messages;
        let memory_turn = prompt
            .iter()
            .find(|m| m.content.contains("User shared"))
            .expect("memory context injected");
        assert!(memory_turn.content.contains("my manager keeps criticizing me"));
        assert!(!memory_turn.content.contains("painting"));

        // one call for the query, one for the reply
        assert_eq!(rig.embedder.calls(), 2);
        assert_eq!(rig.embedder.inputs()[1], vec!["What about work feels heaviest?".to_string()]);
        assert_eq!(response.embedding.as_deref(), Some(&TestRig::EMBEDDING[..]));
    }

    #[tokio::test]
    async fn test_memory_dimension_mismatch_is_caller_error() {
        let rig = TestRig::new(&["unused"]);
        let memory = MemoryQuery {
            stored: vec![stored("short vector", vec![1.0])],
            ..MemoryQuery::default()
        };
        let err = rig.pipeline().respond(reflect("hello"), Some(memory)).await.unwrap_err();
        assert!(matches!(err, MindGlowError::EmbeddingDimensionMismatch { .. }));
        assert_eq!(rig.generator.calls(), 0);
    }

    #[tokio::test]
    async fn test_memory_top_k_over_limit_rejected() {
        let rig = TestRig::new(&["unused"]);
        let memory = MemoryQuery {
            top_k: Some(51),
            ..MemoryQuery::default()
        };
        let err = rig.pipeline().respond(reflect("hello"), Some(memory)).await.unwrap_err();
        assert!(matches!(err, MindGlowError::Validation(_)));
    }

    #[tokio::test]
    async fn test_semantic_search_joins_hits() {
        let rig = TestRig::new(&[]);
        let request = SemanticSearchRequest {
            query: "work stress".into(),
            stored_messages: vec![
                stored("unrelated", vec![0.0, 1.0, 0.0]),
                stored("deadline pressure", TestRig::EMBEDDING.to_vec()),
            ],
            top_k: None,
            threshold: None,
        };
        let response = rig.pipeline().semantic_search(request).await.unwrap();
        assert_eq!(response.results.len(), 1);
        assert_eq!(response.results[0].exchange_id, "msg-1");
        assert_eq!(response.results[0].rank, 1);
        assert_eq!(response.results[0].content, "deadline pressure");
        assert_eq!(response.query_embedding, TestRig::EMBEDDING.to_vec());
    }

    #[tokio::test]
    async fn test_semantic_search_top_k_zero_is_empty() {
        let rig = TestRig::new(&[]);
        let request = SemanticSearchRequest {
            query: "anything".into(),
            stored_messages: vec![stored("same", TestRig::EMBEDDING.to_vec())],
            top_k: Some(0),
            threshold: Some(-1.0),
        };
        assert!(rig.pipeline().semantic_search(request).await.unwrap().results.is_empty());
    }

    #[tokio::test]
    async fn test_summarize_session() {
        let rig = TestRig::new(&[]);
        let request = SummaryRequest {
            chatbot: Persona::Reflect,
            messages: vec![crate::types::Message::new(MessageRole::User, "مرحبا، أشعر بالتعب")],
        };
        let response = rig.pipeline().summarize(request).await.unwrap();
        assert_eq!(response.summary, TestRig::SUMMARY);
        assert_eq!(response.detected_language, "ar");

        let empty = SummaryRequest { chatbot: Persona::Reflect, messages: vec![] };
        assert!(matches!(
            rig.pipeline().summarize(empty).await,
            Err(MindGlowError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_embed_rejects_blank_text() {
        let rig = TestRig::new(&[]);
        let ok = rig.pipeline().embed(EmbedRequest { text: "hello".into() }).await.unwrap();
        assert_eq!(ok.embedding, TestRig::EMBEDDING.to_vec());
        assert!(rig.pipeline().embed(EmbedRequest { text: " ".into() }).await.is_err());
    }
}
