//! MindGlow HTTP server binary.
//!
//! Wires the OpenAI-compatible generator and embedder, the script-based
//! language detector and the persona rule table into a [`ChatPipeline`],
//! then serves the axum router.
//!
//! # Environment Variables
//!
//! - `OPENAI_API_KEY` (required), `OPENAI_BASE_URL`, `OPENAI_MODEL`, `EMBEDDING_MODEL`
//! - `PORT` HTTP port (default: 8000)
//! - `PERSONA_RULES_PATH` YAML rule table replacing the embedded defaults
//! - `RUST_LOG` tracing filter (default: "info,mindglow=debug")
//!
//! # Usage
//!
//! ```bash
//! OPENAI_API_KEY=sk-... cargo run --bin server
//! ```

use std::sync::Arc;

use anyhow::Context;
use mindglow::chat::{ChatPipeline, Collaborators, LlmSummarizer};
use mindglow::config::Settings;
use mindglow::embeddings::OpenAIEmbedding;
use mindglow::events::TracingEventSink;
use mindglow::language::ScriptDetector;
use mindglow::llms::{OpenAICompletion, TextGenerator};
use mindglow::persona::PersonaTable;
use mindglow::server::{app_router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,mindglow=debug".into()),
        )
        .init();

    let settings = Settings::from_env().context("loading settings")?;
    let personas = PersonaTable::load(settings.persona_rules_path.as_deref())
        .context("loading persona rules")?;

    let generator: Arc<dyn TextGenerator> = Arc::new(OpenAICompletion::from_settings(&settings)?);
    let collaborators = Collaborators {
        generator: generator.clone(),
        embedder: Arc::new(OpenAIEmbedding::from_settings(&settings)?),
        detector: Arc::new(ScriptDetector::new()),
        summarizer: Arc::new(LlmSummarizer::new(generator)),
        events: Arc::new(TracingEventSink),
    };

    let bind_addr = settings.bind_addr();
    let pipeline = ChatPipeline::new(settings, Arc::new(personas), collaborators);
    let app = app_router(AppState::new(pipeline));

    tracing::info!("MindGlow server {} starting on {}", mindglow::VERSION, bind_addr);
    tracing::info!("Endpoints:");
    tracing::info!("  GET  /health            liveness probe");
    tracing::info!("  POST /chat              reflect / inner_learning turn");
    tracing::info!("  POST /chat-with-memory  turn with semantic retrieval");
    tracing::info!("  POST /semantic-search   rank stored exchanges");
    tracing::info!("  POST /summary           session summary");
    tracing::info!("  POST /embed             single text embedding");

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("binding {}", bind_addr))?;

    axum::serve(listener, app).await.context("server failed")?;
    Ok(())
}
