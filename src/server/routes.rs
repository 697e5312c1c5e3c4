//! Axum route handlers for the MindGlow HTTP API.
//!
//! # Routes
//!
//! - `GET  /health`            liveness probe with service metadata
//! - `POST /chat`              one turn with `reflect` or `inner_learning`
//! - `POST /chat-with-memory`  same, with semantic retrieval over stored exchanges
//! - `POST /semantic-search`   rank stored exchanges against a query
//! - `POST /summary`           neutral summary of a session
//! - `POST /embed`             embedding for a single text

use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, DefaultBodyLimit, FromRequest, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::Value;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::chat::ChatPipeline;
use crate::error::MindGlowError;
use crate::persona::Persona;
use crate::types::{
    ChatRequest, ChatResponse, ChatWithMemoryRequest, EmbedRequest, EmbedResponse,
    SemanticSearchRequest, SemanticSearchResponse, SummaryRequest, SummaryResponse,
};

/// Request bodies carry stored embeddings, so the limit is well above axum's default.
const MAX_BODY_BYTES: usize = 16 * 1024 * 1024;

/// Service name reported by `/health`.
pub const SERVICE_NAME: &str = "MindGlow AI";

/// Shared application state for the HTTP server.
#[derive(Debug, Clone)]
pub struct AppState {
    pub pipeline: Arc<ChatPipeline>,
}

impl AppState {
    pub fn new(pipeline: ChatPipeline) -> Self {
        Self {
            pipeline: Arc::new(pipeline),
        }
    }
}

/// Build the axum router with all routes.
pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_handler))
        .route("/chat", post(chat_handler))
        .route("/chat-with-memory", post(chat_with_memory_handler))
        .route("/semantic-search", post(semantic_search_handler))
        .route("/summary", post(summary_handler))
        .route("/embed", post(embed_handler))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

// ============================================================================
// Errors
// ============================================================================

/// Error response: `{"error": "<message>", "kind": "<snake_case kind>"}`.
#[derive(Debug)]
pub enum ApiError {
    /// The pipeline rejected or failed the request.
    Pipeline(MindGlowError),
    /// The body was not valid JSON for the endpoint.
    InvalidBody(JsonRejection),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Pipeline(err) => match err {
                MindGlowError::Validation(_) => StatusCode::BAD_REQUEST,
                MindGlowError::EmbeddingDimensionMismatch { .. } => StatusCode::UNPROCESSABLE_ENTITY,
                MindGlowError::BackendUnavailable { .. } => StatusCode::SERVICE_UNAVAILABLE,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::InvalidBody(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            Self::Pipeline(err) => err.kind(),
            Self::InvalidBody(_) => "invalid_request_body",
        }
    }

    fn message(&self) -> String {
        match self {
            Self::Pipeline(err) => err.to_string(),
            Self::InvalidBody(rejection) => rejection.body_text(),
        }
    }
}

impl From<MindGlowError> for ApiError {
    fn from(err: MindGlowError) -> Self {
        Self::Pipeline(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::InvalidBody(rejection)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), kind = self.kind(), "request failed: {}", self.message());
        }
        let body = Json(serde_json::json!({
            "error": self.message(),
            "kind": self.kind(),
        }));
        (status, body).into_response()
    }
}

/// JSON extractor whose rejections use the API error body.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

// ============================================================================
// Handlers
// ============================================================================

/// GET /health
async fn health_handler() -> impl IntoResponse {
    let chatbots: Vec<&str> = Persona::ALL.iter().map(Persona::as_str).collect();
    Json(serde_json::json!({
        "status": "ok",
        "service": SERVICE_NAME,
        "version": crate::VERSION,
        "chatbots": chatbots,
    }))
}

/// POST /chat
async fn chat_handler(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<ChatRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    Ok(Json(state.pipeline.respond(request, None).await?))
}

/// POST /chat-with-memory
async fn chat_with_memory_handler(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<ChatWithMemoryRequest>,
) -> Result<Json<ChatResponse>, ApiError> {
    let (chat, memory) = request.into_parts();
    Ok(Json(state.pipeline.respond(chat, Some(memory)).await?))
}

/// POST /semantic-search
async fn semantic_search_handler(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<SemanticSearchRequest>,
) -> Result<Json<SemanticSearchResponse>, ApiError> {
    Ok(Json(state.pipeline.semantic_search(request).await?))
}

/// POST /summary
async fn summary_handler(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<SummaryRequest>,
) -> Result<Json<SummaryResponse>, ApiError> {
    Ok(Json(state.pipeline.summarize(request).await?))
}

/// POST /embed
async fn embed_handler(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<EmbedRequest>,
) -> Result<Json<EmbedResponse>, ApiError> {
    Ok(Json(state.pipeline.embed(request).await?))
}
