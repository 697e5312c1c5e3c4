//! HTTP server for the MindGlow chat service.
//!
//! Thin transport over [`ChatPipeline`](crate::chat::ChatPipeline): handlers
//! deserialize, delegate and map errors to status codes.
//!
//! # Endpoints
//!
//! - `GET  /health`
//! - `POST /chat`, `POST /chat-with-memory`
//! - `POST /semantic-search`, `POST /summary`, `POST /embed`

pub mod routes;

pub use routes::{app_router, ApiError, ApiJson, AppState};
