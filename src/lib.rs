//! # MindGlow
//!
//! Non-directive reflection chat service. Two personas answer every message:
//!
//! - **Reflect** mirrors feelings back with open questions and short-circuits
//!   to a fixed safety message when crisis language appears.
//! - **InnerLearning** helps the user reason towards their own understanding
//!   without lecturing.
//!
//! Every generated reply passes a banned-phrase filter; rejected candidates are
//! regenerated a bounded number of times before a persona fallback is used.
//! Stored exchanges carry embeddings so later turns can weave in relevant past
//! context through cosine-similarity retrieval.

pub mod chat;
pub mod config;
pub mod embeddings;
pub mod error;
pub mod events;
pub mod language;
pub mod llms;
pub mod memory;
pub mod persona;
pub mod safety;
pub mod server;
pub mod types;

#[cfg(test)]
mod test_support;

pub use chat::ChatPipeline;
pub use config::Settings;
pub use error::{BackendError, MindGlowError, Result};
pub use persona::{Persona, PersonaTable};
pub use types::{ChatRequest, ChatResponse};

/// Crate version reported by `/health`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
