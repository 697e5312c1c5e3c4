//! Generation backend implementations.
//!
//! | Provider | Module | API |
//! |----------|--------|-----|
//! | OpenAI | [`openai`] | Chat Completions (`/chat/completions`) |

pub mod openai;
