//! Personas and their rule sets.
//!
//! Two fixed conversational behaviors share one pipeline:
//!
//! ```text
//! Persona::Reflect        emotional exploration, crisis lexicon enabled
//! Persona::InnerLearning  Socratic discovery, extra teaching-phrase filter
//! ```
//!
//! Each persona's [`PersonaRuleSet`] (system prompt, banned phrases, crisis
//! lexicon, fallback reply, regeneration hint) is loaded once into a
//! [`PersonaTable`] and shared read-only for the life of the process.

pub mod rules;

use std::fmt;

use serde::{Deserialize, Serialize};

pub use rules::{CrisisRules, PersonaRuleSet, PersonaTable};

/// The conversational persona a request is routed to.
///
/// Serialized as the `chatbot` field of API requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Persona {
    /// Inner-voice companion for emotional exploration.
    Reflect,
    /// Socratic guide for self-directed learning.
    InnerLearning,
}

impl Persona {
    /// Every persona, in a stable order.
    pub const ALL: [Persona; 2] = [Persona::Reflect, Persona::InnerLearning];

    /// Wire identifier (`"reflect"`, `"inner_learning"`).
    pub fn as_str(&self) -> &'static str {
        match self {
            Persona::Reflect => "reflect",
            Persona::InnerLearning => "inner_learning",
        }
    }
}

impl fmt::Display for Persona {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
