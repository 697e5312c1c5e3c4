//! Persona rule tables.
//!
//! The embedded `defaults.yaml` ships the production rules; a deployment can
//! point `PERSONA_RULES_PATH` at a replacement file with the same layout:
//!
//! ```yaml
//! shared_banned_phrases: [ ... ]      # applied to every persona
//! crisis_resources: { en: ..., ar: ... }
//! personas:
//!   reflect:
//!     display_name: Reflect
//!     system_prompt: ...
//!     banned_phrases: [ ... ]
//!     crisis: { phrases: [ ... ], templates: { en: ..., ar: ... } }
//!     fallback_reply: ...
//!     regeneration_hint: ...
//!   inner_learning: { ... }
//! ```

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use super::Persona;
use crate::error::{MindGlowError, Result};
use crate::safety::{BannedPhrase, CrisisLexicon, CrisisScan, ResponseFilter};

const EMBEDDED_RULES_YAML: &str = include_str!("defaults.yaml");

/// Raw crisis configuration for a persona.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrisisRules {
    /// Phrases that indicate possible self-harm risk.
    pub phrases: Vec<String>,
    /// Compassionate reply templates keyed by language code.
    pub templates: BTreeMap<String, String>,
}

#[derive(Debug, Deserialize)]
struct PersonaRulesSpec {
    display_name: String,
    system_prompt: String,
    #[serde(default)]
    banned_phrases: Vec<BannedPhrase>,
    #[serde(default)]
    crisis: Option<CrisisRules>,
    fallback_reply: String,
    regeneration_hint: String,
}

#[derive(Debug, Deserialize)]
struct PersonaRulesFile {
    #[serde(default)]
    shared_banned_phrases: Vec<BannedPhrase>,
    #[serde(default)]
    crisis_resources: BTreeMap<String, String>,
    personas: BTreeMap<Persona, PersonaRulesSpec>,
}

/// The compiled, read-only rules for one persona.
#[derive(Debug, Clone)]
pub struct PersonaRuleSet {
    pub persona: Persona,
    pub display_name: String,
    pub system_prompt: String,
    pub fallback_reply: String,
    pub regeneration_hint: String,
    filter: ResponseFilter,
    crisis: Option<CrisisLexicon>,
}

impl PersonaRuleSet {
    fn compile(persona: Persona, spec: PersonaRulesSpec, shared: &[BannedPhrase]) -> Result<Self> {
        let require = |field: &str, value: &str| {
            if value.trim().is_empty() {
                Err(MindGlowError::Config(format!(
                    "persona '{}' must define a non-empty {}",
                    persona, field
                )))
            } else {
                Ok(())
            }
        };
        require("system_prompt", &spec.system_prompt)?;
        require("fallback_reply", &spec.fallback_reply)?;
        require("regeneration_hint", &spec.regeneration_hint)?;

        let phrases: Vec<BannedPhrase> = shared
            .iter()
            .chain(spec.banned_phrases.iter())
            .cloned()
            .collect();
        let filter = ResponseFilter::new(&phrases)?;

        let fallback_reply = spec.fallback_reply.trim().to_string();
        let verdict = filter.check(&fallback_reply);
        if verdict.blocked {
            return Err(MindGlowError::Config(format!(
                "fallback reply for persona '{}' contains banned phrase(s): {}",
                persona,
                verdict.matched.join(", ")
            )));
        }

        let crisis = spec
            .crisis
            .as_ref()
            .map(CrisisLexicon::from_rules)
            .transpose()?;
        if let Some(lexicon) = &crisis {
            for (lang, template) in lexicon.templates() {
                let verdict = filter.check(template);
                if verdict.blocked {
                    return Err(MindGlowError::Config(format!(
                        "crisis template '{}' for persona '{}' contains banned phrase(s): {}",
                        lang,
                        persona,
                        verdict.matched.join(", ")
                    )));
                }
            }
        }

        Ok(Self {
            persona,
            display_name: spec.display_name.trim().to_string(),
            system_prompt: spec.system_prompt.trim().to_string(),
            fallback_reply,
            regeneration_hint: spec.regeneration_hint.trim().to_string(),
            filter,
            crisis,
        })
    }

    /// The compiled banned-phrase filter.
    pub fn filter(&self) -> &ResponseFilter {
        &self.filter
    }

    /// Whether this persona runs crisis detection at all.
    pub fn supports_crisis_detection(&self) -> bool {
        self.crisis.is_some()
    }

    /// Scan user input; personas without a crisis lexicon never trigger.
    pub fn scan_crisis(&self, user_text: &str) -> CrisisScan {
        match &self.crisis {
            Some(lexicon) => lexicon.scan(user_text),
            None => CrisisScan::clear(),
        }
    }

    /// Crisis reply template for the resolved language.
    pub fn crisis_template(&self, language: &str, default_language: &str) -> Option<&str> {
        self.crisis
            .as_ref()
            .map(|lexicon| lexicon.template_for(language, default_language))
    }
}

/// Rules for every persona plus the shared crisis-resource texts.
#[derive(Debug, Clone)]
pub struct PersonaTable {
    reflect: PersonaRuleSet,
    inner_learning: PersonaRuleSet,
    crisis_resources: BTreeMap<String, String>,
}

impl PersonaTable {
    /// The rules compiled into the binary.
    pub fn embedded() -> Result<Self> {
        Self::from_yaml_str(EMBEDDED_RULES_YAML)
    }

    /// Load the override file when given, otherwise the embedded rules.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_path(path),
            None => Self::embedded(),
        }
    }

    /// Load and validate a rules file.
    pub fn from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        log::debug!("Loading persona rules from {}", path.display());
        Self::from_yaml_str(&content)
    }

    /// Parse and validate rules from YAML text.
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let file: PersonaRulesFile = serde_yaml::from_str(yaml)?;
        let PersonaRulesFile {
            shared_banned_phrases,
            crisis_resources,
            mut personas,
        } = file;

        let mut take = |persona: Persona| {
            personas
                .remove(&persona)
                .ok_or_else(|| {
                    MindGlowError::Config(format!("rules for persona '{}' are missing", persona))
                })
                .and_then(|spec| PersonaRuleSet::compile(persona, spec, &shared_banned_phrases))
        };
        let reflect = take(Persona::Reflect)?;
        let inner_learning = take(Persona::InnerLearning)?;

        let crisis_resources: BTreeMap<String, String> = crisis_resources
            .into_iter()
            .filter(|(_, text)| !text.trim().is_empty())
            .map(|(lang, text)| (lang.trim().to_lowercase(), text.trim().to_string()))
            .collect();
        let needs_resources =
            reflect.supports_crisis_detection() || inner_learning.supports_crisis_detection();
        if needs_resources && crisis_resources.is_empty() {
            return Err(MindGlowError::Config(
                "crisis_resources must not be empty when a persona enables crisis detection"
                    .to_string(),
            ));
        }

        Ok(Self {
            reflect,
            inner_learning,
            crisis_resources,
        })
    }

    /// Rules for a persona.
    pub fn get(&self, persona: Persona) -> &PersonaRuleSet {
        match persona {
            Persona::Reflect => &self.reflect,
            Persona::InnerLearning => &self.inner_learning,
        }
    }

    /// Crisis-resource text for `language`, falling back to `default_language`,
    /// then English, then any configured set.
    pub fn crisis_resources(&self, language: &str, default_language: &str) -> &str {
        [language, default_language, "en"]
            .iter()
            .find_map(|lang| self.crisis_resources.get(*lang))
            .or_else(|| self.crisis_resources.values().next())
            .map(String::as_str)
            .unwrap_or_default()
    }
}
