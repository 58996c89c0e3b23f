//! Templated answers used when an agent's backend calls are exhausted.
//!
//! Templates are keyed by `(language, category)` and looked up in this order:
//! exact match, the language's `default`, the English category, the English
//! `default`. Placeholders: `{name}`, `{role}`, `{capability}`, `{task}`.

use crate::core::agent::Agent;
use crate::core::language::Language;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

pub const DEFAULT_CATEGORY: &str = "default";

const LAST_RESORT: &str =
    "As {name} ({role}), I recommend focusing on {capability} for \"{task}\". [Offline mode]";

const BUILTIN: &[(Language, &str, &str)] = &[
    (Language::EnUs, DEFAULT_CATEGORY, LAST_RESORT),
    (
        Language::EnUs,
        "architecture",
        "As {name}, I recommend a design for \"{task}\" that keeps components loosely coupled and lets {capability} scale independently. [Offline mode]",
    ),
    (
        Language::EnUs,
        "development",
        "As {name}, I suggest delivering \"{task}\" in small increments, starting with {capability} and automated tests. [Offline mode]",
    ),
    (
        Language::EnUs,
        "security",
        "As {name}, I recommend a threat model for \"{task}\" before launch, with {capability} reviewed early. [Offline mode]",
    ),
    (
        Language::EnUs,
        "product",
        "As {name}, I suggest validating the core value of \"{task}\" with users first, prioritising {capability}. [Offline mode]",
    ),
    (
        Language::EnUs,
        "ux",
        "As {name}, I recommend mapping the main user journeys of \"{task}\" and testing them early, with attention to {capability}. [Offline mode]",
    ),
    (
        Language::EnUs,
        "design",
        "As {name}, I suggest a consistent design system for \"{task}\" grounded in {capability}. [Offline mode]",
    ),
    (
        Language::EnUs,
        "marketing",
        "As {name}, I recommend defining the positioning of \"{task}\" and the first acquisition channel, leaning on {capability}. [Offline mode]",
    ),
    (
        Language::EnUs,
        "testing",
        "As {name}, I recommend a test strategy for \"{task}\" that covers critical paths first, using {capability}. [Offline mode]",
    ),
    (
        Language::PtBr,
        DEFAULT_CATEGORY,
        "Como {name} ({role}), recomendo focar em {capability} para \"{task}\". [Modo offline]",
    ),
    (
        Language::PtBr,
        "security",
        "Como {name}, recomendo um modelo de ameaças para \"{task}\" antes do lançamento, revisando {capability} cedo. [Modo offline]",
    ),
    (
        Language::EsEs,
        DEFAULT_CATEGORY,
        "Como {name} ({role}), recomiendo centrarse en {capability} para \"{task}\". [Modo sin conexión]",
    ),
    (
        Language::FrFr,
        DEFAULT_CATEGORY,
        "En tant que {name} ({role}), je recommande de se concentrer sur {capability} pour « {task} ». [Mode hors ligne]",
    ),
    (
        Language::DeDe,
        DEFAULT_CATEGORY,
        "Als {name} ({role}) empfehle ich, sich bei \"{task}\" auf {capability} zu konzentrieren. [Offline-Modus]",
    ),
];

/// One row of the template table, as loaded from configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FallbackTemplate {
    pub language: Language,
    #[serde(default = "default_category")]
    pub category: String,
    pub template: String,
}

fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

/// Lookup table of fallback templates.
#[derive(Debug, Clone, Default)]
pub struct FallbackTemplates {
    entries: HashMap<(Language, String), String>,
}

impl FallbackTemplates {
    pub fn empty() -> Self {
        Self::default()
    }

    /// The table shipped with the binary.
    pub fn builtin() -> Self {
        let mut table = Self::empty();
        for (language, category, template) in BUILTIN {
            table.insert(*language, *category, *template);
        }
        table
    }

    /// Built-in table overridden by the given rows.
    pub fn builtin_with(overrides: Vec<FallbackTemplate>) -> Self {
        let mut table = Self::builtin();
        table.extend(overrides);
        table
    }

    pub fn insert(&mut self, language: Language, category: impl Into<String>, template: impl Into<String>) {
        self.entries
            .insert((language, category.into().to_lowercase()), template.into());
    }

    pub fn extend(&mut self, rows: Vec<FallbackTemplate>) {
        for row in rows {
            self.insert(row.language, row.category, row.template);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn lookup(&self, language: Language, category: &str) -> &str {
        let category = category.to_lowercase();
        [
            (language, category.as_str()),
            (language, DEFAULT_CATEGORY),
            (Language::EnUs, category.as_str()),
            (Language::EnUs, DEFAULT_CATEGORY),
        ]
        .into_iter()
        .find_map(|(lang, cat)| self.entries.get(&(lang, cat.to_string())))
        .map(String::as_str)
        .unwrap_or(LAST_RESORT)
    }

    /// Deterministic fallback text for an agent and task.
    pub fn render(&self, language: Language, agent: &Agent, task: &str) -> String {
        self.lookup(language, &agent.category)
            .replace("{name}", &agent.name)
            .replace("{role}", &agent.role)
            .replace("{capability}", agent.primary_capability())
            .replace("{task}", task)
    }
}
