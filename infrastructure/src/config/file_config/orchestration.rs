//! Workflow settings from TOML (`[orchestration]` section)
//!
//! ```toml
//! [orchestration]
//! phases = ["brainstorm", "development", "security"]   # empty = all phases
//! max_iterations = 3
//! language = "en-US"
//! iterate_below_confidence = 0.75
//! stop_on_degraded_phase = false
//! deep_analysis = false
//! ```

use serde::{Deserialize, Serialize};
use warroom_domain::Language;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOrchestrationConfig {
    /// Phases run when the caller selects none
    pub phases: Vec<String>,
    pub max_iterations: u32,
    pub language: String,
    pub iterate_below_confidence: f64,
    pub stop_on_degraded_phase: bool,
    pub deep_analysis: bool,
}

impl Default for FileOrchestrationConfig {
    fn default() -> Self {
        Self {
            phases: Vec::new(),
            max_iterations: 3,
            language: Language::default().as_str().to_string(),
            iterate_below_confidence: 0.75,
            stop_on_degraded_phase: false,
            deep_analysis: false,
        }
    }
}

impl FileOrchestrationConfig {
    /// Parsed language; unknown codes fall back to English.
    pub fn language(&self) -> Language {
        self.language.parse().unwrap_or_default()
    }

    /// Whether the configured code is one we recognise.
    pub fn language_is_known(&self) -> bool {
        let normalized = self.language.trim().replace('_', "-").to_lowercase();
        Language::all().iter().any(|l| {
            let code = l.as_str().to_lowercase();
            code == normalized || code.split('-').next() == Some(normalized.as_str())
        })
    }
}
