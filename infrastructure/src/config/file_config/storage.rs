//! Cache, learning and catalog settings from TOML
//! (`[cache]`, `[learning]` and `[catalog]` sections)

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileCacheConfig {
    pub enabled: bool,
    pub ttl_secs: u64,
    pub max_entries: usize,
}

impl Default for FileCacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            ttl_secs: 600,
            max_entries: 100,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileLearningConfig {
    pub enabled: bool,
    /// Records kept in memory; the oldest are dropped first
    pub capacity: usize,
    /// Keyword overlap needed for a past record to apply
    pub match_threshold: f64,
    /// JSONL file that persists records across runs
    pub path: Option<PathBuf>,
}

impl Default for FileLearningConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            capacity: 256,
            match_threshold: 0.5,
            path: None,
        }
    }
}

/// Optional replacements for the built-in agent catalog and templates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileCatalogConfig {
    /// TOML or JSON file with `agents` and `phases`
    pub agents: Option<PathBuf>,
    /// TOML file with extra fallback templates
    pub templates: Option<PathBuf>,
}
