//! Backend configuration from TOML (`[[providers]]` and `[routing]`)
//!
//! ```toml
//! [[providers]]
//! name = "openai"
//! kind = "openai_compatible"
//! base_url = "https://api.openai.com/v1"
//! model = "gpt-4o-mini"
//! api_key_env = "OPENAI_API_KEY"
//!
//! [[providers]]
//! name = "local"
//! kind = "offline"
//!
//! [routing]
//! default = "openai"
//! failover = true
//!
//! [routing.categories]
//! security = "local"
//! ```

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use warroom_application::RoutingPolicy;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProviderKind {
    /// Any `/chat/completions` endpoint speaking the OpenAI wire format
    #[default]
    OpenaiCompatible,
    /// Deterministic local text generation, no network
    Offline,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileProviderConfig {
    pub name: String,
    pub kind: ProviderKind,
    pub base_url: String,
    pub model: String,
    /// Environment variable holding the API key
    pub api_key_env: String,
    /// Seed for the offline generator
    pub seed: Option<u64>,
}

impl Default for FileProviderConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            kind: ProviderKind::default(),
            base_url: "https://api.openai.com/v1".to_string(),
            model: "gpt-4o-mini".to_string(),
            api_key_env: "OPENAI_API_KEY".to_string(),
            seed: None,
        }
    }
}

impl FileProviderConfig {
    /// The offline provider used when none are configured.
    pub fn offline(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: ProviderKind::Offline,
            model: "offline".to_string(),
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileRoutingConfig {
    pub default: Option<String>,
    /// agent id -> provider name
    pub agents: HashMap<String, String>,
    /// agent category -> provider name
    pub categories: HashMap<String, String>,
    pub failover: bool,
}

impl FileRoutingConfig {
    pub fn to_policy(&self) -> RoutingPolicy {
        RoutingPolicy {
            default_backend: self.default.clone(),
            agent_overrides: self.agents.clone(),
            category_overrides: self.categories.clone(),
            failover: self.failover,
        }
    }

    /// Every provider name this section mentions.
    pub fn referenced(&self) -> impl Iterator<Item = &String> {
        self.default
            .iter()
            .chain(self.agents.values())
            .chain(self.categories.values())
    }
}
