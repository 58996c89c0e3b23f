//! Agent catalog, phase plan and fallback template loading
//!
//! Catalog files are TOML or JSON (chosen by extension) with `agents` and
//! `phases` arrays. Template files carry a `templates` array that overrides
//! the built-in fallback table.
//!
//! ```toml
//! [[agents]]
//! id = "lead-architect"
//! name = "Ana Ribeiro"
//! role = "Lead Architect"
//! capabilities = ["Microservices"]
//! category = "architecture"
//!
//! [[phases]]
//! name = "development"
//! eligible_agents = ["lead-architect"]
//! ```

use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;
use warroom_domain::{
    Agent, AgentCatalog, DomainError, FallbackTemplate, FallbackTemplates, PhaseDefinition, PhasePlan,
};

const BUILTIN_CATALOG: &str = include_str!("../../assets/catalog.toml");

#[derive(Error, Debug)]
pub enum CatalogError {
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid TOML in {}: {message}", path.display())]
    Toml { path: PathBuf, message: String },

    #[error("Invalid JSON in {}: {message}", path.display())]
    Json { path: PathBuf, message: String },

    #[error("Catalog has no agents")]
    NoAgents,

    #[error(transparent)]
    Domain(#[from] DomainError),
}

#[derive(Debug, Deserialize)]
struct CatalogFile {
    #[serde(default)]
    agents: Vec<Agent>,
    #[serde(default)]
    phases: Vec<PhaseDefinition>,
}

#[derive(Debug, Deserialize)]
struct TemplateFile {
    #[serde(default)]
    templates: Vec<FallbackTemplate>,
}

/// A validated catalog: every phase's eligible agents exist.
#[derive(Debug, Clone)]
pub struct Catalog {
    pub agents: AgentCatalog,
    pub plan: PhasePlan,
}

impl Catalog {
    /// The catalog compiled into the binary.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_toml_str(BUILTIN_CATALOG, Path::new("<builtin>"))
    }

    /// Load from a file, or the built-in catalog when `path` is `None`.
    pub fn load(path: Option<&Path>) -> Result<Self, CatalogError> {
        let Some(path) = path else {
            return Self::builtin();
        };
        debug!("Loading agent catalog from {}", path.display());
        let text = read(path)?;
        if is_json(path) {
            let file: CatalogFile = serde_json::from_str(&text).map_err(|e| CatalogError::Json {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;
            Self::from_file(file)
        } else {
            Self::from_toml_str(&text, path)
        }
    }

    fn from_toml_str(text: &str, path: &Path) -> Result<Self, CatalogError> {
        let file: CatalogFile = toml::from_str(text).map_err(|e| CatalogError::Toml {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        Self::from_file(file)
    }

    fn from_file(file: CatalogFile) -> Result<Self, CatalogError> {
        if file.agents.is_empty() {
            return Err(CatalogError::NoAgents);
        }
        let agents = AgentCatalog::new(file.agents)?;
        let plan = PhasePlan::new(file.phases)?;
        plan.validate_against(&agents)?;
        Ok(Self { agents, plan })
    }
}

/// Built-in fallback templates, overridden by rows from `path` if given.
pub fn load_templates(path: Option<&Path>) -> Result<FallbackTemplates, CatalogError> {
    let Some(path) = path else {
        return Ok(FallbackTemplates::builtin());
    };
    debug!("Loading fallback templates from {}", path.display());
    let text = read(path)?;
    let file: TemplateFile = if is_json(path) {
        serde_json::from_str(&text).map_err(|e| CatalogError::Json {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?
    } else {
        toml::from_str(&text).map_err(|e| CatalogError::Toml {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?
    };
    Ok(FallbackTemplates::builtin_with(file.templates))
}

fn read(path: &Path) -> Result<String, CatalogError> {
    std::fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn is_json(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("json"))
}
