//! Prompt domain
//!
//! Agent prompt templates and the data-driven fallback template table.

pub mod agent;
pub mod fallback;

pub use agent::AgentPromptTemplate;
pub use fallback::{FallbackTemplate, FallbackTemplates};
