//! Task submitted to a workflow run.

use super::error::DomainError;
use crate::learning::keywords::extract_keywords;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A free-text task plus optional caller-supplied context (Value Object)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    context: Option<String>,
}

impl Task {
    /// Create a task, trimming surrounding whitespace.
    pub fn new(description: impl Into<String>) -> Result<Self, DomainError> {
        let description = description.into().trim().to_string();
        if description.is_empty() {
            return Err(DomainError::EmptyTask);
        }
        Ok(Self {
            description,
            context: None,
        })
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        let context = context.into();
        self.context = (!context.trim().is_empty()).then_some(context);
        self
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn context(&self) -> Option<&str> {
        self.context.as_deref()
    }

    /// Keyword set used for agent relevance and learning lookups.
    pub fn keywords(&self) -> BTreeSet<String> {
        extract_keywords(&self.description)
    }
}

impl std::fmt::Display for Task {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.description)
    }
}
