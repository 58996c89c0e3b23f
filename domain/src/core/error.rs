//! Domain error types

use thiserror::Error;

/// Domain-level errors
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DomainError {
    #[error("Task description must not be empty")]
    EmptyTask,

    #[error("Unknown agent: {0}")]
    UnknownAgent(String),

    #[error("Unknown phase: {0}")]
    UnknownPhase(String),

    #[error("Duplicate agent id in catalog: {0}")]
    DuplicateAgent(String),

    #[error("Phase '{phase}' references unknown agent '{agent}'")]
    DanglingEligibleAgent { phase: String, agent: String },

    #[error("Invalid phase name: {0}")]
    InvalidPhaseName(String),

    #[error("Invalid workflow transition: {from} -> {to}")]
    InvalidTransition { from: String, to: String },

    #[error("Iteration cap of {0} reached")]
    IterationCapReached(u32),

    #[error("Operation cancelled")]
    Cancelled,
}

impl DomainError {
    /// Check if this error represents a cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self, DomainError::Cancelled)
    }
}
