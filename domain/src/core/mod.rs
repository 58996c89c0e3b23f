//! Core domain concepts shared across all subdomains.
//!
//! - [`agent::Agent`] / [`agent::AgentCatalog`] — expert personas
//! - [`task::Task`] — the task a workflow deliberates on
//! - [`language::Language`] — answer language
//! - [`error::DomainError`] — domain-level errors

pub mod agent;
pub mod error;
pub mod language;
pub mod random;
pub mod task;
