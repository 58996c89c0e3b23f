//! Port definitions (interfaces for external adapters)
//!
//! Ports define the contracts that infrastructure adapters must implement.

pub mod composite_progress;
pub mod learning_store;
pub mod llm_backend;
pub mod progress;
pub mod response_cache;
