//! Use cases
//!
//! Application-level operations that orchestrate domain logic, from a
//! single agent call up to a full multi-phase workflow.

pub mod consult_agent;
pub mod execute_phase;
pub mod run_agent;
pub mod run_batch;
pub mod run_workflow;
