//! Orchestration domain
//!
//! Phases, per-agent responses, phase results, the workflow run entity and
//! the final report.

pub mod context;
pub mod entities;
pub mod report;
pub mod value_objects;
