//! Learning store adapters
//!
//! - [`MemoryLearningStore`]: bounded in-process history
//! - [`JsonlLearningStore`]: the same history, persisted one record per line

mod jsonl_store;
mod memory_store;

pub use jsonl_store::JsonlLearningStore;
pub use memory_store::MemoryLearningStore;
