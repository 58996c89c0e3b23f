//! Learning store port
//!
//! Append-only history of past runs. Lookups are approximate: a record
//! matches when its keyword overlap with the task reaches the store's
//! threshold.

use thiserror::Error;
use warroom_domain::LearningRecord;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

pub trait LearningStore: Send + Sync {
    /// Append a record. Records are never mutated afterwards.
    fn record(&self, record: LearningRecord) -> Result<(), StoreError>;

    /// Most recent record for a lexically similar task.
    fn find(&self, task: &str) -> Option<LearningRecord>;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Store that remembers nothing
pub struct NoLearningStore;

impl LearningStore for NoLearningStore {
    fn record(&self, _record: LearningRecord) -> Result<(), StoreError> {
        Ok(())
    }

    fn find(&self, _task: &str) -> Option<LearningRecord> {
        None
    }

    fn len(&self) -> usize {
        0
    }
}
