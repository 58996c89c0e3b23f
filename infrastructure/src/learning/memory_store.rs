//! Bounded in-memory learning history.

use std::collections::VecDeque;
use std::sync::{Mutex, PoisonError};
use warroom_application::{LearningStore, StoreError};
use warroom_domain::{LearningRecord, extract_keywords};

/// Ring buffer of the most recent records.
pub struct MemoryLearningStore {
    records: Mutex<VecDeque<LearningRecord>>,
    capacity: usize,
    threshold: f64,
}

impl MemoryLearningStore {
    pub fn new(capacity: usize, threshold: f64) -> Self {
        Self {
            records: Mutex::new(VecDeque::new()),
            capacity: capacity.max(1),
            threshold,
        }
    }

    /// Seed the store with records loaded elsewhere, oldest first.
    pub(crate) fn with_records(self, records: impl IntoIterator<Item = LearningRecord>) -> Self {
        {
            let mut guard = self.records.lock().unwrap_or_else(PoisonError::into_inner);
            for record in records {
                push_bounded(&mut guard, record, self.capacity);
            }
        }
        self
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub(crate) fn push(&self, record: LearningRecord) {
        let mut guard = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        push_bounded(&mut guard, record, self.capacity);
    }
}

fn push_bounded(records: &mut VecDeque<LearningRecord>, record: LearningRecord, capacity: usize) {
    while records.len() >= capacity {
        records.pop_front();
    }
    records.push_back(record);
}

impl LearningStore for MemoryLearningStore {
    fn record(&self, record: LearningRecord) -> Result<(), StoreError> {
        self.push(record);
        Ok(())
    }

    fn find(&self, task: &str) -> Option<LearningRecord> {
        let keywords = extract_keywords(task);
        let records = self.records.lock().unwrap_or_else(PoisonError::into_inner);
        records
            .iter()
            .rev()
            .find(|r| r.matches(&keywords, self.threshold))
            .cloned()
    }

    fn len(&self) -> usize {
        self.records.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}
