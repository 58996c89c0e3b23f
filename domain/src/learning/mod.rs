//! Cross-run learning: keyword extraction and learning records.

pub mod keywords;
pub mod record;

pub use keywords::{extract_keywords, jaccard};
pub use record::{LearningPolicy, LearningRecord, ObservedPattern, task_signature};
