//! Infrastructure layer for warroom
//!
//! This crate contains adapters that implement the ports defined in the
//! application layer: language-model backends, the response cache, learning
//! stores, catalog loading, configuration files and the JSONL event log.

pub mod cache;
pub mod catalog;
pub mod config;
pub mod learning;
pub mod logging;
pub mod providers;

// Re-export commonly used types
pub use cache::MemoryResponseCache;
pub use catalog::{Catalog, CatalogError, load_templates};
pub use config::{
    ConfigIssue, ConfigLoader, FileBatchConfig, FileCacheConfig, FileCatalogConfig, FileConfig,
    FileLearningConfig, FileOrchestrationConfig, FileOutputConfig, FileProviderConfig,
    FileRoutingConfig, FileRunnerConfig, FileSelectionConfig, IssueSeverity, ProviderKind,
};
pub use learning::{JsonlLearningStore, MemoryLearningStore};
pub use logging::JsonlEventLogger;
pub use providers::{OFFLINE_PROVIDER, OfflineBackend, ProviderError, build_backends, offline_backends};
#[cfg(feature = "http-backends")]
pub use providers::OpenAiCompatBackend;
