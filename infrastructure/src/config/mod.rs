//! Configuration file loading for warroom
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. `WARROOM_*` environment variables
//! 2. `--config <path>` specified file
//! 3. Project root: `./warroom.toml` or `./.warroom.toml`
//! 4. Global: `<config dir>/warroom/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigIssue, FileBatchConfig, FileCacheConfig, FileCatalogConfig, FileConfig,
    FileLearningConfig, FileOrchestrationConfig, FileOutputConfig, FileProviderConfig,
    FileRoutingConfig, FileRunnerConfig, FileSelectionConfig, IssueSeverity, ProviderKind,
};
pub use loader::ConfigLoader;
