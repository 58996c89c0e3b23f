//! Raw TOML configuration data types
//!
//! These structs mirror the config file exactly. Every section is
//! `#[serde(default)]`, so a partial file only overrides what it names.

mod execution;
mod orchestration;
mod output;
mod providers;
mod storage;

pub use execution::{FileBatchConfig, FileRunnerConfig, FileSelectionConfig};
pub use orchestration::FileOrchestrationConfig;
pub use output::FileOutputConfig;
pub use providers::{FileProviderConfig, FileRoutingConfig, ProviderKind};
pub use storage::{FileCacheConfig, FileCatalogConfig, FileLearningConfig};

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use warroom_application::{ExecutionParams, IterationParams};
use warroom_domain::{ConsensusConfig, LearningPolicy};

/// Complete file configuration (raw TOML structure)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub orchestration: FileOrchestrationConfig,
    pub runner: FileRunnerConfig,
    pub batch: FileBatchConfig,
    pub selection: FileSelectionConfig,
    pub consensus: ConsensusConfig,
    pub cache: FileCacheConfig,
    pub learning: FileLearningConfig,
    pub catalog: FileCatalogConfig,
    pub providers: Vec<FileProviderConfig>,
    pub routing: FileRoutingConfig,
    pub output: FileOutputConfig,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueSeverity {
    Warning,
    Error,
}

/// One problem found while validating a configuration
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigIssue {
    pub severity: IssueSeverity,
    /// Dotted path of the offending key
    pub field: String,
    pub message: String,
}

impl ConfigIssue {
    fn error(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: IssueSeverity::Error,
            field: field.into(),
            message: message.into(),
        }
    }

    fn warning(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: IssueSeverity::Warning,
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == IssueSeverity::Error
    }
}

impl fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self.severity {
            IssueSeverity::Warning => "warning",
            IssueSeverity::Error => "error",
        };
        write!(f, "{}: {}: {}", label, self.field, self.message)
    }
}

impl FileConfig {
    /// Engine parameters assembled from every section.
    pub fn to_execution_params(&self) -> ExecutionParams {
        ExecutionParams::default()
            .with_runner(self.runner.to_params())
            .with_batch(self.batch.to_params())
            .with_selection(self.selection.to_params())
            .with_iteration(IterationParams {
                max_iterations: self.orchestration.max_iterations.max(1),
                iterate_below: self.orchestration.iterate_below_confidence,
                stop_on_degraded_phase: self.orchestration.stop_on_degraded_phase,
            })
            .with_consensus(self.consensus)
            .with_learning(LearningPolicy {
                success_confidence: self.selection.success_confidence,
                ..LearningPolicy::default()
            })
    }

    /// Providers to build, falling back to a single offline provider.
    pub fn effective_providers(&self) -> Vec<FileProviderConfig> {
        if self.providers.is_empty() {
            vec![FileProviderConfig::offline(crate::providers::OFFLINE_PROVIDER)]
        } else {
            self.providers.clone()
        }
    }

    /// Check the configuration, returning every issue found.
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        // 1. Providers
        let mut names = HashSet::new();
        for (i, provider) in self.providers.iter().enumerate() {
            let field = format!("providers[{}]", i);
            if provider.name.trim().is_empty() {
                issues.push(ConfigIssue::error(format!("{}.name", field), "provider name is empty"));
            } else if !names.insert(provider.name.as_str()) {
                issues.push(ConfigIssue::error(
                    format!("{}.name", field),
                    format!("duplicate provider name '{}'", provider.name),
                ));
            }
            if provider.kind == ProviderKind::OpenaiCompatible && provider.base_url.trim().is_empty() {
                issues.push(ConfigIssue::error(format!("{}.base_url", field), "base_url is empty"));
            }
            if provider.model.trim().is_empty() {
                issues.push(ConfigIssue::error(format!("{}.model", field), "model is empty"));
            }
        }
        if self.providers.is_empty() {
            issues.push(ConfigIssue::warning(
                "providers",
                "no providers configured; the offline backend will be used",
            ));
        }

        // 2. Routing must name known providers
        let known: HashSet<String> = self.effective_providers().into_iter().map(|p| p.name).collect();
        for name in self.routing.referenced() {
            if !known.contains(name) {
                issues.push(ConfigIssue::error(
                    "routing",
                    format!("unknown provider '{}'", name),
                ));
            }
        }

        // 3. Numeric ranges
        let ratios = [
            ("consensus.similarity_threshold", self.consensus.similarity_threshold),
            ("consensus.min_consensus_threshold", self.consensus.min_consensus_threshold),
            ("consensus.divergence_threshold", self.consensus.divergence_threshold),
            ("selection.degraded_below", self.selection.degraded_below),
            ("selection.success_confidence", self.selection.success_confidence),
            ("orchestration.iterate_below_confidence", self.orchestration.iterate_below_confidence),
            ("learning.match_threshold", self.learning.match_threshold),
            ("runner.fallback_confidence", self.runner.fallback_confidence),
        ];
        for (field, value) in ratios {
            if !(0.0..=1.0).contains(&value) {
                issues.push(ConfigIssue::error(field, format!("{} is outside [0, 1]", value)));
            }
        }
        if self.consensus.divergence_threshold >= self.consensus.min_consensus_threshold {
            issues.push(ConfigIssue::error(
                "consensus.divergence_threshold",
                format!(
                    "{} must be below consensus.min_consensus_threshold ({})",
                    self.consensus.divergence_threshold, self.consensus.min_consensus_threshold
                ),
            ));
        }
        if self.batch.batch_size == 0 || self.batch.large_batch_size == 0 {
            issues.push(ConfigIssue::error("batch", "batch sizes must be at least 1"));
        }
        if self.selection.max_agents_per_phase == 0 {
            issues.push(ConfigIssue::error("selection.max_agents_per_phase", "must be at least 1"));
        }
        if self.orchestration.max_iterations == 0 {
            issues.push(ConfigIssue::warning(
                "orchestration.max_iterations",
                "0 is treated as 1",
            ));
        }
        if self.runner.batched_timeout_secs == 0 || self.runner.standalone_timeout_secs == 0 {
            issues.push(ConfigIssue::error("runner", "timeouts must be at least 1 second"));
        }

        // 4. Language
        if !self.orchestration.language_is_known() {
            issues.push(ConfigIssue::warning(
                "orchestration.language",
                format!("unknown language '{}', falling back to en-US", self.orchestration.language),
            ));
        }

        issues
    }
}
