//! Execution tuning from TOML (`[runner]`, `[batch]` and `[selection]` sections)
//!
//! ```toml
//! [runner]
//! batched_timeout_secs = 20
//! batched_max_retries = 1
//! standalone_timeout_secs = 30
//! standalone_max_retries = 3
//! backoff_base_ms = 1000
//!
//! [batch]
//! batch_size = 10
//! large_batch_size = 15
//! large_request_threshold = 20
//! inter_batch_delay_ms = 200
//!
//! [selection]
//! max_agents_per_phase = 8
//! degraded_below = 0.7
//! success_confidence = 0.7
//! ```

use serde::{Deserialize, Serialize};
use std::time::Duration;
use warroom_application::{BatchParams, CallOptions, RunnerParams, SelectionParams};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileRunnerConfig {
    pub batched_timeout_secs: u64,
    pub batched_max_retries: u32,
    pub standalone_timeout_secs: u64,
    pub standalone_max_retries: u32,
    pub backoff_base_ms: u64,
    pub temperature: f32,
    pub max_tokens: u32,
    pub fallback_confidence: f64,
}

impl Default for FileRunnerConfig {
    fn default() -> Self {
        let params = RunnerParams::default();
        Self {
            batched_timeout_secs: params.batched.timeout.as_secs(),
            batched_max_retries: params.batched.max_retries,
            standalone_timeout_secs: params.standalone.timeout.as_secs(),
            standalone_max_retries: params.standalone.max_retries,
            backoff_base_ms: params.backoff_base.as_millis() as u64,
            temperature: params.temperature,
            max_tokens: params.max_tokens,
            fallback_confidence: params.fallback_confidence,
        }
    }
}

impl FileRunnerConfig {
    pub fn to_params(&self) -> RunnerParams {
        RunnerParams {
            batched: CallOptions {
                timeout: Duration::from_secs(self.batched_timeout_secs),
                max_retries: self.batched_max_retries,
            },
            standalone: CallOptions {
                timeout: Duration::from_secs(self.standalone_timeout_secs),
                max_retries: self.standalone_max_retries,
            },
            backoff_base: Duration::from_millis(self.backoff_base_ms),
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            fallback_confidence: self.fallback_confidence.clamp(0.0, 1.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileBatchConfig {
    pub batch_size: usize,
    pub large_batch_size: usize,
    pub large_request_threshold: usize,
    pub inter_batch_delay_ms: u64,
}

impl Default for FileBatchConfig {
    fn default() -> Self {
        let params = BatchParams::default();
        Self {
            batch_size: params.batch_size,
            large_batch_size: params.large_batch_size,
            large_request_threshold: params.large_request_threshold,
            inter_batch_delay_ms: params.inter_batch_delay.as_millis() as u64,
        }
    }
}

impl FileBatchConfig {
    pub fn to_params(&self) -> BatchParams {
        BatchParams {
            batch_size: self.batch_size,
            large_batch_size: self.large_batch_size,
            large_request_threshold: self.large_request_threshold,
            inter_batch_delay: Duration::from_millis(self.inter_batch_delay_ms),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileSelectionConfig {
    pub max_agents_per_phase: usize,
    /// Phases below this mean confidence are degraded
    pub degraded_below: f64,
    /// Responses at or above this confidence count as successful for learning
    pub success_confidence: f64,
}

impl Default for FileSelectionConfig {
    fn default() -> Self {
        let params = SelectionParams::default();
        Self {
            max_agents_per_phase: params.max_agents_per_phase,
            degraded_below: params.degraded_below,
            success_confidence: 0.7,
        }
    }
}

impl FileSelectionConfig {
    pub fn to_params(&self) -> SelectionParams {
        SelectionParams {
            max_agents_per_phase: self.max_agents_per_phase,
            degraded_below: self.degraded_below,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_application_params() {
        assert_eq!(FileRunnerConfig::default().to_params(), RunnerParams::default());
        assert_eq!(FileBatchConfig::default().to_params(), BatchParams::default());
        assert_eq!(FileSelectionConfig::default().to_params(), SelectionParams::default());
    }

    #[test]
    fn test_partial_runner_section() {
        let config: FileRunnerConfig = toml::from_str("batched_timeout_secs = 5").unwrap();
        let params = config.to_params();
        assert_eq!(params.batched.timeout, Duration::from_secs(5));
        assert_eq!(params.standalone.max_retries, 3);
    }
}
