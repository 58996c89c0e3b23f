//! Execution parameters — orchestration loop control.
//!
//! These are application-layer knobs: call deadlines and retries, batch
//! sizing, agent selection and iteration thresholds. The infrastructure
//! config loader fills them from the `[runner]`, `[batch]`, `[selection]`
//! and `[orchestration]` sections.

use std::time::Duration;
use warroom_domain::{ConsensusConfig, LearningPolicy};

/// Deadline and attempt budget for one agent call.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CallOptions {
    pub timeout: Duration,
    /// Total attempts per backend (at least one is always made)
    pub max_retries: u32,
}

impl CallOptions {
    /// Calls made inside a batch.
    pub fn batched() -> Self {
        Self {
            timeout: Duration::from_secs(20),
            max_retries: 1,
        }
    }

    /// Single calls made outside a workflow.
    pub fn standalone() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            max_retries: 3,
        }
    }

    pub fn attempts(&self) -> u32 {
        self.max_retries.max(1)
    }
}

/// Agent Runner behaviour.
#[derive(Debug, Clone, PartialEq)]
pub struct RunnerParams {
    pub batched: CallOptions,
    pub standalone: CallOptions,
    /// Delay after the first failed attempt; doubles each retry
    pub backoff_base: Duration,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Confidence assigned to templated fallback answers
    pub fallback_confidence: f64,
}

impl Default for RunnerParams {
    fn default() -> Self {
        Self {
            batched: CallOptions::batched(),
            standalone: CallOptions::standalone(),
            backoff_base: Duration::from_secs(1),
            temperature: 0.7,
            max_tokens: 2000,
            fallback_confidence: 0.5,
        }
    }
}

impl RunnerParams {
    /// Backoff before retry number `attempt` (1-based): `base * 2^(attempt-1)`.
    pub fn backoff_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        self.backoff_base.saturating_mul(1u32 << exponent)
    }
}

/// Batch Scheduler sizing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BatchParams {
    pub batch_size: usize,
    /// Batch size once the agent count exceeds `large_request_threshold`
    pub large_batch_size: usize,
    pub large_request_threshold: usize,
    pub inter_batch_delay: Duration,
}

impl Default for BatchParams {
    fn default() -> Self {
        Self {
            batch_size: 10,
            large_batch_size: 15,
            large_request_threshold: 20,
            inter_batch_delay: Duration::from_millis(200),
        }
    }
}

impl BatchParams {
    pub fn size_for(&self, agents: usize) -> usize {
        let size = if agents > self.large_request_threshold {
            self.large_batch_size
        } else {
            self.batch_size
        };
        size.max(1)
    }
}

/// Phase Executor agent selection.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectionParams {
    pub max_agents_per_phase: usize,
    /// Phases below this mean confidence are degraded
    pub degraded_below: f64,
}

impl Default for SelectionParams {
    fn default() -> Self {
        Self {
            max_agents_per_phase: 8,
            degraded_below: 0.7,
        }
    }
}

/// Workflow Orchestrator iteration control.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IterationParams {
    pub max_iterations: u32,
    /// Another pass is wanted when mean phase confidence is below this
    pub iterate_below: f64,
    /// End the pass at the first degraded phase
    pub stop_on_degraded_phase: bool,
}

impl Default for IterationParams {
    fn default() -> Self {
        Self {
            max_iterations: 3,
            iterate_below: 0.75,
            stop_on_degraded_phase: false,
        }
    }
}

/// Every knob of the orchestration engine.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExecutionParams {
    pub runner: RunnerParams,
    pub batch: BatchParams,
    pub selection: SelectionParams,
    pub iteration: IterationParams,
    pub consensus: ConsensusConfig,
    pub learning: LearningPolicy,
}

impl ExecutionParams {
    // ==================== Builder Methods ====================

    pub fn with_runner(mut self, runner: RunnerParams) -> Self {
        self.runner = runner;
        self
    }

    pub fn with_batch(mut self, batch: BatchParams) -> Self {
        self.batch = batch;
        self
    }

    pub fn with_selection(mut self, selection: SelectionParams) -> Self {
        self.selection = selection;
        self
    }

    pub fn with_iteration(mut self, iteration: IterationParams) -> Self {
        self.iteration = iteration;
        self
    }

    pub fn with_consensus(mut self, consensus: ConsensusConfig) -> Self {
        self.consensus = consensus;
        self
    }

    pub fn with_learning(mut self, learning: LearningPolicy) -> Self {
        self.learning = learning;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let params = ExecutionParams::default();
        assert_eq!(params.runner.batched.timeout, Duration::from_secs(20));
        assert_eq!(params.runner.standalone.max_retries, 3);
        assert_eq!(params.batch.batch_size, 10);
        assert_eq!(params.selection.max_agents_per_phase, 8);
        assert_eq!(params.iteration.max_iterations, 3);
        assert_eq!(params.consensus.similarity_threshold, 0.85);
    }

    #[test]
    fn test_batch_size_switch() {
        let batch = BatchParams::default();
        assert_eq!(batch.size_for(5), 10);
        assert_eq!(batch.size_for(20), 10);
        assert_eq!(batch.size_for(21), 15);
    }

    #[test]
    fn test_backoff_doubles() {
        let runner = RunnerParams::default();
        assert_eq!(runner.backoff_for(1), Duration::from_secs(1));
        assert_eq!(runner.backoff_for(2), Duration::from_secs(2));
        assert_eq!(runner.backoff_for(3), Duration::from_secs(4));
    }

    #[test]
    fn test_attempts_never_zero() {
        let options = CallOptions {
            timeout: Duration::from_secs(1),
            max_retries: 0,
        };
        assert_eq!(options.attempts(), 1);
    }

    #[test]
    fn test_builder() {
        let params = ExecutionParams::default().with_batch(BatchParams {
            batch_size: 2,
            ..BatchParams::default()
        });
        assert_eq!(params.batch.batch_size, 2);
    }
}
