//! Batch Scheduler
//!
//! Runs a phase's agents in sequential batches. Within a batch every agent
//! runs concurrently and the batch ends when all of them have answered,
//! with a real reply or a fallback. A short pause between batches keeps
//! the backends from saturating.

use super::run_agent::{AgentJob, AgentRunner};
use crate::config::BatchParams;
use crate::ports::progress::{ProgressNotifier, WorkflowEvent};
use futures::StreamExt;
use futures::stream::FuturesUnordered;
use std::sync::Arc;
use tracing::{debug, error};
use warroom_domain::{Agent, AgentResponse, ErrorKind};

/// All responses of one phase run, plus running counts
#[derive(Debug, Clone, Default)]
pub struct BatchOutcome {
    /// One per agent, in completion order
    pub responses: Vec<AgentResponse>,
    pub successful: usize,
    pub failed: usize,
    pub cache_hits: usize,
    pub batches: usize,
}

impl BatchOutcome {
    fn push(&mut self, response: AgentResponse) {
        if response.succeeded {
            self.successful += 1;
        } else {
            self.failed += 1;
        }
        if response.cached {
            self.cache_hits += 1;
        }
        self.responses.push(response);
    }
}

pub struct BatchScheduler {
    runner: Arc<AgentRunner>,
    params: BatchParams,
}

impl BatchScheduler {
    pub fn new(runner: Arc<AgentRunner>, params: BatchParams) -> Self {
        Self { runner, params }
    }

    pub fn runner(&self) -> &Arc<AgentRunner> {
        &self.runner
    }

    pub fn batch_size_for(&self, agents: usize) -> usize {
        self.params.size_for(agents)
    }

    /// Run every agent once for the job's phase.
    ///
    /// Always returns exactly one response per agent.
    pub async fn run_phase_agents(
        &self,
        agents: &[Agent],
        job: Arc<AgentJob>,
        progress: &dyn ProgressNotifier,
    ) -> BatchOutcome {
        let total = agents.len();
        let size = self.batch_size_for(total);
        let mut outcome = BatchOutcome::default();

        for (batch_index, batch) in agents.chunks(size).enumerate() {
            if batch_index > 0 && !self.params.inter_batch_delay.is_zero() {
                tokio::time::sleep(self.params.inter_batch_delay).await;
            }
            debug!(
                "Phase {}: batch {} with {} agent(s)",
                job.phase.name,
                batch_index + 1,
                batch.len()
            );

            let mut in_flight = FuturesUnordered::new();
            for (offset, agent) in batch.iter().enumerate() {
                progress.on_event(&WorkflowEvent::AgentProcessing {
                    phase: job.phase.name.clone(),
                    agent_id: agent.id.clone(),
                    agent_name: agent.name.clone(),
                    position: batch_index * size + offset + 1,
                    total,
                });

                let runner = Arc::clone(&self.runner);
                let job = Arc::clone(&job);
                let owned = agent.clone();
                let handle = tokio::spawn(async move { runner.run(&owned, &job).await });
                in_flight.push(async move { (agent, handle.await) });
            }

            while let Some((agent, joined)) = in_flight.next().await {
                let response = match joined {
                    Ok(response) => response,
                    Err(e) => {
                        error!("Agent task for {} failed: {}", agent.id, e);
                        self.runner.fallback_for(agent, &job, ErrorKind::Internal, 0)
                    }
                };

                progress.on_event(&WorkflowEvent::AgentResponse {
                    phase: job.phase.name.clone(),
                    agent_id: response.agent_id.clone(),
                    agent_name: response.agent_name.clone(),
                    content: response.content.clone(),
                    confidence: response.confidence,
                    succeeded: response.succeeded,
                    provider: response.provider.clone(),
                    cached: response.cached,
                });
                outcome.push(response);
            }
            outcome.batches += 1;
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{CallOptions, RunnerParams};
    use crate::ports::llm_backend::{BackendError, LlmBackend};
    use crate::ports::response_cache::NoResponseCache;
    use crate::routing::{ProviderRouter, RoutingPolicy};
    use crate::testing::{RecordingProgress, ScriptedBackend};
    use std::collections::BTreeSet;
    use std::time::Duration;
    use warroom_domain::{FallbackTemplates, PhaseDefinition, PhaseResult, Task};

    fn agents(n: usize) -> Vec<Agent> {
        (0..n)
            .map(|i| Agent::new(format!("agent-{}", i), format!("Agent {}", i), "Engineer"))
            .collect()
    }

    fn scheduler(backend: ScriptedBackend, batch: BatchParams) -> BatchScheduler {
        let router = ProviderRouter::new(
            vec![Arc::new(backend) as Arc<dyn LlmBackend>],
            RoutingPolicy::default(),
            Arc::new(NoResponseCache),
        )
        .unwrap();
        let params = RunnerParams {
            backoff_base: Duration::ZERO,
            ..RunnerParams::default()
        };
        let runner = AgentRunner::new(Arc::new(router), Arc::new(FallbackTemplates::builtin()), params);
        BatchScheduler::new(Arc::new(runner), batch)
    }

    fn job() -> Arc<AgentJob> {
        Arc::new(
            AgentJob::new(
                Task::new("Build a chat app").unwrap(),
                PhaseDefinition::new("development", "Implementation"),
            )
            .with_options(CallOptions {
                timeout: Duration::from_secs(5),
                max_retries: 1,
            }),
        )
    }

    fn no_delay() -> BatchParams {
        BatchParams {
            inter_batch_delay: Duration::ZERO,
            ..BatchParams::default()
        }
    }

    #[test]
    fn test_batch_size_raised_for_large_requests() {
        let scheduler = scheduler(ScriptedBackend::new("a"), BatchParams::default());
        assert_eq!(scheduler.batch_size_for(12), 10);
        assert_eq!(scheduler.batch_size_for(25), 15);
    }

    #[tokio::test]
    async fn test_one_response_per_agent() {
        let scheduler = scheduler(ScriptedBackend::new("a"), no_delay());
        let agents = agents(23);

        let outcome = scheduler.run_phase_agents(&agents, job(), &RecordingProgress::default()).await;

        assert_eq!(outcome.responses.len(), 23);
        assert_eq!(outcome.batches, 2);
        assert_eq!(outcome.successful, 23);
        let ids: BTreeSet<_> = outcome.responses.iter().map(|r| r.agent_id.clone()).collect();
        assert_eq!(ids.len(), 23);
    }

    #[tokio::test]
    async fn test_failures_do_not_abort_the_batch() {
        let backend = ScriptedBackend::new("a")
            .with_reply(Err(BackendError::ClientError("HTTP 400".into())))
            .with_reply(Err(BackendError::ServerError("HTTP 500".into())));
        let scheduler = scheduler(backend, no_delay());

        let outcome = scheduler.run_phase_agents(&agents(5), job(), &RecordingProgress::default()).await;

        assert_eq!(outcome.responses.len(), 5);
        assert_eq!(outcome.failed, 2);
        assert_eq!(outcome.successful, 3);
    }

    #[tokio::test]
    async fn test_panicking_agent_task_becomes_internal_fallback() {
        let backend = ScriptedBackend::new("a").with_responder(|_| panic!("backend blew up"));
        let scheduler = scheduler(backend, no_delay());
        let progress = RecordingProgress::default();

        let outcome = scheduler.run_phase_agents(&agents(3), job(), &progress).await;

        assert_eq!(outcome.responses.len(), 3);
        assert_eq!(outcome.failed, 3);
        assert!(outcome.responses.iter().all(|r| !r.succeeded));
        assert!(outcome.responses.iter().all(|r| r.error_kind == Some(ErrorKind::Internal)));
        assert_eq!(progress.names().iter().filter(|n| **n == "agent-response").count(), 3);
    }

    #[tokio::test]
    async fn test_all_timeouts_give_degraded_phase() {
        let backend = ScriptedBackend::new("a").with_responder(|_| Err(BackendError::Timeout(Duration::from_secs(20))));
        let scheduler = scheduler(backend, no_delay());

        let outcome = scheduler.run_phase_agents(&agents(5), job(), &RecordingProgress::default()).await;
        let result = PhaseResult::from_responses("development", &outcome.responses, 0.7);

        assert_eq!(outcome.failed, 5);
        assert!(outcome.responses.iter().all(|r| r.error_kind == Some(ErrorKind::BackendTimeout)));
        assert!((result.confidence - 0.5).abs() < 1e-9);
        assert!(result.degraded);
    }

    #[tokio::test]
    async fn test_events_per_agent() {
        let scheduler = scheduler(ScriptedBackend::new("a"), no_delay());
        let progress = RecordingProgress::default();

        scheduler.run_phase_agents(&agents(3), job(), &progress).await;

        let names = progress.names();
        assert_eq!(names.iter().filter(|n| **n == "agent-processing").count(), 3);
        assert_eq!(names.iter().filter(|n| **n == "agent-response").count(), 3);
        assert_eq!(names[0], "agent-processing");
        let positions: Vec<usize> = progress
            .events()
            .iter()
            .filter_map(|e| match e {
                WorkflowEvent::AgentProcessing { position, total, .. } => {
                    assert_eq!(*total, 3);
                    Some(*position)
                }
                _ => None,
            })
            .collect();
        assert_eq!(positions, vec![1, 2, 3]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_delay_between_batches() {
        let scheduler = scheduler(
            ScriptedBackend::new("a"),
            BatchParams {
                batch_size: 2,
                large_batch_size: 2,
                large_request_threshold: 100,
                inter_batch_delay: Duration::from_millis(200),
            },
        );
        let started = tokio::time::Instant::now();

        let outcome = scheduler.run_phase_agents(&agents(5), job(), &RecordingProgress::default()).await;

        assert_eq!(outcome.batches, 3);
        assert!(started.elapsed() >= Duration::from_millis(400));
    }

    #[tokio::test]
    async fn test_empty_agent_list() {
        let scheduler = scheduler(ScriptedBackend::new("a"), no_delay());
        let outcome = scheduler.run_phase_agents(&[], job(), &RecordingProgress::default()).await;
        assert!(outcome.responses.is_empty());
        assert_eq!(outcome.batches, 0);
    }
}
