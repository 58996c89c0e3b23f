//! Phase Executor
//!
//! Runs one named phase: picks the agents, hands them to the
//! [`BatchScheduler`] and aggregates their answers into a [`PhaseResult`].

use super::run_agent::AgentJob;
use super::run_batch::BatchScheduler;
use crate::config::{CallOptions, SelectionParams};
use crate::ports::progress::{ProgressNotifier, WorkflowEvent};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};
use warroom_domain::{
    Agent, AgentCatalog, AgentResponse, Language, LearningRecord, PhaseContext, PhaseDefinition,
    PhaseResult, Task,
};

/// Outcome of one phase: the aggregate plus the raw responses behind it
#[derive(Debug, Clone)]
pub struct PhaseExecution {
    pub result: PhaseResult,
    pub responses: Vec<AgentResponse>,
}

pub struct PhaseExecutor {
    catalog: Arc<AgentCatalog>,
    scheduler: BatchScheduler,
    params: SelectionParams,
    call_options: CallOptions,
}

impl PhaseExecutor {
    pub fn new(catalog: Arc<AgentCatalog>, scheduler: BatchScheduler, params: SelectionParams) -> Self {
        let call_options = scheduler.runner().params().batched;
        Self {
            catalog,
            scheduler,
            params,
            call_options,
        }
    }

    pub fn catalog(&self) -> &Arc<AgentCatalog> {
        &self.catalog
    }

    /// Choose the agents for a phase.
    ///
    /// Previously successful agents (from a matching learning record) come
    /// first, then agents whose capabilities mention a task keyword, up to
    /// the per-phase cap. If nothing qualifies, the first eligible agents
    /// are used.
    pub fn select_agents(&self, phase: &PhaseDefinition, task: &Task, learning: Option<&LearningRecord>) -> Vec<Agent> {
        let eligible: Vec<Agent> = if phase.eligible_agent_ids.is_empty() {
            self.catalog.agents().to_vec()
        } else {
            self.catalog.resolve(phase.eligible_agent_ids.iter())
        };
        let cap = self.params.max_agents_per_phase.max(1);

        let mut selected: Vec<Agent> = Vec::new();
        if let Some(record) = learning {
            selected.extend(
                eligible
                    .iter()
                    .filter(|a| record.successful_agent_ids.contains(&a.id))
                    .take(cap)
                    .cloned(),
            );
        }
        let from_learning = selected.len();

        let keywords = task.keywords();
        for agent in &eligible {
            if selected.len() >= cap {
                break;
            }
            if !selected.iter().any(|s| s.id == agent.id) && agent.matches_any_keyword(keywords.iter()) {
                selected.push(agent.clone());
            }
        }

        if selected.is_empty() {
            selected = eligible.into_iter().take(cap).collect();
        }

        debug!(
            "Phase {}: selected {} agent(s), {} from learning",
            phase.name,
            selected.len(),
            from_learning
        );
        selected
    }

    /// Run one phase end to end.
    pub async fn execute(
        &self,
        phase: &PhaseDefinition,
        task: &Task,
        context: PhaseContext,
        learning: Option<&LearningRecord>,
        language: Language,
        progress: &dyn ProgressNotifier,
    ) -> PhaseExecution {
        let started = Instant::now();
        let agents = self.select_agents(phase, task, learning);

        info!("Phase {} starting with {} agent(s)", phase.name, agents.len());
        progress.on_event(&WorkflowEvent::PhaseStarted {
            phase: phase.name.clone(),
            agent_count: agents.len(),
        });

        let job = Arc::new(
            AgentJob::new(task.clone(), phase.clone())
                .with_context(context)
                .with_language(language)
                .with_options(self.call_options),
        );
        let outcome = self.scheduler.run_phase_agents(&agents, job, progress).await;

        let result = PhaseResult::from_responses(&phase.name, &outcome.responses, self.params.degraded_below)
            .with_duration_ms(started.elapsed().as_millis() as u64);

        info!(
            "Phase {} completed: confidence {:.2}, {} ok / {} fallback{}",
            phase.name,
            result.confidence,
            result.successful,
            result.failed,
            if result.degraded { ", degraded" } else { "" }
        );
        progress.on_event(&WorkflowEvent::PhaseCompleted {
            phase: phase.name.clone(),
            confidence: result.confidence,
            degraded: result.degraded,
            successful: result.successful,
            failed: result.failed,
        });

        PhaseExecution {
            result,
            responses: outcome.responses,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BatchParams, RunnerParams};
    use crate::ports::llm_backend::LlmBackend;
    use crate::ports::response_cache::NoResponseCache;
    use crate::routing::{ProviderRouter, RoutingPolicy};
    use crate::testing::{RecordingProgress, ScriptedBackend};
    use crate::use_cases::run_agent::AgentRunner;
    use std::time::Duration;
    use warroom_domain::{AgentId, FallbackTemplates};

    fn catalog() -> AgentCatalog {
        AgentCatalog::new(vec![
            Agent::new("pm", "Paula", "Product Manager").with_capabilities(["roadmap", "pricing"]),
            Agent::new("rt", "Rui", "Realtime Engineer").with_capabilities(["websocket", "chat"]),
            Agent::new("sec", "Sofia", "Security Engineer").with_capabilities(["threat modeling"]),
            Agent::new("ux", "Uma", "UX Researcher").with_capabilities(["interviews", "chat"]),
            Agent::new("qa", "Quinn", "QA Engineer").with_capabilities(["test automation"]),
        ])
        .unwrap()
    }

    fn executor(backend: ScriptedBackend, max_agents: usize) -> PhaseExecutor {
        let router = ProviderRouter::new(
            vec![Arc::new(backend) as Arc<dyn LlmBackend>],
            RoutingPolicy::default(),
            Arc::new(NoResponseCache),
        )
        .unwrap();
        let runner = AgentRunner::new(
            Arc::new(router),
            Arc::new(FallbackTemplates::builtin()),
            RunnerParams {
                backoff_base: Duration::ZERO,
                ..RunnerParams::default()
            },
        );
        let scheduler = BatchScheduler::new(
            Arc::new(runner),
            BatchParams {
                inter_batch_delay: Duration::ZERO,
                ..BatchParams::default()
            },
        );
        PhaseExecutor::new(
            Arc::new(catalog()),
            scheduler,
            SelectionParams {
                max_agents_per_phase: max_agents,
                degraded_below: 0.7,
            },
        )
    }

    fn ids(agents: &[Agent]) -> Vec<&str> {
        agents.iter().map(|a| a.id.as_str()).collect()
    }

    #[test]
    fn test_keyword_relevant_agents_selected() {
        let executor = executor(ScriptedBackend::new("a"), 8);
        let task = Task::new("Build a chat app").unwrap();
        let phase = PhaseDefinition::new("development", "");

        assert_eq!(ids(&executor.select_agents(&phase, &task, None)), vec!["rt", "ux"]);
    }

    #[test]
    fn test_first_eligible_when_nothing_matches() {
        let executor = executor(ScriptedBackend::new("a"), 2);
        let task = Task::new("Organise the offsite").unwrap();
        let phase = PhaseDefinition::new("product", "").with_eligible(["qa", "pm", "sec"]);

        assert_eq!(ids(&executor.select_agents(&phase, &task, None)), vec!["qa", "pm"]);
    }

    #[test]
    fn test_learning_agents_come_first() {
        let executor = executor(ScriptedBackend::new("a"), 3);
        let task = Task::new("Build a chat app").unwrap();
        let phase = PhaseDefinition::new("development", "");
        let mut record = LearningRecord::new("Build a chat app");
        record.successful_agent_ids.insert(AgentId::new("qa"));
        record.successful_agent_ids.insert(AgentId::new("sec"));

        let selected = executor.select_agents(&phase, &task, Some(&record));

        assert_eq!(ids(&selected), vec!["sec", "qa", "rt"]);
    }

    #[test]
    fn test_learning_respects_eligibility() {
        let executor = executor(ScriptedBackend::new("a"), 8);
        let task = Task::new("Build a chat app").unwrap();
        let phase = PhaseDefinition::new("ux", "").with_eligible(["ux"]);
        let mut record = LearningRecord::new("Build a chat app");
        record.successful_agent_ids.insert(AgentId::new("sec"));

        assert_eq!(ids(&executor.select_agents(&phase, &task, Some(&record))), vec!["ux"]);
    }

    #[tokio::test]
    async fn test_execute_aggregates_and_reports() {
        let executor = executor(ScriptedBackend::new("a"), 8);
        let progress = RecordingProgress::default();
        let task = Task::new("Build a chat app").unwrap();

        let execution = executor
            .execute(
                &PhaseDefinition::new("development", ""),
                &task,
                PhaseContext::default(),
                None,
                Language::EnUs,
                &progress,
            )
            .await;

        assert_eq!(execution.responses.len(), 2);
        assert_eq!(execution.result.phase, "development");
        assert_eq!(execution.result.agents_used.len(), 2);
        let names = progress.names();
        assert_eq!(names.first(), Some(&"phase-started"));
        assert_eq!(names.last(), Some(&"phase-completed"));
    }
}
