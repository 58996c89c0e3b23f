//! Workflow Orchestrator
//!
//! Drives a task through the configured phases, aggregates the answers
//! into consensus and synthesis, records what was learned and decides
//! whether another pass is worthwhile.
//!
//! ```text
//! Pending → Running(phase)… → Aggregating → Iterating → Running(phase)…
//!                                         ↘ Completed
//! ```
//!
//! Cancellation is cooperative and only observed between phases, so every
//! recorded [`PhaseResult`](warroom_domain::PhaseResult) is complete.

use super::execute_phase::PhaseExecutor;
use crate::config::{ExecutionParams, IterationParams};
use crate::ports::learning_store::LearningStore;
use crate::ports::progress::{ChannelProgress, NoProgress, ProgressNotifier, WorkflowEvent};
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use uuid::Uuid;
use warroom_domain::{
    AgentResponse, ConsensusAnalysis, ConsensusAnalyzer, DomainError, FinalReport, Language,
    LearningPolicy, LearningRecord, MetaSynthesizer, PhaseContext, PhasePlan, Synthesis, Task,
    WorkflowRun, WorkflowState,
};

/// Errors that end a workflow without a report
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WorkflowError {
    #[error("Workflow {workflow_id} was cancelled during iteration {iteration}")]
    Cancelled { workflow_id: String, iteration: u32 },

    #[error("No phases selected")]
    NoPhases,

    #[error("Unknown phase: {0}")]
    UnknownPhase(String),

    #[error("Internal error: {0}")]
    Internal(String),

    #[error(transparent)]
    Domain(DomainError),
}

impl From<DomainError> for WorkflowError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::UnknownPhase(name) => WorkflowError::UnknownPhase(name),
            other => WorkflowError::Domain(other),
        }
    }
}

impl WorkflowError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, WorkflowError::Cancelled { .. })
    }
}

/// Per-run options chosen by the caller
#[derive(Debug, Clone, Default)]
pub struct WorkflowConfig {
    /// Phase names to run, in plan order; empty means every phase
    pub selected_phases: Vec<String>,
    /// Overrides the configured iteration cap
    pub max_iterations: Option<u32>,
    pub language: Language,
    /// Populate the deep-analysis layer of the synthesis
    pub include_deep_analysis: bool,
}

impl WorkflowConfig {
    pub fn with_phases<I, S>(mut self, phases: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.selected_phases = phases.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: u32) -> Self {
        self.max_iterations = Some(max_iterations);
        self
    }

    pub fn with_language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }

    pub fn with_deep_analysis(mut self, enabled: bool) -> Self {
        self.include_deep_analysis = enabled;
        self
    }
}

#[derive(Debug, Clone)]
pub struct WorkflowInput {
    pub task: Task,
    pub config: WorkflowConfig,
    /// Generated when absent
    pub workflow_id: Option<String>,
}

impl WorkflowInput {
    pub fn new(task: Task) -> Self {
        Self {
            task,
            config: WorkflowConfig::default(),
            workflow_id: None,
        }
    }

    pub fn with_config(mut self, config: WorkflowConfig) -> Self {
        self.config = config;
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.workflow_id = Some(id.into());
        self
    }
}

/// A workflow running on its own task
pub struct WorkflowHandle {
    pub id: String,
    pub events: mpsc::UnboundedReceiver<WorkflowEvent>,
    cancel: CancellationToken,
    join: JoinHandle<Result<FinalReport, WorkflowError>>,
}

impl WorkflowHandle {
    /// Request cancellation; honoured at the next phase boundary.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Wait for the run to finish. Unread events are discarded.
    pub async fn wait(self) -> Result<FinalReport, WorkflowError> {
        match self.join.await {
            Ok(result) => result,
            Err(e) => Err(WorkflowError::Internal(e.to_string())),
        }
    }
}

pub struct WorkflowOrchestrator {
    executor: PhaseExecutor,
    plan: Arc<PhasePlan>,
    analyzer: ConsensusAnalyzer,
    synthesizer: MetaSynthesizer,
    learning: Arc<dyn LearningStore>,
    iteration: IterationParams,
    learning_policy: LearningPolicy,
}

impl WorkflowOrchestrator {
    /// Build an orchestrator, checking the plan against the agent catalog.
    pub fn new(
        executor: PhaseExecutor,
        plan: Arc<PhasePlan>,
        learning: Arc<dyn LearningStore>,
        params: &ExecutionParams,
    ) -> Result<Self, WorkflowError> {
        if plan.is_empty() {
            return Err(WorkflowError::NoPhases);
        }
        plan.validate_against(executor.catalog())?;

        Ok(Self {
            executor,
            plan,
            analyzer: ConsensusAnalyzer::new(params.consensus),
            synthesizer: MetaSynthesizer::new(),
            learning,
            iteration: params.iteration,
            learning_policy: params.learning,
        })
    }

    pub fn with_analyzer(mut self, analyzer: ConsensusAnalyzer) -> Self {
        self.analyzer = analyzer;
        self
    }

    pub fn plan(&self) -> &PhasePlan {
        &self.plan
    }

    pub fn executor(&self) -> &PhaseExecutor {
        &self.executor
    }

    /// Run to completion without progress reporting.
    pub async fn execute(&self, input: WorkflowInput) -> Result<FinalReport, WorkflowError> {
        self.execute_with_progress(input, &NoProgress, &CancellationToken::new())
            .await
    }

    /// Run to completion, reporting every step to `progress`.
    pub async fn execute_with_progress(
        &self,
        input: WorkflowInput,
        progress: &dyn ProgressNotifier,
        cancel: &CancellationToken,
    ) -> Result<FinalReport, WorkflowError> {
        let workflow_id = input
            .workflow_id
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string());

        let result = self.drive(&workflow_id, input, progress, cancel).await;

        match &result {
            Ok(report) => info!(
                "Workflow {} completed after {} iteration(s) in {}ms",
                workflow_id, report.iteration, report.duration_ms
            ),
            Err(WorkflowError::Cancelled { iteration, .. }) => {
                info!("Workflow {} cancelled during iteration {}", workflow_id, iteration)
            }
            Err(e) => {
                error!("Workflow {} failed: {}", workflow_id, e);
                progress.on_event(&WorkflowEvent::WorkflowError {
                    workflow_id: workflow_id.clone(),
                    message: e.to_string(),
                });
            }
        }
        result
    }

    /// Spawn the run and stream its events through a channel.
    pub fn start(self: &Arc<Self>, input: WorkflowInput) -> WorkflowHandle {
        let id = input
            .workflow_id
            .clone()
            .unwrap_or_else(|| Uuid::new_v4().to_string());
        let input = input.with_id(id.clone());
        let (sender, events) = mpsc::unbounded_channel();
        let cancel = CancellationToken::new();

        let orchestrator = Arc::clone(self);
        let run_cancel = cancel.clone();
        let run_sender = sender.clone();
        let run = tokio::spawn(async move {
            let progress = ChannelProgress::new(run_sender);
            orchestrator
                .execute_with_progress(input, &progress, &run_cancel)
                .await
        });

        let supervised_id = id.clone();
        let join = tokio::spawn(async move {
            match run.await {
                Ok(result) => result,
                Err(e) => {
                    let message = format!("workflow task aborted: {}", e);
                    error!("Workflow {}: {}", supervised_id, message);
                    let _ = sender.send(WorkflowEvent::WorkflowError {
                        workflow_id: supervised_id,
                        message: message.clone(),
                    });
                    Err(WorkflowError::Internal(message))
                }
            }
        });

        WorkflowHandle {
            id,
            events,
            cancel,
            join,
        }
    }

    async fn drive(
        &self,
        workflow_id: &str,
        input: WorkflowInput,
        progress: &dyn ProgressNotifier,
        cancel: &CancellationToken,
    ) -> Result<FinalReport, WorkflowError> {
        let WorkflowInput { task, config, .. } = input;
        let phases = self.plan.select(&config.selected_phases)?;
        if phases.is_empty() {
            return Err(WorkflowError::NoPhases);
        }
        let max_iterations = config
            .max_iterations
            .unwrap_or(self.iteration.max_iterations)
            .max(1);

        let mut run = WorkflowRun::new(workflow_id, task, max_iterations);
        info!(
            "Workflow {} started: {} phase(s), up to {} iteration(s)",
            workflow_id,
            phases.len(),
            max_iterations
        );
        progress.on_event(&WorkflowEvent::WorkflowStarted {
            workflow_id: workflow_id.to_string(),
            task: run.task().description().to_string(),
            phases: phases.iter().map(|p| p.name.clone()).collect(),
            max_iterations,
        });

        let mut learning = self.learning.find(run.task().description());
        if learning.is_some() {
            info!("Workflow {}: reusing learning from a similar task", workflow_id);
        }

        loop {
            if cancel.is_cancelled() {
                return Err(Self::cancelled(&mut run, progress));
            }
            let iteration = run.begin_iteration()?;
            if iteration > 1 {
                progress.on_event(&WorkflowEvent::IterationStarted {
                    workflow_id: workflow_id.to_string(),
                    iteration,
                    learning_applied: learning.is_some(),
                });
            }

            for phase in &phases {
                if cancel.is_cancelled() {
                    return Err(Self::cancelled(&mut run, progress));
                }
                run.transition(WorkflowState::Running(phase.name.clone()))?;

                let context = PhaseContext::from_results(run.phase_results()).with_learning(learning.as_ref());
                let execution = self
                    .executor
                    .execute(phase, run.task(), context, learning.as_ref(), config.language, progress)
                    .await;

                let degraded = execution.result.degraded;
                run.record_phase(execution.result, execution.responses);
                if degraded && self.iteration.stop_on_degraded_phase {
                    warn!("Phase {} degraded; ending this pass early", phase.name);
                    break;
                }
            }

            run.transition(WorkflowState::Aggregating)?;
            let consensus = self.analyze(run.responses());
            progress.on_event(&WorkflowEvent::ConsensusComputed {
                consensus_level: consensus.consensus_level,
                clusters: consensus.cluster_count(),
            });

            let synthesis = self.synthesize(run.task(), &consensus, config.include_deep_analysis);
            progress.on_event(&WorkflowEvent::SynthesisReady {
                synthesis: Box::new(synthesis.clone()),
            });

            let record = LearningRecord::derive(
                run.task().description(),
                workflow_id,
                iteration,
                run.phase_results(),
                run.responses(),
                run.elapsed_ms(),
                &self.learning_policy,
            );
            if let Err(e) = self.learning.record(record.clone()) {
                warn!("Failed to store learning for workflow {}: {}", workflow_id, e);
            }
            learning = Some(record);

            let wants_another =
                run.has_high_blocker() || run.mean_phase_confidence() < self.iteration.iterate_below;
            run.close_iteration();

            if wants_another && run.can_iterate() {
                info!(
                    "Workflow {}: iteration {} below the bar (confidence {:.2}); iterating",
                    workflow_id,
                    iteration,
                    run.mean_phase_confidence()
                );
                run.transition(WorkflowState::Iterating)?;
                continue;
            }

            let capped = wants_another && !run.can_iterate();
            if capped {
                warn!(
                    "Workflow {} reached its iteration cap of {}",
                    workflow_id,
                    run.max_iterations()
                );
            }
            run.transition(WorkflowState::Completed)?;

            let report = FinalReport::compile(&run, consensus, synthesis, capped);
            progress.on_event(&WorkflowEvent::WorkflowCompleted {
                workflow_id: workflow_id.to_string(),
                iteration: report.iteration,
                total_agents_activated: report.summary.agents_activated,
                duration_ms: report.duration_ms,
            });
            return Ok(report);
        }
    }

    /// Cluster the responses; a panic in clustering yields an empty analysis.
    fn analyze(&self, responses: &[AgentResponse]) -> ConsensusAnalysis {
        match catch_unwind(AssertUnwindSafe(|| self.analyzer.analyze(responses))) {
            Ok(analysis) => analysis,
            Err(_) => {
                error!(
                    "Consensus clustering failed over {} response(s); continuing with an empty analysis",
                    responses.len()
                );
                ConsensusAnalysis::default()
            }
        }
    }

    fn synthesize(&self, task: &Task, consensus: &ConsensusAnalysis, deep: bool) -> Synthesis {
        if deep {
            self.synthesizer
                .synthesize_deep(task.description(), consensus, &self.analyzer)
        } else {
            self.synthesizer.synthesize(task.description(), consensus)
        }
    }

    fn cancelled(run: &mut WorkflowRun, progress: &dyn ProgressNotifier) -> WorkflowError {
        if let Err(e) = run.transition(WorkflowState::Cancelled) {
            warn!("Cancelling workflow {}: {}", run.id(), e);
        }
        progress.on_event(&WorkflowEvent::WorkflowCancelled {
            workflow_id: run.id().to_string(),
            iteration: run.iteration(),
        });
        WorkflowError::Cancelled {
            workflow_id: run.id().to_string(),
            iteration: run.iteration(),
        }
    }
}
