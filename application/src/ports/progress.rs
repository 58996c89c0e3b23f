//! Progress notification port
//!
//! A workflow reports its progress as an ordered stream of
//! [`WorkflowEvent`]s:
//!
//! ```text
//! workflow-started → phase-started → agent-processing → agent-response → phase-completed
//!                    [repeat per phase]
//!                  → consensus-computed → synthesis-ready → workflow-completed
//! ```

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use warroom_domain::{AgentId, Synthesis};

/// One progress event, serialised with a kebab-case `type` tag.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum WorkflowEvent {
    WorkflowStarted {
        workflow_id: String,
        task: String,
        phases: Vec<String>,
        max_iterations: u32,
    },
    IterationStarted {
        workflow_id: String,
        iteration: u32,
        learning_applied: bool,
    },
    PhaseStarted {
        phase: String,
        agent_count: usize,
    },
    AgentProcessing {
        phase: String,
        agent_id: AgentId,
        agent_name: String,
        /// 1-based position within the phase
        position: usize,
        total: usize,
    },
    AgentResponse {
        phase: String,
        agent_id: AgentId,
        agent_name: String,
        content: String,
        confidence: f64,
        succeeded: bool,
        provider: String,
        cached: bool,
    },
    PhaseCompleted {
        phase: String,
        confidence: f64,
        degraded: bool,
        successful: usize,
        failed: usize,
    },
    ConsensusComputed {
        consensus_level: f64,
        clusters: usize,
    },
    SynthesisReady {
        synthesis: Box<Synthesis>,
    },
    WorkflowCompleted {
        workflow_id: String,
        iteration: u32,
        total_agents_activated: usize,
        duration_ms: u64,
    },
    WorkflowCancelled {
        workflow_id: String,
        iteration: u32,
    },
    WorkflowError {
        workflow_id: String,
        message: String,
    },
}

impl WorkflowEvent {
    /// The kebab-case event name.
    pub fn name(&self) -> &'static str {
        match self {
            WorkflowEvent::WorkflowStarted { .. } => "workflow-started",
            WorkflowEvent::IterationStarted { .. } => "iteration-started",
            WorkflowEvent::PhaseStarted { .. } => "phase-started",
            WorkflowEvent::AgentProcessing { .. } => "agent-processing",
            WorkflowEvent::AgentResponse { .. } => "agent-response",
            WorkflowEvent::PhaseCompleted { .. } => "phase-completed",
            WorkflowEvent::ConsensusComputed { .. } => "consensus-computed",
            WorkflowEvent::SynthesisReady { .. } => "synthesis-ready",
            WorkflowEvent::WorkflowCompleted { .. } => "workflow-completed",
            WorkflowEvent::WorkflowCancelled { .. } => "workflow-cancelled",
            WorkflowEvent::WorkflowError { .. } => "workflow-error",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            WorkflowEvent::WorkflowCompleted { .. }
                | WorkflowEvent::WorkflowCancelled { .. }
                | WorkflowEvent::WorkflowError { .. }
        )
    }
}

/// Callback for progress updates during a workflow
///
/// Implementations live in the presentation and infrastructure layers
/// (console reporter, JSONL event log) and must not block.
pub trait ProgressNotifier: Send + Sync {
    fn on_event(&self, event: &WorkflowEvent);
}

/// No-op progress notifier for when progress reporting is not needed
pub struct NoProgress;

impl ProgressNotifier for NoProgress {
    fn on_event(&self, _event: &WorkflowEvent) {}
}

/// Forwards events into an unbounded channel.
///
/// A closed receiver is ignored; the workflow keeps running.
pub struct ChannelProgress {
    sender: mpsc::UnboundedSender<WorkflowEvent>,
}

impl ChannelProgress {
    pub fn new(sender: mpsc::UnboundedSender<WorkflowEvent>) -> Self {
        Self { sender }
    }
}

impl ProgressNotifier for ChannelProgress {
    fn on_event(&self, event: &WorkflowEvent) {
        let _ = self.sender.send(event.clone());
    }
}
