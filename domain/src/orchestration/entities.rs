//! Orchestration domain entities
//!
//! - [`PhaseDefinition`] / [`PhasePlan`] - static, ordered phase configuration
//! - [`PhaseResult`] - aggregated outcome of one phase
//! - [`WorkflowRun`] - the mutable record of a run, owned by the orchestrator

use super::report::IterationSummary;
use super::value_objects::{AgentResponse, Blocker, Decision, Insight, Severity};
use crate::core::agent::{AgentCatalog, AgentId};
use crate::core::error::DomainError;
use crate::core::task::Task;
use crate::util::now_millis;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;

/// Default execution order of the phases.
pub const DEFAULT_PHASE_ORDER: &[&str] = &[
    "brainstorm",
    "development",
    "product",
    "ux",
    "design",
    "marketing",
    "security",
    "testing",
];

/// A named phase and the agents allowed to take part in it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseDefinition {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, rename = "eligible_agents")]
    pub eligible_agent_ids: Vec<AgentId>,
}

impl PhaseDefinition {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            eligible_agent_ids: Vec::new(),
        }
    }

    pub fn with_eligible<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.eligible_agent_ids = ids.into_iter().map(|id| AgentId::new(id)).collect();
        self
    }
}

/// Ordered list of phases; order defines execution sequence.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PhasePlan {
    phases: Vec<PhaseDefinition>,
}

impl PhasePlan {
    /// Build a plan, rejecting blank or repeated phase names.
    pub fn new(phases: Vec<PhaseDefinition>) -> Result<Self, DomainError> {
        let mut seen = HashSet::new();
        for phase in &phases {
            if phase.name.trim().is_empty() || !seen.insert(phase.name.as_str()) {
                return Err(DomainError::InvalidPhaseName(phase.name.clone()));
            }
        }
        Ok(Self { phases })
    }

    pub fn phases(&self) -> &[PhaseDefinition] {
        &self.phases
    }

    pub fn get(&self, name: &str) -> Option<&PhaseDefinition> {
        self.phases.iter().find(|p| p.name == name)
    }

    pub fn names(&self) -> Vec<&str> {
        self.phases.iter().map(|p| p.name.as_str()).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.phases.is_empty()
    }

    /// Subset of the plan in plan order. An empty selection means every phase.
    pub fn select(&self, selected: &[String]) -> Result<Vec<PhaseDefinition>, DomainError> {
        if selected.is_empty() {
            return Ok(self.phases.clone());
        }
        if let Some(unknown) = selected.iter().find(|name| self.get(name).is_none()) {
            return Err(DomainError::UnknownPhase(unknown.clone()));
        }
        Ok(self
            .phases
            .iter()
            .filter(|p| selected.contains(&p.name))
            .cloned()
            .collect())
    }

    /// Every eligible id must exist in the catalog.
    pub fn validate_against(&self, catalog: &AgentCatalog) -> Result<(), DomainError> {
        for phase in &self.phases {
            if let Some(missing) = phase.eligible_agent_ids.iter().find(|id| !catalog.contains(id)) {
                return Err(DomainError::DanglingEligibleAgent {
                    phase: phase.name.clone(),
                    agent: missing.to_string(),
                });
            }
        }
        Ok(())
    }
}

/// Aggregated outcome of one phase. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseResult {
    pub phase: String,
    pub agents_used: Vec<AgentId>,
    pub insights: Vec<Insight>,
    pub decisions: Vec<Decision>,
    pub blockers: Vec<Blocker>,
    /// Mean of participating agent confidences, within [0, 1]
    pub confidence: f64,
    pub degraded: bool,
    pub successful: usize,
    pub failed: usize,
    pub cache_hits: usize,
    pub duration_ms: u64,
}

impl PhaseResult {
    /// Aggregate agent responses.
    ///
    /// A phase is degraded when any high-severity blocker was raised or the
    /// mean confidence is below `degraded_below`. A phase without responses
    /// has confidence 0 and is degraded.
    pub fn from_responses(phase: impl Into<String>, responses: &[AgentResponse], degraded_below: f64) -> Self {
        let confidence = if responses.is_empty() {
            0.0
        } else {
            let sum: f64 = responses.iter().map(|r| r.confidence.clamp(0.0, 1.0)).sum();
            (sum / responses.len() as f64).clamp(0.0, 1.0)
        };

        let insights: Vec<Insight> = responses.iter().flat_map(|r| r.insights.clone()).collect();
        let decisions: Vec<Decision> = responses.iter().flat_map(|r| r.decisions.clone()).collect();
        let blockers: Vec<Blocker> = responses.iter().flat_map(|r| r.blockers.clone()).collect();
        let has_high = blockers.iter().any(|b| b.severity == Severity::High);
        let successful = responses.iter().filter(|r| r.succeeded).count();

        Self {
            phase: phase.into(),
            agents_used: responses.iter().map(|r| r.agent_id.clone()).collect(),
            insights,
            decisions,
            blockers,
            confidence,
            degraded: has_high || confidence < degraded_below,
            successful,
            failed: responses.len() - successful,
            cache_hits: responses.iter().filter(|r| r.cached).count(),
            duration_ms: 0,
        }
    }

    pub fn with_duration_ms(mut self, duration_ms: u64) -> Self {
        self.duration_ms = duration_ms;
        self
    }

    pub fn has_high_blocker(&self) -> bool {
        self.blockers.iter().any(|b| b.severity == Severity::High)
    }
}

/// Lifecycle of a workflow run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", content = "phase", rename_all = "snake_case")]
pub enum WorkflowState {
    Pending,
    Running(String),
    Aggregating,
    Iterating,
    Completed,
    Cancelled,
    Failed,
}

impl WorkflowState {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            WorkflowState::Completed | WorkflowState::Cancelled | WorkflowState::Failed
        )
    }

    pub fn can_transition_to(&self, next: &WorkflowState) -> bool {
        use WorkflowState::*;
        match (self, next) {
            (_, Failed) => !self.is_terminal(),
            (Pending | Running(_) | Iterating, Cancelled) => true,
            (Pending | Running(_) | Iterating, Running(_)) => true,
            (Running(_), Aggregating) => true,
            (Aggregating, Iterating | Completed) => true,
            _ => false,
        }
    }
}

impl fmt::Display for WorkflowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkflowState::Pending => write!(f, "pending"),
            WorkflowState::Running(phase) => write!(f, "running({})", phase),
            WorkflowState::Aggregating => write!(f, "aggregating"),
            WorkflowState::Iterating => write!(f, "iterating"),
            WorkflowState::Completed => write!(f, "completed"),
            WorkflowState::Cancelled => write!(f, "cancelled"),
            WorkflowState::Failed => write!(f, "failed"),
        }
    }
}

/// A workflow run (Entity).
///
/// Owned by the orchestrator for its whole lifetime; `iteration` only grows
/// and never exceeds `max_iterations`.
#[derive(Debug, Clone)]
pub struct WorkflowRun {
    id: String,
    task: Task,
    iteration: u32,
    max_iterations: u32,
    state: WorkflowState,
    phase_results: Vec<PhaseResult>,
    responses: Vec<AgentResponse>,
    history: Vec<IterationSummary>,
    started_at: u64,
}

impl WorkflowRun {
    pub fn new(id: impl Into<String>, task: Task, max_iterations: u32) -> Self {
        Self {
            id: id.into(),
            task,
            iteration: 0,
            max_iterations: max_iterations.max(1),
            state: WorkflowState::Pending,
            phase_results: Vec::new(),
            responses: Vec::new(),
            history: Vec::new(),
            started_at: now_millis(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn task(&self) -> &Task {
        &self.task
    }

    pub fn iteration(&self) -> u32 {
        self.iteration
    }

    pub fn max_iterations(&self) -> u32 {
        self.max_iterations
    }

    pub fn state(&self) -> &WorkflowState {
        &self.state
    }

    pub fn started_at(&self) -> u64 {
        self.started_at
    }

    /// Phase results of the current iteration, in execution order.
    pub fn phase_results(&self) -> &[PhaseResult] {
        &self.phase_results
    }

    pub fn phase_result(&self, phase: &str) -> Option<&PhaseResult> {
        self.phase_results.iter().find(|r| r.phase == phase)
    }

    /// Agent responses of the current iteration, in completion order.
    pub fn responses(&self) -> &[AgentResponse] {
        &self.responses
    }

    pub fn history(&self) -> &[IterationSummary] {
        &self.history
    }

    pub fn can_iterate(&self) -> bool {
        self.iteration < self.max_iterations
    }

    pub fn transition(&mut self, next: WorkflowState) -> Result<(), DomainError> {
        if !self.state.can_transition_to(&next) {
            return Err(DomainError::InvalidTransition {
                from: self.state.to_string(),
                to: next.to_string(),
            });
        }
        self.state = next;
        Ok(())
    }

    /// Start the next pass, clearing the previous pass's results.
    pub fn begin_iteration(&mut self) -> Result<u32, DomainError> {
        if !self.can_iterate() {
            return Err(DomainError::IterationCapReached(self.max_iterations));
        }
        self.iteration += 1;
        self.phase_results.clear();
        self.responses.clear();
        Ok(self.iteration)
    }

    pub fn record_phase(&mut self, result: PhaseResult, responses: Vec<AgentResponse>) {
        self.phase_results.push(result);
        self.responses.extend(responses);
    }

    /// Mean confidence over the phases of the current iteration.
    pub fn mean_phase_confidence(&self) -> f64 {
        if self.phase_results.is_empty() {
            return 0.0;
        }
        let sum: f64 = self.phase_results.iter().map(|r| r.confidence).sum();
        sum / self.phase_results.len() as f64
    }

    pub fn has_high_blocker(&self) -> bool {
        self.phase_results.iter().any(PhaseResult::has_high_blocker)
    }

    /// Archive the current pass into the run history.
    pub fn close_iteration(&mut self) -> &IterationSummary {
        let summary = IterationSummary::from_results(
            self.iteration,
            &self.phase_results,
            self.mean_phase_confidence(),
            self.has_high_blocker(),
        );
        self.history.push(summary);
        &self.history[self.history.len() - 1]
    }

    /// Agents activated across every pass so far, including the current one.
    pub fn total_agents_activated(&self) -> usize {
        let archived: usize = self.history.iter().map(|h| h.agents_activated).sum();
        let open = if self.history.last().map(|h| h.iteration) == Some(self.iteration) {
            0
        } else {
            self.responses.len()
        };
        archived + open
    }

    pub fn elapsed_ms(&self) -> u64 {
        now_millis().saturating_sub(self.started_at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::agent::Agent;
    use crate::orchestration::value_objects::ErrorKind;

    fn plan() -> PhasePlan {
        PhasePlan::new(vec![
            PhaseDefinition::new("brainstorm", "Ideas").with_eligible(["a", "b"]),
            PhaseDefinition::new("security", "Threats").with_eligible(["b"]),
            PhaseDefinition::new("testing", "QA").with_eligible(["c"]),
        ])
        .unwrap()
    }

    fn response(id: &str, confidence: f64) -> AgentResponse {
        AgentResponse::success(&Agent::new(id, id, "Role"), "brainstorm", "text", "mock", confidence)
    }

    #[test]
    fn test_plan_rejects_duplicate_names() {
        let err = PhasePlan::new(vec![
            PhaseDefinition::new("ux", ""),
            PhaseDefinition::new("ux", ""),
        ])
        .unwrap_err();
        assert_eq!(err, DomainError::InvalidPhaseName("ux".to_string()));
    }

    #[test]
    fn test_select_keeps_plan_order() {
        let selected = plan()
            .select(&["testing".to_string(), "brainstorm".to_string()])
            .unwrap();
        let names: Vec<_> = selected.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, vec!["brainstorm", "testing"]);
        assert_eq!(plan().select(&[]).unwrap().len(), 3);
    }

    #[test]
    fn test_select_unknown_phase() {
        let err = plan().select(&["marketing".to_string()]).unwrap_err();
        assert_eq!(err, DomainError::UnknownPhase("marketing".to_string()));
    }

    #[test]
    fn test_validate_against_catalog() {
        let catalog = AgentCatalog::new(vec![Agent::new("a", "A", "r"), Agent::new("b", "B", "r")]).unwrap();
        let err = plan().validate_against(&catalog).unwrap_err();
        assert_eq!(
            err,
            DomainError::DanglingEligibleAgent {
                phase: "testing".to_string(),
                agent: "c".to_string()
            }
        );
    }

    #[test]
    fn test_phase_result_mean_and_degraded() {
        let result = PhaseResult::from_responses("brainstorm", &[response("a", 0.9), response("b", 0.7)], 0.7);
        assert!((result.confidence - 0.8).abs() < 1e-9);
        assert!(!result.degraded);
        assert_eq!(result.successful, 2);
        assert_eq!(result.failed, 0);
    }

    #[test]
    fn test_phase_result_all_fallback_is_degraded() {
        let agent = Agent::new("a", "A", "r");
        let responses: Vec<_> = (0..5)
            .map(|_| AgentResponse::fallback(&agent, "ux", "offline", ErrorKind::BackendTimeout, 0.5))
            .collect();
        let result = PhaseResult::from_responses("ux", &responses, 0.7);
        assert!((result.confidence - 0.5).abs() < 1e-9);
        assert!(result.degraded);
        assert_eq!(result.failed, 5);
    }

    #[test]
    fn test_phase_result_high_blocker_degrades() {
        let mut r = response("a", 0.9);
        r.blockers.push(Blocker {
            agent_id: r.agent_id.clone(),
            text: "critical data loss risk".to_string(),
            severity: Severity::High,
        });
        let result = PhaseResult::from_responses("security", &[r], 0.7);
        assert!(result.degraded);
        assert!(result.has_high_blocker());
    }

    #[test]
    fn test_empty_phase_result() {
        let result = PhaseResult::from_responses("ux", &[], 0.7);
        assert_eq!(result.confidence, 0.0);
        assert!(result.degraded);
    }

    #[test]
    fn test_state_transitions() {
        use WorkflowState::*;
        assert!(Pending.can_transition_to(&Running("brainstorm".into())));
        assert!(Running("a".into()).can_transition_to(&Running("b".into())));
        assert!(Running("a".into()).can_transition_to(&Aggregating));
        assert!(Aggregating.can_transition_to(&Iterating));
        assert!(Aggregating.can_transition_to(&Completed));
        assert!(!Aggregating.can_transition_to(&Cancelled));
        assert!(!Completed.can_transition_to(&Failed));
        assert!(!Pending.can_transition_to(&Completed));
    }

    #[test]
    fn test_iteration_cap() {
        let task = Task::new("Build a chat app").unwrap();
        let mut run = WorkflowRun::new("wf-1", task, 2);
        assert_eq!(run.begin_iteration().unwrap(), 1);
        assert_eq!(run.begin_iteration().unwrap(), 2);
        assert_eq!(run.begin_iteration().unwrap_err(), DomainError::IterationCapReached(2));
        assert_eq!(run.iteration(), 2);
    }

    #[test]
    fn test_invalid_transition_rejected() {
        let mut run = WorkflowRun::new("wf-1", Task::new("x task").unwrap(), 1);
        let err = run.transition(WorkflowState::Completed).unwrap_err();
        assert!(matches!(err, DomainError::InvalidTransition { .. }));
        assert_eq!(run.state(), &WorkflowState::Pending);
    }

    #[test]
    fn test_agents_activated_across_iterations() {
        let mut run = WorkflowRun::new("wf-1", Task::new("x task").unwrap(), 3);
        run.begin_iteration().unwrap();
        let responses = vec![response("a", 0.9), response("b", 0.8)];
        let result = PhaseResult::from_responses("brainstorm", &responses, 0.7);
        run.record_phase(result, responses);
        assert_eq!(run.total_agents_activated(), 2);
        run.close_iteration();
        assert_eq!(run.total_agents_activated(), 2);

        run.begin_iteration().unwrap();
        let responses = vec![response("a", 0.9)];
        let result = PhaseResult::from_responses("brainstorm", &responses, 0.7);
        run.record_phase(result, responses);
        assert_eq!(run.total_agents_activated(), 3);
    }
}
