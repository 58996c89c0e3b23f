//! Learning records derived from completed workflow iterations.

use super::keywords::{extract_keywords, jaccard};
use crate::core::agent::AgentId;
use crate::orchestration::entities::PhaseResult;
use crate::orchestration::value_objects::AgentResponse;
use crate::util::now_millis;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Something noticed about how a phase went.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ObservedPattern {
    /// Many agents contributed insights; the phase benefits from a larger panel
    HighCollaboration { phase: String, insights: usize },
    /// The phase ended degraded
    DegradedPhase { phase: String, confidence: f64 },
}

/// Thresholds used when deriving a record.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LearningPolicy {
    /// Minimum confidence for a successful response to mark its agent as proven
    pub success_confidence: f64,
    /// A phase with more insights than this signals high collaboration
    pub collaboration_insights: usize,
    /// More activated agents than this suggests trimming the panel
    pub many_agents: usize,
    /// Runs slower than this suggest enabling parallel phases
    pub slow_run_ms: u64,
}

impl Default for LearningPolicy {
    fn default() -> Self {
        Self {
            success_confidence: 0.7,
            collaboration_insights: 3,
            many_agents: 50,
            slow_run_ms: 10_000,
        }
    }
}

/// Append-only history entry. Never mutated once recorded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearningRecord {
    pub task_signature: String,
    pub keywords: BTreeSet<String>,
    pub successful_agent_ids: BTreeSet<AgentId>,
    #[serde(default)]
    pub observed_patterns: Vec<ObservedPattern>,
    #[serde(default)]
    pub optimizations: Vec<String>,
    #[serde(default)]
    pub workflow_id: String,
    #[serde(default)]
    pub iteration: u32,
    /// Milliseconds since the Unix epoch
    pub timestamp: u64,
}

/// Normalised form of a task used as the record key.
pub fn task_signature(task: &str) -> String {
    task.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

impl LearningRecord {
    pub fn new(task: &str) -> Self {
        Self {
            task_signature: task_signature(task),
            keywords: extract_keywords(task),
            successful_agent_ids: BTreeSet::new(),
            observed_patterns: Vec::new(),
            optimizations: Vec::new(),
            workflow_id: String::new(),
            iteration: 0,
            timestamp: now_millis(),
        }
    }

    /// Derive a record from one finished iteration.
    pub fn derive(
        task: &str,
        workflow_id: &str,
        iteration: u32,
        phases: &[PhaseResult],
        responses: &[AgentResponse],
        elapsed_ms: u64,
        policy: &LearningPolicy,
    ) -> Self {
        let successful_agent_ids = responses
            .iter()
            .filter(|r| r.succeeded && r.confidence >= policy.success_confidence)
            .map(|r| r.agent_id.clone())
            .collect();

        let mut observed_patterns = Vec::new();
        for phase in phases {
            if phase.insights.len() > policy.collaboration_insights {
                observed_patterns.push(ObservedPattern::HighCollaboration {
                    phase: phase.phase.clone(),
                    insights: phase.insights.len(),
                });
            }
            if phase.degraded {
                observed_patterns.push(ObservedPattern::DegradedPhase {
                    phase: phase.phase.clone(),
                    confidence: phase.confidence,
                });
            }
        }

        let mut optimizations = Vec::new();
        if responses.len() > policy.many_agents {
            optimizations.push(format!(
                "{} agents were activated; consider a smaller, more targeted panel",
                responses.len()
            ));
        }
        if elapsed_ms > policy.slow_run_ms {
            optimizations.push(format!(
                "Run took {}ms; consider selecting fewer phases",
                elapsed_ms
            ));
        }

        Self {
            successful_agent_ids,
            observed_patterns,
            optimizations,
            workflow_id: workflow_id.to_string(),
            iteration,
            ..Self::new(task)
        }
    }

    /// Keyword overlap with another task's keywords.
    pub fn overlap_with(&self, keywords: &BTreeSet<String>) -> f64 {
        jaccard(&self.keywords, keywords)
    }

    pub fn matches(&self, keywords: &BTreeSet<String>, threshold: f64) -> bool {
        self.overlap_with(keywords) >= threshold
    }
}
