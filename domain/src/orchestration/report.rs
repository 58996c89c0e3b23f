//! Final report assembled when a workflow reaches a terminal state.

use super::entities::{PhaseResult, WorkflowRun};
use super::value_objects::Severity;
use crate::consensus::ConsensusAnalysis;
use crate::synthesis::Synthesis;
use serde::{Deserialize, Serialize};

/// Phases below this confidence get a recommendation.
const LOW_CONFIDENCE_PHASE: f64 = 0.7;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhaseSummary {
    pub phase: String,
    pub confidence: f64,
    pub degraded: bool,
    pub agents: usize,
}

/// Snapshot of one full pass over the phases.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IterationSummary {
    pub iteration: u32,
    pub phases: Vec<PhaseSummary>,
    pub mean_confidence: f64,
    pub has_high_blocker: bool,
    pub agents_activated: usize,
    pub successful: usize,
    pub failed: usize,
}

impl IterationSummary {
    pub fn from_results(
        iteration: u32,
        results: &[PhaseResult],
        mean_confidence: f64,
        has_high_blocker: bool,
    ) -> Self {
        Self {
            iteration,
            phases: results
                .iter()
                .map(|r| PhaseSummary {
                    phase: r.phase.clone(),
                    confidence: r.confidence,
                    degraded: r.degraded,
                    agents: r.agents_used.len(),
                })
                .collect(),
            mean_confidence,
            has_high_blocker,
            agents_activated: results.iter().map(|r| r.agents_used.len()).sum(),
            successful: results.iter().map(|r| r.successful).sum(),
            failed: results.iter().map(|r| r.failed).sum(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecommendationPriority {
    Medium,
    High,
    Critical,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub priority: RecommendationPriority,
    pub recommendation: String,
    pub action: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub phases_run: usize,
    pub agents_activated: usize,
    pub successful: usize,
    pub failed: usize,
    pub average_confidence: f64,
    pub insights: usize,
    pub decisions: usize,
    pub blockers: usize,
    pub high_blockers: usize,
}

/// Everything a caller needs after a run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FinalReport {
    pub workflow_id: String,
    pub task: String,
    /// Number of passes executed
    pub iteration: u32,
    pub summary: ReportSummary,
    /// Phase results of the final pass
    pub phases: Vec<PhaseResult>,
    pub consensus: ConsensusAnalysis,
    pub synthesis: Synthesis,
    pub recommendations: Vec<Recommendation>,
    pub next_steps: Vec<String>,
    pub history: Vec<IterationSummary>,
    pub learning_applied: bool,
    /// The iteration cap stopped a run that still wanted another pass
    pub iteration_capped: bool,
    pub duration_ms: u64,
}

impl FinalReport {
    pub fn compile(
        run: &WorkflowRun,
        consensus: ConsensusAnalysis,
        synthesis: Synthesis,
        iteration_capped: bool,
    ) -> Self {
        let phases = run.phase_results().to_vec();
        let summary = ReportSummary {
            phases_run: phases.len(),
            agents_activated: run.total_agents_activated(),
            successful: phases.iter().map(|p| p.successful).sum(),
            failed: phases.iter().map(|p| p.failed).sum(),
            average_confidence: run.mean_phase_confidence(),
            insights: phases.iter().map(|p| p.insights.len()).sum(),
            decisions: phases.iter().map(|p| p.decisions.len()).sum(),
            blockers: phases.iter().map(|p| p.blockers.len()).sum(),
            high_blockers: phases
                .iter()
                .flat_map(|p| &p.blockers)
                .filter(|b| b.severity == Severity::High)
                .count(),
        };

        Self {
            workflow_id: run.id().to_string(),
            task: run.task().description().to_string(),
            iteration: run.iteration(),
            recommendations: recommendations(&phases),
            next_steps: next_steps(&summary),
            summary,
            phases,
            consensus,
            synthesis,
            history: run.history().to_vec(),
            learning_applied: run.iteration() > 1,
            iteration_capped,
            duration_ms: run.elapsed_ms(),
        }
    }
}

fn recommendations(phases: &[PhaseResult]) -> Vec<Recommendation> {
    let mut out = Vec::new();

    let low: Vec<&str> = phases
        .iter()
        .filter(|p| p.confidence < LOW_CONFIDENCE_PHASE)
        .map(|p| p.phase.as_str())
        .collect();
    if !low.is_empty() {
        out.push(Recommendation {
            priority: RecommendationPriority::High,
            recommendation: format!("Strengthen the {} phase(s)", low.join(", ")),
            action: "Run a detailed review with domain experts".to_string(),
        });
    }

    for blocker in phases
        .iter()
        .flat_map(|p| &p.blockers)
        .filter(|b| b.severity == Severity::High)
    {
        out.push(Recommendation {
            priority: RecommendationPriority::Critical,
            recommendation: format!("Resolve blocker raised by {}: {}", blocker.agent_id, blocker.text),
            action: "Assign an owner before implementation starts".to_string(),
        });
    }

    let medium_concerns = phases
        .iter()
        .flat_map(|p| &p.blockers)
        .filter(|b| b.severity == Severity::Medium)
        .count();
    if medium_concerns > 0 {
        out.push(Recommendation {
            priority: RecommendationPriority::Medium,
            recommendation: format!("Review {} medium-severity concern(s)", medium_concerns),
            action: "Track them in the project risk register".to_string(),
        });
    }

    out
}

fn next_steps(summary: &ReportSummary) -> Vec<String> {
    let mut steps = Vec::new();
    if summary.decisions > 0 {
        steps.push(format!("Review and prioritise the {} recorded decision(s)", summary.decisions));
    }
    if summary.blockers > 0 {
        steps.push(format!("Resolve the {} open blocker(s)", summary.blockers));
    }
    steps.push("Create an implementation roadmap following the phase order".to_string());
    steps.push("Assign a lead for each phase".to_string());
    steps.push("Schedule a follow-up review cycle".to_string());
    steps
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::agent::{Agent, AgentId};
    use crate::core::task::Task;
    use crate::orchestration::value_objects::{AgentResponse, Blocker};
    use crate::synthesis::MetaSynthesizer;

    fn run_with(confidences: &[f64], blocker: Option<Severity>) -> WorkflowRun {
        let mut run = WorkflowRun::new("wf-9", Task::new("Build a chat app").unwrap(), 3);
        run.begin_iteration().unwrap();
        for (i, c) in confidences.iter().enumerate() {
            let agent = Agent::new(format!("a{}", i), "A", "Role");
            let mut response = AgentResponse::success(&agent, format!("phase{}", i), "text", "mock", *c);
            if let Some(severity) = blocker {
                response.blockers.push(Blocker {
                    agent_id: AgentId::new(format!("a{}", i)),
                    text: "data loss".to_string(),
                    severity,
                });
            }
            let result = PhaseResult::from_responses(format!("phase{}", i), &[response.clone()], 0.7);
            run.record_phase(result, vec![response]);
        }
        run
    }

    #[test]
    fn test_compile_summary_and_flags() {
        let run = run_with(&[0.9, 0.5], None);
        let synthesis = MetaSynthesizer::new().synthesize("Build a chat app", &ConsensusAnalysis::default());
        let report = FinalReport::compile(&run, ConsensusAnalysis::default(), synthesis, false);

        assert_eq!(report.summary.phases_run, 2);
        assert_eq!(report.summary.agents_activated, 2);
        assert!((report.summary.average_confidence - 0.7).abs() < 1e-9);
        assert!(!report.learning_applied);
        assert_eq!(report.recommendations.len(), 1);
        assert_eq!(report.recommendations[0].priority, RecommendationPriority::High);
        assert!(report.recommendations[0].recommendation.contains("phase1"));
    }

    #[test]
    fn test_high_blockers_become_critical() {
        let run = run_with(&[0.9], Some(Severity::High));
        let synthesis = MetaSynthesizer::new().synthesize("x", &ConsensusAnalysis::default());
        let report = FinalReport::compile(&run, ConsensusAnalysis::default(), synthesis, true);
        assert_eq!(report.summary.high_blockers, 1);
        assert!(report.iteration_capped);
        assert!(report
            .recommendations
            .iter()
            .any(|r| r.priority == RecommendationPriority::Critical));
        assert_eq!(report.next_steps[0], "Resolve the 1 open blocker(s)");
    }
}
