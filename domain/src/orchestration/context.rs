//! Context handed from earlier phases to later ones.

use super::entities::PhaseResult;
use crate::learning::LearningRecord;
use crate::util::excerpt;
use serde::{Deserialize, Serialize};

/// Insights carried forward per prior phase.
const INSIGHTS_PER_PHASE: usize = 2;
/// Bytes kept per carried insight.
const INSIGHT_BYTES: usize = 160;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriorPhase {
    pub phase: String,
    pub confidence: f64,
    pub highlights: Vec<String>,
}

/// Prior-phase summaries plus an optional learning hint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PhaseContext {
    pub prior: Vec<PriorPhase>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub learning_hint: Option<String>,
}

impl PhaseContext {
    pub fn from_results(results: &[PhaseResult]) -> Self {
        let prior = results
            .iter()
            .map(|r| PriorPhase {
                phase: r.phase.clone(),
                confidence: r.confidence,
                highlights: r
                    .insights
                    .iter()
                    .map(|i| i.text.as_str())
                    .chain(r.decisions.iter().map(|d| d.text.as_str()))
                    .take(INSIGHTS_PER_PHASE)
                    .map(|t| excerpt(t, INSIGHT_BYTES))
                    .collect(),
            })
            .collect();
        Self {
            prior,
            learning_hint: None,
        }
    }

    pub fn with_learning(mut self, record: Option<&LearningRecord>) -> Self {
        self.learning_hint = record.map(|r| {
            format!(
                "A similar task (\"{}\") was analysed before; {} expert(s) gave strong answers.",
                r.task_signature,
                r.successful_agent_ids.len()
            )
        });
        self
    }

    pub fn is_empty(&self) -> bool {
        self.prior.is_empty() && self.learning_hint.is_none()
    }

    /// Compact text rendered into the user prompt, cut at `max_bytes`.
    pub fn render(&self, max_bytes: usize) -> String {
        let mut out = String::new();
        for prior in &self.prior {
            out.push_str(&format!(
                "- {} (confidence {:.0}%)",
                prior.phase,
                prior.confidence * 100.0
            ));
            for highlight in &prior.highlights {
                out.push_str(&format!("; {}", highlight));
            }
            out.push('\n');
        }
        if let Some(hint) = &self.learning_hint {
            out.push_str(hint);
            out.push('\n');
        }
        let trimmed = crate::util::truncate_str(&out, max_bytes);
        trimmed.trim_end().to_string()
    }
}
