//! Synthesis value objects.

use crate::consensus::{ConsensusConfig, ConsensusPoint};
use crate::core::agent::AgentId;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Qualitative confidence band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceLabel {
    High,
    Moderate,
    Low,
}

impl ConfidenceLabel {
    /// `> 0.7` high, `> 0.4` moderate, otherwise low.
    pub fn from_score(score: f64) -> Self {
        if score > 0.7 {
            ConfidenceLabel::High
        } else if score > 0.4 {
            ConfidenceLabel::Moderate
        } else {
            ConfidenceLabel::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConfidenceLabel::High => "high",
            ConfidenceLabel::Moderate => "moderate",
            ConfidenceLabel::Low => "low",
        }
    }
}

impl fmt::Display for ConfidenceLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Weighted contributions that sum to the overall confidence (before clamping).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceFactors {
    /// `0.5 * consensus level`
    pub consensus: f64,
    /// `0.3 * min(clusters / 10, 1)`
    pub coverage: f64,
    /// `0.2 * (1 - divergences / 10)`
    pub clarity: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SynthesisConfidence {
    /// Within [0, 1]
    pub overall: f64,
    pub factors: ConfidenceFactors,
    pub label: ConfidenceLabel,
}

impl SynthesisConfidence {
    pub fn percent(&self) -> u32 {
        (self.overall * 100.0).round() as u32
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TradeoffOption {
    pub name: String,
    pub pros: Vec<String>,
    pub cons: Vec<String>,
    /// Share of experts behind this option, within [0, 1]
    pub support: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Tradeoff {
    pub id: String,
    pub title: String,
    pub options: Vec<TradeoffOption>,
}

/// Always-populated headline layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EssentialLayer {
    pub summary: String,
    pub recommendation: String,
    pub confidence: SynthesisConfidence,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub top_tradeoff: Option<Tradeoff>,
}

/// Drill-down the presentation layer may offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExplorationOption {
    ViewDivergences,
    ViewAllClusters,
    ViewDetailedAnalysis,
    ViewAllResponses,
}

impl ExplorationOption {
    pub fn label(&self) -> &'static str {
        match self {
            ExplorationOption::ViewDivergences => "View divergent perspectives",
            ExplorationOption::ViewAllClusters => "View all response clusters",
            ExplorationOption::ViewDetailedAnalysis => "View detailed analysis",
            ExplorationOption::ViewAllResponses => "View all individual responses",
        }
    }
}

/// Progressive-disclosure layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExplorationLayer {
    pub tradeoffs: Vec<Tradeoff>,
    pub consensus: Vec<ConsensusPoint>,
    pub divergences: Vec<ConsensusPoint>,
    pub confidence_breakdown: ConfidenceFactors,
    pub options: Vec<ExplorationOption>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterDetail {
    pub id: String,
    pub representative_text: String,
    pub size: usize,
    pub weight: f64,
    pub agents: Vec<AgentId>,
    pub mean_confidence: f64,
    pub fallback_members: usize,
}

/// Raw clusters and metadata, built on demand.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeepAnalysisLayer {
    pub clusters: Vec<ClusterDetail>,
    pub total_responses: usize,
    pub similarity: String,
    pub thresholds: ConsensusConfig,
}

/// Final human-facing artifact. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Synthesis {
    pub executive_summary: String,
    pub key_recommendation: String,
    pub critical_considerations: Vec<String>,
    pub confidence: SynthesisConfidence,
    pub tradeoffs: Vec<Tradeoff>,
    pub essential: EssentialLayer,
    pub exploration: ExplorationLayer,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deep_analysis: Option<DeepAnalysisLayer>,
}
