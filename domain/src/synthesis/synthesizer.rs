//! Meta-synthesis of a consensus analysis into layered guidance.

use super::value_objects::*;
use crate::consensus::{ConsensusAnalysis, ConsensusAnalyzer, ConsensusPoint, ResponseCluster};
use crate::util::truncate_str;

/// Maximum length of a trade-off option name.
const OPTION_NAME_BYTES: usize = 50;
/// Critical considerations listed in the synthesis.
const MAX_CONSIDERATIONS: usize = 3;

/// Turns a [`ConsensusAnalysis`] into a [`Synthesis`].
///
/// Deterministic: the same analysis always produces the same synthesis.
#[derive(Debug, Clone, Copy, Default)]
pub struct MetaSynthesizer;

impl MetaSynthesizer {
    pub fn new() -> Self {
        Self
    }

    pub fn synthesize(&self, task: &str, analysis: &ConsensusAnalysis) -> Synthesis {
        if analysis.is_empty() {
            return Self::empty(task);
        }

        let tradeoffs = Self::tradeoffs(analysis);
        let confidence = Self::confidence(analysis);
        let executive_summary = Self::executive_summary(analysis);
        let key_recommendation = analysis
            .top_consensus()
            .map(|p| p.theme.clone())
            .unwrap_or_else(|| {
                "Carefully weigh the trade-offs presented before deciding.".to_string()
            });
        let critical_considerations = analysis
            .divergence_points
            .iter()
            .take(MAX_CONSIDERATIONS)
            .map(|d| d.theme.clone())
            .collect();

        Synthesis {
            essential: EssentialLayer {
                summary: executive_summary.clone(),
                recommendation: key_recommendation.clone(),
                confidence,
                top_tradeoff: tradeoffs.first().cloned(),
            },
            exploration: ExplorationLayer {
                tradeoffs: tradeoffs.clone(),
                consensus: analysis.consensus_points.clone(),
                divergences: analysis.divergence_points.clone(),
                confidence_breakdown: confidence.factors,
                options: Self::exploration_options(analysis),
            },
            executive_summary,
            key_recommendation,
            critical_considerations,
            confidence,
            tradeoffs,
            deep_analysis: None,
        }
    }

    /// Raw cluster data for the deep-analysis layer.
    pub fn deep_analysis(&self, analysis: &ConsensusAnalysis, analyzer: &ConsensusAnalyzer) -> DeepAnalysisLayer {
        DeepAnalysisLayer {
            clusters: analysis.clusters.iter().map(Self::cluster_detail).collect(),
            total_responses: analysis.total_responses,
            similarity: analyzer.similarity_name().to_string(),
            thresholds: *analyzer.config(),
        }
    }

    /// Synthesis with the deep-analysis layer populated.
    pub fn synthesize_deep(
        &self,
        task: &str,
        analysis: &ConsensusAnalysis,
        analyzer: &ConsensusAnalyzer,
    ) -> Synthesis {
        let mut synthesis = self.synthesize(task, analysis);
        synthesis.deep_analysis = Some(self.deep_analysis(analysis, analyzer));
        synthesis
    }

    /// `0.5 * consensus + 0.3 * coverage + 0.2 * clarity`, clamped to [0, 1].
    pub fn confidence(analysis: &ConsensusAnalysis) -> SynthesisConfidence {
        let factors = ConfidenceFactors {
            consensus: analysis.consensus_level * 0.5,
            coverage: (analysis.cluster_count() as f64 / 10.0).min(1.0) * 0.3,
            clarity: (1.0 - analysis.divergence_points.len() as f64 / 10.0).max(0.0) * 0.2,
        };
        let overall = (factors.consensus + factors.coverage + factors.clarity).clamp(0.0, 1.0);
        SynthesisConfidence {
            overall,
            factors,
            label: ConfidenceLabel::from_score(overall),
        }
    }

    fn executive_summary(analysis: &ConsensusAnalysis) -> String {
        let level = analysis.consensus_level;
        let pct = (level * 100.0).round() as u32;
        let top_theme = analysis
            .top_consensus()
            .map(|p| p.theme.as_str())
            .unwrap_or_default();

        if level > 0.8 {
            format!(
                "There is strong consensus ({}%) among the experts on the best approach: {}.",
                pct, top_theme
            )
        } else if level > 0.5 {
            format!(
                "There is moderate consensus ({}%) around \"{}\", with divergent perspectives worth considering.",
                pct, top_theme
            )
        } else {
            match analysis.clusters.first() {
                Some(largest) => format!(
                    "There is no clear consensus. The largest group ({}%) favours \"{}\"; the experts present several valid approaches with significant trade-offs.",
                    (largest.weight * 100.0).round() as u32,
                    largest.theme()
                ),
                None => "There is no clear consensus.".to_string(),
            }
        }
    }

    fn tradeoffs(analysis: &ConsensusAnalysis) -> Vec<Tradeoff> {
        let mut tradeoffs = Vec::new();
        let level = analysis.consensus_level;

        if level > 0.7 {
            tradeoffs.push(Tradeoff {
                id: "consensus_vs_alternatives".to_string(),
                title: "Follow the consensus or explore alternatives".to_string(),
                options: vec![
                    TradeoffOption {
                        name: "Follow consensus".to_string(),
                        pros: vec![
                            "Lower risk".to_string(),
                            "Validated by the majority".to_string(),
                            "Faster implementation".to_string(),
                        ],
                        cons: vec![
                            "May be conventional".to_string(),
                            "Less room for innovation".to_string(),
                        ],
                        support: level,
                    },
                    TradeoffOption {
                        name: "Explore alternatives".to_string(),
                        pros: vec![
                            "Innovation potential".to_string(),
                            "Differentiation".to_string(),
                            "May uncover a better solution".to_string(),
                        ],
                        cons: vec![
                            "Higher risk".to_string(),
                            "Less validation".to_string(),
                            "More complex implementation".to_string(),
                        ],
                        support: 1.0 - level,
                    },
                ],
            });
        }

        if let [first, second, ..] = analysis.divergence_points.as_slice() {
            tradeoffs.push(Tradeoff {
                id: "divergence_tradeoff".to_string(),
                title: "Choose between competing minority positions".to_string(),
                options: vec![Self::divergence_option(first), Self::divergence_option(second)],
            });
        }

        tradeoffs
    }

    fn divergence_option(point: &ConsensusPoint) -> TradeoffOption {
        let name = point.theme.split(',').next().unwrap_or_default();
        TradeoffOption {
            name: truncate_str(name, OPTION_NAME_BYTES).trim().to_string(),
            pros: vec![
                format!("Backed by {}% of the experts", point.agreement),
                "Concrete, argued position".to_string(),
            ],
            cons: vec![
                format!("Only {}% support", point.agreement),
                "May have unexplored limitations".to_string(),
                "Needs further analysis".to_string(),
            ],
            support: point.weight,
        }
    }

    fn exploration_options(analysis: &ConsensusAnalysis) -> Vec<ExplorationOption> {
        let mut options = Vec::new();
        if !analysis.divergence_points.is_empty() {
            options.push(ExplorationOption::ViewDivergences);
        }
        if analysis.cluster_count() > 3 {
            options.push(ExplorationOption::ViewAllClusters);
        }
        options.push(ExplorationOption::ViewDetailedAnalysis);
        if analysis.total_responses > 20 {
            options.push(ExplorationOption::ViewAllResponses);
        }
        options
    }

    fn cluster_detail(cluster: &ResponseCluster) -> ClusterDetail {
        let size = cluster.size();
        let mean_confidence = if size == 0 {
            0.0
        } else {
            cluster.members.iter().map(|m| m.confidence).sum::<f64>() / size as f64
        };
        ClusterDetail {
            id: cluster.id.clone(),
            representative_text: cluster.representative_text.clone(),
            size,
            weight: cluster.weight,
            agents: cluster.agent_ids(),
            mean_confidence,
            fallback_members: cluster.members.iter().filter(|m| !m.succeeded).count(),
        }
    }

    fn empty(task: &str) -> Synthesis {
        let confidence = SynthesisConfidence {
            overall: 0.0,
            factors: ConfidenceFactors::default(),
            label: ConfidenceLabel::Low,
        };
        let summary = format!("No expert responses were available for \"{}\".", task);
        let recommendation = "Re-run the analysis once agents are reachable.".to_string();
        Synthesis {
            essential: EssentialLayer {
                summary: summary.clone(),
                recommendation: recommendation.clone(),
                confidence,
                top_tradeoff: None,
            },
            exploration: ExplorationLayer {
                tradeoffs: Vec::new(),
                consensus: Vec::new(),
                divergences: Vec::new(),
                confidence_breakdown: confidence.factors,
                options: Vec::new(),
            },
            executive_summary: summary,
            key_recommendation: recommendation,
            critical_considerations: Vec::new(),
            confidence,
            tradeoffs: Vec::new(),
            deep_analysis: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::agent::Agent;
    use crate::orchestration::value_objects::AgentResponse;

    fn analyze(contents: &[&str]) -> ConsensusAnalysis {
        let responses: Vec<_> = contents
            .iter()
            .enumerate()
            .map(|(i, c)| {
                let agent = Agent::new(format!("a{}", i), format!("A{}", i), "Expert");
                AgentResponse::success(&agent, "brainstorm", *c, "mock", 0.8)
            })
            .collect();
        ConsensusAnalyzer::default().analyze(&responses)
    }

    #[test]
    fn test_strong_consensus_band() {
        let analysis = analyze(&["Use Postgres. It is proven."; 9]);
        let synthesis = MetaSynthesizer::new().synthesize("Pick a database", &analysis);
        assert!(synthesis.executive_summary.starts_with("There is strong consensus (100%)"));
        assert!(synthesis.executive_summary.contains("Use Postgres"));
        assert_eq!(synthesis.key_recommendation, "Use Postgres");
        assert_eq!(synthesis.tradeoffs[0].id, "consensus_vs_alternatives");
        assert_eq!(synthesis.essential.top_tradeoff.as_ref().unwrap().id, "consensus_vs_alternatives");
    }

    #[test]
    fn test_moderate_band() {
        let mut contents = vec!["Use microservices"; 8];
        contents.extend(["Start with a monolith", "Start with a monolith"]);
        let analysis = analyze(&contents);
        let synthesis = MetaSynthesizer::new().synthesize("Architecture", &analysis);
        assert!(synthesis.executive_summary.starts_with("There is moderate consensus (80%)"));
        assert_eq!(synthesis.critical_considerations, vec!["Start with a monolith".to_string()]);
    }

    #[test]
    fn test_no_consensus_band() {
        let analysis = analyze(&["go left", "go left", "turn right", "turn right", "stay", "stay"]);
        let synthesis = MetaSynthesizer::new().synthesize("Direction", &analysis);
        assert!(synthesis.executive_summary.starts_with("There is no clear consensus."));
        assert_eq!(
            synthesis.key_recommendation,
            "Carefully weigh the trade-offs presented before deciding."
        );
    }

    #[test]
    fn test_confidence_formula() {
        // 8/2 split: level 0.8, 2 clusters, 1 divergence
        let mut contents = vec!["Use microservices"; 8];
        contents.extend(["Start with a monolith", "Start with a monolith"]);
        let confidence = MetaSynthesizer::confidence(&analyze(&contents));
        let expected = 0.5 * 0.8 + 0.3 * 0.2 + 0.2 * 0.9;
        assert!((confidence.overall - expected).abs() < 1e-9);
        assert_eq!(confidence.label, ConfidenceLabel::Moderate);
    }

    #[test]
    fn test_confidence_bounded_with_many_divergences() {
        let mut contents = Vec::new();
        let words: Vec<String> = (0..15).map(|i| format!("option{} idea{}", i, i)).collect();
        for w in &words {
            contents.push(w.as_str());
            contents.push(w.as_str());
        }
        let confidence = MetaSynthesizer::confidence(&analyze(&contents));
        assert!((0.0..=1.0).contains(&confidence.overall));
        assert_eq!(confidence.factors.clarity, 0.0);
    }

    #[test]
    fn test_divergence_tradeoff_option_names() {
        let analysis = analyze(&[
            "Use Kafka, with long retention for replays",
            "Use Kafka, with long retention for replays",
            "Use RabbitMQ for simple routing",
            "Use RabbitMQ for simple routing",
            "a", "b", "c", "d", "e", "f", "g",
        ]);
        let synthesis = MetaSynthesizer::new().synthesize("Queue", &analysis);
        let tradeoff = synthesis
            .tradeoffs
            .iter()
            .find(|t| t.id == "divergence_tradeoff")
            .unwrap();
        assert_eq!(tradeoff.options[0].name, "Use Kafka");
        assert_eq!(tradeoff.options[1].name, "Use RabbitMQ for simple routing");
    }

    #[test]
    fn test_exploration_options() {
        let contents: Vec<String> = (0..22).map(|i| format!("distinct{}", i)).collect();
        let refs: Vec<&str> = contents.iter().map(String::as_str).collect();
        let synthesis = MetaSynthesizer::new().synthesize("Many", &analyze(&refs));
        assert_eq!(
            synthesis.exploration.options,
            vec![
                ExplorationOption::ViewAllClusters,
                ExplorationOption::ViewDetailedAnalysis,
                ExplorationOption::ViewAllResponses,
            ]
        );
    }

    #[test]
    fn test_empty_analysis() {
        let synthesis = MetaSynthesizer::new().synthesize("Nothing", &ConsensusAnalysis::default());
        assert_eq!(synthesis.confidence.overall, 0.0);
        assert_eq!(synthesis.confidence.label, ConfidenceLabel::Low);
        assert!(synthesis.tradeoffs.is_empty());
    }

    #[test]
    fn test_deep_analysis_on_demand() {
        let analyzer = ConsensusAnalyzer::default();
        let analysis = analyze(&["same text", "same text", "other"]);
        let plain = MetaSynthesizer::new().synthesize("T", &analysis);
        assert!(plain.deep_analysis.is_none());

        let deep = MetaSynthesizer::new().synthesize_deep("T", &analysis, &analyzer);
        let layer = deep.deep_analysis.unwrap();
        assert_eq!(layer.clusters.len(), 2);
        assert_eq!(layer.total_responses, 3);
        assert_eq!(layer.similarity, "jaccard");
        assert_eq!(layer.clusters[0].size, 2);
    }
}
