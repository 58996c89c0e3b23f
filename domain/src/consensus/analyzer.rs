//! Greedy lexical clustering of agent responses.
//!
//! Each response is compared against the representative text of the clusters
//! formed so far; it joins the first cluster whose similarity meets the
//! threshold, otherwise it opens a new cluster. Clusters are rebuilt from
//! scratch on every call, so a fixed input order always yields the same
//! result.

use super::similarity::{JaccardSimilarity, SimilarityFn};
use crate::core::agent::AgentId;
use crate::orchestration::value_objects::AgentResponse;
use crate::util::first_sentence;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Bytes kept for a theme when the representative has no sentence break.
const THEME_FALLBACK_BYTES: usize = 100;

/// Thresholds of the consensus heuristic.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConsensusConfig {
    /// Minimum similarity for a response to join a cluster
    pub similarity_threshold: f64,
    /// Minimum weight for a cluster to count as consensus
    pub min_consensus_threshold: f64,
    /// Maximum weight for a multi-member cluster to count as divergence
    pub divergence_threshold: f64,
}

impl Default for ConsensusConfig {
    fn default() -> Self {
        Self {
            similarity_threshold: 0.85,
            min_consensus_threshold: 0.7,
            divergence_threshold: 0.3,
        }
    }
}

/// A group of lexically similar responses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseCluster {
    pub id: String,
    pub representative_text: String,
    pub members: Vec<AgentResponse>,
    /// `members.len() / total responses`
    pub weight: f64,
}

impl ResponseCluster {
    pub fn size(&self) -> usize {
        self.members.len()
    }

    pub fn theme(&self) -> String {
        first_sentence(&self.representative_text, THEME_FALLBACK_BYTES)
    }

    pub fn agent_ids(&self) -> Vec<AgentId> {
        self.members.iter().map(|m| m.agent_id.clone()).collect()
    }
}

/// A consensus or divergence entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConsensusPoint {
    pub cluster_id: String,
    pub theme: String,
    /// Share of responses in the cluster, as a whole percentage
    pub agreement: u32,
    pub weight: f64,
    pub agents: Vec<AgentId>,
}

impl ConsensusPoint {
    fn from_cluster(cluster: &ResponseCluster) -> Self {
        Self {
            cluster_id: cluster.id.clone(),
            theme: cluster.theme(),
            agreement: (cluster.weight * 100.0).round() as u32,
            weight: cluster.weight,
            agents: cluster.agent_ids(),
        }
    }
}

/// Derived, read-only result of one analysis.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConsensusAnalysis {
    pub consensus_points: Vec<ConsensusPoint>,
    pub divergence_points: Vec<ConsensusPoint>,
    /// Weight of the top consensus cluster, 0 when none qualifies
    pub consensus_level: f64,
    /// All clusters, heaviest first
    pub clusters: Vec<ResponseCluster>,
    pub total_responses: usize,
}

impl ConsensusAnalysis {
    pub fn is_empty(&self) -> bool {
        self.total_responses == 0
    }

    pub fn cluster_count(&self) -> usize {
        self.clusters.len()
    }

    pub fn top_consensus(&self) -> Option<&ConsensusPoint> {
        self.consensus_points.first()
    }
}

/// Clusters responses and classifies consensus and divergence.
#[derive(Clone)]
pub struct ConsensusAnalyzer {
    config: ConsensusConfig,
    similarity: Arc<dyn SimilarityFn>,
}

impl Default for ConsensusAnalyzer {
    fn default() -> Self {
        Self::new(ConsensusConfig::default())
    }
}

impl std::fmt::Debug for ConsensusAnalyzer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConsensusAnalyzer")
            .field("config", &self.config)
            .field("similarity", &self.similarity.name())
            .finish()
    }
}

impl ConsensusAnalyzer {
    pub fn new(config: ConsensusConfig) -> Self {
        Self {
            config,
            similarity: Arc::new(JaccardSimilarity),
        }
    }

    pub fn with_similarity(mut self, similarity: Arc<dyn SimilarityFn>) -> Self {
        self.similarity = similarity;
        self
    }

    pub fn config(&self) -> &ConsensusConfig {
        &self.config
    }

    pub fn similarity_name(&self) -> &str {
        self.similarity.name()
    }

    /// Single-pass greedy clustering. Clusters are returned in creation order.
    pub fn cluster(&self, responses: &[AgentResponse]) -> Vec<ResponseCluster> {
        let mut clusters: Vec<ResponseCluster> = Vec::new();

        for response in responses {
            let target = clusters.iter_mut().find(|cluster| {
                self.similarity
                    .similarity(&cluster.representative_text, &response.content)
                    >= self.config.similarity_threshold
            });

            match target {
                Some(cluster) => cluster.members.push(response.clone()),
                None => clusters.push(ResponseCluster {
                    id: format!("cluster_{}", clusters.len() + 1),
                    representative_text: response.content.clone(),
                    members: vec![response.clone()],
                    weight: 0.0,
                }),
            }
        }

        let total = responses.len() as f64;
        for cluster in &mut clusters {
            cluster.weight = cluster.members.len() as f64 / total;
        }
        clusters
    }

    pub fn analyze(&self, responses: &[AgentResponse]) -> ConsensusAnalysis {
        if responses.is_empty() {
            return ConsensusAnalysis::default();
        }

        let mut clusters = self.cluster(responses);
        // Stable sort: equal weights keep creation order.
        clusters.sort_by(|a, b| b.weight.total_cmp(&a.weight));

        let consensus_points: Vec<ConsensusPoint> = clusters
            .iter()
            .filter(|c| c.weight >= self.config.min_consensus_threshold)
            .map(ConsensusPoint::from_cluster)
            .collect();

        let divergence_points: Vec<ConsensusPoint> = clusters
            .iter()
            .filter(|c| c.weight <= self.config.divergence_threshold && c.size() > 1)
            .map(ConsensusPoint::from_cluster)
            .collect();

        let consensus_level = consensus_points.first().map(|p| p.weight).unwrap_or(0.0);

        ConsensusAnalysis {
            consensus_points,
            divergence_points,
            consensus_level,
            clusters,
            total_responses: responses.len(),
        }
    }
}
