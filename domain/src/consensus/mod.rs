//! Consensus analysis over agent responses.
//!
//! - [`similarity::SimilarityFn`] — pluggable similarity, Jaccard by default
//! - [`analyzer::ConsensusAnalyzer`] — greedy clustering and consensus/divergence classification

pub mod analyzer;
pub mod similarity;

pub use analyzer::{ConsensusAnalysis, ConsensusAnalyzer, ConsensusConfig, ConsensusPoint, ResponseCluster};
pub use similarity::{JaccardSimilarity, SimilarityFn};
