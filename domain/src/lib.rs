//! Domain layer for warroom
//!
//! This crate contains the core entities, value objects and pure algorithms.
//! It has no dependencies on infrastructure or presentation concerns.
//!
//! # Core Concepts
//!
//! ## Workflow
//!
//! A task is deliberated by a panel of expert agents across ordered phases
//! (brainstorm, development, product, ux, design, marketing, security,
//! testing). Each phase produces a [`PhaseResult`]; a run may repeat the
//! whole sequence a bounded number of times.
//!
//! ## Consensus and synthesis
//!
//! - **Consensus**: responses are clustered by lexical similarity and the
//!   clusters are classified as consensus or divergence
//! - **Synthesis**: the analysis becomes a layered, confidence-scored
//!   recommendation with trade-offs
//!
//! ## Learning
//!
//! Finished iterations leave a [`LearningRecord`] that biases agent
//! selection for similar tasks later.

pub mod analysis;
pub mod config;
pub mod consensus;
pub mod core;
pub mod learning;
pub mod orchestration;
pub mod prompt;
pub mod synthesis;
pub mod util;

// Re-export commonly used types
pub use analysis::ResponseAnalysis;
pub use config::OutputFormat;
pub use consensus::{
    ConsensusAnalysis, ConsensusAnalyzer, ConsensusConfig, ConsensusPoint, JaccardSimilarity,
    ResponseCluster, SimilarityFn,
};
pub use core::{
    agent::{Agent, AgentCatalog, AgentId},
    error::DomainError,
    language::Language,
    random::{RandomSource, SeededRandom},
    task::Task,
};
pub use learning::{LearningPolicy, LearningRecord, ObservedPattern, extract_keywords, jaccard};
pub use orchestration::{
    context::PhaseContext,
    entities::{DEFAULT_PHASE_ORDER, PhaseDefinition, PhasePlan, PhaseResult, WorkflowRun, WorkflowState},
    report::{FinalReport, IterationSummary, Recommendation, RecommendationPriority, ReportSummary},
    value_objects::{AgentResponse, Blocker, Decision, ErrorKind, FALLBACK_PROVIDER, Insight, Severity},
};
pub use prompt::{AgentPromptTemplate, FallbackTemplate, FallbackTemplates};
pub use synthesis::{
    ConfidenceFactors, ConfidenceLabel, DeepAnalysisLayer, ExplorationOption, MetaSynthesizer,
    Synthesis, SynthesisConfidence, Tradeoff,
};
