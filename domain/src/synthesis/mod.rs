//! Meta-synthesis: layered, confidence-scored guidance built from a consensus analysis.

pub mod synthesizer;
pub mod value_objects;

pub use synthesizer::MetaSynthesizer;
pub use value_objects::{
    ClusterDetail, ConfidenceFactors, ConfidenceLabel, DeepAnalysisLayer, EssentialLayer,
    ExplorationLayer, ExplorationOption, Synthesis, SynthesisConfidence, Tradeoff, TradeoffOption,
};
