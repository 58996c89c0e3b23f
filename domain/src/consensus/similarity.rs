//! Pluggable text similarity used by the consensus clustering.

use std::collections::HashSet;

/// Similarity between two texts, in `[0, 1]`.
///
/// The analyzer only relies on this contract, so an embedding-based
/// implementation can replace the lexical default.
pub trait SimilarityFn: Send + Sync {
    fn similarity(&self, a: &str, b: &str) -> f64;

    /// Short name recorded in deep-analysis metadata.
    fn name(&self) -> &str;
}

/// Token-set Jaccard over lowercased whitespace tokens.
#[derive(Debug, Clone, Copy, Default)]
pub struct JaccardSimilarity;

impl JaccardSimilarity {
    fn tokens(text: &str) -> HashSet<String> {
        text.split_whitespace().map(str::to_lowercase).collect()
    }
}

impl SimilarityFn for JaccardSimilarity {
    fn similarity(&self, a: &str, b: &str) -> f64 {
        let left = Self::tokens(a);
        let right = Self::tokens(b);
        if left.is_empty() && right.is_empty() {
            return 1.0;
        }
        let union = left.union(&right).count();
        left.intersection(&right).count() as f64 / union as f64
    }

    fn name(&self) -> &str {
        "jaccard"
    }
}
