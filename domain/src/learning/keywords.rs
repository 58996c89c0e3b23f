//! Keyword extraction and set overlap.

use std::collections::BTreeSet;

/// Words ignored when extracting task keywords.
const STOP_WORDS: &[&str] = &["with", "from", "that", "this", "will", "have", "into", "about"];

/// Minimum character count (exclusive) for a word to count as a keyword.
const MIN_KEYWORD_CHARS: usize = 3;

/// Lowercase words longer than three characters, minus stop words.
///
/// Leading and trailing punctuation is stripped so that "app." and "app"
/// produce the same keyword.
pub fn extract_keywords(text: &str) -> BTreeSet<String> {
    text.to_lowercase()
        .split_whitespace()
        .map(|word| word.trim_matches(|c: char| !c.is_alphanumeric()))
        .filter(|word| word.chars().count() > MIN_KEYWORD_CHARS)
        .filter(|word| !STOP_WORDS.contains(word))
        .map(str::to_string)
        .collect()
}

/// Jaccard index of two sets. Two empty sets share no evidence and score 0.
pub fn jaccard<T: Ord>(a: &BTreeSet<T>, b: &BTreeSet<T>) -> f64 {
    let union = a.union(b).count();
    if union == 0 {
        return 0.0;
    }
    a.intersection(b).count() as f64 / union as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(words: &[&str]) -> BTreeSet<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn test_extract_keywords_filters_short_and_stop_words() {
        let keywords = extract_keywords("Build a chat app with this backend");
        assert_eq!(keywords, set(&["backend", "build", "chat"]));
    }

    #[test]
    fn test_extract_keywords_strips_punctuation() {
        let keywords = extract_keywords("Design: payments, (checkout)!");
        assert_eq!(keywords, set(&["checkout", "design", "payments"]));
    }

    #[test]
    fn test_jaccard() {
        let a = set(&["build", "chat"]);
        let b = set(&["build", "chat", "mobile"]);
        assert!((jaccard(&a, &b) - 2.0 / 3.0).abs() < 1e-9);
        assert_eq!(jaccard(&a, &a), 1.0);
        assert_eq!(jaccard(&a, &set(&["other"])), 0.0);
        assert_eq!(jaccard(&BTreeSet::<String>::new(), &BTreeSet::new()), 0.0);
    }
}
