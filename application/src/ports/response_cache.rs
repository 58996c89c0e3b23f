//! Response cache port
//!
//! Shared across concurrent workflow runs; implementations must serialise
//! access internally.

use sha2::{Digest, Sha256};

/// Hashed `(model, agent, task text)` key
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey(String);

impl CacheKey {
    pub fn new(model: &str, agent_id: &str, task_text: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(model.as_bytes());
        hasher.update([0u8]);
        hasher.update(agent_id.as_bytes());
        hasher.update([0u8]);
        hasher.update(task_text.as_bytes());
        Self(hex::encode(hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Completed backend answers, keyed by [`CacheKey`]
pub trait ResponseCache: Send + Sync {
    /// A live (non-expired) entry, if any
    fn get(&self, key: &CacheKey) -> Option<String>;

    fn put(&self, key: CacheKey, text: String);

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn clear(&self);
}

/// Cache that never stores anything
pub struct NoResponseCache;

impl ResponseCache for NoResponseCache {
    fn get(&self, _key: &CacheKey) -> Option<String> {
        None
    }

    fn put(&self, _key: CacheKey, _text: String) {}

    fn len(&self) -> usize {
        0
    }

    fn clear(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_is_stable_hex() {
        let a = CacheKey::new("gpt-4o", "architect", "Build a chat app");
        let b = CacheKey::new("gpt-4o", "architect", "Build a chat app");
        assert_eq!(a, b);
        assert_eq!(a.as_str().len(), 64);
    }

    #[test]
    fn test_key_fields_are_separated() {
        let a = CacheKey::new("ab", "c", "task");
        let b = CacheKey::new("a", "bc", "task");
        assert_ne!(a, b);
    }
}
