//! In-process response cache with TTL and a size bound.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};
use tracing::trace;
use warroom_application::{CacheKey, ResponseCache};

/// Expiring map of completed answers.
///
/// Entries older than `ttl` are treated as absent. When full, the oldest
/// entry is evicted to make room.
pub struct MemoryResponseCache {
    entries: Mutex<HashMap<CacheKey, (String, Instant)>>,
    ttl: Duration,
    max_entries: usize,
}

impl MemoryResponseCache {
    pub fn new(ttl: Duration, max_entries: usize) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            ttl,
            max_entries: max_entries.max(1),
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

impl ResponseCache for MemoryResponseCache {
    fn get(&self, key: &CacheKey) -> Option<String> {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        match entries.get(key) {
            Some((text, stored)) if stored.elapsed() < self.ttl => Some(text.clone()),
            Some(_) => {
                trace!("Cache entry {} expired", key.as_str());
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    fn put(&self, key: CacheKey, text: String) {
        let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
        if !entries.contains_key(&key) && entries.len() >= self.max_entries {
            let ttl = self.ttl;
            entries.retain(|_, (_, stored)| stored.elapsed() < ttl);
            if entries.len() >= self.max_entries
                && let Some(oldest) = entries
                    .iter()
                    .min_by_key(|(_, (_, stored))| *stored)
                    .map(|(k, _)| k.clone())
            {
                entries.remove(&oldest);
            }
        }
        entries.insert(key, (text, Instant::now()));
    }

    fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    fn clear(&self) {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner).clear();
    }
}
