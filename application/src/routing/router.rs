//! Provider router
//!
//! Resolution order for an agent's primary backend:
//!
//! 1. per-agent override
//! 2. per-category override
//! 3. the configured default backend
//! 4. a stable hash of the agent id over all backends
//!
//! With failover enabled, the remaining backends follow the primary in
//! ring order.

use super::stats::{BackendSnapshot, BackendStats};
use crate::ports::llm_backend::{BackendError, CompletionRequest, LlmBackend};
use crate::ports::response_cache::{CacheKey, ResponseCache};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, warn};
use warroom_domain::Agent;
use warroom_domain::util::stable_hash;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum RouterError {
    #[error("No language-model backends are configured")]
    NoBackends,

    #[error("Routing refers to unknown backend '{0}'")]
    UnknownBackend(String),
}

/// Which backend serves which agent
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RoutingPolicy {
    pub default_backend: Option<String>,
    /// agent id -> backend name
    pub agent_overrides: HashMap<String, String>,
    /// agent category -> backend name
    pub category_overrides: HashMap<String, String>,
    pub failover: bool,
}

impl RoutingPolicy {
    pub fn with_default(mut self, backend: impl Into<String>) -> Self {
        self.default_backend = Some(backend.into());
        self
    }

    pub fn with_agent(mut self, agent_id: impl Into<String>, backend: impl Into<String>) -> Self {
        self.agent_overrides.insert(agent_id.into(), backend.into());
        self
    }

    pub fn with_category(mut self, category: impl Into<String>, backend: impl Into<String>) -> Self {
        self.category_overrides.insert(category.into(), backend.into());
        self
    }

    pub fn with_failover(mut self, failover: bool) -> Self {
        self.failover = failover;
        self
    }

    fn referenced(&self) -> impl Iterator<Item = &String> {
        self.default_backend
            .iter()
            .chain(self.agent_overrides.values())
            .chain(self.category_overrides.values())
    }
}

/// A resolved backend
#[derive(Debug, Clone, PartialEq)]
pub struct BackendHandle {
    index: usize,
    pub name: String,
    pub model: String,
}

/// A completed call
#[derive(Debug, Clone, PartialEq)]
pub struct RoutedReply {
    pub text: String,
    pub backend: String,
    pub model: String,
    pub cached: bool,
    pub latency_ms: u64,
}

pub struct ProviderRouter {
    backends: Vec<Arc<dyn LlmBackend>>,
    policy: RoutingPolicy,
    cache: Arc<dyn ResponseCache>,
    stats: Mutex<HashMap<String, BackendStats>>,
}

impl ProviderRouter {
    /// Build a router, checking that every backend named by the policy exists.
    pub fn new(
        backends: Vec<Arc<dyn LlmBackend>>,
        policy: RoutingPolicy,
        cache: Arc<dyn ResponseCache>,
    ) -> Result<Self, RouterError> {
        if backends.is_empty() {
            return Err(RouterError::NoBackends);
        }
        if let Some(missing) = policy
            .referenced()
            .find(|name| !backends.iter().any(|b| b.name() == name.as_str()))
        {
            return Err(RouterError::UnknownBackend(missing.clone()));
        }

        Ok(Self {
            backends,
            policy,
            cache,
            stats: Mutex::new(HashMap::new()),
        })
    }

    pub fn backend_names(&self) -> Vec<&str> {
        self.backends.iter().map(|b| b.name()).collect()
    }

    pub fn failover_enabled(&self) -> bool {
        self.policy.failover
    }

    /// Primary backend for an agent.
    pub fn route(&self, agent: &Agent) -> BackendHandle {
        let by_name = |name: &String| self.backends.iter().position(|b| b.name() == name.as_str());

        let index = self
            .policy
            .agent_overrides
            .get(agent.id.as_str())
            .and_then(by_name)
            .or_else(|| self.policy.category_overrides.get(&agent.category).and_then(by_name))
            .or_else(|| self.policy.default_backend.as_ref().and_then(by_name))
            .unwrap_or_else(|| (stable_hash(agent.id.as_str()) % self.backends.len() as u64) as usize);

        self.handle(index)
    }

    /// Primary backend followed by failover candidates.
    pub fn route_chain(&self, agent: &Agent) -> Vec<BackendHandle> {
        let primary = self.route(agent);
        if !self.policy.failover {
            return vec![primary];
        }
        let n = self.backends.len();
        (0..n).map(|offset| self.handle((primary.index + offset) % n)).collect()
    }

    /// Run one completion through the cache and the backend.
    ///
    /// A cache hit never reaches the backend. The request's timeout is
    /// enforced here regardless of what the backend does.
    pub async fn query(
        &self,
        handle: &BackendHandle,
        agent_id: &str,
        request: &CompletionRequest,
        task_text: &str,
    ) -> Result<RoutedReply, BackendError> {
        let backend = &self.backends[handle.index];
        let key = CacheKey::new(backend.model(), agent_id, task_text);

        if let Some(text) = self.cache.get(&key) {
            debug!("Cache hit for agent {} on {}", agent_id, handle.name);
            self.with_stats(&handle.name, |s| s.record_cache_hit());
            return Ok(RoutedReply {
                text,
                backend: handle.name.clone(),
                model: handle.model.clone(),
                cached: true,
                latency_ms: 0,
            });
        }

        let started = Instant::now();
        let outcome = match tokio::time::timeout(request.options.timeout, backend.complete(request)).await {
            Ok(Ok(text)) if text.trim().is_empty() => {
                Err(BackendError::ServerError("empty completion".to_string()))
            }
            Ok(result) => result,
            Err(_) => Err(BackendError::Timeout(request.options.timeout)),
        };
        let latency_ms = started.elapsed().as_millis() as u64;

        match outcome {
            Ok(text) => {
                self.with_stats(&handle.name, |s| s.record_success(latency_ms));
                self.cache.put(key, text.clone());
                Ok(RoutedReply {
                    text,
                    backend: handle.name.clone(),
                    model: handle.model.clone(),
                    cached: false,
                    latency_ms,
                })
            }
            Err(e) => {
                warn!("Backend {} failed for agent {}: {}", handle.name, agent_id, e);
                self.with_stats(&handle.name, |s| s.record_failure(latency_ms));
                Err(e)
            }
        }
    }

    /// Telemetry for every backend, in configuration order.
    pub fn stats_snapshot(&self) -> Vec<BackendSnapshot> {
        let stats = self.stats.lock().unwrap_or_else(PoisonError::into_inner);
        self.backends
            .iter()
            .map(|b| {
                let entry = stats.get(b.name()).cloned().unwrap_or_default();
                BackendSnapshot::from_stats(b.name(), b.model(), &entry)
            })
            .collect()
    }

    fn handle(&self, index: usize) -> BackendHandle {
        let backend = &self.backends[index];
        BackendHandle {
            index,
            name: backend.name().to_string(),
            model: backend.model().to_string(),
        }
    }

    fn with_stats(&self, backend: &str, update: impl FnOnce(&mut BackendStats)) {
        let mut stats = self.stats.lock().unwrap_or_else(PoisonError::into_inner);
        update(stats.entry(backend.to_string()).or_default());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::llm_backend::CompletionOptions;
    use crate::ports::response_cache::NoResponseCache;
    use crate::testing::{MemoryCache, ScriptedBackend};
    use std::time::Duration;

    fn agent(id: &str, category: &str) -> Agent {
        Agent::new(id, id, "Expert").with_category(category)
    }

    fn router(names: &[&str], policy: RoutingPolicy) -> ProviderRouter {
        let backends: Vec<Arc<dyn LlmBackend>> = names
            .iter()
            .map(|n| Arc::new(ScriptedBackend::new(*n)) as Arc<dyn LlmBackend>)
            .collect();
        ProviderRouter::new(backends, policy, Arc::new(NoResponseCache)).unwrap()
    }

    #[test]
    fn test_rejects_empty_backends() {
        let result = ProviderRouter::new(vec![], RoutingPolicy::default(), Arc::new(NoResponseCache));
        assert!(matches!(result, Err(RouterError::NoBackends)));
    }

    #[test]
    fn test_rejects_unknown_backend_in_policy() {
        let backends: Vec<Arc<dyn LlmBackend>> = vec![Arc::new(ScriptedBackend::new("a"))];
        let result = ProviderRouter::new(
            backends,
            RoutingPolicy::default().with_category("security", "ghost"),
            Arc::new(NoResponseCache),
        );
        assert_eq!(result.err(), Some(RouterError::UnknownBackend("ghost".to_string())));
    }

    #[test]
    fn test_resolution_order() {
        let policy = RoutingPolicy::default()
            .with_default("a")
            .with_category("security", "b")
            .with_agent("sofia", "c");
        let router = router(&["a", "b", "c"], policy);

        assert_eq!(router.route(&agent("sofia", "security")).name, "c");
        assert_eq!(router.route(&agent("sam", "security")).name, "b");
        assert_eq!(router.route(&agent("dev", "development")).name, "a");
    }

    #[test]
    fn test_hash_routing_is_stable() {
        let router = router(&["a", "b", "c"], RoutingPolicy::default());
        let first = router.route(&agent("architect", "architecture"));
        let second = router.route(&agent("architect", "architecture"));
        assert_eq!(first, second);
    }

    #[test]
    fn test_chain_without_failover_is_primary_only() {
        let router = router(&["a", "b"], RoutingPolicy::default().with_default("b"));
        let chain = router.route_chain(&agent("x", "general"));
        assert_eq!(chain.len(), 1);
        assert_eq!(chain[0].name, "b");
    }

    #[test]
    fn test_chain_with_failover_follows_ring_order() {
        let router = router(
            &["a", "b", "c"],
            RoutingPolicy::default().with_default("b").with_failover(true),
        );
        let names: Vec<String> = router
            .route_chain(&agent("x", "general"))
            .into_iter()
            .map(|h| h.name)
            .collect();
        assert_eq!(names, vec!["b", "c", "a"]);
    }

    #[tokio::test]
    async fn test_cache_hit_bypasses_backend() {
        let backend = Arc::new(ScriptedBackend::new("a").with_reply(Ok("fresh answer".to_string())));
        let router = ProviderRouter::new(
            vec![backend.clone() as Arc<dyn LlmBackend>],
            RoutingPolicy::default(),
            Arc::new(MemoryCache::default()),
        )
        .unwrap();
        let handle = router.route(&agent("x", "general"));
        let request = CompletionRequest::new("sys", "user");

        let first = router.query(&handle, "x", &request, "ux: task").await.unwrap();
        let second = router.query(&handle, "x", &request, "ux: task").await.unwrap();

        assert!(!first.cached);
        assert!(second.cached);
        assert_eq!(second.text, "fresh answer");
        assert_eq!(backend.calls(), 1);
        assert_eq!(router.stats_snapshot()[0].cache_hits, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline_is_enforced() {
        let backend = Arc::new(ScriptedBackend::new("slow").with_delay(Duration::from_secs(60)));
        let router = ProviderRouter::new(
            vec![backend as Arc<dyn LlmBackend>],
            RoutingPolicy::default(),
            Arc::new(NoResponseCache),
        )
        .unwrap();
        let handle = router.route(&agent("x", "general"));
        let request = CompletionRequest::new("sys", "user").with_options(CompletionOptions {
            timeout: Duration::from_secs(2),
            ..CompletionOptions::default()
        });

        let err = router.query(&handle, "x", &request, "task").await.unwrap_err();
        assert_eq!(err, BackendError::Timeout(Duration::from_secs(2)));
        assert_eq!(router.stats_snapshot()[0].failures, 1);
    }

    #[tokio::test]
    async fn test_empty_completion_is_a_server_error() {
        let backend = Arc::new(ScriptedBackend::new("a").with_reply(Ok("   ".to_string())));
        let router = ProviderRouter::new(
            vec![backend as Arc<dyn LlmBackend>],
            RoutingPolicy::default(),
            Arc::new(NoResponseCache),
        )
        .unwrap();
        let handle = router.route(&agent("x", "general"));
        let err = router
            .query(&handle, "x", &CompletionRequest::new("s", "u"), "t")
            .await
            .unwrap_err();
        assert!(matches!(err, BackendError::ServerError(_)));
    }
}
