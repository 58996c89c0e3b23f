//! Orchestration value objects - immutable per-agent results.
//!
//! - [`AgentResponse`] - one agent's answer (or templated fallback) for a phase
//! - [`ErrorKind`] - classification of backend failures
//! - [`Insight`], [`Decision`], [`Blocker`] - findings extracted from answers

use crate::core::agent::{Agent, AgentId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Classified failure of a backend call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    BackendTimeout,
    BackendRateLimited,
    BackendServerError,
    BackendClientError,
    /// Agent task aborted unexpectedly (panic inside a spawned runner).
    Internal,
}

impl ErrorKind {
    /// Timeouts, rate limits and server errors are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            ErrorKind::BackendTimeout | ErrorKind::BackendRateLimited | ErrorKind::BackendServerError
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorKind::BackendTimeout => "backend_timeout",
            ErrorKind::BackendRateLimited => "backend_rate_limited",
            ErrorKind::BackendServerError => "backend_server_error",
            ErrorKind::BackendClientError => "backend_client_error",
            ErrorKind::Internal => "internal",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Severity of a raised blocker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Low,
    Medium,
    High,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Low => "low",
            Severity::Medium => "medium",
            Severity::High => "high",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Insight {
    pub agent_id: AgentId,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Decision {
    pub agent_id: AgentId,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Blocker {
    pub agent_id: AgentId,
    pub text: String,
    pub severity: Severity,
}

/// Result of one Agent Runner invocation.
///
/// Exactly one is produced per agent per phase, whether the backend
/// answered or a fallback template was used.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentResponse {
    pub agent_id: AgentId,
    pub agent_name: String,
    pub phase: String,
    pub content: String,
    /// Backend name, or `"fallback"` for templated answers
    pub provider: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
    pub confidence: f64,
    pub succeeded: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
    /// Backend attempts spent, 0 for cache hits
    pub attempts: u32,
    pub cached: bool,
    pub latency_ms: u64,
    #[serde(default)]
    pub insights: Vec<Insight>,
    #[serde(default)]
    pub decisions: Vec<Decision>,
    #[serde(default)]
    pub blockers: Vec<Blocker>,
}

/// Provider name recorded on templated responses.
pub const FALLBACK_PROVIDER: &str = "fallback";

impl AgentResponse {
    /// Successful answer from a backend.
    pub fn success(
        agent: &Agent,
        phase: impl Into<String>,
        content: impl Into<String>,
        provider: impl Into<String>,
        confidence: f64,
    ) -> Self {
        Self {
            agent_id: agent.id.clone(),
            agent_name: agent.name.clone(),
            phase: phase.into(),
            content: content.into(),
            provider: provider.into(),
            model: None,
            confidence: confidence.clamp(0.0, 1.0),
            succeeded: true,
            error_kind: None,
            attempts: 1,
            cached: false,
            latency_ms: 0,
            insights: Vec::new(),
            decisions: Vec::new(),
            blockers: Vec::new(),
        }
    }

    /// Templated answer used once retries are exhausted.
    pub fn fallback(
        agent: &Agent,
        phase: impl Into<String>,
        content: impl Into<String>,
        kind: ErrorKind,
        confidence: f64,
    ) -> Self {
        Self {
            agent_id: agent.id.clone(),
            agent_name: agent.name.clone(),
            phase: phase.into(),
            content: content.into(),
            provider: FALLBACK_PROVIDER.to_string(),
            model: None,
            confidence: confidence.clamp(0.0, 1.0),
            succeeded: false,
            error_kind: Some(kind),
            attempts: 0,
            cached: false,
            latency_ms: 0,
            insights: Vec::new(),
            decisions: Vec::new(),
            blockers: Vec::new(),
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_attempts(mut self, attempts: u32) -> Self {
        self.attempts = attempts;
        self
    }

    pub fn with_cached(mut self, cached: bool) -> Self {
        self.cached = cached;
        self
    }

    pub fn with_latency_ms(mut self, latency_ms: u64) -> Self {
        self.latency_ms = latency_ms;
        self
    }

    pub fn is_fallback(&self) -> bool {
        !self.succeeded
    }

    pub fn has_high_blocker(&self) -> bool {
        self.blockers.iter().any(|b| b.severity == Severity::High)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn agent() -> Agent {
        Agent::new("sec", "Sofia", "Security Engineer").with_category("security")
    }

    #[test]
    fn test_retryable_classes() {
        assert!(ErrorKind::BackendTimeout.is_retryable());
        assert!(ErrorKind::BackendRateLimited.is_retryable());
        assert!(ErrorKind::BackendServerError.is_retryable());
        assert!(!ErrorKind::BackendClientError.is_retryable());
        assert!(!ErrorKind::Internal.is_retryable());
    }

    #[test]
    fn test_fallback_response_shape() {
        let response =
            AgentResponse::fallback(&agent(), "security", "offline", ErrorKind::BackendTimeout, 0.5);
        assert!(!response.succeeded);
        assert!(response.is_fallback());
        assert_eq!(response.provider, FALLBACK_PROVIDER);
        assert_eq!(response.error_kind, Some(ErrorKind::BackendTimeout));
        assert_eq!(response.confidence, 0.5);
    }

    #[test]
    fn test_confidence_clamped() {
        let response = AgentResponse::success(&agent(), "security", "ok", "openrouter", 1.7);
        assert_eq!(response.confidence, 1.0);
    }

    #[test]
    fn test_severity_ordering_and_serde() {
        assert!(Severity::High > Severity::Medium);
        assert_eq!(serde_json::to_string(&Severity::High).unwrap(), "\"high\"");
        assert_eq!(
            serde_json::to_string(&ErrorKind::BackendRateLimited).unwrap(),
            "\"backend_rate_limited\""
        );
    }
}
