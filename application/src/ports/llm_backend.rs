//! Language-model backend port
//!
//! Defines the interface for completing a prompt against one model. Adapters
//! (HTTP providers, offline generators) live in the infrastructure layer.

use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;
use warroom_domain::ErrorKind;

/// Classified backend failure
#[derive(Error, Debug, Clone, PartialEq)]
pub enum BackendError {
    #[error("Request timed out after {0:?}")]
    Timeout(Duration),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Client error: {0}")]
    ClientError(String),
}

impl BackendError {
    /// Classify an HTTP-style status code.
    ///
    /// 429 is a rate limit, 5xx a server error, anything else a client error.
    pub fn from_status(status: u16, body: &str) -> Self {
        let message = format!("HTTP {}: {}", status, body.trim());
        match status {
            429 => BackendError::RateLimited(message),
            500..=599 => BackendError::ServerError(message),
            _ => BackendError::ClientError(message),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            BackendError::Timeout(_) => ErrorKind::BackendTimeout,
            BackendError::RateLimited(_) => ErrorKind::BackendRateLimited,
            BackendError::ServerError(_) => ErrorKind::BackendServerError,
            BackendError::ClientError(_) => ErrorKind::BackendClientError,
        }
    }

    pub fn is_retryable(&self) -> bool {
        self.kind().is_retryable()
    }
}

/// Sampling and deadline options for one completion
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CompletionOptions {
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout: Duration,
}

impl Default for CompletionOptions {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            max_tokens: 2000,
            timeout: Duration::from_secs(30),
        }
    }
}

/// A system/user prompt pair
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub system_prompt: String,
    pub user_prompt: String,
    pub options: CompletionOptions,
}

impl CompletionRequest {
    pub fn new(system_prompt: impl Into<String>, user_prompt: impl Into<String>) -> Self {
        Self {
            system_prompt: system_prompt.into(),
            user_prompt: user_prompt.into(),
            options: CompletionOptions::default(),
        }
    }

    pub fn with_options(mut self, options: CompletionOptions) -> Self {
        self.options = options;
        self
    }
}

/// A language-model backend
///
/// Implementations must be cheap to share; the router holds them behind `Arc`.
#[async_trait]
pub trait LlmBackend: Send + Sync {
    /// Stable name used for routing and telemetry
    fn name(&self) -> &str;

    /// Model identifier, part of the response cache key
    fn model(&self) -> &str;

    /// Complete a prompt. The router enforces `options.timeout` as well.
    async fn complete(&self, request: &CompletionRequest) -> Result<String, BackendError>;
}
