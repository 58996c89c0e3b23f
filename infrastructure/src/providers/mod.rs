//! Language-model backend adapters
//!
//! - [`OfflineBackend`]: deterministic local generation, always available
//! - `OpenAiCompatBackend`: HTTP chat completions (feature `http-backends`)

mod offline;
#[cfg(feature = "http-backends")]
mod openai_compat;

pub use offline::OfflineBackend;
#[cfg(feature = "http-backends")]
pub use openai_compat::OpenAiCompatBackend;

use crate::config::{FileProviderConfig, ProviderKind};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};
use warroom_application::LlmBackend;

/// Name of the provider used when none are configured
pub const OFFLINE_PROVIDER: &str = "offline";

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Provider '{provider}': environment variable {env} is not set")]
    MissingApiKey { provider: String, env: String },

    #[error("Provider '{0}' needs HTTP support; rebuild with the `http-backends` feature")]
    HttpDisabled(String),

    #[error("Provider '{provider}': failed to create HTTP client: {message}")]
    Client { provider: String, message: String },
}

/// Build one backend per configured provider, in configuration order.
///
/// An empty list yields the single offline provider.
pub fn build_backends(providers: &[FileProviderConfig]) -> Result<Vec<Arc<dyn LlmBackend>>, ProviderError> {
    if providers.is_empty() {
        warn!("No providers configured; using the offline provider");
        return Ok(offline_backends());
    }
    providers.iter().map(build_backend).collect()
}

/// The fallback backend set: one offline provider.
pub fn offline_backends() -> Vec<Arc<dyn LlmBackend>> {
    vec![Arc::new(OfflineBackend::new(OFFLINE_PROVIDER, 0))]
}

fn build_backend(config: &FileProviderConfig) -> Result<Arc<dyn LlmBackend>, ProviderError> {
    debug!("Building provider '{}' ({:?})", config.name, config.kind);
    match config.kind {
        ProviderKind::Offline => Ok(Arc::new(
            OfflineBackend::new(&config.name, config.seed.unwrap_or(0)).with_model(&config.model),
        )),
        ProviderKind::OpenaiCompatible => build_http_backend(config),
    }
}

#[cfg(feature = "http-backends")]
fn build_http_backend(config: &FileProviderConfig) -> Result<Arc<dyn LlmBackend>, ProviderError> {
    let api_key = std::env::var(&config.api_key_env).map_err(|_| ProviderError::MissingApiKey {
        provider: config.name.clone(),
        env: config.api_key_env.clone(),
    })?;
    let backend = OpenAiCompatBackend::new(&config.name, &config.base_url, &config.model, api_key)
        .map_err(|e| ProviderError::Client {
            provider: config.name.clone(),
            message: e.to_string(),
        })?;
    Ok(Arc::new(backend))
}

#[cfg(not(feature = "http-backends"))]
fn build_http_backend(config: &FileProviderConfig) -> Result<Arc<dyn LlmBackend>, ProviderError> {
    Err(ProviderError::HttpDisabled(config.name.clone()))
}
