//! Provider routing
//!
//! Maps agents to language-model backends, wraps every call with the
//! response cache and a deadline, and keeps per-backend telemetry.

pub mod router;
pub mod stats;

pub use router::{BackendHandle, ProviderRouter, RoutedReply, RouterError, RoutingPolicy};
pub use stats::{BackendSnapshot, BackendStats};
