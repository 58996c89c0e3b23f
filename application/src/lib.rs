//! Application layer for warroom
//!
//! This crate contains use cases, port definitions, provider routing and
//! application configuration. It depends only on the domain layer.

pub mod config;
pub mod ports;
pub mod routing;
pub mod use_cases;

#[cfg(test)]
pub(crate) mod testing;

// Re-export commonly used types
pub use config::{
    BatchParams, CallOptions, ExecutionParams, IterationParams, RunnerParams, SelectionParams,
};
pub use ports::{
    composite_progress::CompositeProgressNotifier,
    learning_store::{LearningStore, NoLearningStore, StoreError},
    llm_backend::{BackendError, CompletionOptions, CompletionRequest, LlmBackend},
    progress::{ChannelProgress, NoProgress, ProgressNotifier, WorkflowEvent},
    response_cache::{CacheKey, NoResponseCache, ResponseCache},
};
pub use routing::{BackendSnapshot, ProviderRouter, RouterError, RoutingPolicy};
pub use use_cases::consult_agent::{ConsultAgentUseCase, ConsultError, ConsultInput};
pub use use_cases::execute_phase::{PhaseExecution, PhaseExecutor};
pub use use_cases::run_agent::{AgentJob, AgentRunner};
pub use use_cases::run_batch::{BatchOutcome, BatchScheduler};
pub use use_cases::run_workflow::{
    WorkflowConfig, WorkflowError, WorkflowHandle, WorkflowInput, WorkflowOrchestrator,
};
