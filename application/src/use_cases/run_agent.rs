//! Agent Runner
//!
//! Executes one agent's query against its routed backend(s) with a
//! deadline, bounded retries and exponential backoff. Whatever happens, the
//! caller gets exactly one [`AgentResponse`]: backend failures end in a
//! templated fallback answer rather than an error.

use crate::config::{CallOptions, RunnerParams};
use crate::ports::llm_backend::{BackendError, CompletionOptions, CompletionRequest};
use crate::routing::{ProviderRouter, RoutedReply};
use std::sync::Arc;
use tracing::{debug, info, warn};
use warroom_domain::{
    Agent, AgentPromptTemplate, AgentResponse, ErrorKind, FallbackTemplates, Language,
    PhaseContext, PhaseDefinition, ResponseAnalysis, Task,
};

/// Everything an agent needs to answer within one phase
#[derive(Debug, Clone)]
pub struct AgentJob {
    pub task: Task,
    pub phase: PhaseDefinition,
    pub context: PhaseContext,
    pub language: Language,
    pub options: CallOptions,
}

impl AgentJob {
    pub fn new(task: Task, phase: PhaseDefinition) -> Self {
        Self {
            task,
            phase,
            context: PhaseContext::default(),
            language: Language::default(),
            options: CallOptions::batched(),
        }
    }

    pub fn with_context(mut self, context: PhaseContext) -> Self {
        self.context = context;
        self
    }

    pub fn with_language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }

    pub fn with_options(mut self, options: CallOptions) -> Self {
        self.options = options;
        self
    }

    /// Text identifying the work for caching purposes.
    pub fn cache_text(&self) -> String {
        format!("{}\n{}", self.phase.name, self.task.description())
    }
}

pub struct AgentRunner {
    router: Arc<ProviderRouter>,
    templates: Arc<FallbackTemplates>,
    params: RunnerParams,
}

impl AgentRunner {
    pub fn new(router: Arc<ProviderRouter>, templates: Arc<FallbackTemplates>, params: RunnerParams) -> Self {
        Self {
            router,
            templates,
            params,
        }
    }

    pub fn params(&self) -> &RunnerParams {
        &self.params
    }

    pub fn router(&self) -> &Arc<ProviderRouter> {
        &self.router
    }

    /// Run one agent for one phase.
    pub async fn run(&self, agent: &Agent, job: &AgentJob) -> AgentResponse {
        let request = CompletionRequest::new(
            AgentPromptTemplate::agent_system(agent, &job.phase, job.language),
            AgentPromptTemplate::agent_user(job.task.description(), job.task.context(), &job.context),
        )
        .with_options(self.completion_options(job.options));

        match self.call_with_retries(agent, &request, &job.cache_text(), job.options).await {
            Ok((reply, attempts)) => {
                debug!(
                    "Agent {} answered in phase {} via {} after {} attempt(s)",
                    agent.id, job.phase.name, reply.backend, attempts
                );
                Self::success(agent, &job.phase.name, reply, attempts)
            }
            Err((error, attempts)) => {
                warn!(
                    "Agent {} falling back in phase {} after {} attempt(s): {}",
                    agent.id, job.phase.name, attempts, error
                );
                self.fallback_for(agent, job, error.kind(), attempts)
            }
        }
    }

    /// Templated answer for an agent whose backend calls all failed.
    pub fn fallback_for(&self, agent: &Agent, job: &AgentJob, kind: ErrorKind, attempts: u32) -> AgentResponse {
        let content = self.templates.render(job.language, agent, job.task.description());
        AgentResponse::fallback(agent, &job.phase.name, content, kind, self.params.fallback_confidence)
            .with_attempts(attempts)
    }

    /// Ask one agent a direct question outside any workflow.
    pub async fn consult(&self, agent: &Agent, question: &Task, language: Language) -> AgentResponse {
        const CONSULT_PHASE: &str = "consult";
        let options = self.params.standalone;
        let mut user = question.description().to_string();
        if let Some(context) = question.context() {
            user.push_str(&format!("\n\nAdditional context:\n{}", context));
        }
        let request = CompletionRequest::new(AgentPromptTemplate::consult_system(agent, language), user)
            .with_options(self.completion_options(options));
        let cache_text = format!("{}\n{}", CONSULT_PHASE, question.description());

        match self.call_with_retries(agent, &request, &cache_text, options).await {
            Ok((reply, attempts)) => Self::success(agent, CONSULT_PHASE, reply, attempts),
            Err((error, attempts)) => {
                warn!("Consultation with {} fell back: {}", agent.id, error);
                let content = self.templates.render(language, agent, question.description());
                AgentResponse::fallback(agent, CONSULT_PHASE, content, error.kind(), self.params.fallback_confidence)
                    .with_attempts(attempts)
            }
        }
    }

    fn completion_options(&self, call: CallOptions) -> CompletionOptions {
        CompletionOptions {
            temperature: self.params.temperature,
            max_tokens: self.params.max_tokens,
            timeout: call.timeout,
        }
    }

    /// Try each backend in the agent's route chain.
    ///
    /// Retryable errors are retried on the same backend with exponential
    /// backoff, then the next backend is tried. A client error stops
    /// everything. Returns the reply or the last error, with the total
    /// number of backend attempts made.
    async fn call_with_retries(
        &self,
        agent: &Agent,
        request: &CompletionRequest,
        cache_text: &str,
        options: CallOptions,
    ) -> Result<(RoutedReply, u32), (BackendError, u32)> {
        let mut attempts = 0u32;
        let mut last_error = BackendError::ServerError("no backend attempted".to_string());

        'backends: for (position, handle) in self.router.route_chain(agent).into_iter().enumerate() {
            if position > 0 {
                info!("Agent {} failing over to backend {}", agent.id, handle.name);
            }
            for attempt in 1..=options.attempts() {
                if attempt > 1 {
                    tokio::time::sleep(self.params.backoff_for(attempt - 1)).await;
                }
                match self.router.query(&handle, agent.id.as_str(), request, cache_text).await {
                    Ok(reply) => {
                        if !reply.cached {
                            attempts += 1;
                        }
                        return Ok((reply, attempts));
                    }
                    Err(error) => {
                        attempts += 1;
                        let retryable = error.is_retryable();
                        last_error = error;
                        if !retryable {
                            break 'backends;
                        }
                    }
                }
            }
        }

        Err((last_error, attempts))
    }

    fn success(agent: &Agent, phase: &str, reply: RoutedReply, attempts: u32) -> AgentResponse {
        let analysis = ResponseAnalysis::parse(&reply.text, attempts.max(1));
        let mut response = AgentResponse::success(agent, phase, reply.text, reply.backend, analysis.confidence)
            .with_model(reply.model)
            .with_attempts(attempts)
            .with_cached(reply.cached)
            .with_latency_ms(reply.latency_ms);
        analysis.apply_to(&mut response);
        response
    }
}
