//! Consult Agent use case
//!
//! Asks a single catalog agent a direct question, outside any workflow.
//! Uses the standalone call options (longer deadline, more retries).

use super::run_agent::AgentRunner;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;
use warroom_domain::{AgentCatalog, AgentId, AgentResponse, Language, Task};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConsultError {
    #[error("Unknown agent: {0}")]
    UnknownAgent(String),

    #[error("Question cannot be empty")]
    EmptyQuestion,
}

#[derive(Debug, Clone)]
pub struct ConsultInput {
    pub agent_id: AgentId,
    pub question: String,
    pub context: Option<String>,
    pub language: Language,
}

impl ConsultInput {
    pub fn new(agent_id: impl Into<String>, question: impl Into<String>) -> Self {
        Self {
            agent_id: AgentId::new(agent_id),
            question: question.into(),
            context: None,
            language: Language::default(),
        }
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }

    pub fn with_language(mut self, language: Language) -> Self {
        self.language = language;
        self
    }
}

pub struct ConsultAgentUseCase {
    catalog: Arc<AgentCatalog>,
    runner: Arc<AgentRunner>,
}

impl ConsultAgentUseCase {
    pub fn new(catalog: Arc<AgentCatalog>, runner: Arc<AgentRunner>) -> Self {
        Self { catalog, runner }
    }

    pub async fn execute(&self, input: ConsultInput) -> Result<AgentResponse, ConsultError> {
        let agent = self
            .catalog
            .get(&input.agent_id)
            .ok_or_else(|| ConsultError::UnknownAgent(input.agent_id.to_string()))?;

        let mut question = Task::new(input.question).map_err(|_| ConsultError::EmptyQuestion)?;
        if let Some(context) = input.context {
            question = question.with_context(context);
        }

        info!("Consulting {} ({})", agent.name, agent.id);
        Ok(self.runner.consult(agent, &question, input.language).await)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::RunnerParams;
    use crate::ports::llm_backend::LlmBackend;
    use crate::ports::response_cache::NoResponseCache;
    use crate::routing::{ProviderRouter, RoutingPolicy};
    use crate::testing::ScriptedBackend;
    use warroom_domain::{Agent, FallbackTemplates};

    fn use_case() -> ConsultAgentUseCase {
        let catalog = AgentCatalog::new(vec![Agent::new("sec", "Sofia", "Security Engineer")]).unwrap();
        let backend = ScriptedBackend::new("primary").with_responder(|request| {
            Ok(format!("Answering: {}", request.user_prompt))
        });
        let router = ProviderRouter::new(
            vec![Arc::new(backend) as Arc<dyn LlmBackend>],
            RoutingPolicy::default(),
            Arc::new(NoResponseCache),
        )
        .unwrap();
        let runner = AgentRunner::new(Arc::new(router), Arc::new(FallbackTemplates::builtin()), RunnerParams::default());
        ConsultAgentUseCase::new(Arc::new(catalog), Arc::new(runner))
    }

    #[tokio::test]
    async fn test_consult_known_agent() {
        let response = use_case()
            .execute(ConsultInput::new("sec", "Is JWT enough?").with_context("Public API"))
            .await
            .unwrap();
        assert!(response.succeeded);
        assert!(response.content.contains("Is JWT enough?"));
        assert!(response.content.contains("Public API"));
    }

    #[tokio::test]
    async fn test_unknown_agent() {
        let err = use_case().execute(ConsultInput::new("ghost", "Hi?")).await.unwrap_err();
        assert_eq!(err, ConsultError::UnknownAgent("ghost".to_string()));
    }

    #[tokio::test]
    async fn test_empty_question() {
        let err = use_case().execute(ConsultInput::new("sec", "   ")).await.unwrap_err();
        assert_eq!(err, ConsultError::EmptyQuestion);
    }
}
