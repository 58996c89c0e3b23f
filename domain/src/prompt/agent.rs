//! Prompt templates for expert agents

use crate::core::agent::Agent;
use crate::core::language::Language;
use crate::orchestration::context::PhaseContext;
use crate::orchestration::entities::PhaseDefinition;

/// Bytes of prior-phase context rendered into a user prompt.
const CONTEXT_BYTES: usize = 1_200;

/// Templates for generating agent prompts
pub struct AgentPromptTemplate;

impl AgentPromptTemplate {
    /// Role-scoped system persona for one agent in one phase.
    pub fn agent_system(agent: &Agent, phase: &PhaseDefinition, language: Language) -> String {
        let capabilities = if agent.capabilities.is_empty() {
            agent.role.clone()
        } else {
            agent.capabilities.join(", ")
        };
        let phase_line = if phase.description.is_empty() {
            format!("You are contributing to the \"{}\" phase of the analysis.", phase.name)
        } else {
            format!(
                "You are contributing to the \"{}\" phase of the analysis: {}",
                phase.name, phase.description
            )
        };

        format!(
            r#"You are {name}, {role}.
Your areas of expertise: {capabilities}.
{phase_line}

Answer from your specific perspective. Be concrete and concise:
- lead with your main recommendation in one sentence
- list the key considerations from your area
- name any risks or blockers you see and how serious they are

{instruction}"#,
            name = agent.name,
            role = agent.role,
            instruction = language.instruction(),
        )
    }

    /// User message: the task, optional caller context and prior-phase summary.
    pub fn agent_user(task: &str, caller_context: Option<&str>, phase_context: &PhaseContext) -> String {
        let mut prompt = format!("Task: {}\n", task);

        if let Some(context) = caller_context {
            prompt.push_str(&format!("\nAdditional context:\n{}\n", context));
        }

        if !phase_context.is_empty() {
            prompt.push_str(&format!(
                "\nFindings from earlier phases:\n{}\n",
                phase_context.render(CONTEXT_BYTES)
            ));
        }

        prompt.push_str("\nGive your expert analysis.");
        prompt
    }

    /// Direct question to a single agent outside any workflow.
    pub fn consult_system(agent: &Agent, language: Language) -> String {
        format!(
            "You are {}, {}. Your areas of expertise: {}.\nAnswer the question directly from your perspective.\n\n{}",
            agent.name,
            agent.role,
            agent.capabilities.join(", "),
            language.instruction()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn agent() -> Agent {
        Agent::new("ux-lead", "Uma", "UX Lead").with_capabilities(["User Research", "Accessibility"])
    }

    #[test]
    fn test_system_prompt_mentions_persona_and_phase() {
        let phase = PhaseDefinition::new("ux", "Usability and flows");
        let prompt = AgentPromptTemplate::agent_system(&agent(), &phase, Language::PtBr);
        assert!(prompt.starts_with("You are Uma, UX Lead."));
        assert!(prompt.contains("User Research, Accessibility"));
        assert!(prompt.contains("\"ux\" phase of the analysis: Usability and flows"));
        assert!(prompt.ends_with(Language::PtBr.instruction()));
    }

    #[test]
    fn test_user_prompt_sections() {
        let plain = AgentPromptTemplate::agent_user("Build a chat app", None, &PhaseContext::default());
        assert_eq!(plain, "Task: Build a chat app\n\nGive your expert analysis.");

        let with_context =
            AgentPromptTemplate::agent_user("Build a chat app", Some("B2B only"), &PhaseContext::default());
        assert!(with_context.contains("Additional context:\nB2B only"));
    }
}
