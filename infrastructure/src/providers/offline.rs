//! Deterministic local backend.
//!
//! Produces role-flavoured answers without any network access. Phrasing is
//! drawn from a [`SeededRandom`] seeded by the configured seed and the
//! prompt itself, so the same prompt always yields the same answer.

use async_trait::async_trait;
use rand::Rng;
use rand::seq::SliceRandom;
use std::time::Duration;
use warroom_application::{BackendError, CompletionRequest, LlmBackend};
use warroom_domain::SeededRandom;

const OPENINGS: &[&str] = &[
    "From my perspective the priority is clear.",
    "Looking at this through my specialty, a few things stand out.",
    "I have seen similar efforts succeed when the basics come first.",
    "My assessment focuses on what will matter in the first release.",
];

const RECOMMENDATIONS: &[&str] = &[
    "We should start with the smallest slice that delivers real value to users.",
    "I recommend defining measurable success criteria before building anything.",
    "The team must keep the architecture simple until usage data justifies more.",
    "It is important to validate the main assumptions with real users early.",
    "We should automate testing and deployment from the first week.",
    "I suggest documenting the key decisions so later phases can build on them.",
];

const DECISIONS: &[&str] = &[
    "Recommend using: an incremental rollout behind feature flags",
    "Opt for: managed infrastructure over self-hosted services",
    "Choose: a single well-understood data store for the first version",
];

const RISKS: &[&str] = &[
    "Risk: scope creep could delay the first release.",
    "A significant concern is the operational load on a small team.",
    "Critical risk: user data must be protected from day one.",
];

pub struct OfflineBackend {
    name: String,
    model: String,
    seed: u64,
    latency: Duration,
}

impl OfflineBackend {
    pub fn new(name: impl Into<String>, seed: u64) -> Self {
        Self {
            name: name.into(),
            model: "offline".to_string(),
            seed,
            latency: Duration::ZERO,
        }
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Simulated response time.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Compose an answer for a prompt pair.
    pub fn compose(&self, request: &CompletionRequest) -> String {
        let mut rng = SeededRandom::from_text(&format!(
            "{}\u{0}{}\u{0}{}",
            self.seed, request.system_prompt, request.user_prompt
        ));

        let opening = OPENINGS.choose(&mut rng).copied().unwrap_or_default();
        let mut lines = vec![match persona_line(&request.system_prompt) {
            Some(persona) => format!("{} Speaking as {}.", opening, persona),
            None => opening.to_string(),
        }];
        if let Some(task) = task_line(&request.user_prompt) {
            lines.push(format!("For \"{}\":", task));
        }

        for (n, recommendation) in RECOMMENDATIONS.choose_multiple(&mut rng, 2).enumerate() {
            lines.push(format!("{}. {}", n + 1, recommendation));
        }
        if let Some(decision) = DECISIONS.choose(&mut rng) {
            lines.push(format!("{}.", decision));
        }

        // Roughly one answer in three raises a risk.
        if rng.gen_ratio(1, 3)
            && let Some(risk) = RISKS.choose(&mut rng)
        {
            lines.push(risk.to_string());
        }
        lines.push("[Offline mode]".to_string());
        lines.join("\n")
    }
}

/// "You are Ana, Lead Architect." -> "Ana, Lead Architect"
fn persona_line(system_prompt: &str) -> Option<&str> {
    let line = system_prompt.lines().next()?;
    let rest = line.strip_prefix("You are ")?;
    Some(rest.trim_end_matches('.'))
}

/// First `Task:` line of the user prompt.
fn task_line(user_prompt: &str) -> Option<&str> {
    user_prompt
        .lines()
        .find_map(|line| line.strip_prefix("Task:"))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

#[async_trait]
impl LlmBackend for OfflineBackend {
    fn name(&self) -> &str {
        &self.name
    }

    fn model(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String, BackendError> {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        Ok(self.compose(request))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn request(persona: &str) -> CompletionRequest {
        CompletionRequest::new(
            format!("You are {}.\nFocus on the phase.", persona),
            "Task: Build a chat app\n\nGive your expert analysis.",
        )
    }

    #[tokio::test]
    async fn test_same_prompt_same_answer() {
        let backend = OfflineBackend::new("offline", 7);
        let a = backend.complete(&request("Ana, Lead Architect")).await.unwrap();
        let b = backend.complete(&request("Ana, Lead Architect")).await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn test_answer_mentions_persona_and_task() {
        let backend = OfflineBackend::new("offline", 7);
        let text = backend.complete(&request("Ana, Lead Architect")).await.unwrap();
        assert!(text.contains("Speaking as Ana, Lead Architect."));
        assert!(text.contains("\"Build a chat app\""));
        assert!(text.ends_with("[Offline mode]"));
    }

    #[test]
    fn test_two_distinct_recommendations() {
        let backend = OfflineBackend::new("offline", 1);
        for persona in ["A, B", "C, D", "E, F", "G, H"] {
            let text = backend.compose(&request(persona));
            let numbered: Vec<&str> = text
                .lines()
                .filter(|l| l.starts_with("1. ") || l.starts_with("2. "))
                .collect();
            assert_eq!(numbered.len(), 2);
            assert_ne!(numbered[0][3..], numbered[1][3..]);
        }
    }

    #[test]
    fn test_seed_varies_phrasing() {
        let texts: HashSet<String> = (0..8)
            .map(|seed| OfflineBackend::new("offline", seed).compose(&request("Ana, Lead Architect")))
            .collect();
        assert!(texts.len() > 1);
    }
}
