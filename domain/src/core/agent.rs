//! Agent records and the read-only agent catalog.

use super::error::DomainError;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Identifier of an expert agent (Value Object)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentId(String);

impl AgentId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for AgentId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// An expert agent persona.
///
/// Agents are loaded once from the catalog and referenced by [`AgentId`]
/// everywhere else.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub id: AgentId,
    pub name: String,
    pub role: String,
    #[serde(default)]
    pub capabilities: Vec<String>,
    #[serde(default = "default_category")]
    pub category: String,
}

fn default_category() -> String {
    "general".to_string()
}

impl Agent {
    pub fn new(id: impl Into<String>, name: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            id: AgentId::new(id),
            name: name.into(),
            role: role.into(),
            capabilities: Vec::new(),
            category: default_category(),
        }
    }

    pub fn with_capabilities<I, S>(mut self, capabilities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.capabilities = capabilities.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    /// First listed capability, or the role when none are listed.
    pub fn primary_capability(&self) -> &str {
        self.capabilities
            .first()
            .map(String::as_str)
            .unwrap_or(&self.role)
    }

    /// Lowercased name, role and capabilities used for keyword matching.
    pub fn searchable_text(&self) -> String {
        let mut text = format!("{} {}", self.name, self.role);
        for capability in &self.capabilities {
            text.push(' ');
            text.push_str(capability);
        }
        text.to_lowercase()
    }

    /// Whether any of the given lowercase keywords occurs in this agent's text.
    pub fn matches_any_keyword<'a, I>(&self, keywords: I) -> bool
    where
        I: IntoIterator<Item = &'a String>,
    {
        let text = self.searchable_text();
        keywords.into_iter().any(|k| text.contains(k.as_str()))
    }
}

/// Read-only list of agents, indexed by id.
#[derive(Debug, Clone, Default)]
pub struct AgentCatalog {
    agents: Vec<Agent>,
    index: HashMap<AgentId, usize>,
}

impl AgentCatalog {
    /// Build a catalog, rejecting duplicate ids.
    pub fn new(agents: Vec<Agent>) -> Result<Self, DomainError> {
        let mut index = HashMap::with_capacity(agents.len());
        for (i, agent) in agents.iter().enumerate() {
            if index.insert(agent.id.clone(), i).is_some() {
                return Err(DomainError::DuplicateAgent(agent.id.to_string()));
            }
        }
        Ok(Self { agents, index })
    }

    pub fn get(&self, id: &AgentId) -> Option<&Agent> {
        self.index.get(id).map(|&i| &self.agents[i])
    }

    pub fn contains(&self, id: &AgentId) -> bool {
        self.index.contains_key(id)
    }

    pub fn agents(&self) -> &[Agent] {
        &self.agents
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    /// Agents grouped by category, categories in lexical order.
    pub fn by_category(&self) -> BTreeMap<&str, Vec<&Agent>> {
        let mut groups: BTreeMap<&str, Vec<&Agent>> = BTreeMap::new();
        for agent in &self.agents {
            groups.entry(agent.category.as_str()).or_default().push(agent);
        }
        groups
    }

    /// Resolve ids to agents, skipping unknown ones.
    pub fn resolve<'a, I>(&self, ids: I) -> Vec<Agent>
    where
        I: IntoIterator<Item = &'a AgentId>,
    {
        ids.into_iter().filter_map(|id| self.get(id).cloned()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn architect() -> Agent {
        Agent::new("lead-architect", "Ana", "Lead Architect")
            .with_capabilities(["Microservices", "Cloud Infrastructure"])
            .with_category("architecture")
    }

    #[test]
    fn test_searchable_text_is_lowercase() {
        let text = architect().searchable_text();
        assert!(text.contains("lead architect"));
        assert!(text.contains("microservices"));
        assert!(!text.contains("Cloud"));
    }

    #[test]
    fn test_primary_capability_falls_back_to_role() {
        let bare = Agent::new("x", "X", "Tester");
        assert_eq!(bare.primary_capability(), "Tester");
        assert_eq!(architect().primary_capability(), "Microservices");
    }

    #[test]
    fn test_matches_any_keyword() {
        let keywords = vec!["cloud".to_string(), "nothing".to_string()];
        assert!(architect().matches_any_keyword(&keywords));
        let keywords = vec!["payments".to_string()];
        assert!(!architect().matches_any_keyword(&keywords));
    }

    #[test]
    fn test_catalog_rejects_duplicates() {
        let err = AgentCatalog::new(vec![architect(), architect()]).unwrap_err();
        assert_eq!(err, DomainError::DuplicateAgent("lead-architect".to_string()));
    }

    #[test]
    fn test_catalog_lookup_and_grouping() {
        let catalog = AgentCatalog::new(vec![
            architect(),
            Agent::new("qa", "Quinn", "QA Lead").with_category("testing"),
            Agent::new("sre", "Sam", "SRE").with_category("architecture"),
        ])
        .unwrap();

        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.get(&AgentId::from("qa")).unwrap().name, "Quinn");
        assert!(catalog.get(&AgentId::from("missing")).is_none());

        let groups = catalog.by_category();
        assert_eq!(groups["architecture"].len(), 2);
        assert_eq!(groups.keys().copied().collect::<Vec<_>>(), vec!["architecture", "testing"]);

        let resolved = catalog.resolve(&[AgentId::from("sre"), AgentId::from("ghost")]);
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].id.as_str(), "sre");
    }
}
