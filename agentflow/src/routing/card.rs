//! Agent discovery document.
//!
//! A static descriptor served by the collaborator layer (typically at a
//! well-known URL) so clients can discover an agent's endpoint and
//! declared skills. This crate only serializes and deserializes the
//! shape; it does not compute or serve it.

use serde::{Deserialize, Serialize};

/// Optional capabilities an agent declares.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct AgentCapabilities {
    /// Whether the agent streams partial results.
    #[serde(default)]
    pub streaming: bool,
    /// Whether the agent pushes notifications.
    #[serde(default)]
    pub push_notifications: bool,
}

/// A skill declared on an agent card.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentSkill {
    /// Stable skill identifier.
    pub id: String,
    /// Human-readable skill name.
    pub name: String,
    /// What the skill does.
    pub description: String,
    /// Free-form tags for discovery.
    #[serde(default)]
    pub tags: Vec<String>,
}

impl AgentSkill {
    /// Creates a new skill.
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            tags: Vec::new(),
        }
    }

    /// Adds tags to the skill.
    #[must_use]
    pub fn with_tags(mut self, tags: &[&str]) -> Self {
        self.tags = tags.iter().map(ToString::to_string).collect();
        self
    }
}

/// The discovery document for one agent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentCard {
    /// Agent display name.
    pub name: String,
    /// What the agent does.
    pub description: String,
    /// Endpoint URL for sending tasks.
    pub url: String,
    /// Protocol version.
    pub version: String,
    /// Declared capabilities.
    #[serde(default)]
    pub capabilities: AgentCapabilities,
    /// Declared skills.
    #[serde(default)]
    pub skills: Vec<AgentSkill>,
}

impl AgentCard {
    /// Creates a new card.
    #[must_use]
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        url: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            url: url.into(),
            version: version.into(),
            capabilities: AgentCapabilities::default(),
            skills: Vec::new(),
        }
    }

    /// Adds a skill to the card.
    #[must_use]
    pub fn with_skill(mut self, skill: AgentSkill) -> Self {
        self.skills.push(skill);
        self
    }

    /// The card published for the researcher agent.
    #[must_use]
    pub fn researcher() -> Self {
        Self::new(
            "Researcher Agent",
            "Research agent that gathers information from the web.",
            "http://localhost:8080/a2a/researcher",
            "1.0.0",
        )
        .with_skill(
            AgentSkill::new(
                "web-research",
                "Web Research",
                "Searches the web on the given topic and collects raw material.",
            )
            .with_tags(&["research", "web-search", "data-collection"]),
        )
    }

    /// The card published for the analysis agent.
    #[must_use]
    pub fn analyst() -> Self {
        Self::new(
            "Analysis Agent",
            "Analysis agent that turns raw data into structured results.",
            "http://localhost:8080/a2a/analyst",
            "1.0.0",
        )
        .with_skill(
            AgentSkill::new(
                "data-analysis",
                "Data Analysis",
                "Analyzes raw research data, summarises it, and presents it in a structured format.",
            )
            .with_tags(&["analysis", "summarization", "structuring"]),
        )
    }
}
