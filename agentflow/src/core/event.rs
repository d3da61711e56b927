//! Agent events and their attached control actions.

use super::EventStatus;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// An event produced by a single agent run.
///
/// Events are immutable once created: composites append them to the
/// session's event log and read the attached [`EventActions`] to decide
/// what happens next (state updates, early termination, transfer).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentEvent {
    /// Name of the agent that produced the event.
    pub author: String,

    /// The event status.
    pub status: EventStatus,

    /// Text produced by the agent.
    pub content: String,

    /// Control actions attached to the event.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actions: Option<EventActions>,

    /// When the event was created (ISO 8601).
    pub timestamp: String,
}

impl AgentEvent {
    /// Creates a new event.
    #[must_use]
    pub fn new(author: impl Into<String>, status: EventStatus, content: impl Into<String>) -> Self {
        Self {
            author: author.into(),
            status,
            content: content.into(),
            actions: None,
            timestamp: crate::utils::iso_timestamp(),
        }
    }

    /// Creates a working event with empty content.
    #[must_use]
    pub fn working(author: impl Into<String>) -> Self {
        Self::new(author, EventStatus::Working, "")
    }

    /// Creates a completed event.
    #[must_use]
    pub fn completed(author: impl Into<String>, content: impl Into<String>) -> Self {
        Self::new(author, EventStatus::Completed, content)
    }

    /// Creates a failed event.
    #[must_use]
    pub fn failed(author: impl Into<String>, content: impl Into<String>) -> Self {
        Self::new(author, EventStatus::Failed, content)
    }

    /// Attaches actions to the event.
    #[must_use]
    pub fn with_actions(mut self, actions: EventActions) -> Self {
        self.actions = Some(actions);
        self
    }

    /// Returns true if the event requests early termination.
    #[must_use]
    pub fn escalates(&self) -> bool {
        self.actions.as_ref().is_some_and(|a| a.escalate)
    }

    /// Returns the transfer target named by the event, if any.
    #[must_use]
    pub fn transfer_target(&self) -> Option<&str> {
        self.actions
            .as_ref()
            .and_then(|a| a.transfer_to.as_deref())
            .filter(|t| !t.is_empty())
    }

    /// Returns the state updates attached to the event, if any.
    #[must_use]
    pub fn state_updates(&self) -> Option<&HashMap<String, serde_json::Value>> {
        self.actions
            .as_ref()
            .map(|a| &a.state_updates)
            .filter(|u| !u.is_empty())
    }
}

/// Control actions attached to an [`AgentEvent`].
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventActions {
    /// If true, the enclosing composite stops iterating and treats this
    /// event as final.
    #[serde(default)]
    pub escalate: bool,

    /// Hand control to the named agent for exactly one extra step.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transfer_to: Option<String>,

    /// Updates to apply onto the shared session state.
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub state_updates: HashMap<String, serde_json::Value>,
}

impl EventActions {
    /// Creates an empty action bundle.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the event as escalating.
    #[must_use]
    pub fn escalate(mut self) -> Self {
        self.escalate = true;
        self
    }

    /// Sets the transfer target.
    #[must_use]
    pub fn transfer_to(mut self, agent: impl Into<String>) -> Self {
        self.transfer_to = Some(agent.into());
        self
    }

    /// Adds a single state update.
    #[must_use]
    pub fn with_state_update(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.state_updates.insert(key.into(), value);
        self
    }

    /// Adds a batch of state updates.
    #[must_use]
    pub fn with_state_updates(mut self, updates: HashMap<String, serde_json::Value>) -> Self {
        self.state_updates.extend(updates);
        self
    }
}
