//! The mutable context shared across one pipeline invocation.

use super::StateBag;
use crate::core::AgentEvent;
use parking_lot::RwLock;

/// The execution context for one pipeline run.
///
/// Owned by the invocation that created it and shared as an `Arc` with
/// every agent it is passed to. Carries the session identity, the original
/// user query, the shared state bag, and the append-only event log. The
/// context has no persistence obligation; it is dropped when the
/// invocation completes.
#[derive(Debug)]
pub struct SessionContext {
    /// Unique session identifier.
    session_id: String,
    /// The user's original query.
    query: String,
    /// Shared state, used for data handoff between agents.
    state: StateBag,
    /// Chronological log of events produced during the run.
    events: RwLock<Vec<AgentEvent>>,
}

impl SessionContext {
    /// Creates a new context with a fresh session id.
    #[must_use]
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            session_id: crate::utils::generate_uuid().to_string(),
            query: query.into(),
            state: StateBag::new(),
            events: RwLock::new(Vec::new()),
        }
    }

    /// Overrides the generated session id.
    #[must_use]
    pub fn with_session_id(mut self, session_id: impl Into<String>) -> Self {
        self.session_id = session_id.into();
        self
    }

    /// Returns the session id.
    #[must_use]
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Returns the original user query.
    #[must_use]
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Returns the shared state bag.
    #[must_use]
    pub fn state(&self) -> &StateBag {
        &self.state
    }

    /// Gets a raw state value.
    #[must_use]
    pub fn get_state(&self, key: &str) -> Option<serde_json::Value> {
        self.state.get(key)
    }

    /// Writes a state value, overwriting any previous value.
    pub fn set_state(&self, key: impl Into<String>, value: serde_json::Value) {
        self.state.set(key, value);
    }

    /// Checks whether the key exists in state.
    #[must_use]
    pub fn has_state(&self, key: &str) -> bool {
        self.state.contains_key(key)
    }

    /// Appends an event to the log.
    pub fn push_event(&self, event: AgentEvent) {
        self.events.write().push(event);
    }

    /// Returns a snapshot of the event log.
    #[must_use]
    pub fn events(&self) -> Vec<AgentEvent> {
        self.events.read().clone()
    }

    /// Returns the most recent event, if any.
    #[must_use]
    pub fn last_event(&self) -> Option<AgentEvent> {
        self.events.read().last().cloned()
    }

    /// Returns the number of logged events.
    #[must_use]
    pub fn event_count(&self) -> usize {
        self.events.read().len()
    }
}
