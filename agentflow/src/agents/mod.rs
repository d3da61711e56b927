//! Agent trait and implementations.
//!
//! An agent is the unit of work in an agentflow pipeline: a named node
//! exposing a single `run` operation over a shared session context.
//! Leaves do real work (call an LLM, search the web); composites
//! ([`SequentialAgent`], [`ParallelAgent`]) hold ordered child agents and
//! define how control flows between them.

mod analyst;
mod parallel;
mod researcher;
mod sequential;

pub use analyst::AnalystAgent;
pub use parallel::ParallelAgent;
pub use researcher::ResearcherAgent;
pub use sequential::SequentialAgent;

use crate::cancellation::CancellationToken;
use crate::context::SessionContext;
use crate::core::AgentEvent;
use crate::errors::{AgentAttachError, AgentflowError};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::sync::Arc;

/// Identity shared by every agent: name, description, and the parent
/// back-reference.
///
/// The parent is recorded by name and set exactly once, when the agent is
/// added as a child. The parent/child relation must form a tree, so
/// attaching an already-parented agent is a setup-time error.
#[derive(Debug)]
pub struct AgentMeta {
    name: String,
    description: String,
    parent: RwLock<Option<String>>,
}

impl AgentMeta {
    /// Creates a new agent identity.
    #[must_use]
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parent: RwLock::new(None),
        }
    }

    /// Returns the agent name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the agent description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the parent agent name, if attached.
    #[must_use]
    pub fn parent(&self) -> Option<String> {
        self.parent.read().clone()
    }

    /// Records the parent at attach time.
    ///
    /// # Errors
    ///
    /// Returns [`AgentAttachError`] if the agent already has a parent.
    pub fn attach(&self, parent: &str) -> Result<(), AgentAttachError> {
        let mut slot = self.parent.write();
        if let Some(existing) = slot.as_ref() {
            return Err(AgentAttachError::new(&self.name, existing));
        }
        *slot = Some(parent.to_string());
        Ok(())
    }
}

/// Trait for agents.
///
/// `run` must be safe to invoke for any context: a missing expected state
/// key is a recoverable condition reported as a `Failed` event, not a
/// crash. The only error crossing this boundary is
/// [`AgentflowError::Cancelled`].
#[async_trait]
pub trait Agent: Send + Sync {
    /// Returns the agent's identity.
    fn meta(&self) -> &AgentMeta;

    /// Returns the agent name.
    fn name(&self) -> &str {
        self.meta().name()
    }

    /// Returns the agent description.
    fn description(&self) -> &str {
        self.meta().description()
    }

    /// Returns the agent's ordered children. Leaves have none.
    fn children(&self) -> &[Arc<dyn Agent>] {
        &[]
    }

    /// Runs the agent against the shared context.
    ///
    /// # Errors
    ///
    /// Returns [`AgentflowError::Cancelled`] when the cancellation token
    /// fires; every other failure is absorbed into a `Failed` event.
    async fn run(
        &self,
        ctx: Arc<SessionContext>,
        cancel: Arc<CancellationToken>,
    ) -> Result<AgentEvent, AgentflowError>;
}

/// Finds an agent by name in the subtree rooted at `root`.
///
/// Depth-first: the root itself is checked before its children, children
/// in insertion order. Returns the first match. Used to resolve
/// `transfer_to` targets.
#[must_use]
pub fn find_agent(root: &Arc<dyn Agent>, name: &str) -> Option<Arc<dyn Agent>> {
    if root.name() == name {
        return Some(Arc::clone(root));
    }
    for child in root.children() {
        if let Some(found) = find_agent(child, name) {
            return Some(found);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedAgent;

    #[test]
    fn test_meta_attach_once() {
        let meta = AgentMeta::new("child", "a child agent");
        assert!(meta.parent().is_none());

        meta.attach("pipeline").unwrap();
        assert_eq!(meta.parent(), Some("pipeline".to_string()));
    }

    #[test]
    fn test_meta_attach_twice_fails() {
        let meta = AgentMeta::new("child", "");
        meta.attach("first").unwrap();

        let err = meta.attach("second").unwrap_err();
        assert_eq!(err.child, "child");
        assert_eq!(err.parent, "first");
    }

    #[test]
    fn test_find_agent_depth_first() {
        let mut inner = ScriptedAgent::new("inner");
        inner
            .add_child(Arc::new(ScriptedAgent::new("target")))
            .unwrap();

        let mut root = ScriptedAgent::new("root");
        root.add_child(Arc::new(inner)).unwrap();
        root.add_child(Arc::new(ScriptedAgent::new("sibling")))
            .unwrap();

        let root: Arc<dyn Agent> = Arc::new(root);
        assert_eq!(find_agent(&root, "root").unwrap().name(), "root");
        assert_eq!(find_agent(&root, "target").unwrap().name(), "target");
        assert_eq!(find_agent(&root, "sibling").unwrap().name(), "sibling");
        assert!(find_agent(&root, "missing").is_none());
    }
}
