//! Error types for the agentflow engine.
//!
//! Most failure modes in agentflow are data, not errors: a leaf agent that
//! cannot do its work returns a `Failed` event, and a task handler that
//! fails produces a `Failed` task. The types here cover the two conditions
//! that do cross the orchestration boundary as errors — cancellation and
//! setup-time structural mistakes.

use thiserror::Error;

/// The main error type for agentflow operations.
#[derive(Debug, Error)]
pub enum AgentflowError {
    /// The run was cancelled through its cancellation token.
    ///
    /// Distinct from a `Failed` event or task: callers need to tell
    /// "the caller gave up" apart from "the agent could not do its work".
    #[error("Pipeline cancelled: {0}")]
    Cancelled(String),

    /// An agent was attached to a second parent.
    #[error("{0}")]
    Attach(#[from] AgentAttachError),

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A generic internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AgentflowError {
    /// Returns true if this error represents cancellation.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Cancelled(_))
    }
}

/// Error raised when adding a child agent that already has a parent.
///
/// The parent/child relation must form a tree; re-parenting is a
/// programming error surfaced at tree-construction time, before any run.
#[derive(Debug, Clone, Error)]
#[error("Agent '{child}' already has a parent: '{parent}'")]
pub struct AgentAttachError {
    /// The child that was being attached.
    pub child: String,
    /// The parent it is already attached to.
    pub parent: String,
}

impl AgentAttachError {
    /// Creates a new attach error.
    #[must_use]
    pub fn new(child: impl Into<String>, parent: impl Into<String>) -> Self {
        Self {
            child: child.into(),
            parent: parent.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_attach_error_message() {
        let err = AgentAttachError::new("worker", "pipeline");
        assert!(err.to_string().contains("worker"));
        assert!(err.to_string().contains("pipeline"));
    }

    #[test]
    fn test_cancelled_is_distinguishable() {
        let err = AgentflowError::Cancelled("caller went away".to_string());
        assert!(err.is_cancelled());

        let err: AgentflowError = AgentAttachError::new("a", "b").into();
        assert!(!err.is_cancelled());
    }
}
