//! The inter-agent task envelope.
//!
//! These shapes form an external protocol boundary and must stay stable
//! for interoperation with A2A-style clients: a task carries role-tagged
//! messages in `history` and named artifacts out. Only text parts are
//! interpreted by this crate; other part kinds pass through untouched.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle state of a routed task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskState {
    /// Created by the caller, not yet dispatched.
    Submitted,
    /// A handler is processing the task.
    Working,
    /// The handler finished successfully.
    Completed,
    /// The handler failed or no handler was registered.
    Failed,
}

impl Default for TaskState {
    fn default() -> Self {
        Self::Submitted
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Submitted => write!(f, "submitted"),
            Self::Working => write!(f, "working"),
            Self::Completed => write!(f, "completed"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Status of a task, with an optional explanatory message on failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskStatus {
    /// The lifecycle state.
    pub state: TaskState,
    /// When the state was entered (ISO 8601).
    pub timestamp: String,
    /// Optional message, set on failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<Message>,
}

impl TaskStatus {
    /// Creates a status in the given state, stamped now.
    #[must_use]
    pub fn new(state: TaskState) -> Self {
        Self {
            state,
            timestamp: crate::utils::iso_timestamp(),
            message: None,
        }
    }
}

impl Default for TaskStatus {
    fn default() -> Self {
        Self::new(TaskState::Submitted)
    }
}

/// The role of a message author.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// The end user.
    User,
    /// An agent.
    Agent,
}

/// One content part of a message or artifact.
///
/// Only `Text` is interpreted; other kinds are carried through verbatim.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Part {
    /// Plain text.
    Text {
        /// The text content.
        text: String,
    },
    /// Structured data, passed through untouched.
    Data {
        /// The payload.
        data: serde_json::Value,
    },
    /// A file reference, passed through untouched.
    File {
        /// The file name.
        name: String,
        /// Where the file lives.
        uri: String,
    },
}

impl Part {
    /// Creates a text part.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::Text { text: text.into() }
    }

    /// Returns the text content if this is a text part.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text { text } => Some(text),
            _ => None,
        }
    }
}

/// A role-tagged message carrying one or more parts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Who authored the message.
    pub role: Role,
    /// Unique message identifier.
    pub message_id: String,
    /// The message content parts.
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Message {
    /// Creates a user message with one text part.
    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            message_id: crate::utils::generate_uuid().to_string(),
            parts: vec![Part::text(text)],
        }
    }

    /// Creates an agent message with one text part.
    #[must_use]
    pub fn agent(text: impl Into<String>) -> Self {
        Self {
            role: Role::Agent,
            message_id: crate::utils::generate_uuid().to_string(),
            parts: vec![Part::text(text)],
        }
    }

    /// Returns the first text part, if any.
    #[must_use]
    pub fn first_text(&self) -> Option<&str> {
        self.parts.iter().find_map(Part::as_text)
    }
}

/// A named bundle of output parts attached to a completed task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artifact {
    /// Unique artifact identifier.
    pub id: String,
    /// The artifact name.
    pub name: String,
    /// The artifact content parts.
    #[serde(default)]
    pub parts: Vec<Part>,
}

impl Artifact {
    /// Creates an artifact with one text part.
    #[must_use]
    pub fn text(name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: crate::utils::generate_uuid().to_string(),
            name: name.into(),
            parts: vec![Part::text(text)],
        }
    }
}

/// The routed-mode message envelope.
///
/// Created by the caller, mutated in place by the router as it
/// transitions status, read back by the caller after dispatch.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    /// Unique task identifier.
    pub id: String,
    /// Correlates the task to a session.
    pub context_id: String,
    /// Ordered conversation history.
    #[serde(default)]
    pub history: Vec<Message>,
    /// Current lifecycle status.
    #[serde(default)]
    pub status: TaskStatus,
    /// Output bundles produced on completion.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub artifacts: Vec<Artifact>,
}

impl Task {
    /// Creates a new submitted task for the given session.
    #[must_use]
    pub fn new(context_id: impl Into<String>) -> Self {
        Self {
            id: crate::utils::generate_uuid().to_string(),
            context_id: context_id.into(),
            history: Vec::new(),
            status: TaskStatus::default(),
            artifacts: Vec::new(),
        }
    }

    /// Appends a user message carrying the given text.
    #[must_use]
    pub fn with_user_message(mut self, text: impl Into<String>) -> Self {
        self.history.push(Message::user(text));
        self
    }

    /// Appends a message to the history.
    pub fn push_message(&mut self, message: Message) {
        self.history.push(message);
    }

    /// Returns the first text part of the first user message, or "".
    #[must_use]
    pub fn first_user_text(&self) -> String {
        self.history
            .iter()
            .find(|m| m.role == Role::User)
            .and_then(Message::first_text)
            .unwrap_or_default()
            .to_string()
    }

    /// Returns the first text part of the last agent message, or "".
    #[must_use]
    pub fn last_agent_text(&self) -> String {
        self.history
            .iter()
            .rev()
            .find(|m| m.role == Role::Agent)
            .and_then(Message::first_text)
            .unwrap_or_default()
            .to_string()
    }

    /// Returns the first text part found across artifacts, or "".
    ///
    /// Artifacts are scanned in order, parts within each artifact in
    /// order; a task without any text part extracts as empty, never as an
    /// error.
    #[must_use]
    pub fn artifact_text(&self) -> String {
        self.artifacts
            .iter()
            .flat_map(|a| a.parts.iter())
            .find_map(Part::as_text)
            .unwrap_or_default()
            .to_string()
    }

    /// Attaches a text artifact.
    pub fn add_artifact(&mut self, name: impl Into<String>, text: impl Into<String>) {
        self.artifacts.push(Artifact::text(name, text));
    }

    /// Transitions the task to `Working`.
    pub fn mark_working(&mut self) {
        self.status = TaskStatus::new(TaskState::Working);
    }

    /// Transitions the task to `Completed`.
    pub fn mark_completed(&mut self) {
        self.status = TaskStatus::new(TaskState::Completed);
    }

    /// Transitions the task to `Failed` with an explanatory message.
    pub fn mark_failed(&mut self, message: impl Into<String>) {
        let mut status = TaskStatus::new(TaskState::Failed);
        status.message = Some(Message::agent(message));
        self.status = status;
    }

    /// Returns the failure message text, if the task failed with one.
    #[must_use]
    pub fn failure_message(&self) -> Option<&str> {
        self.status.message.as_ref().and_then(Message::first_text)
    }
}
