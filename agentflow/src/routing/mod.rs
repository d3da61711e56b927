//! Task routing between agents.
//!
//! The routed execution mode exchanges work through a message envelope
//! instead of a shared context: a [`Task`] carries a conversation history
//! in, and named [`Artifact`]s out. The [`TaskRouter`] owns the
//! identifier-to-handler registry and the task lifecycle
//! (submitted -> working -> completed/failed). [`AgentCard`] is the
//! read-only discovery document shape.

mod card;
mod router;
mod task;

pub use card::{AgentCapabilities, AgentCard, AgentSkill};
pub use router::{TaskHandler, TaskRouter};
pub use task::{Artifact, Message, Part, Role, Task, TaskState, TaskStatus};
