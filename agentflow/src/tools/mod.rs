//! External collaborators consumed by leaf agents.
//!
//! Leaf agents reach the outside world (LLM completion, web search, file
//! persistence) only through the narrow traits defined here. Every
//! collaborator failure is reported as an `Err` that the leaf translates
//! into a `Failed` event - exceptions never cross the agent boundary.

mod chat;
mod search;
mod store;

pub use chat::{ChatCompletion, SimulatedChat};
pub use search::{SearchConfig, StaticSearch, WebSearch};
#[cfg(feature = "websearch")]
pub use search::TavilySearch;
pub use store::{FileReportStore, NullReportStore, ReportStore};
