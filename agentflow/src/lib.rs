//! # Agentflow
//!
//! An agent orchestration engine for composable pipelines of autonomous,
//! LLM-backed workers.
//!
//! Agentflow provides:
//!
//! - **Composable agents**: one `Agent` trait; sequential and parallel
//!   composites with escalate/transfer control flow
//! - **Shared context**: a per-invocation session carrying state and an
//!   append-only event log
//! - **Task routing**: an identifier-to-handler registry dispatching
//!   A2A-style task envelopes with full lifecycle tracking
//! - **Cancellation handling**: cooperative tokens observed at iteration
//!   boundaries and propagated to in-flight children
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use agentflow::prelude::*;
//! use std::sync::Arc;
//!
//! let orchestrator = ResearchOrchestrator::new(
//!     Arc::new(SimulatedChat::new()),
//!     Arc::new(StaticSearch::default()),
//!     Arc::new(FileReportStore::new("reports")),
//! );
//!
//! let result = orchestrator
//!     .run_research("What changed in Rust 1.80?", Arc::new(CancellationToken::new()))
//!     .await?;
//! println!("{}", result.analysis_result);
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod agents;
pub mod cancellation;
pub mod context;
pub mod core;
pub mod errors;
pub mod observability;
pub mod orchestrator;
pub mod routing;
pub mod testing;
pub mod tools;
pub mod utils;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::agents::{
        find_agent, Agent, AgentMeta, AnalystAgent, ParallelAgent, ResearcherAgent,
        SequentialAgent,
    };
    pub use crate::cancellation::CancellationToken;
    pub use crate::context::{SessionContext, StateBag};
    pub use crate::core::{AgentEvent, EventActions, EventStatus};
    pub use crate::errors::{AgentAttachError, AgentflowError};
    pub use crate::orchestrator::{
        EventSummary, ResearchOrchestrator, ResearchResult, ANALYST_ID, PREVIEW_LIMIT,
        RESEARCHER_ID,
    };
    pub use crate::routing::{
        AgentCard, AgentSkill, Artifact, Message, Part, Role, Task, TaskRouter, TaskState,
        TaskStatus,
    };
    #[cfg(feature = "websearch")]
    pub use crate::tools::TavilySearch;
    pub use crate::tools::{
        ChatCompletion, FileReportStore, NullReportStore, ReportStore, SearchConfig,
        SimulatedChat, StaticSearch, WebSearch,
    };
    pub use crate::utils::{generate_uuid, iso_timestamp};
}
