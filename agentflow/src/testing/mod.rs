//! Test doubles for agents and collaborators.
//!
//! Public so downstream crates can script pipelines in their own tests.

mod mocks;

pub use mocks::{
    order_log, FailingSearch, MemoryReportStore, OrderLog, QueueChat, ScriptedAgent,
};
