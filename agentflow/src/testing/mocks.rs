//! Mock agents and collaborators for testing.

use crate::agents::{Agent, AgentMeta};
use crate::cancellation::CancellationToken;
use crate::context::SessionContext;
use crate::core::AgentEvent;
use crate::errors::{AgentAttachError, AgentflowError};
use crate::tools::{ChatCompletion, ReportStore, WebSearch};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// A shared log of agent names in invocation order.
pub type OrderLog = Arc<Mutex<Vec<String>>>;

/// Creates a fresh order log.
#[must_use]
pub fn order_log() -> OrderLog {
    Arc::new(Mutex::new(Vec::new()))
}

/// An agent that returns a configured event and records its calls.
///
/// Children can be attached purely for tree structure - they make the
/// mock resolvable as a transfer holder, but `run` ignores them.
pub struct ScriptedAgent {
    meta: AgentMeta,
    event: Mutex<AgentEvent>,
    children: Vec<Arc<dyn Agent>>,
    call_count: AtomicUsize,
    delay: Option<Duration>,
    panics: AtomicBool,
    order: Option<OrderLog>,
}

impl ScriptedAgent {
    /// Creates a mock returning a completed event with "ok" content.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            event: Mutex::new(AgentEvent::completed(&name, "ok")),
            meta: AgentMeta::new(name, "scripted test agent"),
            children: Vec::new(),
            call_count: AtomicUsize::new(0),
            delay: None,
            panics: AtomicBool::new(false),
            order: None,
        }
    }

    /// Creates a mock that panics when run.
    #[must_use]
    pub fn panicking(name: impl Into<String>) -> Self {
        let agent = Self::new(name);
        agent.panics.store(true, Ordering::SeqCst);
        agent
    }

    /// Sets the event to return.
    #[must_use]
    pub fn with_event(self, event: AgentEvent) -> Self {
        *self.event.lock() = event;
        self
    }

    /// Sleeps for the given duration before returning.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Records invocations into a shared order log.
    #[must_use]
    pub fn with_order_log(mut self, order: OrderLog) -> Self {
        self.order = Some(order);
        self
    }

    /// Attaches a child for tree structure.
    ///
    /// # Errors
    ///
    /// Returns [`AgentAttachError`] if the child already has a parent.
    pub fn add_child(&mut self, child: Arc<dyn Agent>) -> Result<(), AgentAttachError> {
        child.meta().attach(self.meta.name())?;
        self.children.push(child);
        Ok(())
    }

    /// Returns the number of times the agent was run.
    #[must_use]
    pub fn call_count(&self) -> usize {
        self.call_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Agent for ScriptedAgent {
    fn meta(&self) -> &AgentMeta {
        &self.meta
    }

    fn children(&self) -> &[Arc<dyn Agent>] {
        &self.children
    }

    async fn run(
        &self,
        _ctx: Arc<SessionContext>,
        _cancel: Arc<CancellationToken>,
    ) -> Result<AgentEvent, AgentflowError> {
        self.call_count.fetch_add(1, Ordering::SeqCst);
        if let Some(order) = &self.order {
            order.lock().push(self.meta.name().to_string());
        }

        if self.panics.load(Ordering::SeqCst) {
            panic!("scripted panic in '{}'", self.meta.name());
        }

        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        Ok(self.event.lock().clone())
    }
}

/// A chat provider answering from a fixed queue of responses.
///
/// Every call pops the next response; an exhausted queue is an error,
/// which doubles as the completion-failure mock. All received prompts
/// are recorded for assertions.
pub struct QueueChat {
    responses: Mutex<VecDeque<String>>,
    prompts: Mutex<Vec<(String, String)>>,
}

impl QueueChat {
    /// Creates a provider with the given responses, served in order.
    #[must_use]
    pub fn new(responses: Vec<&str>) -> Self {
        Self {
            responses: Mutex::new(responses.into_iter().map(String::from).collect()),
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Creates a provider that fails on every call.
    #[must_use]
    pub fn empty() -> Self {
        Self::new(Vec::new())
    }

    /// Returns the (system, user) prompt pairs received so far.
    #[must_use]
    pub fn prompts(&self) -> Vec<(String, String)> {
        self.prompts.lock().clone()
    }
}

#[async_trait]
impl ChatCompletion for QueueChat {
    async fn complete(&self, system_prompt: &str, user_message: &str) -> anyhow::Result<String> {
        self.prompts
            .lock()
            .push((system_prompt.to_string(), user_message.to_string()));

        self.responses
            .lock()
            .pop_front()
            .ok_or_else(|| anyhow::anyhow!("no scripted response left"))
    }
}

/// A search provider that fails with a fixed message.
#[derive(Debug, Clone)]
pub struct FailingSearch {
    message: String,
}

impl FailingSearch {
    /// Creates a provider failing with the given message.
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

#[async_trait]
impl WebSearch for FailingSearch {
    async fn search(&self, _query: &str) -> anyhow::Result<String> {
        Err(anyhow::anyhow!("{}", self.message))
    }
}

/// A report store keeping saved reports in memory.
#[derive(Default)]
pub struct MemoryReportStore {
    saved: Mutex<Vec<(String, String)>>,
    fail_with: Option<String>,
}

impl MemoryReportStore {
    /// Creates an empty in-memory store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that fails every save with the given message.
    #[must_use]
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            saved: Mutex::new(Vec::new()),
            fail_with: Some(message.into()),
        }
    }

    /// Returns the saved (name, content) pairs.
    #[must_use]
    pub fn saved(&self) -> Vec<(String, String)> {
        self.saved.lock().clone()
    }
}

#[async_trait]
impl ReportStore for MemoryReportStore {
    async fn save(&self, name: &str, content: &str) -> anyhow::Result<String> {
        if let Some(message) = &self.fail_with {
            return Err(anyhow::anyhow!("{message}"));
        }
        self.saved
            .lock()
            .push((name.to_string(), content.to_string()));
        Ok(format!("memory://{name}"))
    }
}
