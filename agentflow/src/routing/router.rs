//! Task router: one handler per agent identifier.

use super::Task;
use crate::cancellation::CancellationToken;
use crate::errors::AgentflowError;
use dashmap::DashMap;
use futures::future::BoxFuture;
use std::future::Future;
use std::sync::Arc;
use tracing::{error, info, warn};

/// A registered task handler.
///
/// Handlers return explicit results; the router folds any error into the
/// task's status rather than letting it escape.
pub type TaskHandler =
    Arc<dyn Fn(Task, Arc<CancellationToken>) -> BoxFuture<'static, anyhow::Result<Task>> + Send + Sync>;

/// Routes tasks to registered agent handlers and manages their lifecycle.
///
/// The registry holds at most one handler per identifier, and dispatch
/// performs the synchronous status transitions downstream consumers
/// branch on: submitted -> working -> completed/failed. Failures of the
/// handler or an unknown identifier are always converted into a `Failed`
/// task, never surfaced as errors; the single exception is cancellation,
/// which propagates as [`AgentflowError::Cancelled`] so callers can tell
/// it apart from failure.
#[derive(Default)]
pub struct TaskRouter {
    handlers: DashMap<String, TaskHandler>,
}

impl TaskRouter {
    /// Creates a new empty router.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler for an agent identifier.
    ///
    /// Re-registration replaces the previous handler silently.
    pub fn register<F, Fut>(&self, agent_id: impl Into<String>, handler: F)
    where
        F: Fn(Task, Arc<CancellationToken>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<Task>> + Send + 'static,
    {
        let agent_id = agent_id.into();
        info!(agent_id = %agent_id, "task handler registered");
        self.handlers.insert(
            agent_id,
            Arc::new(move |task, cancel| Box::pin(handler(task, cancel))),
        );
    }

    /// Returns true if a handler is registered for the identifier.
    #[must_use]
    pub fn is_registered(&self, agent_id: &str) -> bool {
        self.handlers.contains_key(agent_id)
    }

    /// Returns the registered agent identifiers.
    #[must_use]
    pub fn registered_agents(&self) -> Vec<String> {
        self.handlers.iter().map(|e| e.key().clone()).collect()
    }

    /// Dispatches a task to the handler registered for `agent_id`.
    ///
    /// # Errors
    ///
    /// Returns [`AgentflowError::Cancelled`] only when the handler was
    /// cancelled; every other failure comes back as a `Failed` task.
    pub async fn dispatch(
        &self,
        agent_id: &str,
        mut task: Task,
        cancel: Arc<CancellationToken>,
    ) -> Result<Task, AgentflowError> {
        let handler = match self.handlers.get(agent_id) {
            Some(entry) => Arc::clone(entry.value()),
            None => {
                warn!(agent_id, task_id = %task.id, "no handler registered");
                task.mark_failed(format!("Agent not found: {agent_id}"));
                return Ok(task);
            }
        };

        info!(agent_id, task_id = %task.id, "dispatching task");
        task.mark_working();

        match handler(task.clone(), cancel).await {
            Ok(mut done) => {
                done.mark_completed();
                info!(agent_id, task_id = %done.id, "task completed");
                Ok(done)
            }
            Err(err) => {
                if let Some(AgentflowError::Cancelled(reason)) =
                    err.downcast_ref::<AgentflowError>()
                {
                    return Err(AgentflowError::Cancelled(reason.clone()));
                }

                error!(agent_id, task_id = %task.id, error = %err, "task failed");
                task.mark_failed(format!("Task handler failed: {err}"));
                Ok(task)
            }
        }
    }
}

impl std::fmt::Debug for TaskRouter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskRouter")
            .field("handlers", &self.registered_agents())
            .finish()
    }
}
