//! Composite agent that runs its children concurrently.

use super::{Agent, AgentMeta};
use crate::cancellation::CancellationToken;
use crate::context::SessionContext;
use crate::core::AgentEvent;
use crate::errors::{AgentAttachError, AgentflowError};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{debug, warn};

/// Separator between child entries in the aggregate event content.
const CONTENT_SEPARATOR: &str = "\n\n---\n\n";

/// Runs child agents concurrently against the same context (fan-out),
/// then joins on the full set (fan-in).
///
/// Every child is spawned as an independent task. After the join, each
/// child's event is appended to the session log and its state updates are
/// applied in child-registration order - one serialized pass, so children
/// never race on the apply step. The logical last-writer-wins order among
/// children that wrote the same key concurrently is unspecified; children
/// should use disjoint keys. A panicking child is surfaced as that
/// child's own `Failed` event and does not disturb its siblings' state
/// updates.
///
/// The aggregate event joins every child's `[author]: content` line with
/// a visible separator, in registration order, so output is reproducible
/// regardless of completion order.
pub struct ParallelAgent {
    meta: AgentMeta,
    children: Vec<Arc<dyn Agent>>,
}

impl ParallelAgent {
    /// Creates a new parallel composite with no children.
    #[must_use]
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            meta: AgentMeta::new(name, description),
            children: Vec::new(),
        }
    }

    /// Adds a child agent, establishing the parent relationship.
    ///
    /// # Errors
    ///
    /// Returns [`AgentAttachError`] if the child already has a parent.
    pub fn add_child(&mut self, child: Arc<dyn Agent>) -> Result<(), AgentAttachError> {
        child.meta().attach(self.meta.name())?;
        self.children.push(child);
        Ok(())
    }
}

#[async_trait]
impl Agent for ParallelAgent {
    fn meta(&self) -> &AgentMeta {
        &self.meta
    }

    fn children(&self) -> &[Arc<dyn Agent>] {
        &self.children
    }

    async fn run(
        &self,
        ctx: Arc<SessionContext>,
        cancel: Arc<CancellationToken>,
    ) -> Result<AgentEvent, AgentflowError> {
        if cancel.is_cancelled() {
            return Err(AgentflowError::Cancelled(cancel.reason_or_default()));
        }

        debug!(agent = self.name(), children = self.children.len(), "fanning out");

        let mut handles = Vec::with_capacity(self.children.len());
        for child in &self.children {
            let child = Arc::clone(child);
            let ctx = Arc::clone(&ctx);
            let token = Arc::clone(&cancel);
            handles.push(tokio::spawn(async move { child.run(ctx, token).await }));
        }

        // Join on the full set, but let cancellation win the race so a
        // slow child cannot delay the abort.
        let abort_handles: Vec<_> = handles.iter().map(tokio::task::JoinHandle::abort_handle).collect();
        let join = futures::future::join_all(handles);
        tokio::pin!(join);

        let results = tokio::select! {
            results = &mut join => results,
            () = cancel.cancelled() => {
                for handle in &abort_handles {
                    handle.abort();
                }
                return Err(AgentflowError::Cancelled(cancel.reason_or_default()));
            }
        };

        // A child observing the token mid-run aborts the whole composite
        // before any event or state from this fan-out is recorded.
        for result in &results {
            if let Ok(Err(AgentflowError::Cancelled(reason))) = result {
                return Err(AgentflowError::Cancelled(reason.clone()));
            }
        }

        // Single serialized apply pass, in registration order.
        let mut entries = Vec::with_capacity(results.len());
        for (child, result) in self.children.iter().zip(results) {
            let event = match result {
                Ok(Ok(event)) => event,
                Ok(Err(err)) => {
                    warn!(agent = self.name(), child = child.name(), error = %err, "child errored");
                    AgentEvent::failed(child.name(), format!("Child agent error: {err}"))
                }
                Err(join_err) => {
                    warn!(agent = self.name(), child = child.name(), error = %join_err, "child task aborted");
                    AgentEvent::failed(child.name(), format!("Child task aborted: {join_err}"))
                }
            };

            ctx.push_event(event.clone());
            if let Some(updates) = event.state_updates() {
                ctx.state().apply(updates);
            }
            entries.push(format!("[{}]: {}", event.author, event.content));
        }

        Ok(AgentEvent::completed(
            self.name(),
            entries.join(CONTENT_SEPARATOR),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{EventActions, EventStatus};
    use crate::testing::ScriptedAgent;
    use pretty_assertions::assert_eq;
    use std::time::Duration;

    fn writer(name: &str, key: &str, value: &str) -> ScriptedAgent {
        ScriptedAgent::new(name).with_event(
            AgentEvent::completed(name, format!("wrote {key}")).with_actions(
                EventActions::new().with_state_update(key, serde_json::json!(value)),
            ),
        )
    }

    #[tokio::test]
    async fn test_disjoint_writes_both_present() {
        let mut fanout = ParallelAgent::new("fanout", "");
        fanout.add_child(Arc::new(writer("a", "left", "1"))).unwrap();
        fanout.add_child(Arc::new(writer("b", "right", "2"))).unwrap();

        let ctx = Arc::new(SessionContext::new("q"));
        let event = fanout
            .run(Arc::clone(&ctx), Arc::new(CancellationToken::new()))
            .await
            .unwrap();

        assert_eq!(ctx.state().get_str("left"), Some("1".to_string()));
        assert_eq!(ctx.state().get_str("right"), Some("2".to_string()));
        assert_eq!(event.status, EventStatus::Completed);
    }

    #[tokio::test]
    async fn test_aggregate_content_in_registration_order() {
        let mut fanout = ParallelAgent::new("fanout", "");
        // The slow child still comes first in the aggregate.
        fanout
            .add_child(Arc::new(
                ScriptedAgent::new("slow")
                    .with_event(AgentEvent::completed("slow", "tortoise"))
                    .with_delay(Duration::from_millis(50)),
            ))
            .unwrap();
        fanout
            .add_child(Arc::new(
                ScriptedAgent::new("fast").with_event(AgentEvent::completed("fast", "hare")),
            ))
            .unwrap();

        let ctx = Arc::new(SessionContext::new("q"));
        let event = fanout
            .run(ctx, Arc::new(CancellationToken::new()))
            .await
            .unwrap();

        assert_eq!(event.content, "[slow]: tortoise\n\n---\n\n[fast]: hare");
    }

    #[tokio::test]
    async fn test_panicking_child_does_not_corrupt_sibling() {
        let mut fanout = ParallelAgent::new("fanout", "");
        fanout.add_child(Arc::new(writer("a", "left", "1"))).unwrap();
        fanout
            .add_child(Arc::new(ScriptedAgent::panicking("b")))
            .unwrap();

        let ctx = Arc::new(SessionContext::new("q"));
        let event = fanout
            .run(Arc::clone(&ctx), Arc::new(CancellationToken::new()))
            .await
            .unwrap();

        // A's state update survives; B is its own Failed event.
        assert_eq!(ctx.state().get_str("left"), Some("1".to_string()));

        let events = ctx.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[0].author, "a");
        assert_eq!(events[1].author, "b");
        assert_eq!(events[1].status, EventStatus::Failed);

        // Both entries appear in the aggregate, in registration order.
        assert!(event.content.starts_with("[a]: wrote left"));
        assert!(event.content.contains("[b]:"));
    }

    #[tokio::test]
    async fn test_cancellation_wins_over_slow_child() {
        let mut fanout = ParallelAgent::new("fanout", "");
        fanout
            .add_child(Arc::new(
                ScriptedAgent::new("slow")
                    .with_event(AgentEvent::completed("slow", "never"))
                    .with_delay(Duration::from_secs(30)),
            ))
            .unwrap();

        let cancel = Arc::new(CancellationToken::new());
        let ctx = Arc::new(SessionContext::new("q"));

        let canceller = {
            let cancel = Arc::clone(&cancel);
            tokio::spawn(async move {
                tokio::time::sleep(Duration::from_millis(20)).await;
                cancel.cancel("deadline");
            })
        };

        let started = std::time::Instant::now();
        let err = fanout.run(Arc::clone(&ctx), cancel).await.unwrap_err();
        canceller.await.unwrap();

        assert!(err.is_cancelled());
        assert!(started.elapsed() < Duration::from_secs(5));
        // Nothing was recorded after the abort.
        assert_eq!(ctx.event_count(), 0);
    }

    #[tokio::test]
    async fn test_already_cancelled_runs_nothing() {
        let mut fanout = ParallelAgent::new("fanout", "");
        let child = Arc::new(ScriptedAgent::new("a"));
        fanout.add_child(Arc::clone(&child) as Arc<dyn Agent>).unwrap();

        let cancel = Arc::new(CancellationToken::new());
        cancel.cancel("too late");

        let ctx = Arc::new(SessionContext::new("q"));
        let err = fanout.run(ctx, cancel).await.unwrap_err();

        assert!(err.is_cancelled());
        assert_eq!(child.call_count(), 0);
    }
}
