//! Composite agent that runs its children one after another.

use super::{find_agent, Agent, AgentMeta};
use crate::cancellation::CancellationToken;
use crate::context::SessionContext;
use crate::core::AgentEvent;
use crate::errors::{AgentAttachError, AgentflowError};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// Runs child agents sequentially, in insertion order.
///
/// One child's output (via shared state) becomes the next child's input.
/// After each child event the composite appends the event to the session
/// log, applies its state updates, and honors its control actions:
///
/// - `escalate` stops iteration immediately; that event supplies the
///   pipeline's final content.
/// - `transfer_to` runs the named agent next, if it resolves anywhere in
///   this composite's subtree. The transfer is single-hop: the
///   transferred-to agent's own transfer and escalate signals are not
///   resolved again, which keeps transfer chains bounded.
pub struct SequentialAgent {
    meta: AgentMeta,
    children: Vec<Arc<dyn Agent>>,
}

impl SequentialAgent {
    /// Creates a new sequential composite with no children.
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

    fn resolve_transfer(&self, target: &str) -> Option<Arc<dyn Agent>> {
        self.children
            .iter()
            .find_map(|child| find_agent(child, target))
    }
}

#[async_trait]
impl Agent for SequentialAgent {
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
        let mut last = AgentEvent::working(self.name());

        for child in &self.children {
            // Observed once per iteration, before the next child starts.
            if cancel.is_cancelled() {
                return Err(AgentflowError::Cancelled(cancel.reason_or_default()));
            }

            let event = child.run(Arc::clone(&ctx), Arc::clone(&cancel)).await?;
            ctx.push_event(event.clone());
            if let Some(updates) = event.state_updates() {
                ctx.state().apply(updates);
            }
            last = event;

            if last.escalates() {
                debug!(
                    agent = self.name(),
                    author = %last.author,
                    "child escalated, stopping early"
                );
                break;
            }

            if let Some(target) = last.transfer_target().map(str::to_owned) {
                if let Some(agent) = self.resolve_transfer(&target) {
                    debug!(agent = self.name(), target = %target, "transferring control");
                    // Single hop: this event's own signals are not resolved.
                    let event = agent.run(Arc::clone(&ctx), Arc::clone(&cancel)).await?;
                    ctx.push_event(event.clone());
                    if let Some(updates) = event.state_updates() {
                        ctx.state().apply(updates);
                    }
                    last = event;
                } else {
                    debug!(agent = self.name(), target = %target, "transfer target not found");
                }
            }
        }

        Ok(AgentEvent::completed(self.name(), last.content.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{EventActions, EventStatus};
    use crate::testing::{order_log, ScriptedAgent};
    use pretty_assertions::assert_eq;

    fn scripted(name: &str, event: AgentEvent, log: &crate::testing::OrderLog) -> ScriptedAgent {
        ScriptedAgent::new(name)
            .with_event(event)
            .with_order_log(Arc::clone(log))
    }

    #[tokio::test]
    async fn test_runs_children_in_insertion_order() {
        let log = order_log();
        let mut pipeline = SequentialAgent::new("pipeline", "");
        pipeline
            .add_child(Arc::new(scripted(
                "a",
                AgentEvent::completed("a", "one"),
                &log,
            )))
            .unwrap();
        pipeline
            .add_child(Arc::new(scripted(
                "b",
                AgentEvent::completed("b", "two"),
                &log,
            )))
            .unwrap();

        let ctx = Arc::new(SessionContext::new("q"));
        let event = pipeline
            .run(Arc::clone(&ctx), Arc::new(CancellationToken::new()))
            .await
            .unwrap();

        assert_eq!(*log.lock(), vec!["a".to_string(), "b".to_string()]);
        assert_eq!(event.status, EventStatus::Completed);
        assert_eq!(event.author, "pipeline");
        assert_eq!(event.content, "two");
        assert_eq!(ctx.event_count(), 2);
    }

    #[tokio::test]
    async fn test_state_updates_applied_between_children() {
        let mut pipeline = SequentialAgent::new("pipeline", "");
        pipeline
            .add_child(Arc::new(ScriptedAgent::new("a").with_event(
                AgentEvent::completed("a", "done").with_actions(
                    EventActions::new().with_state_update("handoff", serde_json::json!("data")),
                ),
            )))
            .unwrap();

        let ctx = Arc::new(SessionContext::new("q"));
        pipeline
            .run(Arc::clone(&ctx), Arc::new(CancellationToken::new()))
            .await
            .unwrap();

        assert_eq!(ctx.state().get_str("handoff"), Some("data".to_string()));
    }

    #[tokio::test]
    async fn test_escalate_stops_iteration() {
        let log = order_log();
        let mut pipeline = SequentialAgent::new("pipeline", "");
        pipeline
            .add_child(Arc::new(scripted(
                "a",
                AgentEvent::completed("a", "early exit").with_actions(EventActions::new().escalate()),
                &log,
            )))
            .unwrap();
        pipeline
            .add_child(Arc::new(scripted(
                "b",
                AgentEvent::completed("b", "never"),
                &log,
            )))
            .unwrap();

        let ctx = Arc::new(SessionContext::new("q"));
        let event = pipeline
            .run(ctx, Arc::new(CancellationToken::new()))
            .await
            .unwrap();

        // B never ran; the escalating event supplies the final content.
        assert_eq!(*log.lock(), vec!["a".to_string()]);
        assert_eq!(event.content, "early exit");
    }

    #[tokio::test]
    async fn test_transfer_runs_target_then_resumes_iteration() {
        let log = order_log();

        // C hangs off B in the tree, so it is resolvable but not iterated.
        let mut b = scripted("b", AgentEvent::completed("b", "from b"), &log);
        b.add_child(Arc::new(scripted(
            "c",
            AgentEvent::completed("c", "from c"),
            &log,
        )))
        .unwrap();

        let mut pipeline = SequentialAgent::new("pipeline", "");
        pipeline
            .add_child(Arc::new(scripted(
                "a",
                AgentEvent::completed("a", "from a")
                    .with_actions(EventActions::new().transfer_to("c")),
                &log,
            )))
            .unwrap();
        pipeline.add_child(Arc::new(b)).unwrap();

        let ctx = Arc::new(SessionContext::new("q"));
        let event = pipeline
            .run(Arc::clone(&ctx), Arc::new(CancellationToken::new()))
            .await
            .unwrap();

        // C runs immediately after A; B still runs afterwards.
        assert_eq!(
            *log.lock(),
            vec!["a".to_string(), "c".to_string(), "b".to_string()]
        );
        assert_eq!(event.content, "from b");
        assert_eq!(ctx.event_count(), 3);
    }

    #[tokio::test]
    async fn test_transfer_is_single_hop() {
        let log = order_log();

        let mut holder = scripted("holder", AgentEvent::completed("holder", "held"), &log);
        // C itself asks for another transfer; it must not be resolved.
        holder
            .add_child(Arc::new(scripted(
                "c",
                AgentEvent::completed("c", "from c")
                    .with_actions(EventActions::new().transfer_to("d")),
                &log,
            )))
            .unwrap();
        holder
            .add_child(Arc::new(scripted(
                "d",
                AgentEvent::completed("d", "from d"),
                &log,
            )))
            .unwrap();

        let mut pipeline = SequentialAgent::new("pipeline", "");
        pipeline
            .add_child(Arc::new(scripted(
                "a",
                AgentEvent::completed("a", "from a")
                    .with_actions(EventActions::new().transfer_to("c")),
                &log,
            )))
            .unwrap();
        pipeline.add_child(Arc::new(holder)).unwrap();

        let ctx = Arc::new(SessionContext::new("q"));
        pipeline
            .run(ctx, Arc::new(CancellationToken::new()))
            .await
            .unwrap();

        // D was never run via C's transfer request.
        assert_eq!(
            *log.lock(),
            vec!["a".to_string(), "c".to_string(), "holder".to_string()]
        );
    }

    #[tokio::test]
    async fn test_unresolvable_transfer_is_ignored() {
        let log = order_log();
        let mut pipeline = SequentialAgent::new("pipeline", "");
        pipeline
            .add_child(Arc::new(scripted(
                "a",
                AgentEvent::completed("a", "from a")
                    .with_actions(EventActions::new().transfer_to("nowhere")),
                &log,
            )))
            .unwrap();
        pipeline
            .add_child(Arc::new(scripted(
                "b",
                AgentEvent::completed("b", "from b"),
                &log,
            )))
            .unwrap();

        let ctx = Arc::new(SessionContext::new("q"));
        let event = pipeline
            .run(ctx, Arc::new(CancellationToken::new()))
            .await
            .unwrap();

        assert_eq!(*log.lock(), vec!["a".to_string(), "b".to_string()]);
        assert_eq!(event.content, "from b");
    }

    #[tokio::test]
    async fn test_cancellation_checked_before_each_child() {
        let log = order_log();
        let mut pipeline = SequentialAgent::new("pipeline", "");
        pipeline
            .add_child(Arc::new(scripted(
                "a",
                AgentEvent::completed("a", "ok"),
                &log,
            )))
            .unwrap();

        let cancel = Arc::new(CancellationToken::new());
        cancel.cancel("caller went away");

        let ctx = Arc::new(SessionContext::new("q"));
        let err = pipeline.run(ctx, cancel).await.unwrap_err();

        assert!(err.is_cancelled());
        assert!(log.lock().is_empty());
    }

    #[test]
    fn test_add_child_rejects_reparenting() {
        let child: Arc<dyn Agent> = Arc::new(ScriptedAgent::new("child"));

        let mut first = SequentialAgent::new("first", "");
        first.add_child(Arc::clone(&child)).unwrap();

        let mut second = SequentialAgent::new("second", "");
        let err = second.add_child(child).unwrap_err();
        assert_eq!(err.parent, "first");
    }
}
