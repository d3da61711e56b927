//! Top-level coordinator for the research pipeline.
//!
//! The orchestrator wires leaf agents to their collaborators and offers
//! two execution modes with an equivalent result shape:
//!
//! - **Direct mode**: a fresh two-node [`SequentialAgent`] per invocation
//!   (research -> analysis), sharing state through one
//!   [`SessionContext`].
//! - **Routed mode**: the same leaves driven through the [`TaskRouter`]
//!   with task envelopes carrying the handoff instead of shared state.

mod result;

pub use result::{preview, EventSummary, ResearchResult, PREVIEW_LIMIT};

use crate::agents::{Agent, AnalystAgent, ResearcherAgent, SequentialAgent};
use crate::cancellation::CancellationToken;
use crate::context::SessionContext;
use crate::core::EventStatus;
use crate::errors::AgentflowError;
use crate::routing::{Message, Task, TaskRouter, TaskState};
use crate::tools::{ChatCompletion, ReportStore, WebSearch};
use std::sync::Arc;
use std::time::Instant;
use tracing::{info, warn};

/// Router identifier of the researcher agent.
pub const RESEARCHER_ID: &str = "researcher";
/// Router identifier of the analysis agent.
pub const ANALYST_ID: &str = "analyst";

/// Coordinates the research pipeline across both execution modes.
///
/// Holds only collaborator handles; agent trees are rebuilt fresh on
/// every invocation so no agent retains cross-invocation state - all
/// durable state lives in the per-call context or task.
pub struct ResearchOrchestrator {
    chat: Arc<dyn ChatCompletion>,
    search: Arc<dyn WebSearch>,
    store: Arc<dyn ReportStore>,
    router: Arc<TaskRouter>,
}

impl ResearchOrchestrator {
    /// Creates an orchestrator and registers the routed-mode handlers.
    #[must_use]
    pub fn new(
        chat: Arc<dyn ChatCompletion>,
        search: Arc<dyn WebSearch>,
        store: Arc<dyn ReportStore>,
    ) -> Self {
        let orchestrator = Self {
            chat,
            search,
            store,
            router: Arc::new(TaskRouter::new()),
        };
        orchestrator.register_handlers();
        orchestrator
    }

    /// Returns the task router, for callers that dispatch directly.
    #[must_use]
    pub fn router(&self) -> &Arc<TaskRouter> {
        &self.router
    }

    fn register_handlers(&self) {
        let chat = Arc::clone(&self.chat);
        let search = Arc::clone(&self.search);
        self.router.register(RESEARCHER_ID, move |mut task: Task, cancel| {
            let chat = Arc::clone(&chat);
            let search = Arc::clone(&search);
            async move {
                let ctx = Arc::new(
                    SessionContext::new(task.first_user_text())
                        .with_session_id(task.context_id.clone()),
                );
                let agent = ResearcherAgent::new(chat, search);
                let event = agent.run(ctx, cancel).await?;
                task.add_artifact("research_report", &event.content);
                Ok(task)
            }
        });

        let chat = Arc::clone(&self.chat);
        let store = Arc::clone(&self.store);
        self.router.register(ANALYST_ID, move |mut task: Task, cancel| {
            let chat = Arc::clone(&chat);
            let store = Arc::clone(&store);
            async move {
                let ctx = Arc::new(
                    SessionContext::new(task.first_user_text())
                        .with_session_id(task.context_id.clone()),
                );

                // Seed state from the carried-over stage output.
                let raw_data = task.last_agent_text();
                if !raw_data.is_empty() {
                    ctx.set_state("research_report", serde_json::json!(raw_data));
                    ctx.set_state("search_results", serde_json::json!(raw_data));
                    ctx.set_state("research_query", serde_json::json!(ctx.query()));
                }

                let agent = AnalystAgent::new(chat, store);
                let event = agent.run(ctx, cancel).await?;
                task.add_artifact("analysis_report", &event.content);
                Ok(task)
            }
        });

        info!("routed-mode task handlers registered");
    }

    fn build_pipeline(&self) -> Result<SequentialAgent, AgentflowError> {
        let mut pipeline = SequentialAgent::new(
            "research_pipeline",
            "Research then analysis, in sequence.",
        );
        pipeline.add_child(Arc::new(ResearcherAgent::new(
            Arc::clone(&self.chat),
            Arc::clone(&self.search),
        )))?;
        pipeline.add_child(Arc::new(AnalystAgent::new(
            Arc::clone(&self.chat),
            Arc::clone(&self.store),
        )))?;
        Ok(pipeline)
    }

    /// Runs the full pipeline in direct mode.
    ///
    /// # Errors
    ///
    /// Returns [`AgentflowError::Cancelled`] when the run is cancelled;
    /// agent failures come back as a `"Failed"` result carrying whatever
    /// partial content was produced.
    pub async fn run_research(
        &self,
        query: &str,
        cancel: Arc<CancellationToken>,
    ) -> Result<ResearchResult, AgentflowError> {
        let started = Instant::now();
        let ctx = Arc::new(SessionContext::new(query));

        info!(session_id = ctx.session_id(), query = %query, "research starting");

        let pipeline = self.build_pipeline()?;
        let final_event = pipeline.run(Arc::clone(&ctx), cancel).await?;

        let events = ctx.events();
        // The composite's terminal event is always Completed; whether the
        // run actually succeeded is carried by the last stage event.
        let failed = events
            .last()
            .is_some_and(|e| e.status == EventStatus::Failed);
        if failed {
            warn!(session_id = ctx.session_id(), "pipeline finished with a failed stage");
        }

        let mut result = ResearchResult::new(ctx.session_id(), query);
        result.raw_search_results = ctx.state().get_str("search_results").unwrap_or_default();
        result.research_report = ctx.state().get_str("research_report").unwrap_or_default();
        result.analysis_result = ctx
            .state()
            .get_str("analysis_result")
            .unwrap_or_else(|| final_event.content.clone());
        result.saved_file = ctx.state().get_str("analysis_file").unwrap_or_default();
        result.status = if failed { "Failed" } else { "Completed" }.to_string();
        result.elapsed_ms = elapsed_ms(started);
        result.events = events.iter().map(EventSummary::from_event).collect();

        info!(
            session_id = %result.session_id,
            status = %result.status,
            elapsed_ms = result.elapsed_ms,
            "research finished"
        );
        Ok(result)
    }

    /// Runs the full pipeline in routed mode.
    ///
    /// Each stage is a dispatched task; the first stage's artifact text
    /// is carried into the second stage's history as an agent message.
    ///
    /// # Errors
    ///
    /// Returns [`AgentflowError::Cancelled`] when a dispatch is
    /// cancelled; task failures come back as a `"Failed"` result.
    pub async fn run_research_routed(
        &self,
        query: &str,
        cancel: Arc<CancellationToken>,
    ) -> Result<ResearchResult, AgentflowError> {
        let started = Instant::now();
        let session_id = crate::utils::generate_uuid().to_string();

        info!(session_id = %session_id, query = %query, "research starting (routed mode)");

        let research_task = Task::new(&session_id).with_user_message(query);
        let research_task = self
            .router
            .dispatch(RESEARCHER_ID, research_task, Arc::clone(&cancel))
            .await?;
        let research_report = research_task.artifact_text();

        let mut analysis_task = Task::new(&session_id).with_user_message(query);
        analysis_task.push_message(Message::agent(&research_report));
        let analysis_task = self
            .router
            .dispatch(ANALYST_ID, analysis_task, cancel)
            .await?;
        let analysis_report = analysis_task.artifact_text();

        let failed = research_task.status.state == TaskState::Failed
            || analysis_task.status.state == TaskState::Failed;

        let mut result = ResearchResult::new(&session_id, query);
        result.research_report = research_report.clone();
        result.analysis_result = analysis_report.clone();
        result.status = if failed { "Failed" } else { "Completed" }.to_string();
        result.elapsed_ms = elapsed_ms(started);
        result.events = vec![
            stage_summary("ResearcherAgent", &research_task, &research_report),
            stage_summary("AnalysisAgent", &analysis_task, &analysis_report),
        ];

        info!(
            session_id = %session_id,
            status = %result.status,
            elapsed_ms = result.elapsed_ms,
            "research finished (routed mode)"
        );
        Ok(result)
    }
}

fn stage_summary(agent: &str, task: &Task, output: &str) -> EventSummary {
    EventSummary {
        agent: agent.to_string(),
        status: task.status.state.to_string(),
        timestamp: task.status.timestamp.clone(),
        content_preview: preview(output, PREVIEW_LIMIT),
    }
}

#[allow(clippy::cast_possible_truncation)]
fn elapsed_ms(started: Instant) -> u64 {
    started.elapsed().as_millis() as u64
}
