//! Leaf agent that gathers raw material for a research query.

use super::{Agent, AgentMeta};
use crate::cancellation::CancellationToken;
use crate::context::SessionContext;
use crate::core::{AgentEvent, EventActions};
use crate::errors::AgentflowError;
use crate::tools::{ChatCompletion, WebSearch};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{error, info};

const SYSTEM_PROMPT: &str = "\
You are an expert researcher. Your job:
1. Review the provided search results carefully
2. Identify the most important and reliable information
3. Compile the findings together with their sources
4. Produce a structured research report

Include in the report: key findings as bullet points, source
references, notable details and figures, and any conflicting
information. Use a professional tone.";

/// Searches the web for the session query and composes a research report.
///
/// Writes `search_results`, `research_report`, `research_query` and
/// `research_status` into shared state so the next stage can pick the
/// material up, and mirrors the handoff keys in the event's state
/// updates.
pub struct ResearcherAgent {
    meta: AgentMeta,
    chat: Arc<dyn ChatCompletion>,
    search: Arc<dyn WebSearch>,
}

impl ResearcherAgent {
    /// Creates a new researcher over the given collaborators.
    #[must_use]
    pub fn new(chat: Arc<dyn ChatCompletion>, search: Arc<dyn WebSearch>) -> Self {
        Self {
            meta: AgentMeta::new(
                "ResearcherAgent",
                "Gathers information from the web for a research query.",
            ),
            chat,
            search,
        }
    }
}

#[async_trait]
impl Agent for ResearcherAgent {
    fn meta(&self) -> &AgentMeta {
        &self.meta
    }

    async fn run(
        &self,
        ctx: Arc<SessionContext>,
        cancel: Arc<CancellationToken>,
    ) -> Result<AgentEvent, AgentflowError> {
        let query = ctx.query().to_string();
        info!(query = %query, "research starting");

        let search_results = match self.search.search(&query).await {
            Ok(results) => results,
            Err(err) => {
                error!(query = %query, error = %err, "web search failed");
                return Ok(AgentEvent::failed(
                    self.name(),
                    format!("Web search failed: {err}"),
                ));
            }
        };

        if cancel.is_cancelled() {
            return Err(AgentflowError::Cancelled(cancel.reason_or_default()));
        }

        let user_message = format!(
            "Research topic: {query}\n\nWeb search results:\n{search_results}\n\n\
             Review these results and produce a thorough research report."
        );

        let report = match self.chat.complete(SYSTEM_PROMPT, &user_message).await {
            Ok(report) => report,
            Err(err) => {
                error!(query = %query, error = %err, "completion failed");
                return Ok(AgentEvent::failed(
                    self.name(),
                    format!("Research report generation failed: {err}"),
                ));
            }
        };

        info!(query = %query, length = report.len(), "research report ready");

        ctx.set_state("search_results", serde_json::json!(search_results));
        ctx.set_state("research_report", serde_json::json!(report));
        ctx.set_state("research_query", serde_json::json!(query));
        ctx.set_state("research_status", serde_json::json!("completed"));

        Ok(AgentEvent::completed(self.name(), report.clone()).with_actions(
            EventActions::new()
                .with_state_update("search_results", serde_json::json!(search_results))
                .with_state_update("research_report", serde_json::json!(report))
                .with_state_update("research_query", serde_json::json!(query)),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::EventStatus;
    use crate::testing::{FailingSearch, QueueChat};
    use crate::tools::StaticSearch;

    #[tokio::test]
    async fn test_researcher_writes_handoff_state() {
        let agent = ResearcherAgent::new(
            Arc::new(QueueChat::new(vec!["the report"])),
            Arc::new(StaticSearch::new("raw results")),
        );

        let ctx = Arc::new(SessionContext::new("rust releases"));
        let event = agent
            .run(Arc::clone(&ctx), Arc::new(CancellationToken::new()))
            .await
            .unwrap();

        assert_eq!(event.status, EventStatus::Completed);
        assert_eq!(event.content, "the report");
        assert_eq!(
            ctx.state().get_str("research_report"),
            Some("the report".to_string())
        );
        assert_eq!(
            ctx.state().get_str("search_results"),
            Some("raw results".to_string())
        );
        assert_eq!(
            ctx.state().get_str("research_query"),
            Some("rust releases".to_string())
        );

        let updates = event.state_updates().unwrap();
        assert!(updates.contains_key("research_report"));
    }

    #[tokio::test]
    async fn test_search_failure_becomes_failed_event() {
        let agent = ResearcherAgent::new(
            Arc::new(QueueChat::new(vec!["unused"])),
            Arc::new(FailingSearch::new("connection refused")),
        );

        let ctx = Arc::new(SessionContext::new("q"));
        let event = agent
            .run(Arc::clone(&ctx), Arc::new(CancellationToken::new()))
            .await
            .unwrap();

        assert_eq!(event.status, EventStatus::Failed);
        assert!(event.content.contains("connection refused"));
        assert!(!ctx.has_state("research_report"));
    }

    #[tokio::test]
    async fn test_completion_failure_becomes_failed_event() {
        let agent = ResearcherAgent::new(
            Arc::new(QueueChat::empty()),
            Arc::new(StaticSearch::new("raw")),
        );

        let ctx = Arc::new(SessionContext::new("q"));
        let event = agent
            .run(ctx, Arc::new(CancellationToken::new()))
            .await
            .unwrap();

        assert_eq!(event.status, EventStatus::Failed);
        assert!(event.content.contains("Research report generation failed"));
    }
}
