//! Leaf agent that turns raw research into a structured analysis.

use super::{Agent, AgentMeta};
use crate::cancellation::CancellationToken;
use crate::context::SessionContext;
use crate::core::{AgentEvent, EventActions};
use crate::errors::AgentflowError;
use crate::tools::{ChatCompletion, ReportStore};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{error, info, warn};

const SYSTEM_PROMPT: &str = "\
You are an expert analysis agent. Your job:
1. Analyze the research report in depth
2. Identify the main themes and patterns
3. Organize the information into a logical structure
4. Produce a professional Markdown report

Report format: a title, an executive summary, a detailed analysis with
subsections, sources and references, and a closing assessment. Use a
professional, accessible tone.";

/// Reads the research material from shared state, produces a structured
/// analysis, and persists it through the report store.
///
/// The research report is a prerequisite: when it is absent the agent
/// returns a `Failed` event naming the missing stage instead of
/// crashing. On success the event escalates, signalling the enclosing
/// pipeline that the work is done.
pub struct AnalystAgent {
    meta: AgentMeta,
    chat: Arc<dyn ChatCompletion>,
    store: Arc<dyn ReportStore>,
}

impl AnalystAgent {
    /// Creates a new analyst over the given collaborators.
    #[must_use]
    pub fn new(chat: Arc<dyn ChatCompletion>, store: Arc<dyn ReportStore>) -> Self {
        Self {
            meta: AgentMeta::new(
                "AnalysisAgent",
                "Analyzes research data into a structured report.",
            ),
            chat,
            store,
        }
    }
}

#[async_trait]
impl Agent for AnalystAgent {
    fn meta(&self) -> &AgentMeta {
        &self.meta
    }

    async fn run(
        &self,
        ctx: Arc<SessionContext>,
        cancel: Arc<CancellationToken>,
    ) -> Result<AgentEvent, AgentflowError> {
        info!("analysis starting");

        let query = ctx
            .state()
            .get_str("research_query")
            .unwrap_or_else(|| ctx.query().to_string());
        let search_results = ctx.state().get_str("search_results").unwrap_or_default();
        let research_report = ctx.state().get_str("research_report").unwrap_or_default();

        if research_report.is_empty() {
            warn!("research report missing from state");
            return Ok(AgentEvent::failed(
                self.name(),
                "No research data available to analyze; the researcher stage must run first.",
            ));
        }

        let user_message = format!(
            "Research topic: {query}\n\nResearch report:\n{research_report}\n\n\
             Raw search results:\n{search_results}\n\n\
             Analyze this material and produce a structured report in the requested format."
        );

        let analysis = match self.chat.complete(SYSTEM_PROMPT, &user_message).await {
            Ok(analysis) => analysis,
            Err(err) => {
                error!(error = %err, "completion failed");
                return Ok(AgentEvent::failed(
                    self.name(),
                    format!("Analysis failed: {err}"),
                ));
            }
        };

        if cancel.is_cancelled() {
            return Err(AgentflowError::Cancelled(cancel.reason_or_default()));
        }

        let file_name = format!(
            "{}-{}.md",
            crate::utils::sanitize_file_stem(&query),
            crate::utils::now_utc().format("%Y%m%d-%H%M%S")
        );

        match self.store.save(&file_name, &analysis).await {
            Ok(location) => info!(location = %location, "analysis persisted"),
            Err(err) => {
                error!(error = %err, "persisting analysis failed");
                return Ok(AgentEvent::failed(
                    self.name(),
                    format!("Saving the analysis failed: {err}"),
                ));
            }
        }

        ctx.set_state("analysis_result", serde_json::json!(analysis));
        ctx.set_state("analysis_file", serde_json::json!(file_name));
        ctx.set_state("analysis_status", serde_json::json!("completed"));

        // Escalate: the pipeline is finished, notify the enclosing agent.
        Ok(AgentEvent::completed(self.name(), analysis.clone()).with_actions(
            EventActions::new()
                .escalate()
                .with_state_update("analysis_result", serde_json::json!(analysis))
                .with_state_update("analysis_file", serde_json::json!(file_name)),
        ))
    }
}
