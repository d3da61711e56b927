//! Result summary returned to orchestrator callers.

use crate::core::AgentEvent;
use serde::{Deserialize, Serialize};

/// Maximum preview length for event content in result summaries.
pub const PREVIEW_LIMIT: usize = 200;

/// Truncates text to a preview of at most `limit` characters.
///
/// Content at or below the limit is returned unmodified; longer content
/// is cut at the limit with a visible ellipsis marker appended.
#[must_use]
pub fn preview(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        text.to_string()
    } else {
        let truncated: String = text.chars().take(limit).collect();
        format!("{truncated}...")
    }
}

/// A transport-friendly view of one pipeline event.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventSummary {
    /// Name of the agent that produced the event.
    pub agent: String,
    /// The event status.
    pub status: String,
    /// When the event occurred.
    pub timestamp: String,
    /// Content preview (at most [`PREVIEW_LIMIT`] characters plus marker).
    pub content_preview: String,
}

impl EventSummary {
    /// Builds a summary from a full event.
    #[must_use]
    pub fn from_event(event: &AgentEvent) -> Self {
        Self {
            agent: event.author.clone(),
            status: event.status.to_string(),
            timestamp: event.timestamp.clone(),
            content_preview: preview(&event.content, PREVIEW_LIMIT),
        }
    }
}

/// The full result of one research pipeline run.
///
/// Failed runs still carry whatever partial content was produced before
/// the failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResearchResult {
    /// The session identifier.
    pub session_id: String,
    /// The original research query.
    pub query: String,
    /// Raw web search results.
    pub raw_search_results: String,
    /// The researcher's report.
    pub research_report: String,
    /// The analyst's final report.
    pub analysis_result: String,
    /// Where the analysis was saved, if anywhere.
    pub saved_file: String,
    /// Terminal status: "Completed" or "Failed".
    pub status: String,
    /// Elapsed wall-clock time in milliseconds.
    pub elapsed_ms: u64,
    /// Per-stage events with previewed content.
    pub events: Vec<EventSummary>,
}

impl ResearchResult {
    /// Creates an empty result shell for the given session.
    #[must_use]
    pub fn new(session_id: impl Into<String>, query: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
            query: query.into(),
            raw_search_results: String::new(),
            research_report: String::new(),
            analysis_result: String::new(),
            saved_file: String::new(),
            status: "Failed".to_string(),
            elapsed_ms: 0,
            events: Vec::new(),
        }
    }

    /// Returns true if the run completed.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.status == "Completed"
    }
}
