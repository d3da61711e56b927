//! Chat completion collaborator.

use async_trait::async_trait;

/// Protocol for LLM chat completion.
///
/// One system prompt, one user message, one text response. Providers may
/// suspend while awaiting the remote call; errors are returned, never
/// panicked.
#[async_trait]
pub trait ChatCompletion: Send + Sync {
    /// Produces a completion for the given prompts.
    async fn complete(&self, system_prompt: &str, user_message: &str) -> anyhow::Result<String>;
}

/// A deterministic offline completion provider.
///
/// Produces templated research/analysis responses so the pipeline can run
/// without an API key. Which template is used depends on the system
/// prompt: prompts that mention analysis get the analysis shape.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimulatedChat;

impl SimulatedChat {
    /// Creates a new simulated provider.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn extract_topic(user_message: &str) -> &str {
        // The leaf prompts lead with "Research topic: <query>".
        user_message
            .lines()
            .find_map(|line| line.strip_prefix("Research topic:"))
            .map_or("the requested topic", str::trim)
    }

    fn research_response(topic: &str) -> String {
        format!(
            "# Research Report: {topic}\n\n\
             ## Key Findings\n\n\
             1. **Current state**: the topic is under active development and\n   \
                recent releases brought notable changes.\n\
             2. **Technical detail**: the latest improvements cover performance\n   \
                and new capabilities.\n\
             3. **Community reception**: feedback from practitioners has been\n   \
                broadly positive.\n\n\
             ## Sources\n\
             - docs.example.com - reference guide\n\
             - blog.example.com - release notes\n\n\
             _Simulated response; configure a real completion provider for live results._"
        )
    }

    fn analysis_response(topic: &str) -> String {
        format!(
            "# {topic} - Analysis\n\n\
             ## Executive Summary\n\
             The collected research on \"{topic}\" was reviewed and organised\n\
             into the themes below.\n\n\
             ## Detailed Analysis\n\
             ### Strengths\n\
             - Thorough documentation and community support\n\
             - Active, continuous development\n\n\
             ### Watch items\n\
             - Prepare for breaking changes\n\
             - Benchmark performance impact before adopting\n\n\
             ## Conclusion\n\
             The topic is in active development and suitable for professional use.\n\n\
             _Simulated response; configure a real completion provider for live results._"
        )
    }
}

#[async_trait]
impl ChatCompletion for SimulatedChat {
    async fn complete(&self, system_prompt: &str, user_message: &str) -> anyhow::Result<String> {
        let topic = Self::extract_topic(user_message);
        let is_analysis = system_prompt.to_lowercase().contains("analysis");

        Ok(if is_analysis {
            Self::analysis_response(topic)
        } else {
            Self::research_response(topic)
        })
    }
}
