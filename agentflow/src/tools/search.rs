//! Web search collaborator.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// Protocol for web search.
///
/// Returns formatted result text ready to feed into a completion prompt.
#[async_trait]
pub trait WebSearch: Send + Sync {
    /// Searches the web for the given query.
    async fn search(&self, query: &str) -> anyhow::Result<String>;
}

/// Configuration for the Tavily-backed search client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Tavily API key. When empty, searches report the missing key in
    /// their result text instead of failing.
    #[serde(default)]
    pub api_key: String,
    /// Search endpoint URL.
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// Maximum number of results to request.
    #[serde(default = "default_max_results")]
    pub max_results: usize,
    /// Search depth ("basic" or "advanced").
    #[serde(default = "default_search_depth")]
    pub search_depth: String,
    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout_seconds: f64,
}

fn default_endpoint() -> String {
    "https://api.tavily.com/search".to_string()
}

fn default_max_results() -> usize {
    10
}

fn default_search_depth() -> String {
    "advanced".to_string()
}

fn default_timeout() -> f64 {
    30.0
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            api_key: String::new(),
            endpoint: default_endpoint(),
            max_results: default_max_results(),
            search_depth: default_search_depth(),
            timeout_seconds: default_timeout(),
        }
    }
}

impl SearchConfig {
    /// Creates a new configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the API key.
    #[must_use]
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = api_key.into();
        self
    }

    /// Sets the maximum number of results.
    #[must_use]
    pub fn with_max_results(mut self, max_results: usize) -> Self {
        self.max_results = max_results;
        self
    }

    /// Gets the timeout as a Duration.
    #[must_use]
    pub fn timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs_f64(self.timeout_seconds)
    }
}

/// A single search hit used when formatting results.
#[derive(Debug, Clone, Default)]
struct SearchHit {
    title: String,
    url: String,
    snippet: String,
}

fn format_results(query: &str, hits: &[SearchHit], source: &str) -> String {
    let entries = hits
        .iter()
        .enumerate()
        .map(|(i, hit)| {
            format!(
                "{}. {}\n   URL: {}\n   Summary: {}",
                i + 1,
                hit.title,
                hit.url,
                hit.snippet
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n");

    format!(
        "Web search results for '{query}'\nSource: {source}\nRetrieved: {}\nResults: {}\n\n{entries}",
        crate::utils::iso_timestamp(),
        hits.len()
    )
}

/// Web search backed by the Tavily Search API.
#[cfg(feature = "websearch")]
pub struct TavilySearch {
    config: SearchConfig,
    client: reqwest::Client,
}

#[cfg(feature = "websearch")]
impl TavilySearch {
    /// Creates a new Tavily client from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be constructed.
    pub fn new(config: SearchConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()?;
        Ok(Self { config, client })
    }
}

#[cfg(feature = "websearch")]
#[async_trait]
impl WebSearch for TavilySearch {
    async fn search(&self, query: &str) -> anyhow::Result<String> {
        tracing::info!(query, "searching with Tavily");

        if self.config.api_key.is_empty() {
            tracing::warn!("Tavily API key is not configured");
            return Ok(
                "Tavily API key is not configured; set `api_key` in the search configuration."
                    .to_string(),
            );
        }

        let body = serde_json::json!({
            "api_key": self.config.api_key,
            "query": query,
            "max_results": self.config.max_results,
            "include_answer": true,
            "search_depth": self.config.search_depth,
        });

        let response = self
            .client
            .post(&self.config.endpoint)
            .json(&body)
            .send()
            .await?
            .error_for_status()?;

        let payload: serde_json::Value = response.json().await?;

        let hits: Vec<SearchHit> = payload
            .get("results")
            .and_then(|v| v.as_array())
            .map(|items| {
                items
                    .iter()
                    .map(|item| SearchHit {
                        title: item
                            .get("title")
                            .and_then(|v| v.as_str())
                            .unwrap_or_default()
                            .to_string(),
                        url: item
                            .get("url")
                            .and_then(|v| v.as_str())
                            .unwrap_or_default()
                            .to_string(),
                        snippet: item
                            .get("content")
                            .and_then(|v| v.as_str())
                            .unwrap_or_default()
                            .to_string(),
                    })
                    .collect()
            })
            .unwrap_or_default();

        if hits.is_empty() {
            return Ok(format!("Tavily Search: no results found for '{query}'."));
        }

        let mut formatted = format_results(query, &hits, "Tavily Search API");

        // Prepend Tavily's AI summary answer when present.
        if let Some(answer) = payload.get("answer").and_then(|v| v.as_str()) {
            if !answer.is_empty() {
                formatted = format!("AI Summary: {answer}\n\n{formatted}");
            }
        }

        tracing::info!(query, results = hits.len(), "Tavily search finished");
        Ok(formatted)
    }
}

/// A search provider returning fixed text.
///
/// Used when no search backend is configured and in tests.
#[derive(Debug, Clone)]
pub struct StaticSearch {
    results: String,
}

impl StaticSearch {
    /// Creates a provider returning the given text for every query.
    #[must_use]
    pub fn new(results: impl Into<String>) -> Self {
        Self {
            results: results.into(),
        }
    }
}

impl Default for StaticSearch {
    fn default() -> Self {
        Self::new("No search backend configured; no live results available.")
    }
}

#[async_trait]
impl WebSearch for StaticSearch {
    async fn search(&self, _query: &str) -> anyhow::Result<String> {
        Ok(self.results.clone())
    }
}
