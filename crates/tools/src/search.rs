//! Search tool — text search over a hosted search API.
//!
//! When configured with an API endpoint and key, queries the hosted service
//! (Tavily-style JSON POST). Without credentials it returns deterministic
//! offline results so the workflow and its tests run end-to-end with no
//! network access.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use taskweave_core::error::ToolError;
use tracing::{debug, warn};

use crate::Tool;

/// How many results to request per search.
const MAX_RESULTS: usize = 5;

/// Connection settings for the hosted search API.
#[derive(Debug, Clone)]
pub struct SearchApiConfig {
    pub api_url: String,
    pub api_key: String,
}

pub struct SearchTool {
    api: Option<SearchApiConfig>,
    client: reqwest::Client,
}

impl SearchTool {
    /// A search tool backed by the hosted API.
    pub fn hosted(config: SearchApiConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");
        Self {
            api: Some(config),
            client,
        }
    }

    /// A search tool that serves deterministic offline results.
    pub fn offline() -> Self {
        Self {
            api: None,
            client: reqwest::Client::new(),
        }
    }

    async fn search_hosted(&self, config: &SearchApiConfig, query: &str) -> Result<Value, ToolError> {
        let body = ApiSearchRequest {
            api_key: config.api_key.clone(),
            query: query.to_string(),
            max_results: MAX_RESULTS,
        };

        let response = self
            .client
            .post(&config.api_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ToolError::ExecutionFailed {
                tool_name: "search".into(),
                reason: format!("Request failed: {e}"),
            })?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            return Err(ToolError::ExecutionFailed {
                tool_name: "search".into(),
                reason: format!("Search API returned {status}: {text}"),
            });
        }

        let parsed: ApiSearchResponse =
            response.json().await.map_err(|e| ToolError::ExecutionFailed {
                tool_name: "search".into(),
                reason: format!("Undecodable search response: {e}"),
            })?;

        debug!(results = parsed.results.len(), "Search completed");
        serde_json::to_value(parsed.results).map_err(|e| ToolError::ExecutionFailed {
            tool_name: "search".into(),
            reason: format!("Failed to encode results: {e}"),
        })
    }
}

#[async_trait]
impl Tool for SearchTool {
    fn name(&self) -> &str {
        "search"
    }

    fn description(&self) -> &str {
        "Search the web for information. Returns relevant results with titles, URLs, and snippets."
    }

    async fn invoke(&self, input: &str) -> std::result::Result<Value, ToolError> {
        let query = input.trim();
        if query.is_empty() {
            return Err(ToolError::InvalidInput("Search query is empty".into()));
        }

        match &self.api {
            Some(config) => self.search_hosted(config, query).await,
            None => {
                warn!("No search API configured, serving offline results");
                let results = offline_results(query, 3);
                Ok(serde_json::to_value(results).unwrap_or_default())
            }
        }
    }
}

#[derive(Serialize)]
struct ApiSearchRequest {
    api_key: String,
    query: String,
    max_results: usize,
}

#[derive(Deserialize)]
struct ApiSearchResponse {
    #[serde(default)]
    results: Vec<SearchResult>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub url: String,
    #[serde(alias = "content")]
    pub snippet: String,
}

fn offline_results(query: &str, count: usize) -> Vec<SearchResult> {
    (0..count)
        .map(|i| SearchResult {
            title: format!("Result {} for: {}", i + 1, query),
            url: format!("https://example.com/search?q={}&p={}", query.replace(' ', "+"), i + 1),
            snippet: format!(
                "Offline search result for the query '{}'. Configure a search API for live content.",
                query
            ),
        })
        .collect()
}
