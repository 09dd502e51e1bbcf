//! Web search tool backed by a SearxNG instance.
//!
//! Queries `{host}/search?format=json` and returns the top results as a
//! JSON array of citation records: title, url, snippet, source, author,
//! publication and access dates, and a short summary.

use async_trait::async_trait;
use chrono::NaiveDate;
use ponder_core::error::ToolError;
use ponder_core::tool::{Tool, ToolArguments, ToolParameter, required_str};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

pub struct WebSearchTool {
    host: String,
    count: usize,
    client: reqwest::Client,
}

impl WebSearchTool {
    pub fn new(host: impl Into<String>, count: usize) -> Self {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(15))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            host: host.into().trim_end_matches('/').to_string(),
            count: count.max(1),
            client,
        }
    }

    pub fn host(&self) -> &str {
        &self.host
    }
}

/// Summaries longer than this many characters are cut.
const SUMMARY_CHARS: usize = 500;

/// One search hit as returned to the model.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchHit {
    pub title: String,
    pub url: String,
    pub snippet: String,
    pub source: String,
    pub author: String,
    pub date_published: String,
    pub accessed_date: String,
    pub summary: String,
}

#[derive(Debug, Deserialize)]
struct SearxResponse {
    #[serde(default)]
    results: Vec<SearxResult>,
}

#[derive(Debug, Deserialize)]
struct SearxResult {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    engines: Vec<String>,
    #[serde(default)]
    author: Option<String>,
    #[serde(default, rename = "publishedDate")]
    published_date: Option<String>,
}

/// `YYYY-MM-DD` prefix of a SearxNG timestamp, or the raw value.
fn publication_date(raw: &str) -> String {
    raw.get(..10)
        .and_then(|prefix| NaiveDate::parse_from_str(prefix, "%Y-%m-%d").ok())
        .map(|date| date.format("%Y-%m-%d").to_string())
        .unwrap_or_else(|| raw.to_string())
}

fn summarize(snippet: &str) -> String {
    match snippet.char_indices().nth(SUMMARY_CHARS) {
        Some((cut, _)) => format!("{}...", &snippet[..cut]),
        None => snippet.to_string(),
    }
}

/// Keep the first `count` results that carry a URL, dated against `today`.
fn top_hits(response: SearxResponse, count: usize, today: NaiveDate) -> Vec<SearchHit> {
    let today = today.format("%Y-%m-%d").to_string();
    response
        .results
        .into_iter()
        .filter_map(|r| {
            let url = r.url.filter(|u| !u.is_empty())?;
            let snippet = r.content.unwrap_or_default();
            Some(SearchHit {
                title: r.title.unwrap_or_else(|| "Unknown".into()),
                url,
                summary: summarize(&snippet),
                snippet,
                source: r.engines.into_iter().next().unwrap_or_else(|| "Unknown".into()),
                author: r
                    .author
                    .filter(|a| !a.is_empty())
                    .unwrap_or_else(|| "Unknown".into()),
                date_published: r
                    .published_date
                    .filter(|d| !d.is_empty())
                    .map(|d| publication_date(&d))
                    .unwrap_or_else(|| today.clone()),
                accessed_date: today.clone(),
            })
        })
        .take(count)
        .collect()
}

#[async_trait]
impl Tool for WebSearchTool {
    fn name(&self) -> &str {
        "web_search"
    }

    fn description(&self) -> &str {
        "Perform a web search using the SearxNG search engine."
    }

    fn parameters(&self) -> Vec<ToolParameter> {
        vec![ToolParameter::required(
            "query",
            "str",
            "The search query string.",
        )]
    }

    async fn execute(&self, arguments: ToolArguments) -> Result<serde_json::Value, ToolError> {
        let query = required_str(&arguments, "query")?;
        let url = format!("{}/search", self.host);
        debug!(query, host = %self.host, "Searching");

        let count = self.count.to_string();
        let response = self
            .client
            .get(&url)
            .query(&[("q", query), ("format", "json"), ("count", count.as_str())])
            .send()
            .await
            .map_err(|e| ToolError::ExecutionFailed(format!("Search request failed: {e}")))?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            warn!(status, "SearxNG returned an error status");
            return Err(ToolError::ExecutionFailed(format!(
                "Search request failed with status {status}"
            )));
        }

        let body: SearxResponse = response.json().await.map_err(|e| {
            ToolError::ExecutionFailed(format!("Failed to parse search results: {e}"))
        })?;

        let hits = top_hits(body, self.count, chrono::Local::now().date_naive());
        serde_json::to_value(hits)
            .map_err(|e| ToolError::ExecutionFailed(format!("Failed to encode results: {e}")))
    }
}
