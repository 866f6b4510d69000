//! Web search providers
//!
//! The information agent answers general questions from web results. The
//! default provider is the DuckDuckGo Instant Answer API, which needs no key.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use sonocare_config::SearchConfig;

use crate::mcp::ToolError;

/// Text returned when a search yields nothing usable
pub const NO_RESULTS: &str = "No results found.";

/// Search errors
#[derive(Error, Debug)]
pub enum SearchError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Search API returned {0}")]
    Api(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),
}

impl From<reqwest::Error> for SearchError {
    fn from(err: reqwest::Error) -> Self {
        SearchError::ConnectionFailed(err.to_string())
    }
}

impl From<SearchError> for ToolError {
    fn from(err: SearchError) -> Self {
        ToolError::internal(err.to_string())
    }
}

impl From<SearchError> for sonocare_core::Error {
    fn from(err: SearchError) -> Self {
        sonocare_core::Error::Search(err.to_string())
    }
}

/// One web result
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub href: String,
    pub body: String,
}

impl SearchResult {
    pub fn new(title: impl Into<String>, href: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            href: href.into(),
            body: body.into(),
        }
    }
}

/// Web search backend
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Return at most `max_results` results for the query
    async fn search(&self, query: &str, max_results: usize)
        -> Result<Vec<SearchResult>, SearchError>;

    /// Provider name for logging
    fn name(&self) -> &str;
}

/// Render results as `Title/URL/Description` blocks separated by a blank line
pub fn format_results(results: &[SearchResult]) -> String {
    if results.is_empty() {
        return NO_RESULTS.to_string();
    }

    results
        .iter()
        .map(|r| format!("Title: {}\nURL: {}\nDescription: {}", r.title, r.href, r.body))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// DuckDuckGo Instant Answer provider
pub struct DuckDuckGoSearch {
    client: Client,
    endpoint: String,
}

impl DuckDuckGoSearch {
    pub fn new(config: &SearchConfig) -> Result<Self, SearchError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .user_agent(concat!("sonocare/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| SearchError::ConnectionFailed(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: config.endpoint.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl SearchProvider for DuckDuckGoSearch {
    async fn search(
        &self,
        query: &str,
        max_results: usize,
    ) -> Result<Vec<SearchResult>, SearchError> {
        let response = self
            .client
            .get(format!("{}/", self.endpoint))
            .query(&[
                ("q", query),
                ("format", "json"),
                ("no_html", "1"),
                ("skip_disambig", "1"),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(SearchError::Api(status.to_string()));
        }

        // The API answers with a javascript content type, so decode by hand
        let body = response.text().await?;
        let answer: InstantAnswer = serde_json::from_str(&body)
            .map_err(|e| SearchError::InvalidResponse(e.to_string()))?;

        Ok(answer.into_results(max_results))
    }

    fn name(&self) -> &str {
        "duckduckgo"
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct InstantAnswer {
    #[serde(default)]
    heading: String,
    #[serde(default)]
    abstract_text: String,
    #[serde(rename = "AbstractURL", default)]
    abstract_url: String,
    #[serde(default)]
    related_topics: Vec<RelatedTopic>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RelatedTopic {
    Entry {
        #[serde(rename = "Text")]
        text: String,
        #[serde(rename = "FirstURL")]
        first_url: String,
    },
    Group {
        #[serde(rename = "Topics")]
        topics: Vec<RelatedTopic>,
    },
}

impl RelatedTopic {
    fn flatten_into(self, out: &mut Vec<SearchResult>) {
        match self {
            RelatedTopic::Entry { text, first_url } => {
                // Entries read "Title - description"
                let title = text
                    .split_once(" - ")
                    .map(|(title, _)| title.to_string())
                    .unwrap_or_else(|| text.clone());
                out.push(SearchResult::new(title, first_url, text));
            }
            RelatedTopic::Group { topics } => {
                for topic in topics {
                    topic.flatten_into(out);
                }
            }
        }
    }
}

impl InstantAnswer {
    fn into_results(self, max_results: usize) -> Vec<SearchResult> {
        let mut results = Vec::new();

        if !self.abstract_text.is_empty() {
            results.push(SearchResult::new(
                self.heading,
                self.abstract_url,
                self.abstract_text,
            ));
        }

        for topic in self.related_topics {
            topic.flatten_into(&mut results);
        }

        results.truncate(max_results);
        results
    }
}
