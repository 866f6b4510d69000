//! Search Info Tool
//!
//! Answers general ultrasound questions from web search results.

use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

use sonocare_config::constants::timeouts;

use crate::mcp::{InputSchema, PropertySchema, Tool, ToolError, ToolOutput, ToolSchema};
use crate::search::{format_results, SearchProvider, NO_RESULTS};

/// Web search tool
pub struct SearchInfoTool {
    provider: Arc<dyn SearchProvider>,
    max_results: usize,
}

impl SearchInfoTool {
    pub fn new(provider: Arc<dyn SearchProvider>, max_results: usize) -> Self {
        Self {
            provider,
            max_results,
        }
    }
}

#[async_trait]
impl Tool for SearchInfoTool {
    fn name(&self) -> &str {
        "search_info_tool"
    }

    fn description(&self) -> &str {
        "Searches for information related to ultrasound scans."
    }

    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: self.name().to_string(),
            description: self.description().to_string(),
            input_schema: InputSchema::object().property(
                "query",
                PropertySchema::string("Search keywords"),
                true,
            ),
        }
    }

    /// Search failures degrade to the empty-result text
    async fn execute(&self, input: Value) -> Result<ToolOutput, ToolError> {
        let query = input
            .get("query")
            .and_then(|v| v.as_str())
            .ok_or_else(|| ToolError::invalid_params("query must be a string"))?;

        match self.provider.search(query, self.max_results).await {
            Ok(mut results) => {
                results.truncate(self.max_results);
                tracing::debug!(
                    provider = self.provider.name(),
                    results = results.len(),
                    "Web search completed"
                );
                Ok(ToolOutput::text(format_results(&results)))
            }
            Err(e) => {
                tracing::warn!(
                    provider = self.provider.name(),
                    error = %e,
                    "Web search failed"
                );
                Ok(ToolOutput::text(NO_RESULTS))
            }
        }
    }

    fn timeout_secs(&self) -> u64 {
        timeouts::SEARCH_SECS + 5
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::{SearchError, SearchResult};
    use serde_json::json;

    struct FixedSearch(Vec<SearchResult>);

    #[async_trait]
    impl SearchProvider for FixedSearch {
        async fn search(&self, _: &str, _: usize) -> Result<Vec<SearchResult>, SearchError> {
            Ok(self.0.clone())
        }

        fn name(&self) -> &str {
            "fixed"
        }
    }

    struct FailingSearch;

    #[async_trait]
    impl SearchProvider for FailingSearch {
        async fn search(&self, _: &str, _: usize) -> Result<Vec<SearchResult>, SearchError> {
            Err(SearchError::ConnectionFailed("offline".to_string()))
        }

        fn name(&self) -> &str {
            "failing"
        }
    }

    fn results(n: usize) -> Vec<SearchResult> {
        (0..n)
            .map(|i| {
                SearchResult::new(
                    format!("T{}", i),
                    format!("https://example.com/{}", i),
                    format!("B{}", i),
                )
            })
            .collect()
    }

    #[tokio::test]
    async fn test_caps_results() {
        let tool = SearchInfoTool::new(Arc::new(FixedSearch(results(5))), 3);
        let text = tool.execute(json!({"query": "3D scan"})).await.unwrap().as_text();

        assert_eq!(text.matches("Title: ").count(), 3);
        assert!(text.starts_with("Title: T0\nURL: https://example.com/0\nDescription: B0\n\nTitle: T1"));
    }

    #[tokio::test]
    async fn test_empty_results() {
        let tool = SearchInfoTool::new(Arc::new(FixedSearch(Vec::new())), 3);
        let output = tool.execute(json!({"query": "x"})).await.unwrap();
        assert_eq!(output.as_text(), "No results found.");
    }

    #[tokio::test]
    async fn test_failure_degrades_to_no_results() {
        let tool = SearchInfoTool::new(Arc::new(FailingSearch), 3);
        let output = tool.execute(json!({"query": "x"})).await.unwrap();
        assert_eq!(output.as_text(), "No results found.");
        assert!(!output.is_error);
    }
}
