//! Internal Perspective Search Tool
//!
//! Answers questions about the firm's market outlook, investment policy and
//! FAQs from the internal document index.

use std::sync::Arc;

use async_trait::async_trait;

use agent_core::{Result as CoreResult, Tool, ToolCall, ToolResult, ToolSchema, tool::ParameterSchema};

use crate::model::{PERSPECTIVE_RESULT_LIMIT, PerspectiveResult, PerspectiveSnippet};
use crate::search::{DocumentSearch, SearchRequest, SearchResponse};

pub const TOOL_NAME: &str = "get_citi_perspective";

pub struct CitiPerspectiveTool {
    search: Option<Arc<dyn DocumentSearch>>,
}

impl CitiPerspectiveTool {
    pub fn new(search: Option<Arc<dyn DocumentSearch>>) -> Self {
        Self { search }
    }

    pub fn is_configured(&self) -> bool {
        self.search.is_some()
    }

    fn request(query: &str) -> SearchRequest {
        SearchRequest {
            query: query.to_string(),
            page_size: PERSPECTIVE_RESULT_LIMIT,
            summary_result_count: PERSPECTIVE_RESULT_LIMIT,
            include_citations: true,
            max_extractive_answers: PERSPECTIVE_RESULT_LIMIT,
        }
    }
}

/// Summary wins when present; otherwise snippets flattened across documents.
fn perspective_from(response: SearchResponse) -> Option<PerspectiveResult> {
    if let Some(summary) = response.summary.filter(|s| !s.trim().is_empty()) {
        return Some(PerspectiveResult::Summary { summary });
    }

    let snippets: Vec<_> = response
        .documents
        .into_iter()
        .flat_map(|doc| {
            let (title, link) = (doc.title, doc.link);
            doc.snippets.into_iter().map(move |snippet| PerspectiveSnippet {
                title: title.clone(),
                link: link.clone(),
                snippet,
            })
        })
        .take(PERSPECTIVE_RESULT_LIMIT)
        .collect();

    (!snippets.is_empty()).then_some(PerspectiveResult::Snippets(snippets))
}

#[async_trait]
impl Tool for CitiPerspectiveTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: TOOL_NAME.into(),
            description: "Search Citi's internal documents for the firm's market outlook, investment policy and FAQs. Always consult this before answering questions about outlook or policy.".into(),
            parameters: vec![ParameterSchema::string(
                "query",
                "Natural-language question, e.g. 'What is the 2025 equity outlook?'",
                true,
            )],
            category: Some("research".into()),
        }
    }

    // argument faults are reported in the result payload
    fn validate(&self, _call: &ToolCall) -> CoreResult<()> {
        Ok(())
    }

    async fn execute(&self, call: &ToolCall) -> CoreResult<ToolResult> {
        let Some(search) = &self.search else {
            return Ok(ToolResult::failure(TOOL_NAME, "search client not configured"));
        };
        let Some(query) = call.str_arg("query") else {
            return Ok(ToolResult::failure(TOOL_NAME, "query is required"));
        };
        let query = &*query;

        let response = match search.search(&Self::request(query)).await {
            Ok(response) => response,
            Err(e) => {
                tracing::error!(search = search.name(), error = %e, "Perspective search failed");
                return Ok(ToolResult::failure(TOOL_NAME, "query failed").with_details(e.to_string()));
            }
        };

        match perspective_from(response) {
            Some(perspective) => Ok(ToolResult::from_payload(TOOL_NAME, &perspective)),
            None => {
                tracing::warn!(query, "No internal guidance found");
                Ok(ToolResult::failure(TOOL_NAME, "no internal guidance found"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AdvisorError, Result};
    use crate::search::SearchDocument;
    use crate::test_support::error_counting_subscriber;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tracing::instrument::WithSubscriber;

    struct FakeSearch {
        response: Option<SearchResponse>,
        calls: AtomicUsize,
    }

    impl FakeSearch {
        fn new(response: Option<SearchResponse>) -> Arc<Self> {
            Arc::new(Self {
                response,
                calls: AtomicUsize::new(0),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl DocumentSearch for FakeSearch {
        async fn search(&self, _request: &SearchRequest) -> Result<SearchResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.response
                .clone()
                .ok_or_else(|| AdvisorError::UpstreamUnavailable("PERMISSION_DENIED".into()))
        }

        fn name(&self) -> &str {
            "fake"
        }
    }

    fn document(title: &str, snippets: &[&str]) -> SearchDocument {
        SearchDocument {
            title: title.into(),
            link: format!("gs://perspectives/{title}.pdf"),
            snippets: snippets.iter().map(|s| (*s).to_string()).collect(),
        }
    }

    fn tool(search: &Arc<FakeSearch>) -> CitiPerspectiveTool {
        CitiPerspectiveTool::new(Some(search.clone() as Arc<dyn DocumentSearch>))
    }

    fn call(query: &str) -> ToolCall {
        ToolCall::new(TOOL_NAME).with_arg("query", query)
    }

    #[tokio::test]
    async fn summary_takes_precedence_over_snippets() {
        let search = FakeSearch::new(Some(SearchResponse {
            summary: Some("We favour quality equities.".into()),
            documents: vec![document("outlook", &["Equities favoured."])],
        }));

        let result = tool(&search).execute(&call("2025 outlook")).await.unwrap();

        assert_eq!(result.to_value(), json!({ "summary": "We favour quality equities." }));
    }

    #[tokio::test]
    async fn snippets_are_flattened_and_capped() {
        let search = FakeSearch::new(Some(SearchResponse {
            summary: None,
            documents: vec![
                document("outlook", &["First.", "Second."]),
                document("policy", &["Third.", "Fourth."]),
            ],
        }));

        let result = tool(&search).execute(&call("rebalancing policy")).await.unwrap();

        assert_eq!(
            result.to_value(),
            json!([
                { "title": "outlook", "link": "gs://perspectives/outlook.pdf", "snippet": "First." },
                { "title": "outlook", "link": "gs://perspectives/outlook.pdf", "snippet": "Second." },
                { "title": "policy", "link": "gs://perspectives/policy.pdf", "snippet": "Third." }
            ])
        );
    }

    #[tokio::test]
    async fn empty_index_reports_no_guidance() {
        let search = FakeSearch::new(Some(SearchResponse::default()));
        let result = tool(&search).execute(&call("crypto custody")).await.unwrap();

        assert_eq!(result.to_json(), r#"{"error":"no internal guidance found"}"#);
    }

    #[tokio::test]
    async fn blank_query_skips_search() {
        let search = FakeSearch::new(Some(SearchResponse::default()));
        let result = tool(&search).execute(&call("  ")).await.unwrap();

        assert_eq!(result.error(), Some("query is required"));
        assert_eq!(search.calls(), 0);
    }

    #[tokio::test]
    async fn unconfigured_search_is_reported() {
        let result = CitiPerspectiveTool::new(None).execute(&call("fees")).await.unwrap();

        assert_eq!(result.to_value(), json!({ "error": "search client not configured" }));
    }

    #[tokio::test]
    async fn fault_is_logged_once_with_details() {
        let (subscriber, errors) = error_counting_subscriber();
        let search = FakeSearch::new(None);

        let result = tool(&search)
            .execute(&call("fees"))
            .with_subscriber(subscriber)
            .await
            .unwrap();

        assert_eq!(result.error(), Some("query failed"));
        assert!(result.to_value()["details"].as_str().unwrap().contains("PERMISSION_DENIED"));
        assert_eq!(errors.count(), 1);
    }

    #[tokio::test]
    async fn repeated_calls_are_identical() {
        let search = FakeSearch::new(Some(SearchResponse {
            summary: None,
            documents: vec![document("faq", &["Fees are tiered."])],
        }));
        let tool = tool(&search);

        let first = tool.execute(&call("fees")).await.unwrap();
        let second = tool.execute(&call("fees")).await.unwrap();

        assert_eq!(first.to_json(), second.to_json());
    }
}
