//! Discovery Engine (Vertex AI Search) adapter

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};

use super::{DocumentSearch, SearchDocument, SearchRequest, SearchResponse};
use crate::config::{AdvisorConfig, ApiKey};
use crate::error::{AdvisorError, Result};

const MISSING_FIELD: &str = "N/A";

pub struct DiscoveryEngineClient {
    http: reqwest::Client,
    serving_config_url: String,
    token: Option<ApiKey>,
}

#[derive(Deserialize)]
struct SearchApiResponse {
    #[serde(default)]
    results: Vec<SearchApiResult>,
    summary: Option<SearchApiSummary>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchApiSummary {
    #[serde(default)]
    summary_text: String,
}

#[derive(Deserialize)]
struct SearchApiResult {
    document: Option<SearchApiDocument>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchApiDocument {
    #[serde(default)]
    derived_struct_data: Value,
}

impl From<SearchApiDocument> for SearchDocument {
    fn from(doc: SearchApiDocument) -> Self {
        let data = &doc.derived_struct_data;
        let text = |key: &str| {
            data.get(key)
                .and_then(Value::as_str)
                .unwrap_or(MISSING_FIELD)
                .to_string()
        };

        let snippets = data
            .get("snippets")
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .map(|s| {
                        s.get("snippet")
                            .and_then(Value::as_str)
                            .unwrap_or(MISSING_FIELD)
                            .to_string()
                    })
                    .collect()
            })
            .unwrap_or_default();

        Self {
            title: text("title"),
            link: text("link"),
            snippets,
        }
    }
}

impl DiscoveryEngineClient {
    /// Requires `project_id` and `data_store_id`
    pub fn new(config: &AdvisorConfig) -> Result<Self> {
        let project_id = config
            .project_id
            .as_deref()
            .ok_or_else(|| AdvisorError::ConfigurationMissing("GCP_PROJECT_ID is not set".into()))?;
        let data_store_id = config
            .data_store_id
            .as_deref()
            .ok_or_else(|| AdvisorError::ConfigurationMissing("DATA_STORE_ID is not set".into()))?;

        let http = reqwest::Client::builder()
            .timeout(config.timeouts.search)
            .build()
            .map_err(|e| AdvisorError::Internal(format!("failed to build search client: {e}")))?;

        let serving_config_url = format!(
            "{}/v1/projects/{project_id}/locations/{}/collections/default_collection/dataStores/{data_store_id}/servingConfigs/default_config:search",
            config.endpoints.discovery_engine.trim_end_matches('/'),
            config.data_store_location,
        );

        Ok(Self {
            http,
            serving_config_url,
            token: config.gcp_access_token.clone(),
        })
    }

    fn request_body(request: &SearchRequest) -> Value {
        json!({
            "query": request.query,
            "pageSize": request.page_size,
            "contentSearchSpec": {
                "snippetSpec": { "returnSnippet": true },
                "summarySpec": {
                    "summaryResultCount": request.summary_result_count,
                    "includeCitations": request.include_citations,
                },
                "extractiveContentSpec": {
                    "maxExtractiveAnswerCount": request.max_extractive_answers,
                },
            },
        })
    }
}

#[async_trait]
impl DocumentSearch for DiscoveryEngineClient {
    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse> {
        let mut http_request = self
            .http
            .post(&self.serving_config_url)
            .json(&Self::request_body(request));
        if let Some(token) = &self.token {
            http_request = http_request.bearer_auth(token.expose());
        }

        tracing::debug!(page_size = request.page_size, "Searching internal documents");
        let body: SearchApiResponse = http_request.send().await?.error_for_status()?.json().await?;

        Ok(SearchResponse {
            summary: body
                .summary
                .map(|s| s.summary_text)
                .filter(|s| !s.trim().is_empty()),
            documents: body
                .results
                .into_iter()
                .filter_map(|r| r.document)
                .map(SearchDocument::from)
                .collect(),
        })
    }

    fn name(&self) -> &str {
        "Discovery Engine"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const SEARCH_PATH: &str = "/v1/projects/wealth-prod/locations/global/collections/default_collection/dataStores/perspectives/servingConfigs/default_config:search";

    fn config(base_url: &str) -> AdvisorConfig {
        let mut config = AdvisorConfig {
            project_id: Some("wealth-prod".into()),
            data_store_id: Some("perspectives".into()),
            gcp_access_token: Some(ApiKey::new("gcp-token")),
            ..AdvisorConfig::default()
        };
        config.endpoints.discovery_engine = base_url.into();
        config
    }

    fn request(query: &str) -> SearchRequest {
        SearchRequest {
            query: query.into(),
            page_size: 3,
            summary_result_count: 3,
            include_citations: true,
            max_extractive_answers: 3,
        }
    }

    #[test]
    fn requires_project_and_data_store() {
        let err = DiscoveryEngineClient::new(&AdvisorConfig::default()).err().unwrap();
        assert!(matches!(err, AdvisorError::ConfigurationMissing(_)));

        let config = AdvisorConfig {
            project_id: Some("wealth-prod".into()),
            ..AdvisorConfig::default()
        };
        let err = DiscoveryEngineClient::new(&config).err().unwrap();
        assert!(err.to_string().contains("DATA_STORE_ID"));
    }

    #[tokio::test]
    async fn maps_summary_and_documents() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(SEARCH_PATH))
            .and(header("authorization", "Bearer gcp-token"))
            .and(body_partial_json(json!({
                "query": "2025 outlook",
                "pageSize": 3,
                "contentSearchSpec": {
                    "snippetSpec": { "returnSnippet": true },
                    "summarySpec": { "summaryResultCount": 3, "includeCitations": true }
                }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "results": [
                    {
                        "id": "doc-1",
                        "document": {
                            "derivedStructData": {
                                "title": "2025 Outlook",
                                "link": "gs://perspectives/outlook.pdf",
                                "snippets": [{ "snippet": "Equities favoured." }]
                            }
                        }
                    },
                    {
                        "id": "doc-2",
                        "document": { "derivedStructData": { "snippets": [{}] } }
                    }
                ],
                "summary": { "summaryText": "We favour quality equities." }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = DiscoveryEngineClient::new(&config(&server.uri())).unwrap();
        let response = client.search(&request("2025 outlook")).await.unwrap();

        assert_eq!(response.summary.as_deref(), Some("We favour quality equities."));
        assert_eq!(
            response.documents,
            vec![
                SearchDocument {
                    title: "2025 Outlook".into(),
                    link: "gs://perspectives/outlook.pdf".into(),
                    snippets: vec!["Equities favoured.".into()],
                },
                SearchDocument {
                    title: "N/A".into(),
                    link: "N/A".into(),
                    snippets: vec!["N/A".into()],
                },
            ]
        );
    }

    #[tokio::test]
    async fn blank_summary_is_dropped() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "summary": { "summaryText": "  " }
            })))
            .mount(&server)
            .await;

        let client = DiscoveryEngineClient::new(&config(&server.uri())).unwrap();
        let response = client.search(&request("estate planning")).await.unwrap();

        assert_eq!(response, SearchResponse::default());
    }

    #[tokio::test]
    async fn permission_denied_is_upstream_fault() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403).set_body_json(json!({
                "error": { "code": 403, "status": "PERMISSION_DENIED" }
            })))
            .mount(&server)
            .await;

        let client = DiscoveryEngineClient::new(&config(&server.uri())).unwrap();
        let err = client.search(&request("fees")).await.unwrap_err();

        assert!(matches!(err, AdvisorError::UpstreamUnavailable(_)));
    }
}
