//! Internal Document Search
//!
//! Capability consumed by the perspective tool: a managed index of the
//! firm's policy, outlook and FAQ documents.

mod discovery_engine;

pub use discovery_engine::DiscoveryEngineClient;

use async_trait::async_trait;

use crate::error::Result;

/// What to ask the index for
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchRequest {
    pub query: String,
    /// Documents per page
    pub page_size: usize,
    /// Documents contributing to the abstractive summary
    pub summary_result_count: usize,
    pub include_citations: bool,
    /// Extractive snippets per matching document
    pub max_extractive_answers: usize,
}

/// Index response in vendor-neutral form
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct SearchResponse {
    pub summary: Option<String>,
    pub documents: Vec<SearchDocument>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SearchDocument {
    pub title: String,
    pub link: String,
    pub snippets: Vec<String>,
}

#[async_trait]
pub trait DocumentSearch: Send + Sync {
    async fn search(&self, request: &SearchRequest) -> Result<SearchResponse>;

    fn name(&self) -> &str;
}
