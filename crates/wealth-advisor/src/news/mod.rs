//! Market News Feed
//!
//! Capability consumed by the market news & sentiment tool.

mod alpha_vantage;

pub use alpha_vantage::AlphaVantageClient;

use async_trait::async_trait;

use crate::error::Result;
use crate::model::NewsArticle;

/// Parameters for a news & sentiment lookup, already case-normalized
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NewsQuery {
    /// Comma-delimited, upper-case tickers
    pub tickers: Option<String>,
    /// Comma-delimited, lower-case topics
    pub topics: Option<String>,
    /// Maximum articles requested upstream
    pub limit: usize,
}

/// One page of provider results
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct NewsFeedPage {
    /// Articles in provider order (most recent first)
    pub articles: Vec<NewsArticle>,
    /// Provider diagnostic text, e.g. a rate-limit notice
    pub diagnostic: Option<String>,
}

/// Market news provider
#[async_trait]
pub trait NewsFeed: Send + Sync {
    async fn news_sentiment(&self, query: &NewsQuery) -> Result<NewsFeedPage>;

    fn name(&self) -> &str;
}
