//! Alpha Vantage `NEWS_SENTIMENT` adapter

use async_trait::async_trait;
use serde::Deserialize;

use super::{NewsFeed, NewsFeedPage, NewsQuery};
use crate::config::{AdvisorConfig, ApiKey};
use crate::error::{AdvisorError, Result};
use crate::model::NewsArticle;

pub struct AlphaVantageClient {
    http: reqwest::Client,
    base_url: String,
    api_key: ApiKey,
}

#[derive(Debug, Deserialize)]
struct AvNewsResponse {
    #[serde(default)]
    feed: Option<Vec<AvFeedItem>>,

    // Throttling and quota notices come back with HTTP 200:
    // { "Information": "... rate limit is 25 requests per day ..." }
    #[serde(rename = "Information")]
    information: Option<String>,

    #[serde(rename = "Note")]
    note: Option<String>,

    #[serde(rename = "Error Message")]
    error_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AvFeedItem {
    title: Option<String>,
    summary: Option<String>,
    url: Option<String>,
    overall_sentiment_label: Option<String>,
}

impl From<AvFeedItem> for NewsArticle {
    fn from(item: AvFeedItem) -> Self {
        Self {
            title: item.title,
            summary: item.summary,
            url: item.url,
            sentiment_label: item.overall_sentiment_label,
        }
    }
}

impl AlphaVantageClient {
    pub fn new(config: &AdvisorConfig, api_key: ApiKey) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeouts.news)
            .build()
            .map_err(|e| AdvisorError::Internal(format!("failed to build news client: {e}")))?;

        Ok(Self {
            http,
            base_url: config.endpoints.alpha_vantage.trim_end_matches('/').to_string(),
            api_key,
        })
    }
}

#[async_trait]
impl NewsFeed for AlphaVantageClient {
    async fn news_sentiment(&self, query: &NewsQuery) -> Result<NewsFeedPage> {
        let limit = query.limit.to_string();
        let mut params = vec![
            ("function", "NEWS_SENTIMENT"),
            ("apikey", self.api_key.expose()),
            ("limit", limit.as_str()),
        ];
        if let Some(tickers) = &query.tickers {
            params.push(("tickers", tickers.as_str()));
        }
        if let Some(topics) = &query.topics {
            params.push(("topics", topics.as_str()));
        }

        tracing::debug!(tickers = ?query.tickers, topics = ?query.topics, "Fetching market news");
        let body: AvNewsResponse = self
            .http
            .get(format!("{}/query", self.base_url))
            .query(&params)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;

        Ok(NewsFeedPage {
            articles: body
                .feed
                .unwrap_or_default()
                .into_iter()
                .map(NewsArticle::from)
                .collect(),
            diagnostic: body.information.or(body.note).or(body.error_message),
        })
    }

    fn name(&self) -> &str {
        "Alpha Vantage"
    }
}
