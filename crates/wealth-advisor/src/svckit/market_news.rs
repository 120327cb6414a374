//! Market News & Sentiment Tool

use std::sync::Arc;

use async_trait::async_trait;

use agent_core::{Result as CoreResult, Tool, ToolCall, ToolResult, ToolSchema, tool::ParameterSchema};

use crate::model::NEWS_ARTICLE_LIMIT;
use crate::news::{NewsFeed, NewsQuery};

pub const TOOL_NAME: &str = "get_market_news_and_sentiment";

pub struct MarketNewsTool {
    feed: Option<Arc<dyn NewsFeed>>,
}

impl MarketNewsTool {
    /// `feed` is `None` when no news API key could be resolved
    pub fn new(feed: Option<Arc<dyn NewsFeed>>) -> Self {
        Self { feed }
    }

    pub fn is_configured(&self) -> bool {
        self.feed.is_some()
    }
}

/// Normalize a comma-delimited argument: trim entries, drop blanks, recase.
fn normalize_list(raw: Option<&str>, recase: fn(&str) -> String) -> Option<String> {
    let joined = raw?
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(recase)
        .collect::<Vec<_>>()
        .join(",");

    (!joined.is_empty()).then_some(joined)
}

#[async_trait]
impl Tool for MarketNewsTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: TOOL_NAME.into(),
            description: "Recent external market news with sentiment labels for tickers and/or topics. Returns up to five articles (title, summary, url, sentiment_label). Provide at least one of tickers or topics.".into(),
            parameters: vec![
                ParameterSchema::string("tickers", "Comma-separated ticker symbols, e.g. 'AAPL,MSFT'", false),
                ParameterSchema::string(
                    "topics",
                    "Comma-separated topics, e.g. 'technology,earnings,economy_monetary'",
                    false,
                ),
            ],
            category: Some("market_data".into()),
        }
    }

    async fn execute(&self, call: &ToolCall) -> CoreResult<ToolResult> {
        let tickers = normalize_list(call.str_arg("tickers").as_deref(), str::to_uppercase);
        let topics = normalize_list(call.str_arg("topics").as_deref(), str::to_lowercase);

        if tickers.is_none() && topics.is_none() {
            return Ok(ToolResult::failure(TOOL_NAME, "at least one ticker or topic required"));
        }
        let Some(feed) = &self.feed else {
            return Ok(ToolResult::failure(TOOL_NAME, "API key not configured"));
        };

        let query = NewsQuery {
            tickers,
            topics,
            limit: NEWS_ARTICLE_LIMIT,
        };

        let page = match feed.news_sentiment(&query).await {
            Ok(page) => page,
            Err(e) => {
                tracing::error!(feed = feed.name(), error = %e, "Market news request failed");
                return Ok(ToolResult::failure(TOOL_NAME, "failed to retrieve news").with_details(e.to_string()));
            }
        };

        if page.articles.is_empty() {
            tracing::warn!(
                tickers = ?query.tickers,
                topics = ?query.topics,
                diagnostic = ?page.diagnostic,
                "No market news found"
            );
            let result = ToolResult::failure(TOOL_NAME, "no news found");
            return Ok(match page.diagnostic {
                Some(diagnostic) => result.with_details(diagnostic),
                None => result,
            });
        }

        let mut articles = page.articles;
        articles.truncate(NEWS_ARTICLE_LIMIT);
        Ok(ToolResult::from_payload(TOOL_NAME, &articles))
    }
}
