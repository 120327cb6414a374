//! Domain Models
//!
//! Plain data shapes handed back to the model. Vendor payloads are mapped
//! into these before serialization so upstream schema drift stays inside the
//! adapters. Monetary values are `rust_decimal::Decimal` internally and are
//! rendered as JSON numbers.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Maximum holdings reported in a portfolio summary
pub const TOP_HOLDINGS_LIMIT: usize = 3;

/// Maximum articles reported by the news tool
pub const NEWS_ARTICLE_LIMIT: usize = 5;

/// Maximum snippets reported by the perspective tool
pub const PERSPECTIVE_RESULT_LIMIT: usize = 3;

/// One security position in a client portfolio
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Holding {
    pub ticker: String,
    pub security_name: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub market_value: Decimal,
}

impl Holding {
    pub fn new(ticker: impl Into<String>, security_name: impl Into<String>, market_value: Decimal) -> Self {
        Self {
            ticker: ticker.into(),
            security_name: security_name.into(),
            market_value,
        }
    }
}

/// Aggregated holdings as returned by the warehouse, before normalization
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PortfolioSnapshot {
    pub total_market_value: Decimal,
    pub holdings: Vec<Holding>,
}

/// Portfolio tool payload
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortfolioSummary {
    #[serde(with = "rust_decimal::serde::float")]
    pub total_market_value: Decimal,
    /// Largest holdings first, at most [`TOP_HOLDINGS_LIMIT`]
    pub top_holdings: Vec<Holding>,
}

impl From<PortfolioSnapshot> for PortfolioSummary {
    fn from(snapshot: PortfolioSnapshot) -> Self {
        let mut top_holdings = snapshot.holdings;
        // stable: ties keep warehouse order
        top_holdings.sort_by(|a, b| b.market_value.cmp(&a.market_value));
        top_holdings.truncate(TOP_HOLDINGS_LIMIT);

        Self {
            total_market_value: snapshot.total_market_value,
            top_holdings,
        }
    }
}

/// A news article with its provider-assigned sentiment
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewsArticle {
    pub title: Option<String>,
    pub summary: Option<String>,
    pub url: Option<String>,
    pub sentiment_label: Option<String>,
}

/// Perspective tool payload
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PerspectiveResult {
    /// Abstractive summary; takes precedence over raw snippets
    Summary { summary: String },
    Snippets(Vec<PerspectiveSnippet>),
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PerspectiveSnippet {
    pub title: String,
    pub link: String,
    pub snippet: String,
}
