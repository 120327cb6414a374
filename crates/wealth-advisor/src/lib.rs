//! # wealth-advisor
//!
//! Conversational wealth advisor tools for a private-bank client desk.
//!
//! The agent can call three tools, each backed by an external service:
//!
//! ```text
//! ┌──────────────────────────────┬──────────────────────┬─────────────────────┐
//! │ Tool                         │ Capability           │ Service             │
//! ├──────────────────────────────┼──────────────────────┼─────────────────────┤
//! │ get_user_portfolio_summary   │ Warehouse            │ BigQuery            │
//! │ get_market_news_and_sentiment│ NewsFeed             │ Alpha Vantage       │
//! │ get_citi_perspective         │ DocumentSearch       │ Discovery Engine    │
//! └──────────────────────────────┴──────────────────────┴─────────────────────┘
//! ```
//!
//! Every tool answers with a JSON payload. Failures are reported in-band as
//! `{"error": "...", "details": ...}`; no fault escapes a tool.

pub mod backends;
pub mod config;
pub mod error;
pub mod model;
pub mod news;
pub mod search;
pub mod secrets;
pub mod svckit;
pub mod warehouse;

pub use backends::{BackendStatus, Backends};
pub use config::{AdvisorConfig, ApiKey};
pub use error::{AdvisorError, Result};
pub use model::{Holding, NewsArticle, PerspectiveResult, PerspectiveSnippet, PortfolioSummary};

/// Re-export tools for easy registration
pub mod tools {
    pub use crate::svckit::{CitiPerspectiveTool, MarketNewsTool, PortfolioSummaryTool, names};
}

/// System prompt for the wealth advisor agent
pub const WEALTH_ADVISOR_PROMPT: &str = r#"You are a friendly and professional AI Wealth Advisor for Citi.

## Rules

1. Keep responses concise, clear and easy to understand.
2. Before answering questions about market outlook, recommendations, policies or procedures, you MUST call `get_citi_perspective` to retrieve the official Citi viewpoint.
3. Use `get_user_portfolio_summary` for questions about the user's own portfolio performance or composition. If you do not know the user's client ID, ask for it first. Never guess one.
4. Use `get_market_news_and_sentiment` for questions about external company news or stock market sentiment.
5. Never provide financial advice.
6. On the first turn of every conversation, include this disclaimer: "I am an AI assistant and do not provide financial advice. Information is for educational purposes only; please consult your Citi advisor before making investment decisions."
7. Do not answer questions outside the scope of finance and portfolio management. Politely decline instead.

## Tool Results

Tool results are JSON. A result with an `error` key means the call failed: tell the user plainly what could not be retrieved and do not invent figures."#;


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_names_every_tool() {
        for name in [
            tools::names::PORTFOLIO_SUMMARY,
            tools::names::MARKET_NEWS,
            tools::names::CITI_PERSPECTIVE,
        ] {
            assert!(WEALTH_ADVISOR_PROMPT.contains(name), "{name} missing from prompt");
        }
    }
}
