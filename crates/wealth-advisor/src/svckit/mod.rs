//! Service Kit - Agent Tools
//!
//! Domain-specific tools that implement `agent_core::Tool` for the wealth
//! advisor. Each tool holds an optional backend; a missing backend turns
//! every call into a "not configured" error result.

mod citi_perspective;
mod market_news;
mod portfolio_summary;

pub use citi_perspective::CitiPerspectiveTool;
pub use market_news::MarketNewsTool;
pub use portfolio_summary::PortfolioSummaryTool;

/// Registered tool names
pub mod names {
    pub use super::citi_perspective::TOOL_NAME as CITI_PERSPECTIVE;
    pub use super::market_news::TOOL_NAME as MARKET_NEWS;
    pub use super::portfolio_summary::TOOL_NAME as PORTFOLIO_SUMMARY;
}
