//! Portfolio Summary Tool
//!
//! Total market value and largest holdings for one client.

use std::sync::Arc;

use async_trait::async_trait;

use agent_core::{Result as CoreResult, Tool, ToolCall, ToolResult, ToolSchema, tool::ParameterSchema};

use crate::model::PortfolioSummary;
use crate::warehouse::Warehouse;

pub const TOOL_NAME: &str = "get_user_portfolio_summary";

pub struct PortfolioSummaryTool {
    warehouse: Option<Arc<dyn Warehouse>>,
}

impl PortfolioSummaryTool {
    pub fn new(warehouse: Option<Arc<dyn Warehouse>>) -> Self {
        Self { warehouse }
    }

    pub fn is_configured(&self) -> bool {
        self.warehouse.is_some()
    }
}

#[async_trait]
impl Tool for PortfolioSummaryTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: TOOL_NAME.into(),
            description: "Look up a client's portfolio: total market value and the three largest holdings (ticker, security name, market value). Ask the user for their client ID first.".into(),
            parameters: vec![ParameterSchema::string(
                "client_id",
                "The client's identifier, e.g. 'C-1001'",
                true,
            )],
            category: Some("portfolio".into()),
        }
    }

    // argument faults are reported in the result payload
    fn validate(&self, _call: &ToolCall) -> CoreResult<()> {
        Ok(())
    }

    async fn execute(&self, call: &ToolCall) -> CoreResult<ToolResult> {
        let Some(warehouse) = &self.warehouse else {
            return Ok(ToolResult::failure(TOOL_NAME, "client not configured"));
        };
        let Some(client_id) = call.str_arg("client_id") else {
            return Ok(ToolResult::failure(TOOL_NAME, "client_id is required"));
        };
        let client_id = &*client_id;

        match warehouse.fetch_portfolio(client_id).await {
            Ok(Some(snapshot)) => {
                let summary = PortfolioSummary::from(snapshot);
                tracing::debug!(holdings = summary.top_holdings.len(), "Portfolio summary ready");
                Ok(ToolResult::from_payload(TOOL_NAME, &summary))
            }
            Ok(None) => {
                tracing::warn!(client_id, "No portfolio data for client");
                Ok(ToolResult::failure(TOOL_NAME, "no portfolio data found"))
            }
            Err(e) => {
                tracing::error!(
                    client_id,
                    warehouse = warehouse.name(),
                    error = %e,
                    "Portfolio fetch failed"
                );
                Ok(ToolResult::failure(TOOL_NAME, "portfolio fetch failed"))
            }
        }
    }
}
