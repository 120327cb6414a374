//! Holdings Warehouse
//!
//! Capability consumed by the portfolio summary tool.

mod bigquery;

pub use bigquery::BigQueryWarehouse;

use async_trait::async_trait;

use crate::error::Result;
use crate::model::PortfolioSnapshot;

/// Tabular store holding per-client holdings records
#[async_trait]
pub trait Warehouse: Send + Sync {
    /// Total market value and largest holdings for one client.
    ///
    /// `Ok(None)` means the client has no holdings.
    async fn fetch_portfolio(&self, client_id: &str) -> Result<Option<PortfolioSnapshot>>;

    fn name(&self) -> &str;
}
