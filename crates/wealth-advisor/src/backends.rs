//! Backend wiring
//!
//! Builds the HTTP adapters from [`AdvisorConfig`] and registers the three
//! tools. A backend that cannot be built is left out; its tool is still
//! registered and answers with a "not configured" error.

use std::sync::Arc;

use serde::Serialize;

use agent_core::ToolRegistry;

use crate::config::{AdvisorConfig, ApiKey};
use crate::error::{AdvisorError, Result};
use crate::news::{AlphaVantageClient, NewsFeed};
use crate::search::{DiscoveryEngineClient, DocumentSearch};
use crate::secrets::{SecretManagerClient, resolve_news_api_key};
use crate::svckit::{CitiPerspectiveTool, MarketNewsTool, PortfolioSummaryTool};
use crate::warehouse::{BigQueryWarehouse, Warehouse};

#[derive(Clone, Default)]
pub struct Backends {
    pub warehouse: Option<Arc<dyn Warehouse>>,
    pub news: Option<Arc<dyn NewsFeed>>,
    pub search: Option<Arc<dyn DocumentSearch>>,
}

/// Which tools have a live backend
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct BackendStatus {
    pub portfolio: bool,
    pub news: bool,
    pub perspective: bool,
}

fn build<T>(backend: &str, built: Result<T>) -> Option<T> {
    match built {
        Ok(client) => {
            tracing::info!(backend, "Backend ready");
            Some(client)
        }
        Err(AdvisorError::ConfigurationMissing(reason)) => {
            tracing::warn!(backend, %reason, "Backend not configured");
            None
        }
        Err(e) => {
            tracing::error!(backend, error = %e, "Failed to initialize backend");
            None
        }
    }
}

impl Backends {
    /// Build every backend the configuration allows.
    ///
    /// `news_api_key` is the key resolved by
    /// [`resolve_news_api_key`](crate::secrets::resolve_news_api_key).
    pub fn from_config(config: &AdvisorConfig, news_api_key: Option<ApiKey>) -> Self {
        let warehouse = build("warehouse", BigQueryWarehouse::new(config))
            .map(|w| Arc::new(w) as Arc<dyn Warehouse>);

        let news_client = news_api_key.map_or_else(
            || {
                Err(AdvisorError::ConfigurationMissing(
                    "news API key is not available".into(),
                ))
            },
            |key| AlphaVantageClient::new(config, key),
        );
        let news = build("news", news_client).map(|n| Arc::new(n) as Arc<dyn NewsFeed>);

        let search = build("search", DiscoveryEngineClient::new(config))
            .map(|s| Arc::new(s) as Arc<dyn DocumentSearch>);

        Self {
            warehouse,
            news,
            search,
        }
    }

    /// Resolve the news API key through Secret Manager, then build every
    /// backend. Never fails; missing pieces are logged and left out.
    pub async fn connect(config: &AdvisorConfig) -> Self {
        let news_api_key = match SecretManagerClient::new(config) {
            Ok(store) => resolve_news_api_key(config, &store).await,
            Err(e) => {
                tracing::error!(error = %e, "Failed to initialize secret store");
                config.news_api_key.clone()
            }
        };

        Self::from_config(config, news_api_key)
    }

    pub const fn status(&self) -> BackendStatus {
        BackendStatus {
            portfolio: self.warehouse.is_some(),
            news: self.news.is_some(),
            perspective: self.search.is_some(),
        }
    }

    /// Register all three tools, configured or not
    pub fn register_tools(&self, registry: &mut ToolRegistry) {
        registry.register(PortfolioSummaryTool::new(self.warehouse.clone()));
        registry.register(MarketNewsTool::new(self.news.clone()));
        registry.register(CitiPerspectiveTool::new(self.search.clone()));
    }

    pub fn tool_registry(&self) -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        self.register_tools(&mut registry);
        registry
    }
}
