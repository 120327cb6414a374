//! Advisor Configuration
//!
//! Built once at startup and shared read-only. Tools never read the
//! environment; every backend receives what it needs from [`AdvisorConfig`].

use std::time::Duration;

use secrecy::{ExposeSecret, Secret};

/// Value published when the API key could not be resolved
pub const MISSING_KEY_SENTINEL: &str = "key_not_found";

/// An API key or bearer token
#[derive(Clone, Debug)]
pub struct ApiKey(Secret<String>);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(Secret::new(key.into()))
    }

    /// Treat absent, blank and the missing-key sentinel the same way
    pub fn resolve(raw: Option<String>) -> Option<Self> {
        raw.map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty() && k != MISSING_KEY_SENTINEL)
            .map(Self::new)
    }

    pub fn expose(&self) -> &str {
        self.0.expose_secret()
    }
}

/// Base URLs of the external services
#[derive(Clone, Debug)]
pub struct Endpoints {
    pub bigquery: String,
    pub discovery_engine: String,
    pub alpha_vantage: String,
    pub secret_manager: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            bigquery: "https://bigquery.googleapis.com".into(),
            discovery_engine: "https://discoveryengine.googleapis.com".into(),
            alpha_vantage: "https://www.alphavantage.co".into(),
            secret_manager: "https://secretmanager.googleapis.com".into(),
        }
    }
}

/// Per-backend request timeouts
#[derive(Clone, Debug)]
pub struct Timeouts {
    pub warehouse: Duration,
    pub search: Duration,
    pub news: Duration,
    pub secrets: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            warehouse: Duration::from_secs(30),
            search: Duration::from_secs(30),
            news: Duration::from_secs(15),
            secrets: Duration::from_secs(10),
        }
    }
}

#[derive(Clone, Debug)]
pub struct AdvisorConfig {
    /// `GCP_PROJECT_ID`
    pub project_id: Option<String>,

    /// `DATASET_ID` - warehouse dataset holding the `holdings` table
    pub dataset_id: Option<String>,

    /// `DATA_STORE_ID`
    pub data_store_id: Option<String>,

    /// `DATA_STORE_LOCATION`, defaults to `global`
    pub data_store_location: String,

    /// `ALPHA_VANTAGE_API_KEY`
    pub news_api_key: Option<ApiKey>,

    /// `ALPHA_VANTAGE_API_KEY_SECRET` - secret holding the news API key
    pub news_api_key_secret: Option<String>,

    /// `GCP_ACCESS_TOKEN` - OAuth bearer token for Google APIs
    pub gcp_access_token: Option<ApiKey>,

    pub endpoints: Endpoints,

    pub timeouts: Timeouts,
}

impl Default for AdvisorConfig {
    fn default() -> Self {
        Self {
            project_id: None,
            dataset_id: None,
            data_store_id: None,
            data_store_location: "global".into(),
            news_api_key: None,
            news_api_key_secret: None,
            gcp_access_token: None,
            endpoints: Endpoints::default(),
            timeouts: Timeouts::default(),
        }
    }
}

impl AdvisorConfig {
    /// Read configuration from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary lookup. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let secs = |key: &str, default: Duration| {
            get(key)
                .and_then(|v| v.parse().ok())
                .map_or(default, Duration::from_secs)
        };

        let defaults = Self::default();
        let endpoints = Endpoints {
            bigquery: get("BIGQUERY_BASE_URL").unwrap_or(defaults.endpoints.bigquery),
            discovery_engine: get("DISCOVERY_ENGINE_BASE_URL")
                .unwrap_or(defaults.endpoints.discovery_engine),
            alpha_vantage: get("ALPHA_VANTAGE_BASE_URL").unwrap_or(defaults.endpoints.alpha_vantage),
            secret_manager: get("SECRET_MANAGER_BASE_URL")
                .unwrap_or(defaults.endpoints.secret_manager),
        };
        let timeouts = Timeouts {
            warehouse: secs("WAREHOUSE_TIMEOUT_SECS", defaults.timeouts.warehouse),
            search: secs("SEARCH_TIMEOUT_SECS", defaults.timeouts.search),
            news: secs("NEWS_TIMEOUT_SECS", defaults.timeouts.news),
            secrets: secs("SECRETS_TIMEOUT_SECS", defaults.timeouts.secrets),
        };

        Self {
            project_id: get("GCP_PROJECT_ID"),
            dataset_id: get("DATASET_ID"),
            data_store_id: get("DATA_STORE_ID"),
            data_store_location: get("DATA_STORE_LOCATION").unwrap_or(defaults.data_store_location),
            news_api_key: ApiKey::resolve(get("ALPHA_VANTAGE_API_KEY")),
            news_api_key_secret: get("ALPHA_VANTAGE_API_KEY_SECRET"),
            gcp_access_token: ApiKey::resolve(get("GCP_ACCESS_TOKEN")),
            endpoints,
            timeouts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn defaults_when_environment_is_empty() {
        let config = AdvisorConfig::from_lookup(lookup(&[]));

        assert!(config.project_id.is_none());
        assert!(config.news_api_key.is_none());
        assert_eq!(config.data_store_location, "global");
        assert_eq!(config.timeouts.news, Duration::from_secs(15));
        assert_eq!(config.endpoints.alpha_vantage, "https://www.alphavantage.co");
    }

    #[test]
    fn reads_identifiers_and_overrides() {
        let config = AdvisorConfig::from_lookup(lookup(&[
            ("GCP_PROJECT_ID", "wealth-prod"),
            ("DATASET_ID", "advisory"),
            ("DATA_STORE_ID", "citi-perspectives"),
            ("DATA_STORE_LOCATION", "us"),
            ("ALPHA_VANTAGE_API_KEY", "demo"),
            ("NEWS_TIMEOUT_SECS", "5"),
            ("BIGQUERY_BASE_URL", "http://localhost:9050"),
        ]));

        assert_eq!(config.project_id.as_deref(), Some("wealth-prod"));
        assert_eq!(config.dataset_id.as_deref(), Some("advisory"));
        assert_eq!(config.data_store_id.as_deref(), Some("citi-perspectives"));
        assert_eq!(config.data_store_location, "us");
        assert_eq!(config.news_api_key.as_ref().map(ApiKey::expose), Some("demo"));
        assert_eq!(config.timeouts.news, Duration::from_secs(5));
        assert_eq!(config.endpoints.bigquery, "http://localhost:9050");
    }

    #[test]
    fn blank_values_count_as_unset() {
        let config = AdvisorConfig::from_lookup(lookup(&[
            ("GCP_PROJECT_ID", "  "),
            ("DATA_STORE_LOCATION", ""),
            ("NEWS_TIMEOUT_SECS", "soon"),
        ]));

        assert!(config.project_id.is_none());
        assert_eq!(config.data_store_location, "global");
        assert_eq!(config.timeouts.news, Duration::from_secs(15));
    }

    #[test]
    fn missing_key_sentinel_is_treated_as_absent() {
        assert!(ApiKey::resolve(Some(MISSING_KEY_SENTINEL.into())).is_none());
        assert!(ApiKey::resolve(Some(String::new())).is_none());
        assert!(ApiKey::resolve(None).is_none());
        assert_eq!(ApiKey::resolve(Some(" abc ".into())).unwrap().expose(), "abc");
    }

    #[test]
    fn api_key_is_redacted_in_debug_output() {
        let key = ApiKey::new("super-secret");
        assert!(!format!("{key:?}").contains("super-secret"));
    }
}
