//! Secret Resolution
//!
//! Resolves the news API key once at startup, from the environment or from
//! Google Secret Manager. Failure never aborts startup: the key is simply
//! left unset and the news tool reports it as not configured.

use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::Deserialize;

use crate::config::{AdvisorConfig, ApiKey};
use crate::error::{AdvisorError, Result};

/// Secret storage capability
#[async_trait]
pub trait SecretStore: Send + Sync {
    /// Latest version of a secret, decoded as UTF-8
    async fn access_latest(&self, project_id: &str, secret_id: &str) -> Result<String>;
}

/// Google Secret Manager over REST
pub struct SecretManagerClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<ApiKey>,
}

#[derive(Deserialize)]
struct AccessSecretVersionResponse {
    payload: SecretPayload,
}

#[derive(Deserialize)]
struct SecretPayload {
    data: String,
}

impl SecretManagerClient {
    pub fn new(config: &AdvisorConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.timeouts.secrets)
            .build()
            .map_err(|e| AdvisorError::Internal(format!("failed to build secrets client: {e}")))?;

        Ok(Self {
            http,
            base_url: config.endpoints.secret_manager.trim_end_matches('/').to_string(),
            token: config.gcp_access_token.clone(),
        })
    }
}

#[async_trait]
impl SecretStore for SecretManagerClient {
    async fn access_latest(&self, project_id: &str, secret_id: &str) -> Result<String> {
        let url = format!(
            "{}/v1/projects/{project_id}/secrets/{secret_id}/versions/latest:access",
            self.base_url
        );

        let mut request = self.http.get(url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token.expose());
        }

        let response: AccessSecretVersionResponse =
            request.send().await?.error_for_status()?.json().await?;

        let bytes = STANDARD
            .decode(response.payload.data.trim())
            .map_err(|e| AdvisorError::Internal(format!("secret payload is not base64: {e}")))?;

        String::from_utf8(bytes)
            .map_err(|e| AdvisorError::Internal(format!("secret payload is not UTF-8: {e}")))
    }
}

/// Resolve the news API key.
///
/// `ALPHA_VANTAGE_API_KEY` wins; otherwise the secret named by
/// `ALPHA_VANTAGE_API_KEY_SECRET` is fetched. A store failure is logged once
/// and yields `None`. Missing configuration only yields `None`; building the
/// news backend reports it.
pub async fn resolve_news_api_key(config: &AdvisorConfig, store: &dyn SecretStore) -> Option<ApiKey> {
    if let Some(key) = &config.news_api_key {
        tracing::info!("Using news API key from environment");
        return Some(key.clone());
    }

    match fetch_news_api_key(config, store).await {
        Ok(Some(key)) => {
            tracing::info!("Fetched news API key from secret store");
            Some(key)
        }
        Ok(None) => {
            tracing::error!("Secret store returned an empty news API key");
            None
        }
        Err(AdvisorError::ConfigurationMissing(reason)) => {
            tracing::debug!(%reason, "News API key secret not configured");
            None
        }
        Err(e) => {
            tracing::error!(error = %e, "Failed to fetch news API key");
            None
        }
    }
}

async fn fetch_news_api_key(config: &AdvisorConfig, store: &dyn SecretStore) -> Result<Option<ApiKey>> {
    let secret_id = config.news_api_key_secret.as_deref().ok_or_else(|| {
        AdvisorError::ConfigurationMissing("ALPHA_VANTAGE_API_KEY_SECRET is not set".into())
    })?;
    let project_id = config
        .project_id
        .as_deref()
        .ok_or_else(|| AdvisorError::ConfigurationMissing("GCP_PROJECT_ID is not set".into()))?;

    let raw = store.access_latest(project_id, secret_id).await?;
    Ok(ApiKey::resolve(Some(raw)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{error_counting_subscriber, level_counting_subscriber};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tracing::instrument::WithSubscriber;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    struct FixedStore {
        value: Result<String>,
        calls: AtomicUsize,
    }

    impl FixedStore {
        fn ok(value: &str) -> Self {
            Self {
                value: Ok(value.into()),
                calls: AtomicUsize::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                value: Err(AdvisorError::UpstreamUnavailable("permission denied".into())),
                calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl SecretStore for FixedStore {
        async fn access_latest(&self, _project_id: &str, _secret_id: &str) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.value {
                Ok(v) => Ok(v.clone()),
                Err(e) => Err(AdvisorError::UpstreamUnavailable(e.to_string())),
            }
        }
    }

    fn secret_config() -> AdvisorConfig {
        AdvisorConfig {
            project_id: Some("wealth-prod".into()),
            news_api_key_secret: Some("alpha-vantage-key".into()),
            ..AdvisorConfig::default()
        }
    }

    #[tokio::test]
    async fn environment_key_takes_precedence() {
        let store = FixedStore::ok("from-secret");
        let config = AdvisorConfig {
            news_api_key: Some(ApiKey::new("from-env")),
            ..secret_config()
        };

        let key = resolve_news_api_key(&config, &store).await.unwrap();
        assert_eq!(key.expose(), "from-env");
        assert_eq!(store.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn falls_back_to_secret_store() {
        let store = FixedStore::ok("from-secret\n");
        let key = resolve_news_api_key(&secret_config(), &store).await.unwrap();
        assert_eq!(key.expose(), "from-secret");
    }

    #[tokio::test]
    async fn store_failure_leaves_key_unset_and_logs_once() {
        let (subscriber, errors) = error_counting_subscriber();
        let store = FixedStore::failing();

        let key = resolve_news_api_key(&secret_config(), &store)
            .with_subscriber(subscriber)
            .await;

        assert!(key.is_none());
        assert_eq!(errors.count(), 1);
    }

    #[tokio::test]
    async fn missing_secret_name_is_not_logged_as_a_fault() {
        let (subscriber, errors, warnings) = level_counting_subscriber();
        let store = FixedStore::ok("unused");
        let config = AdvisorConfig {
            news_api_key_secret: None,
            ..secret_config()
        };

        let key = resolve_news_api_key(&config, &store)
            .with_subscriber(subscriber)
            .await;

        assert!(key.is_none());
        assert_eq!(errors.count(), 0);
        assert_eq!(warnings.count(), 0);
    }

    #[tokio::test]
    async fn missing_secret_name_skips_store() {
        let store = FixedStore::ok("unused");
        let config = AdvisorConfig {
            news_api_key_secret: None,
            ..secret_config()
        };

        assert!(resolve_news_api_key(&config, &store).await.is_none());
        assert_eq!(store.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn secret_manager_decodes_payload() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(
                "/v1/projects/wealth-prod/secrets/alpha-vantage-key/versions/latest:access",
            ))
            .and(header("authorization", "Bearer token-123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "name": "projects/wealth-prod/secrets/alpha-vantage-key/versions/3",
                "payload": { "data": STANDARD.encode("av-key-42") }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let mut config = secret_config();
        config.endpoints.secret_manager = server.uri();
        config.gcp_access_token = Some(ApiKey::new("token-123"));
        let client = SecretManagerClient::new(&config).unwrap();

        let value = client
            .access_latest("wealth-prod", "alpha-vantage-key")
            .await
            .unwrap();
        assert_eq!(value, "av-key-42");
    }

    #[tokio::test]
    async fn secret_manager_maps_denied_access_to_upstream_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(403))
            .mount(&server)
            .await;

        let mut config = secret_config();
        config.endpoints.secret_manager = server.uri();
        let client = SecretManagerClient::new(&config).unwrap();

        let err = client
            .access_latest("wealth-prod", "alpha-vantage-key")
            .await
            .unwrap_err();
        assert!(matches!(err, AdvisorError::UpstreamUnavailable(_)));
    }
}
