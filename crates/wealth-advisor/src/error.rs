//! Error Types for the Wealth Advisor backends

use thiserror::Error;

pub type Result<T> = std::result::Result<T, AdvisorError>;

/// Backend fault taxonomy.
///
/// None of these cross the tool boundary; each tool maps them to an
/// `{"error": ..}` payload.
#[derive(Error, Debug)]
pub enum AdvisorError {
    /// A required identifier or key is absent. No network call was made.
    #[error("Configuration missing: {0}")]
    ConfigurationMissing(String),

    /// Transport fault, timeout or non-success status from a dependency
    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// The dependency answered but had no matching data
    #[error("Not found: {0}")]
    NotFound(String),

    /// Unexpected fault while shaping a response
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<reqwest::Error> for AdvisorError {
    fn from(err: reqwest::Error) -> Self {
        // request URLs may carry API keys
        let err = err.without_url();
        if err.is_timeout() {
            Self::UpstreamUnavailable(format!("request timed out: {err}"))
        } else if err.is_decode() {
            Self::Internal(format!("malformed upstream response: {err}"))
        } else {
            Self::UpstreamUnavailable(err.to_string())
        }
    }
}

impl From<serde_json::Error> for AdvisorError {
    fn from(err: serde_json::Error) -> Self {
        Self::Internal(format!("JSON error: {err}"))
    }
}
