//! Remote backend configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration shared by the HTTP providers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Base URL of the provider service
    pub base_url: String,
    /// Bearer token, if the service requires one
    pub api_key: Option<String>,
    /// Model identifier passed to the generation endpoint
    pub model: Option<String>,
    /// Transport-level timeout in milliseconds
    pub timeout_ms: u64,
}

impl RemoteConfig {
    /// Create a configuration for a base URL
    #[inline]
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: None,
            model: None,
            timeout_ms: 30_000,
        }
    }

    /// With bearer token
    #[inline]
    #[must_use]
    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    /// With model identifier
    #[inline]
    #[must_use]
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Transport timeout as a [`Duration`]
    #[inline]
    #[must_use]
    pub fn transport_timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Endpoint URL for a path
    #[inline]
    #[must_use]
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

/// Errors building a remote backend
#[derive(Debug, thiserror::Error)]
pub enum RemoteError {
    /// The underlying HTTP client could not be constructed
    #[error("failed to build HTTP client: {0}")]
    ClientBuild(#[from] reqwest::Error),
}

/// Build the shared HTTP client for a configuration
///
/// # Errors
/// Returns [`RemoteError::ClientBuild`] if the client cannot be constructed.
pub(crate) fn build_client(config: &RemoteConfig) -> Result<reqwest::Client, RemoteError> {
    Ok(reqwest::Client::builder()
        .timeout(config.transport_timeout())
        .build()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endpoint_joins_paths() {
        let config = RemoteConfig::new("https://kb.example.com/");
        assert_eq!(config.endpoint("/search"), "https://kb.example.com/search");
        assert_eq!(config.endpoint("generate"), "https://kb.example.com/generate");
    }

    #[test]
    fn builder_methods() {
        let config = RemoteConfig::new("https://kb.example.com")
            .with_api_key("secret")
            .with_model("outline-large");

        assert_eq!(config.api_key.as_deref(), Some("secret"));
        assert_eq!(config.model.as_deref(), Some("outline-large"));
        assert_eq!(config.transport_timeout(), Duration::from_secs(30));
    }
}
