//! Configuration for the HTTP transport.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Configuration for [`super::ReqwestTransport`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransportConfig {
    /// Request timeout in seconds; `None` keeps the client default.
    #[serde(default)]
    pub timeout_seconds: Option<f64>,
    /// User agent string.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Maximum number of redirects to follow.
    #[serde(default = "default_max_redirects")]
    pub max_redirects: usize,
    /// Skip certificate validation (legacy portals with broken chains).
    #[serde(default)]
    pub accept_invalid_certs: bool,
    /// Headers sent with every request.
    #[serde(default)]
    pub headers: HashMap<String, String>,
}

fn default_user_agent() -> String {
    concat!("crawlflow/", env!("CARGO_PKG_VERSION")).to_string()
}

fn default_max_redirects() -> usize {
    10
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: None,
            user_agent: default_user_agent(),
            max_redirects: default_max_redirects(),
            accept_invalid_certs: false,
            headers: HashMap::new(),
        }
    }
}

impl TransportConfig {
    /// Creates a new transport configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the timeout.
    #[must_use]
    pub fn with_timeout(mut self, seconds: f64) -> Self {
        self.timeout_seconds = Some(seconds);
        self
    }

    /// Sets the user agent.
    #[must_use]
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Sets the redirect limit.
    #[must_use]
    pub fn with_max_redirects(mut self, max_redirects: usize) -> Self {
        self.max_redirects = max_redirects;
        self
    }

    /// Accepts invalid TLS certificates.
    #[must_use]
    pub fn with_accept_invalid_certs(mut self, accept: bool) -> Self {
        self.accept_invalid_certs = accept;
        self
    }

    /// Adds a default header.
    #[must_use]
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Gets the timeout as a `Duration`.
    #[must_use]
    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_seconds
            .filter(|s| s.is_finite() && *s > 0.0)
            .map(Duration::from_secs_f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TransportConfig::default();
        assert!(config.timeout().is_none());
        assert_eq!(config.max_redirects, 10);
        assert!(config.user_agent.starts_with("crawlflow/"));
        assert!(!config.accept_invalid_certs);
    }

    #[test]
    fn test_builders() {
        let config = TransportConfig::new()
            .with_timeout(2.5)
            .with_user_agent("agent")
            .with_max_redirects(0)
            .with_header("Accept-Language", "pt-BR");

        assert_eq!(config.timeout(), Some(Duration::from_millis(2500)));
        assert_eq!(config.user_agent, "agent");
        assert_eq!(config.max_redirects, 0);
        assert_eq!(config.headers.get("Accept-Language"), Some(&"pt-BR".to_string()));
    }

    #[test]
    fn test_non_positive_timeout_ignored() {
        assert!(TransportConfig::new().with_timeout(0.0).timeout().is_none());
        assert!(TransportConfig::new().with_timeout(-1.0).timeout().is_none());
    }

    #[test]
    fn test_deserialize_partial() {
        let config: TransportConfig =
            serde_json::from_str(r#"{"timeout_seconds": 5, "accept_invalid_certs": true}"#).unwrap();
        assert_eq!(config.timeout_seconds, Some(5.0));
        assert!(config.accept_invalid_certs);
        assert_eq!(config.max_redirects, 10);
    }
}
