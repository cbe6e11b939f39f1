//! Configuration of a workflow run.

use crate::context::Credentials;
use crate::errors::CrawlError;
use crate::http::TransportConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Everything needed to start a workflow run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowConfig {
    /// Base URL used by steps that do not override it.
    pub base_url: String,
    /// Fixed execution identifier; a UUID is generated when absent.
    #[serde(default)]
    pub execution_id: Option<String>,
    /// Credentials stored on the session before the root step runs.
    #[serde(default)]
    pub credentials: Option<Credentials>,
    /// Transport settings.
    #[serde(default)]
    pub transport: TransportConfig,
}

impl WorkflowConfig {
    /// Creates a configuration for the given base URL.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            execution_id: None,
            credentials: None,
            transport: TransportConfig::default(),
        }
    }

    /// Sets the execution identifier.
    #[must_use]
    pub fn with_execution_id(mut self, execution_id: impl Into<String>) -> Self {
        self.execution_id = Some(execution_id.into());
        self
    }

    /// Sets the credentials.
    #[must_use]
    pub fn with_credentials(mut self, login: impl Into<String>, password: impl Into<String>) -> Self {
        self.credentials = Some(Credentials::new(login, password));
        self
    }

    /// Sets the transport configuration.
    #[must_use]
    pub fn with_transport(mut self, transport: TransportConfig) -> Self {
        self.transport = transport;
        self
    }

    /// Parses and validates a JSON configuration.
    ///
    /// # Errors
    ///
    /// Returns `Serialization` for malformed JSON and `Configuration` for
    /// invalid values.
    pub fn from_json_str(json: &str) -> Result<Self, CrawlError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON configuration file.
    ///
    /// # Errors
    ///
    /// Returns `Io` if the file cannot be read, otherwise the same errors
    /// as [`WorkflowConfig::from_json_str`].
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, CrawlError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Checks the configuration for values the engine cannot use.
    ///
    /// # Errors
    ///
    /// Returns `Configuration` if the base URL is not absolute or the login
    /// is empty.
    pub fn validate(&self) -> Result<(), CrawlError> {
        if self.base_url.trim().is_empty() {
            return Err(CrawlError::Configuration("base_url must not be empty".to_string()));
        }
        url::Url::parse(&self.base_url).map_err(|e| {
            CrawlError::Configuration(format!("base_url '{}' is not absolute: {e}", self.base_url))
        })?;
        if let Some(credentials) = &self.credentials {
            if credentials.login.is_empty() {
                return Err(CrawlError::Configuration("login must not be empty".to_string()));
            }
        }
        if let Some(seconds) = self.transport.timeout_seconds {
            if !seconds.is_finite() || seconds < 0.0 {
                return Err(CrawlError::Configuration(format!(
                    "timeout_seconds must be a non-negative number, got {seconds}"
                )));
            }
        }
        Ok(())
    }
}
