//! Error types for the crawlflow engine.
//!
//! Configuration mistakes surface at the call that caused them, transport
//! failures propagate unchanged through every composite level, and HTTP
//! status failures are never errors at all (steps inspect them instead).

use thiserror::Error;

/// The main error type for crawlflow operations.
#[derive(Debug, Error)]
pub enum CrawlError {
    /// A parameter was added twice to the same parameter map.
    #[error("{0}")]
    DuplicateParameter(#[from] DuplicateParameterError),

    /// A child step could not be constructed from its descriptor.
    #[error("{0}")]
    StepConstruction(#[from] StepConstructionError),

    /// The request could not be assembled (bad URL, bad header, ...).
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Invalid configuration value.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The transport failed to deliver the request.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Error raised by the underlying HTTP client.
    #[error("HTTP client error: {0}")]
    Http(#[from] reqwest::Error),

    /// The response body could not be read.
    #[error("Failed to read response body: {0}")]
    Body(String),

    /// A leaf step failed while exchanging with the remote service.
    #[error("Step '{step}' failed: {source}")]
    Step {
        /// Name of the failing step.
        step: String,
        /// The underlying error.
        #[source]
        source: Box<CrawlError>,
    },

    /// Serialization/deserialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl CrawlError {
    /// Wraps an error with the name of the step it escaped from.
    #[must_use]
    pub fn in_step(step: impl Into<String>, source: Self) -> Self {
        Self::Step {
            step: step.into(),
            source: Box::new(source),
        }
    }

    /// Returns the innermost error, skipping step wrappers.
    #[must_use]
    pub fn root_cause(&self) -> &Self {
        match self {
            Self::Step { source, .. } => source.root_cause(),
            other => other,
        }
    }

    /// Returns the name of the step that failed, if known.
    #[must_use]
    pub fn step_name(&self) -> Option<&str> {
        match self {
            Self::Step { step, .. } => Some(step),
            _ => None,
        }
    }

    /// Returns true if the network or the response stream misbehaved.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(
            self.root_cause(),
            Self::Transport(_) | Self::Http(_) | Self::Body(_)
        )
    }

    /// Returns true if the error comes from a misconfigured workflow.
    #[must_use]
    pub fn is_configuration(&self) -> bool {
        matches!(
            self.root_cause(),
            Self::DuplicateParameter(_)
                | Self::StepConstruction(_)
                | Self::InvalidRequest(_)
                | Self::Configuration(_)
        )
    }
}

/// Error raised when a parameter name is inserted twice.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Duplicate parameter: '{name}' has already been added")]
pub struct DuplicateParameterError {
    /// The conflicting parameter name.
    pub name: String,
}

impl DuplicateParameterError {
    /// Creates a new duplicate parameter error.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

/// Error raised when a step descriptor cannot produce its step.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Cannot construct step '{step}': {reason}")]
pub struct StepConstructionError {
    /// The step name from the descriptor.
    pub step: String,
    /// Why construction failed.
    pub reason: String,
}

impl StepConstructionError {
    /// Creates a new step construction error.
    #[must_use]
    pub fn new(step: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            step: step.into(),
            reason: reason.into(),
        }
    }

    /// Creates an error for a step name missing from a registry.
    #[must_use]
    pub fn unknown(step: impl Into<String>) -> Self {
        Self::new(step, "no constructor registered under this name")
    }
}
