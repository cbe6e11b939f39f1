//! The logger collaborator consumed by session contexts.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt;

/// Severity of a log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Fine-grained step progress.
    Trace,
    /// Debugging output.
    Debug,
    /// Informational messages.
    Info,
    /// Warnings.
    Warn,
    /// Messages destined for a work queue consumer.
    Queue,
    /// Errors.
    Error,
    /// Unrecoverable errors.
    Fatal,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Queue => "queue",
            Self::Error => "error",
            Self::Fatal => "fatal",
        };
        f.write_str(s)
    }
}

/// Sink for the log lines and errors produced during a workflow run.
///
/// Implementations must not fail; return values are never inspected.
pub trait Logger: Send + Sync {
    /// Logs a message at the given severity.
    fn log_message(&self, level: LogLevel, message: &str);

    /// Logs an error value.
    fn log_exception(&self, error: &dyn Error);
}

/// A logger that forwards to the `tracing` macros.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl TracingLogger {
    /// Creates a new tracing logger.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl Logger for TracingLogger {
    fn log_message(&self, level: LogLevel, message: &str) {
        match level {
            LogLevel::Trace => tracing::trace!("{}", message),
            LogLevel::Debug => tracing::debug!("{}", message),
            LogLevel::Info => tracing::info!("{}", message),
            LogLevel::Warn => tracing::warn!("{}", message),
            LogLevel::Queue => tracing::info!(queue = true, "{}", message),
            LogLevel::Error => tracing::error!("{}", message),
            LogLevel::Fatal => tracing::error!(fatal = true, "{}", message),
        }
    }

    fn log_exception(&self, error: &dyn Error) {
        let mut chain = Vec::new();
        let mut source = error.source();
        while let Some(cause) = source {
            chain.push(cause.to_string());
            source = cause.source();
        }
        tracing::error!(error = %error, causes = ?chain, "Exception");
    }
}
