//! Logging and timing utilities.
//!
//! The engine talks to a [`Logger`] collaborator; [`TracingLogger`] forwards
//! everything to the `tracing` ecosystem.

mod logger;
mod subscriber;

pub use logger::{LogLevel, Logger, TracingLogger};
pub use subscriber::{init_tracing, SpanTimer};
