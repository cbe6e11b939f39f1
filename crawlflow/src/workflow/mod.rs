//! Running whole workflows.
//!
//! This module provides:
//! - `WorkflowConfig`, loadable from JSON
//! - `WorkflowRunner`, which builds a session, runs a root step and hands
//!   back the final response

mod config;
mod runner;

pub use config::WorkflowConfig;
pub use runner::WorkflowRunner;
