//! Testing utilities for crawlflow workflows.
//!
//! This module provides:
//! - A scripted transport that replays canned responses
//! - A logger that collects every line
//! - Recording leaf steps and configurable composite steps
//! - A session fixture wiring them together

mod assertions;
mod fixtures;
mod mocks;

pub use assertions::{assert_cookie, assert_journal, assert_logged, assert_no_requests};
pub use fixtures::{TestSession, TEST_BASE_URL};
pub use mocks::{
    CollectingLogger, Journal, RecordingStep, ScriptedReply, ScriptedTransport, SequenceStep,
};
