//! The response contract and the completion signal.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Whether the engine should keep walking the step tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WorkflowSignal {
    /// Remaining steps may run.
    Continue,
    /// The workflow is finished; no further step runs.
    Stop,
}

impl WorkflowSignal {
    /// Returns true for [`WorkflowSignal::Stop`].
    #[must_use]
    pub fn is_stop(self) -> bool {
        matches!(self, Self::Stop)
    }
}

/// The object a workflow run accumulates its result into.
///
/// Only the response itself may become finished, through its own API. The
/// engine reads the flag and never writes it.
pub trait WorkflowResponse: Send + 'static {
    /// Returns true once the workflow should stop.
    fn is_finished(&self) -> bool;

    /// Returns the signal derived from [`WorkflowResponse::is_finished`].
    fn signal(&self) -> WorkflowSignal {
        if self.is_finished() {
            WorkflowSignal::Stop
        } else {
            WorkflowSignal::Continue
        }
    }
}

/// A ready-made response carrying a free-form detail message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponseBase {
    /// Free-form detail about the outcome.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(skip)]
    finished: bool,
}

impl ResponseBase {
    /// Creates an unfinished response.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the response as finished. There is no way back.
    pub fn finish(&mut self) {
        self.finished = true;
    }

    /// Sets the detail and marks the response as finished.
    pub fn finish_with(&mut self, detail: impl Into<String>) {
        self.detail = Some(detail.into());
        self.finish();
    }

    /// Sets the detail message.
    pub fn set_detail(&mut self, detail: impl Into<String>) {
        self.detail = Some(detail.into());
    }
}

impl WorkflowResponse for ResponseBase {
    fn is_finished(&self) -> bool {
        self.finished
    }
}

impl fmt::Display for ResponseBase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let json = serde_json::to_string(self).map_err(|_| fmt::Error)?;
        f.write_str(&json)
    }
}
