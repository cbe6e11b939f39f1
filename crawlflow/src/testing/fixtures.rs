//! Test fixtures for workflow testing.

use std::sync::Arc;

use super::{CollectingLogger, ScriptedTransport};
use crate::context::{ResponseBase, SessionContext, WorkflowResponse};

/// Default base URL used by [`TestSession`].
pub const TEST_BASE_URL: &str = "http://crawlflow.test/";

/// A session builder wired to a scripted transport and a collecting logger.
///
/// Keep the fixture around after building a context: its handles observe
/// everything the run sends and logs.
#[derive(Debug, Clone)]
pub struct TestSession {
    /// The scripted transport shared with every context built here.
    pub transport: Arc<ScriptedTransport>,
    /// The logger shared with every context built here.
    pub logger: Arc<CollectingLogger>,
    base_url: String,
    execution_id: Option<String>,
}

impl Default for TestSession {
    fn default() -> Self {
        Self {
            transport: Arc::new(ScriptedTransport::new()),
            logger: Arc::new(CollectingLogger::new()),
            base_url: TEST_BASE_URL.to_string(),
            execution_id: None,
        }
    }
}

impl TestSession {
    /// Creates a new fixture.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the base URL of built contexts.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Sets the execution identifier of built contexts.
    #[must_use]
    pub fn with_execution_id(mut self, execution_id: impl Into<String>) -> Self {
        self.execution_id = Some(execution_id.into());
        self
    }

    /// Returns the base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Builds a context holding a fresh [`ResponseBase`].
    #[must_use]
    pub fn context(&self) -> SessionContext<ResponseBase> {
        self.context_with(ResponseBase::new())
    }

    /// Builds a context holding the given response.
    #[must_use]
    pub fn context_with<R: WorkflowResponse>(&self, response: R) -> SessionContext<R> {
        let mut ctx = SessionContext::with_response(
            Arc::clone(&self.transport) as _,
            Arc::clone(&self.logger) as _,
            response,
        )
        .with_base_url(self.base_url.clone());
        if let Some(id) = &self.execution_id {
            ctx.set_execution_id(id.clone());
        }
        ctx
    }
}
