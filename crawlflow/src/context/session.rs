//! The mutable session context of one workflow run.

use super::{Credentials, WorkflowResponse, WorkflowSignal};
use crate::http::{CookieJar, Transport};
use crate::observability::{LogLevel, Logger};
use std::any::Any;
use std::error::Error;
use std::sync::Arc;
use uuid::Uuid;

/// Marker stored as the last step when a login is set.
pub const START_STEP: &str = "start";

/// Generates a fresh execution identifier.
#[must_use]
pub fn generate_execution_id() -> String {
    Uuid::new_v4().to_string()
}

/// Shared, mutable state for one workflow run.
///
/// Holds the cookie jar, the transport and logger handles, the optional
/// credentials, an arbitrary request object and exactly one response of type
/// `R`. Every step receives the same context by `&mut` reference.
///
/// The transport handle belongs to the caller: disposing the context clears
/// the jar but never shuts the transport down, so it can serve further runs.
pub struct SessionContext<R: WorkflowResponse> {
    execution_id: String,
    base_url: String,
    last_step: Option<String>,
    credentials: Option<Credentials>,
    cookies: CookieJar,
    logger: Arc<dyn Logger>,
    transport: Arc<dyn Transport>,
    request: Option<Box<dyn Any + Send + Sync>>,
    response: R,
    disposed: bool,
}

impl<R: WorkflowResponse + Default> SessionContext<R> {
    /// Creates a context holding a default response.
    #[must_use]
    pub fn new(transport: Arc<dyn Transport>, logger: Arc<dyn Logger>) -> Self {
        Self::with_response(transport, logger, R::default())
    }
}

impl<R: WorkflowResponse> SessionContext<R> {
    /// Creates a context holding the given response.
    #[must_use]
    pub fn with_response(transport: Arc<dyn Transport>, logger: Arc<dyn Logger>, response: R) -> Self {
        Self {
            execution_id: generate_execution_id(),
            base_url: String::new(),
            last_step: None,
            credentials: None,
            cookies: CookieJar::new(),
            logger,
            transport,
            request: None,
            response,
            disposed: false,
        }
    }

    /// Sets the base URL.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Returns the execution identifier.
    #[must_use]
    pub fn execution_id(&self) -> &str {
        &self.execution_id
    }

    /// Overrides the execution identifier.
    ///
    /// An empty value is ignored so the generated identifier survives.
    pub fn set_execution_id(&mut self, execution_id: impl Into<String>) {
        let execution_id = execution_id.into();
        if execution_id.is_empty() {
            return;
        }
        self.execution_id = execution_id;
    }

    /// Returns the base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Sets the base URL.
    pub fn set_base_url(&mut self, base_url: impl Into<String>) {
        self.base_url = base_url.into();
    }

    /// Returns the name of the last step entered.
    #[must_use]
    pub fn last_step(&self) -> Option<&str> {
        self.last_step.as_deref()
    }

    /// Records the name of the step being entered.
    pub fn set_last_step(&mut self, name: impl Into<String>) {
        self.last_step = Some(name.into());
    }

    /// Returns the credentials, if set.
    #[must_use]
    pub fn credentials(&self) -> Option<&Credentials> {
        self.credentials.as_ref()
    }

    /// Stores the credentials and resets the last step to [`START_STEP`].
    pub fn set_login(&mut self, login: impl Into<String>, password: impl Into<String>) {
        self.last_step = Some(START_STEP.to_string());
        self.credentials = Some(Credentials::new(login, password));
    }

    /// Returns the cookie jar.
    #[must_use]
    pub fn cookies(&self) -> &CookieJar {
        &self.cookies
    }

    /// Returns the cookie jar for mutation.
    pub fn cookies_mut(&mut self) -> &mut CookieJar {
        &mut self.cookies
    }

    /// Returns the logger handle.
    #[must_use]
    pub fn logger(&self) -> &Arc<dyn Logger> {
        &self.logger
    }

    /// Returns the transport handle.
    #[must_use]
    pub fn transport(&self) -> &Arc<dyn Transport> {
        &self.transport
    }

    /// Returns the request object if it has type `T`.
    #[must_use]
    pub fn request<T: Any>(&self) -> Option<&T> {
        self.request.as_deref()?.downcast_ref::<T>()
    }

    /// Returns the request object for mutation if it has type `T`.
    pub fn request_mut<T: Any>(&mut self) -> Option<&mut T> {
        self.request.as_deref_mut()?.downcast_mut::<T>()
    }

    /// Stores the request object, replacing any previous one.
    pub fn set_request<T: Any + Send + Sync>(&mut self, request: T) {
        self.request = Some(Box::new(request));
    }

    /// Returns the current response.
    #[must_use]
    pub fn response(&self) -> &R {
        &self.response
    }

    /// Returns the current response for mutation.
    pub fn response_mut(&mut self) -> &mut R {
        &mut self.response
    }

    /// Replaces the current response, returning the old one.
    pub fn set_response(&mut self, response: R) -> R {
        std::mem::replace(&mut self.response, response)
    }

    /// Returns the completion signal of the current response.
    #[must_use]
    pub fn signal(&self) -> WorkflowSignal {
        self.response.signal()
    }

    /// Returns true once the current response is finished.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.response.is_finished()
    }

    fn prefixed(&self, message: &str) -> String {
        format!("Id: '{}' - {}", self.execution_id, message)
    }

    /// Logs a trace line prefixed with the execution identifier.
    pub fn log_trace(&self, message: &str) {
        self.logger.log_message(LogLevel::Trace, &self.prefixed(message));
    }

    /// Logs an info line prefixed with the execution identifier.
    pub fn log_info(&self, message: &str) {
        self.logger.log_message(LogLevel::Info, &self.prefixed(message));
    }

    /// Logs `message` at info and at trace level, then forwards `error`.
    ///
    /// Downstream log consumers rely on both lines being present.
    pub fn log_error(&self, error: &dyn Error, message: &str) {
        self.log_info(message);
        self.log_trace(message);
        self.logger.log_exception(error);
    }

    /// Clears the cookie jar and drops the request object.
    ///
    /// Idempotent. The transport handle is left alone.
    pub fn dispose(&mut self) {
        if self.disposed {
            return;
        }
        self.cookies.clear();
        self.request = None;
        self.disposed = true;
        tracing::debug!(execution_id = %self.execution_id, "Session context disposed");
    }

    /// Returns true once [`SessionContext::dispose`] has run.
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Disposes the context and hands back the final response.
    #[must_use]
    pub fn into_response(mut self) -> R {
        self.dispose();
        self.response
    }
}

impl<R: WorkflowResponse + std::fmt::Debug> std::fmt::Debug for SessionContext<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionContext")
            .field("execution_id", &self.execution_id)
            .field("base_url", &self.base_url)
            .field("last_step", &self.last_step)
            .field("credentials", &self.credentials)
            .field("cookies", &self.cookies)
            .field("response", &self.response)
            .field("disposed", &self.disposed)
            .finish_non_exhaustive()
    }
}
