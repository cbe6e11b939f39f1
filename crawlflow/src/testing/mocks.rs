//! Mock collaborators and steps for testing.

use async_trait::async_trait;
use parking_lot::Mutex;
use reqwest::header::SET_COOKIE;
use std::collections::VecDeque;
use std::error::Error;
use std::sync::Arc;

use crate::context::{ResponseBase, SessionContext};
use crate::errors::CrawlError;
use crate::http::{
    BufferedBody, HeaderMap, HeaderValue, HttpRequest, RequestSpec, StepResponse, Transport,
    TransportResponse,
};
use crate::observability::{LogLevel, Logger};
use crate::steps::{merge_cookies, Step, StepDescriptor, StepList};

/// A canned transport reply.
#[derive(Debug, Clone)]
pub enum ScriptedReply {
    /// A response with an in-memory body.
    Response {
        /// Status code.
        status: u16,
        /// Response headers.
        headers: HeaderMap,
        /// Body returned when read.
        body: BufferedBody,
    },
    /// A transport failure.
    Error(String),
}

/// A transport that replays scripted replies in order and records requests.
///
/// Once the script runs out every request gets an empty `200`.
#[derive(Debug, Default)]
pub struct ScriptedTransport {
    replies: Mutex<VecDeque<ScriptedReply>>,
    requests: Mutex<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    /// Creates a transport with an empty script.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a reply.
    pub fn push(&self, reply: ScriptedReply) -> &Self {
        self.replies.lock().push_back(reply);
        self
    }

    /// Queues a response.
    pub fn push_response(&self, status: u16, headers: HeaderMap, body: impl Into<String>) -> &Self {
        self.push(ScriptedReply::Response {
            status,
            headers,
            body: BufferedBody::new(body),
        })
    }

    /// Queues an empty response with the given status.
    pub fn push_status(&self, status: u16) -> &Self {
        self.push_response(status, HeaderMap::new(), "")
    }

    /// Queues a `200` response carrying `Set-Cookie` headers.
    pub fn push_set_cookies(&self, cookies: &[&'static str]) -> &Self {
        let mut headers = HeaderMap::new();
        for cookie in cookies {
            headers.append(SET_COOKIE, HeaderValue::from_static(*cookie));
        }
        self.push_response(200, headers, "")
    }

    /// Queues a transport failure.
    pub fn push_error(&self, message: impl Into<String>) -> &Self {
        self.push(ScriptedReply::Error(message.into()))
    }

    /// Queues a response whose body cannot be read.
    pub fn push_body_failure(&self, status: u16, message: impl Into<String>) -> &Self {
        self.push(ScriptedReply::Response {
            status,
            headers: HeaderMap::new(),
            body: BufferedBody::failing(message),
        })
    }

    /// Returns every request sent so far.
    #[must_use]
    pub fn requests(&self) -> Vec<HttpRequest> {
        self.requests.lock().clone()
    }

    /// Returns the number of requests sent.
    #[must_use]
    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }

    /// Returns the most recent request.
    #[must_use]
    pub fn last_request(&self) -> Option<HttpRequest> {
        self.requests.lock().last().cloned()
    }

    /// Returns the URLs requested, in order.
    #[must_use]
    pub fn urls(&self) -> Vec<String> {
        self.requests.lock().iter().map(|r| r.url.clone()).collect()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: HttpRequest) -> Result<TransportResponse, CrawlError> {
        self.requests.lock().push(request);
        let reply = self.replies.lock().pop_front();

        match reply {
            Some(ScriptedReply::Response {
                status,
                headers,
                body,
            }) => Ok(TransportResponse::new(status, headers, Box::new(body))),
            Some(ScriptedReply::Error(message)) => Err(CrawlError::Transport(message)),
            None => Ok(TransportResponse::buffered(200, HeaderMap::new(), "")),
        }
    }
}

/// A logger that keeps every line in memory.
#[derive(Debug, Default)]
pub struct CollectingLogger {
    messages: Mutex<Vec<(LogLevel, String)>>,
    exceptions: Mutex<Vec<String>>,
}

impl CollectingLogger {
    /// Creates an empty logger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns every logged message.
    #[must_use]
    pub fn messages(&self) -> Vec<(LogLevel, String)> {
        self.messages.lock().clone()
    }

    /// Returns the messages logged at `level`.
    #[must_use]
    pub fn messages_at(&self, level: LogLevel) -> Vec<String> {
        self.messages
            .lock()
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, m)| m.clone())
            .collect()
    }

    /// Returns the display form of every logged error.
    #[must_use]
    pub fn exceptions(&self) -> Vec<String> {
        self.exceptions.lock().clone()
    }

    /// Returns true if any message contains `needle`.
    #[must_use]
    pub fn contains(&self, needle: &str) -> bool {
        self.messages.lock().iter().any(|(_, m)| m.contains(needle))
    }

    /// Clears everything collected.
    pub fn clear(&self) {
        self.messages.lock().clear();
        self.exceptions.lock().clear();
    }
}

impl Logger for CollectingLogger {
    fn log_message(&self, level: LogLevel, message: &str) {
        self.messages.lock().push((level, message.to_string()));
    }

    fn log_exception(&self, error: &dyn Error) {
        self.exceptions.lock().push(error.to_string());
    }
}

/// A shared, ordered record of which steps ran.
#[derive(Debug, Clone, Default)]
pub struct Journal(Arc<Mutex<Vec<String>>>);

impl Journal {
    /// Creates an empty journal.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends an entry.
    pub fn record(&self, entry: impl Into<String>) {
        self.0.lock().push(entry.into());
    }

    /// Returns all entries in order.
    #[must_use]
    pub fn entries(&self) -> Vec<String> {
        self.0.lock().clone()
    }

    /// Returns the number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.lock().len()
    }

    /// Returns true if nothing was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.lock().is_empty()
    }
}

/// A leaf step that records itself in a journal when it runs.
#[derive(Debug, Clone)]
pub struct RecordingStep {
    label: String,
    journal: Journal,
    spec: RequestSpec,
    pre_condition: bool,
    post_condition: bool,
    finish_after: bool,
    statuses: Option<Arc<Mutex<Vec<u16>>>>,
}

impl RecordingStep {
    /// Creates a GET leaf that records `label`.
    #[must_use]
    pub fn new(label: impl Into<String>, journal: &Journal) -> Self {
        Self {
            label: label.into(),
            journal: journal.clone(),
            spec: RequestSpec::get(),
            pre_condition: true,
            post_condition: true,
            finish_after: false,
            statuses: None,
        }
    }

    /// Uses the given request spec.
    #[must_use]
    pub fn with_request(mut self, spec: RequestSpec) -> Self {
        self.spec = spec;
        self
    }

    /// Makes the pre-condition fail.
    #[must_use]
    pub fn skipped(mut self) -> Self {
        self.pre_condition = false;
        self
    }

    /// Makes the post-condition fail.
    #[must_use]
    pub fn failing_post_condition(mut self) -> Self {
        self.post_condition = false;
        self
    }

    /// Finishes the response in `after`.
    #[must_use]
    pub fn finishing(mut self) -> Self {
        self.finish_after = true;
        self
    }

    /// Records every status code seen in `after` into `statuses`.
    #[must_use]
    pub fn recording_statuses(mut self, statuses: Arc<Mutex<Vec<u16>>>) -> Self {
        self.statuses = Some(statuses);
        self
    }
}

impl Step<ResponseBase> for RecordingStep {
    fn name(&self) -> &str {
        &self.label
    }

    fn pre_condition(&self, _ctx: &SessionContext<ResponseBase>) -> bool {
        self.pre_condition
    }

    fn post_condition(&self, _ctx: &SessionContext<ResponseBase>) -> bool {
        self.post_condition
    }

    fn request(&self) -> RequestSpec {
        self.spec.clone()
    }

    fn before(
        &mut self,
        _ctx: &mut SessionContext<ResponseBase>,
        _request: &mut RequestSpec,
    ) -> Result<(), CrawlError> {
        self.journal.record(&self.label);
        Ok(())
    }

    fn after(
        &mut self,
        ctx: &mut SessionContext<ResponseBase>,
        response: &StepResponse,
    ) -> Result<(), CrawlError> {
        merge_cookies(ctx, response);
        if let Some(statuses) = &self.statuses {
            statuses.lock().push(response.status);
        }
        if self.finish_after {
            ctx.response_mut().finish();
        }
        Ok(())
    }
}

type ChildFactory = Arc<dyn Fn() -> Box<dyn Step<ResponseBase>> + Send + Sync>;

/// A composite step whose children are fixed at construction.
#[derive(Clone)]
pub struct SequenceStep {
    label: String,
    children: Vec<(String, ChildFactory)>,
    pre_condition: bool,
    post_condition: bool,
}

impl SequenceStep {
    /// Creates an empty sequence. Without children it behaves as a leaf.
    #[must_use]
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            children: Vec::new(),
            pre_condition: true,
            post_condition: true,
        }
    }

    /// Appends a child; each run gets a fresh clone of it.
    #[must_use]
    pub fn child<S>(mut self, step: S) -> Self
    where
        S: Step<ResponseBase> + Clone + Sync + 'static,
    {
        let name = step.name().to_string();
        let factory: ChildFactory =
            Arc::new(move || Box::new(step.clone()) as Box<dyn Step<ResponseBase>>);
        self.children.push((name, factory));
        self
    }

    /// Makes the pre-condition fail.
    #[must_use]
    pub fn skipped(mut self) -> Self {
        self.pre_condition = false;
        self
    }

    /// Makes the post-condition fail.
    #[must_use]
    pub fn failing_post_condition(mut self) -> Self {
        self.post_condition = false;
        self
    }
}

impl std::fmt::Debug for SequenceStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SequenceStep")
            .field("label", &self.label)
            .field(
                "children",
                &self.children.iter().map(|(n, _)| n.as_str()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

impl Step<ResponseBase> for SequenceStep {
    fn name(&self) -> &str {
        &self.label
    }

    fn steps(&self, steps: &mut StepList<ResponseBase>) {
        for (name, factory) in &self.children {
            let factory = Arc::clone(factory);
            steps.push(StepDescriptor::new(name.clone(), move || Ok(factory())));
        }
    }

    fn pre_condition(&self, _ctx: &SessionContext<ResponseBase>) -> bool {
        self.pre_condition
    }

    fn post_condition(&self, _ctx: &SessionContext<ResponseBase>) -> bool {
        self.post_condition
    }
}
