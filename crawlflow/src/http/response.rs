//! Transport responses and the view handed to `after` hooks.

use crate::errors::CrawlError;
use futures::future::{BoxFuture, FutureExt};
use reqwest::header::HeaderMap;
use std::fmt;

/// A response body that has not been read yet.
pub trait BodyStream: Send {
    /// Reads the whole body into memory as text.
    fn read_to_string(self: Box<Self>) -> BoxFuture<'static, Result<String, CrawlError>>;
}

/// An in-memory body, mostly useful for scripted transports.
#[derive(Debug, Clone)]
pub struct BufferedBody(Result<String, String>);

impl BufferedBody {
    /// Creates a body that reads successfully.
    #[must_use]
    pub fn new(text: impl Into<String>) -> Self {
        Self(Ok(text.into()))
    }

    /// Creates a body whose read fails with the given message.
    #[must_use]
    pub fn failing(message: impl Into<String>) -> Self {
        Self(Err(message.into()))
    }
}

impl BodyStream for BufferedBody {
    fn read_to_string(self: Box<Self>) -> BoxFuture<'static, Result<String, CrawlError>> {
        let result = self.0.map_err(CrawlError::Body);
        async move { result }.boxed()
    }
}

/// What a transport returns: status, headers and an unread body.
pub struct TransportResponse {
    /// HTTP status code.
    pub status: u16,
    /// Response headers; repeated `Set-Cookie` entries are preserved.
    pub headers: HeaderMap,
    /// The unread body.
    pub body: Box<dyn BodyStream>,
}

impl TransportResponse {
    /// Creates a transport response.
    #[must_use]
    pub fn new(status: u16, headers: HeaderMap, body: Box<dyn BodyStream>) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// Creates a response with an in-memory body.
    #[must_use]
    pub fn buffered(status: u16, headers: HeaderMap, text: impl Into<String>) -> Self {
        Self::new(status, headers, Box::new(BufferedBody::new(text)))
    }
}

impl fmt::Debug for TransportResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransportResponse")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

/// The outcome of a leaf exchange, as seen by `after` hooks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StepResponse {
    /// The URL that was requested.
    pub url: String,
    /// HTTP status code.
    pub status: u16,
    /// Response headers.
    pub headers: HeaderMap,
    /// The body text; only read when the status counts as success.
    pub body: Option<String>,
}

impl StepResponse {
    /// Returns true for status codes in `[200, 400)`.
    #[must_use]
    pub fn is_success(&self) -> bool {
        is_success_status(self.status)
    }

    /// Returns the body text, or an empty string when it was not read.
    #[must_use]
    pub fn text(&self) -> &str {
        self.body.as_deref().unwrap_or_default()
    }
}

/// Success is any status in the inclusive range `[200, 400)`.
#[must_use]
pub fn is_success_status(status: u16) -> bool {
    (200..400).contains(&status)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_range() {
        assert!(!is_success_status(199));
        assert!(is_success_status(200));
        assert!(is_success_status(302));
        assert!(is_success_status(399));
        assert!(!is_success_status(400));
        assert!(!is_success_status(404));
    }

    #[tokio::test]
    async fn test_buffered_body_reads() {
        let body: Box<dyn BodyStream> = Box::new(BufferedBody::new("hello"));
        assert_eq!(body.read_to_string().await.unwrap(), "hello");
    }

    #[tokio::test]
    async fn test_failing_body() {
        let body: Box<dyn BodyStream> = Box::new(BufferedBody::failing("truncated"));
        let err = body.read_to_string().await.unwrap_err();
        assert!(matches!(err, CrawlError::Body(msg) if msg == "truncated"));
    }

    #[test]
    fn test_step_response_text() {
        let response = StepResponse {
            url: "http://x/".to_string(),
            status: 404,
            headers: HeaderMap::new(),
            body: None,
        };
        assert!(!response.is_success());
        assert_eq!(response.text(), "");
    }
}
