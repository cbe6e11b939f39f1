//! Concrete HTTP requests handed to a transport.

use reqwest::header::{HeaderMap, COOKIE};
use serde::{Deserialize, Serialize};
use std::fmt;

/// HTTP method used by a leaf step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    /// Parameters travel in the query string.
    #[default]
    Get,
    /// Parameters travel in the body.
    Post,
}

impl HttpMethod {
    /// Returns the method name as sent on the wire.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A request body together with its content type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestBody {
    /// The body text.
    pub content: String,
    /// The `Content-Type` header value.
    pub content_type: String,
}

impl RequestBody {
    /// Creates a body with an explicit content type.
    #[must_use]
    pub fn new(content: impl Into<String>, content_type: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            content_type: content_type.into(),
        }
    }

    /// Creates a form-urlencoded body.
    #[must_use]
    pub fn form(encoded: impl Into<String>) -> Self {
        Self::new(encoded, "application/x-www-form-urlencoded")
    }
}

/// A fully built request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    /// The request method.
    pub method: HttpMethod,
    /// The absolute request URL, query string included.
    pub url: String,
    /// Request headers, `Cookie` included.
    pub headers: HeaderMap,
    /// Optional body (POST only).
    pub body: Option<RequestBody>,
}

impl HttpRequest {
    /// Creates a request without headers or body.
    #[must_use]
    pub fn new(method: HttpMethod, url: impl Into<String>) -> Self {
        Self {
            method,
            url: url.into(),
            headers: HeaderMap::new(),
            body: None,
        }
    }

    /// Returns the `Cookie` header, if any and if it is visible ASCII.
    #[must_use]
    pub fn cookie_header(&self) -> Option<&str> {
        self.headers.get(COOKIE).and_then(|v| v.to_str().ok())
    }

    /// Returns the body text, if any.
    #[must_use]
    pub fn body_text(&self) -> Option<&str> {
        self.body.as_ref().map(|b| b.content.as_str())
    }
}
