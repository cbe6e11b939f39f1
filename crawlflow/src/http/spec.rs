//! Declared requests and how they become concrete ones.

use super::cookies::put_cookies_on_request;
use super::headers::merge_headers;
use super::{CookieJar, HttpMethod, HttpRequest, Parameters, RequestBody};
use crate::errors::{CrawlError, DuplicateParameterError};
use indexmap::IndexMap;

/// A raw POST body that replaces form encoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawBody {
    /// Body text.
    pub content: String,
    /// Media type, e.g. `application/json`.
    pub media_type: String,
    /// Charset advertised in the content type.
    pub charset: String,
}

impl RawBody {
    /// Creates a UTF-8 raw body.
    #[must_use]
    pub fn new(content: impl Into<String>, media_type: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            media_type: media_type.into(),
            charset: "utf-8".to_string(),
        }
    }

    /// Creates a `text/plain` body.
    #[must_use]
    pub fn text(content: impl Into<String>) -> Self {
        Self::new(content, "text/plain")
    }

    /// Overrides the advertised charset.
    #[must_use]
    pub fn with_charset(mut self, charset: impl Into<String>) -> Self {
        self.charset = charset.into();
        self
    }

    /// Returns the `Content-Type` header value.
    #[must_use]
    pub fn content_type(&self) -> String {
        format!("{}; charset={}", self.media_type, self.charset)
    }
}

/// Everything a leaf step declares about the request it sends.
///
/// The target URL defaults to the session's base URL. GET sends the
/// parameters as a query string; POST sends them form-encoded unless a raw
/// body was supplied.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestSpec {
    /// The request method.
    pub method: HttpMethod,
    /// Replaces the session base URL when set.
    pub url_override: Option<String>,
    /// Query or form parameters.
    pub parameters: Parameters,
    /// Static headers, replacing same-name headers on the request.
    pub headers: IndexMap<String, String>,
    /// Raw POST body; disables form encoding.
    pub raw_body: Option<RawBody>,
}

impl RequestSpec {
    /// Creates a GET spec against the base URL.
    #[must_use]
    pub fn get() -> Self {
        Self::default()
    }

    /// Creates a POST spec against the base URL.
    #[must_use]
    pub fn post() -> Self {
        Self {
            method: HttpMethod::Post,
            ..Self::default()
        }
    }

    /// Sets the URL override.
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url_override = Some(url.into());
        self
    }

    /// Adds a static header.
    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Adds a parameter.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateParameterError` if the name is already present.
    pub fn with_parameter(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<Self, DuplicateParameterError> {
        self.parameters.add(name, value)?;
        Ok(self)
    }

    /// Adds a parameter in place.
    ///
    /// # Errors
    ///
    /// Returns `DuplicateParameterError` if the name is already present.
    pub fn add_parameter(
        &mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<(), DuplicateParameterError> {
        self.parameters.add(name, value)
    }

    /// Gets a parameter value.
    #[must_use]
    pub fn parameter(&self, name: &str) -> Option<&str> {
        self.parameters.get(name)
    }

    /// Supplies a raw body, switching off form encoding.
    pub fn set_raw_body(&mut self, body: RawBody) {
        self.raw_body = Some(body);
    }

    /// Supplies a raw body.
    #[must_use]
    pub fn with_raw_body(mut self, body: RawBody) -> Self {
        self.raw_body = Some(body);
        self
    }

    /// Returns true for GET requests.
    #[must_use]
    pub fn is_get(&self) -> bool {
        self.method == HttpMethod::Get
    }

    /// Returns true for POST requests.
    #[must_use]
    pub fn is_post(&self) -> bool {
        self.method == HttpMethod::Post
    }

    /// Builds the concrete request.
    ///
    /// Static headers are merged first, then the jar is written into the
    /// `Cookie` header, replacing any previous one.
    ///
    /// # Errors
    ///
    /// Returns `CrawlError::InvalidRequest` if no URL is available, the URL
    /// is not absolute, a static header is not a valid header, or a cookie
    /// cannot be encoded.
    pub fn build(&self, base_url: &str, jar: &CookieJar) -> Result<HttpRequest, CrawlError> {
        let target = self.url_override.as_deref().unwrap_or(base_url);
        if target.is_empty() {
            return Err(CrawlError::InvalidRequest(
                "no URL override and no base URL".to_string(),
            ));
        }
        url::Url::parse(target)
            .map_err(|e| CrawlError::InvalidRequest(format!("invalid URL '{target}': {e}")))?;

        let mut request = match self.method {
            HttpMethod::Get => HttpRequest::new(self.method, self.parameters.append_to_url(target)),
            HttpMethod::Post => {
                let mut request = HttpRequest::new(self.method, target);
                request.body = Some(match &self.raw_body {
                    Some(raw) => RequestBody::new(raw.content.clone(), raw.content_type()),
                    None => RequestBody::form(self.parameters.to_form_urlencoded()),
                });
                request
            }
        };

        merge_headers(&mut request.headers, &self.headers)?;
        put_cookies_on_request(&mut request, jar)?;

        Ok(request)
    }
}
