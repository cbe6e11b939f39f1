//! Transport backed by `reqwest`.

use super::headers::header_pair;
use super::{BodyStream, HttpMethod, HttpRequest, Transport, TransportConfig, TransportResponse};
use crate::errors::CrawlError;
use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt};
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};

/// A [`Transport`] over a shared `reqwest::Client`.
///
/// The client's own cookie store stays off: cookies are owned by the session
/// context's jar. Cloning is cheap and clones share the connection pool.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Creates a transport with the default configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the client cannot be built.
    pub fn new() -> Result<Self, CrawlError> {
        Self::from_config(&TransportConfig::default())
    }

    /// Wraps an existing client.
    #[must_use]
    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Builds a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns `CrawlError::Configuration` for invalid default headers and
    /// `CrawlError::Http` if the client cannot be built.
    pub fn from_config(config: &TransportConfig) -> Result<Self, CrawlError> {
        let mut default_headers = HeaderMap::new();
        for (name, value) in &config.headers {
            let (name, value) = header_pair(name, value).map_err(CrawlError::Configuration)?;
            default_headers.insert(name, value);
        }

        let mut builder = reqwest::Client::builder()
            .user_agent(config.user_agent.clone())
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .danger_accept_invalid_certs(config.accept_invalid_certs)
            .default_headers(default_headers);
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            client: builder.build()?,
        })
    }

    /// Returns the underlying client.
    #[must_use]
    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }
}

#[async_trait]
impl Transport for ReqwestTransport {
    async fn send(&self, request: HttpRequest) -> Result<TransportResponse, CrawlError> {
        let method = match request.method {
            HttpMethod::Get => reqwest::Method::GET,
            HttpMethod::Post => reqwest::Method::POST,
        };

        let mut headers = request.headers;
        let body = match request.body {
            Some(body) => {
                if !headers.contains_key(CONTENT_TYPE) {
                    let content_type = HeaderValue::from_str(&body.content_type).map_err(|e| {
                        CrawlError::InvalidRequest(format!("invalid content type '{}': {e}", body.content_type))
                    })?;
                    headers.insert(CONTENT_TYPE, content_type);
                }
                Some(body.content)
            }
            None => None,
        };

        let mut builder = self.client.request(method, request.url.as_str()).headers(headers);
        if let Some(content) = body {
            builder = builder.body(content);
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let headers = response.headers().clone();

        Ok(TransportResponse::new(
            status,
            headers,
            Box::new(ReqwestBody(response)),
        ))
    }
}

struct ReqwestBody(reqwest::Response);

impl BodyStream for ReqwestBody {
    fn read_to_string(self: Box<Self>) -> BoxFuture<'static, Result<String, CrawlError>> {
        let response = self.0;
        async move {
            response
                .text()
                .await
                .map_err(|e| CrawlError::Body(e.to_string()))
        }
        .boxed()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{CookieJar, RequestSpec};
    use crate::http::cookies::put_cookies_on_request;
    use httpmock::prelude::*;
    use pretty_assertions::assert_eq;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Serves one canned raw HTTP response and returns the server URL.
    async fn serve_raw_once(reply: &'static [u8]) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let mut received = Vec::new();
            let mut buf = [0u8; 1024];
            while !received.windows(4).any(|w| w == b"\r\n\r\n") {
                let n = socket.read(&mut buf).await.unwrap();
                if n == 0 {
                    break;
                }
                received.extend_from_slice(&buf[..n]);
            }
            socket.write_all(reply).await.unwrap();
            socket.shutdown().await.unwrap();
        });
        format!("http://{addr}/")
    }

    #[test]
    fn test_invalid_default_header() {
        let config = TransportConfig::new().with_header("bad header", "x");
        let err = ReqwestTransport::from_config(&config).unwrap_err();
        assert!(matches!(err, CrawlError::Configuration(_)));
    }

    #[tokio::test]
    async fn test_get_with_query_and_cookies() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/search")
                    .query_param("q", "1")
                    .query_param("r", "2")
                    .header("Cookie", "sid=abc;");
                then.status(200)
                    .header("Set-Cookie", "next=1; Path=/")
                    .body("found");
            })
            .await;

        let jar: CookieJar = [("sid", "abc")].into_iter().collect();
        let request = RequestSpec::get()
            .with_parameter("q", "1")
            .and_then(|s| s.with_parameter("r", "2"))
            .unwrap()
            .build(&server.url("/search"), &jar)
            .unwrap();

        let transport = ReqwestTransport::new().unwrap();
        let response = transport.send(request).await.unwrap();

        assert_eq!(response.status, 200);
        assert_eq!(response.headers.get("set-cookie").unwrap(), "next=1; Path=/");
        assert_eq!(response.body.read_to_string().await.unwrap(), "found");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_post_form_body() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/login")
                    .header("Content-Type", "application/x-www-form-urlencoded")
                    .body("user=ana&pass=x+y");
                then.status(302).header("Location", "/home");
            })
            .await;

        let request = RequestSpec::post()
            .with_parameter("user", "ana")
            .and_then(|s| s.with_parameter("pass", "x y"))
            .unwrap()
            .build(&server.url("/login"), &CookieJar::new())
            .unwrap();

        let transport = ReqwestTransport::from_config(&TransportConfig::new().with_max_redirects(0)).unwrap();
        let response = transport.send(request).await.unwrap();

        assert_eq!(response.status, 302);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_connection_refused_is_transport_error() {
        let request = RequestSpec::get()
            .build("http://127.0.0.1:9/", &CookieJar::new())
            .unwrap();
        let transport = ReqwestTransport::new().unwrap();

        let err = transport.send(request).await.unwrap_err();
        assert!(err.is_transport());
    }

    #[tokio::test]
    async fn test_non_utf8_set_cookie_round_trips_byte_exact() {
        let url = serve_raw_once(
            b"HTTP/1.1 200 OK\r\nSet-Cookie: lang=caf\xe9; Path=/\r\nContent-Length: 2\r\nConnection: close\r\n\r\nok",
        )
        .await;
        let request = RequestSpec::get().build(&url, &CookieJar::new()).unwrap();
        let transport = ReqwestTransport::new().unwrap();

        let response = transport.send(request).await.unwrap();

        assert_eq!(
            response.headers.get("set-cookie").unwrap().as_bytes(),
            b"lang=caf\xe9; Path=/"
        );
        let mut jar = CookieJar::new();
        assert_eq!(jar.merge_set_cookies(&response.headers), 1);
        assert_eq!(jar.get_bytes("lang"), Some(&b"caf\xe9"[..]));
        assert_eq!(jar.to_header_bytes(), Some(b"lang=caf\xe9;".to_vec()));

        let mut next = RequestSpec::get().build(&url, &CookieJar::new()).unwrap();
        put_cookies_on_request(&mut next, &jar).unwrap();
        assert_eq!(next.headers.get("cookie").unwrap().as_bytes(), b"lang=caf\xe9;");
    }

    #[tokio::test]
    async fn test_request_headers_sent_as_given() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/api")
                    .header("Content-Type", "application/json")
                    .header("X-Token", "t1");
                then.status(204);
            })
            .await;

        let request = RequestSpec::post()
            .with_header("x-token", "t1")
            .with_header("Content-Type", "application/json")
            .with_raw_body(crate::http::RawBody::text("{}"))
            .build(&server.url("/api"), &CookieJar::new())
            .unwrap();

        let response = ReqwestTransport::new().unwrap().send(request).await.unwrap();

        assert_eq!(response.status, 204);
        mock.assert_async().await;
    }
}
