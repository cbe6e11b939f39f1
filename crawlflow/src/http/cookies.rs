//! Cookie propagation between responses and requests.
//!
//! Only `name=value` pairs travel: attributes such as `Path`, `Domain` or
//! `Expires` are dropped when a `Set-Cookie` header is read, and the jar is
//! sent back as a single `Cookie` header of the form `a=1;b=2;`.
//!
//! Values are kept as raw bytes, so a value that is not UTF-8 goes back to
//! the server exactly as it arrived.

use super::HttpRequest;
use crate::errors::CrawlError;
use indexmap::IndexMap;
use reqwest::header::{HeaderMap, HeaderValue, COOKIE, SET_COOKIE};

/// The cookie jar of a workflow run.
///
/// Keys are unique and the last write wins.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CookieJar {
    cookies: IndexMap<String, Vec<u8>>,
}

impl CookieJar {
    /// Creates an empty jar.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores a cookie, returning the previous value.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Vec<u8>>) -> Option<Vec<u8>> {
        self.cookies.insert(name.into(), value.into())
    }

    /// Gets a cookie value as text.
    ///
    /// Returns `None` if the cookie is missing or its value is not UTF-8.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.get_bytes(name).and_then(|v| std::str::from_utf8(v).ok())
    }

    /// Gets the raw bytes of a cookie value.
    #[must_use]
    pub fn get_bytes(&self, name: &str) -> Option<&[u8]> {
        self.cookies.get(name).map(Vec::as_slice)
    }

    /// Removes a cookie.
    pub fn remove(&mut self, name: &str) -> Option<Vec<u8>> {
        self.cookies.shift_remove(name)
    }

    /// Returns the number of cookies.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cookies.len()
    }

    /// Returns true if the jar is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cookies.is_empty()
    }

    /// Removes every cookie.
    pub fn clear(&mut self) {
        self.cookies.clear();
    }

    /// Iterates over cookies.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[u8])> {
        self.cookies.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Merges every `Set-Cookie` value from `headers` into the jar.
    ///
    /// Returns the number of cookies written.
    pub fn merge_set_cookies(&mut self, headers: &HeaderMap) -> usize {
        let extracted = extract_cookies(headers);
        let count = extracted.len();
        self.cookies.extend(extracted);
        count
    }

    /// Serializes the jar as the raw bytes of a `Cookie` header.
    ///
    /// Returns `None` for an empty jar.
    #[must_use]
    pub fn to_header_bytes(&self) -> Option<Vec<u8>> {
        if self.cookies.is_empty() {
            return None;
        }
        let mut bytes = Vec::new();
        for (name, value) in &self.cookies {
            bytes.extend_from_slice(name.as_bytes());
            bytes.push(b'=');
            bytes.extend_from_slice(value);
            bytes.push(b';');
        }
        Some(bytes)
    }

    /// Serializes the jar as a `Cookie` header value.
    ///
    /// Returns `Ok(None)` for an empty jar.
    ///
    /// # Errors
    ///
    /// Returns `CrawlError::InvalidRequest` if a stored cookie contains bytes
    /// a header cannot carry (control characters).
    pub fn to_header_value(&self) -> Result<Option<HeaderValue>, CrawlError> {
        self.to_header_bytes()
            .map(|bytes| {
                HeaderValue::from_bytes(&bytes)
                    .map_err(|e| CrawlError::InvalidRequest(format!("invalid cookie value: {e}")))
            })
            .transpose()
    }
}

impl<N: Into<String>, V: Into<Vec<u8>>> FromIterator<(N, V)> for CookieJar {
    fn from_iter<I: IntoIterator<Item = (N, V)>>(iter: I) -> Self {
        Self {
            cookies: iter.into_iter().map(|(n, v)| (n.into(), v.into())).collect(),
        }
    }
}

fn trim_whitespace(bytes: &[u8]) -> &[u8] {
    let start = bytes
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(bytes.len());
    let end = bytes
        .iter()
        .rposition(|b| !b.is_ascii_whitespace())
        .map_or(start, |i| i + 1);
    &bytes[start..end]
}

/// Parses the `name=value` pair at the front of a `Set-Cookie` value.
///
/// Only the first `=` separates name from value, so padded values such as
/// `token=YWJj==` keep their trailing `=` signs. Name and value are trimmed
/// of surrounding whitespace. Returns `None` when the pair is empty, has no
/// `=`, or the name is not UTF-8.
#[must_use]
pub fn parse_set_cookie(header: &[u8]) -> Option<(String, Vec<u8>)> {
    let pair = header.split(|b| *b == b';').next().unwrap_or_default();
    let pair = trim_whitespace(pair);
    if pair.is_empty() {
        return None;
    }
    let separator = pair.iter().position(|b| *b == b'=')?;
    let name = std::str::from_utf8(trim_whitespace(&pair[..separator])).ok()?;
    if name.is_empty() {
        return None;
    }
    Some((name.to_string(), trim_whitespace(&pair[separator + 1..]).to_vec()))
}

/// Extracts every cookie set by a response; later headers win.
#[must_use]
pub fn extract_cookies(headers: &HeaderMap) -> IndexMap<String, Vec<u8>> {
    let mut result = IndexMap::new();
    for (name, value) in headers
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| parse_set_cookie(v.as_bytes()))
    {
        result.insert(name, value);
    }
    result
}

/// Looks up a single cookie set by a response.
///
/// Returns `None` if the cookie is absent or its value is not UTF-8.
#[must_use]
pub fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|v| parse_set_cookie(v.as_bytes()))
        .find(|(n, _)| n == name)
        .and_then(|(_, v)| String::from_utf8(v).ok())
}

/// Writes the jar into the request's `Cookie` header.
///
/// Any existing `Cookie` header is replaced. An empty jar leaves the request
/// untouched.
///
/// # Errors
///
/// Returns `CrawlError::InvalidRequest` if the jar cannot be encoded as a
/// header value.
pub fn put_cookies_on_request(request: &mut HttpRequest, jar: &CookieJar) -> Result<(), CrawlError> {
    if let Some(value) = jar.to_header_value()? {
        request.headers.insert(COOKIE, value);
    }
    Ok(())
}

/// Copies the cookies a response set straight onto a request.
///
/// # Errors
///
/// Same as [`put_cookies_on_request`].
pub fn copy_cookies_from_response(request: &mut HttpRequest, headers: &HeaderMap) -> Result<(), CrawlError> {
    let jar: CookieJar = extract_cookies(headers).into_iter().collect();
    put_cookies_on_request(request, &jar)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::HttpMethod;
    use pretty_assertions::assert_eq;
    use reqwest::header::CONTENT_TYPE;

    fn set_cookies(values: &[&'static str]) -> HeaderMap {
        let mut headers = HeaderMap::new();
        for value in values {
            headers.append(SET_COOKIE, HeaderValue::from_static(*value));
        }
        headers
    }

    fn pair(name: &str, value: &[u8]) -> Option<(String, Vec<u8>)> {
        Some((name.to_string(), value.to_vec()))
    }

    #[test]
    fn test_parse_set_cookie() {
        assert_eq!(parse_set_cookie(b"sid=abc; Path=/; HttpOnly"), pair("sid", b"abc"));
        assert_eq!(parse_set_cookie(b" sid = abc ;Path=/"), pair("sid", b"abc"));
        assert_eq!(parse_set_cookie(b"empty="), pair("empty", b""));
        assert_eq!(parse_set_cookie(b"; Path=/"), None);
        assert_eq!(parse_set_cookie(b"novalue"), None);
        assert_eq!(parse_set_cookie(b"=orphan"), None);
        assert_eq!(parse_set_cookie(b"\xff=1"), None);
    }

    #[test]
    fn test_padded_value_keeps_equals_signs() {
        // Stripping every `=` would corrupt base64 padding, so only the first
        // `=` is treated as the separator.
        assert_eq!(parse_set_cookie(b"token=YWJj=="), pair("token", b"YWJj=="));
        assert_eq!(parse_set_cookie(b"q=a=b; Path=/"), pair("q", b"a=b"));
    }

    #[test]
    fn test_non_utf8_value_kept_verbatim() {
        let mut headers = HeaderMap::new();
        headers.append(SET_COOKIE, HeaderValue::from_bytes(b"lang=caf\xe9; Path=/").unwrap());
        let mut jar = CookieJar::new();

        jar.merge_set_cookies(&headers);

        assert_eq!(jar.get_bytes("lang"), Some(&b"caf\xe9"[..]));
        assert_eq!(jar.get("lang"), None);
        assert_eq!(jar.to_header_bytes(), Some(b"lang=caf\xe9;".to_vec()));
        assert_eq!(
            jar.to_header_value().unwrap().unwrap().as_bytes(),
            b"lang=caf\xe9;"
        );
    }

    #[test]
    fn test_merge_is_idempotent_per_name() {
        let mut jar = CookieJar::new();
        jar.merge_set_cookies(&set_cookies(&["a=1"]));
        jar.merge_set_cookies(&set_cookies(&["a=1"]));
        assert_eq!(jar.len(), 1);
        assert_eq!(jar.get("a"), Some("1"));

        jar.merge_set_cookies(&set_cookies(&["a=2; Path=/"]));
        assert_eq!(jar.len(), 1);
        assert_eq!(jar.get("a"), Some("2"));
    }

    #[test]
    fn test_later_header_wins_within_response() {
        let cookies = extract_cookies(&set_cookies(&["a=1", "b=2", "a=3"]));
        assert_eq!(cookies.len(), 2);
        assert_eq!(cookies.get("a").map(Vec::as_slice), Some(&b"3"[..]));
    }

    #[test]
    fn test_merge_ignores_other_headers() {
        let mut headers = set_cookies(&["a=1"]);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("text/html"));
        let mut jar = CookieJar::new();

        assert_eq!(jar.merge_set_cookies(&headers), 1);
        assert_eq!(jar.merge_set_cookies(&HeaderMap::new()), 0);
        assert_eq!(jar.len(), 1);
    }

    #[test]
    fn test_header_value_format() {
        let jar: CookieJar = [("a", "1"), ("b", "2")].into_iter().collect();
        assert_eq!(jar.to_header_bytes(), Some(b"a=1;b=2;".to_vec()));
        assert_eq!(jar.to_header_value().unwrap().unwrap(), "a=1;b=2;");
        assert_eq!(CookieJar::new().to_header_bytes(), None);
        assert!(CookieJar::new().to_header_value().unwrap().is_none());
    }

    #[test]
    fn test_control_characters_rejected() {
        let jar: CookieJar = [("a", "1\r\nX: y")].into_iter().collect();
        assert!(matches!(jar.to_header_value(), Err(CrawlError::InvalidRequest(_))));
    }

    #[test]
    fn test_put_cookies_replaces_existing_header() {
        let mut request = HttpRequest::new(HttpMethod::Get, "http://x/");
        request.headers.append(COOKIE, HeaderValue::from_static("stale=1;"));
        request.headers.append(COOKIE, HeaderValue::from_static("older=1;"));
        let jar: CookieJar = [("sid", "abc")].into_iter().collect();

        put_cookies_on_request(&mut request, &jar).unwrap();

        let values: Vec<_> = request.headers.get_all(COOKIE).iter().collect();
        assert_eq!(values, vec!["sid=abc;"]);
    }

    #[test]
    fn test_empty_jar_keeps_request() {
        let mut request = HttpRequest::new(HttpMethod::Get, "http://x/");
        request.headers.insert(COOKIE, HeaderValue::from_static("manual=1;"));
        put_cookies_on_request(&mut request, &CookieJar::new()).unwrap();
        assert_eq!(request.cookie_header(), Some("manual=1;"));
    }

    #[test]
    fn test_cookie_value_lookup() {
        let headers = set_cookies(&["a=1; Path=/", "b=2"]);
        assert_eq!(cookie_value(&headers, "b"), Some("2".to_string()));
        assert_eq!(cookie_value(&headers, "c"), None);
    }

    #[test]
    fn test_copy_cookies_from_response() {
        let mut request = HttpRequest::new(HttpMethod::Get, "http://x/");
        copy_cookies_from_response(&mut request, &set_cookies(&["a=1; Secure", "b=2"])).unwrap();
        assert_eq!(request.cookie_header(), Some("a=1;b=2;"));
    }
}
