//! Static header validation and merging.
//!
//! Requests and responses carry a `reqwest::header::HeaderMap`. Steps declare
//! their static headers as plain strings; those are checked and converted
//! here when a request is built.

use crate::errors::CrawlError;
use indexmap::IndexMap;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};

/// Converts a name/value pair into typed header parts.
///
/// # Errors
///
/// Returns a description of the problem if the name is not a valid header
/// token or the value contains forbidden bytes.
pub fn header_pair(name: &str, value: &str) -> Result<(HeaderName, HeaderValue), String> {
    let header_name = HeaderName::from_bytes(name.as_bytes())
        .map_err(|e| format!("invalid header name '{name}': {e}"))?;
    let header_value =
        HeaderValue::from_str(value).map_err(|e| format!("invalid value for header '{name}': {e}"))?;
    Ok((header_name, header_value))
}

/// Merges static headers onto `target`, replacing same-name entries.
///
/// # Errors
///
/// Returns `CrawlError::InvalidRequest` for the first invalid header; the
/// target is left partially merged.
pub fn merge_headers(
    target: &mut HeaderMap,
    headers: &IndexMap<String, String>,
) -> Result<(), CrawlError> {
    for (name, value) in headers {
        let (name, value) = header_pair(name, value).map_err(CrawlError::InvalidRequest)?;
        target.insert(name, value);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use reqwest::header::{REFERER, USER_AGENT};

    #[test]
    fn test_merge_headers_replaces_case_insensitive() {
        let mut target = HeaderMap::new();
        target.append(USER_AGENT, HeaderValue::from_static("old"));
        target.append(USER_AGENT, HeaderValue::from_static("older"));
        target.insert("x-keep", HeaderValue::from_static("1"));

        let mut statics = IndexMap::new();
        statics.insert("user-AGENT".to_string(), "new".to_string());
        statics.insert("Referer".to_string(), "http://x/".to_string());
        merge_headers(&mut target, &statics).unwrap();

        assert_eq!(target.get_all(USER_AGENT).iter().count(), 1);
        assert_eq!(target.get(USER_AGENT).unwrap(), "new");
        assert_eq!(target.get("X-Keep").unwrap(), "1");
        assert_eq!(target.get(REFERER).unwrap(), "http://x/");
        assert_eq!(target.len(), 3);
    }

    #[test]
    fn test_invalid_static_header_is_rejected() {
        let mut statics = IndexMap::new();
        statics.insert("bad header".to_string(), "x".to_string());
        let err = merge_headers(&mut HeaderMap::new(), &statics).unwrap_err();
        assert!(matches!(err, CrawlError::InvalidRequest(msg) if msg.contains("bad header")));

        let mut statics = IndexMap::new();
        statics.insert("X-Line".to_string(), "a\r\nInjected: 1".to_string());
        let err = merge_headers(&mut HeaderMap::new(), &statics).unwrap_err();
        assert!(err.is_configuration());
    }
}
