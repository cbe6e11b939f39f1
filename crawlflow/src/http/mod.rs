//! HTTP plumbing for leaf steps.
//!
//! This module provides:
//! - Ordered request parameters with duplicate detection
//! - Request specs that build concrete requests (query string, form or raw body)
//! - Cookie and header propagation between responses and requests
//! - The transport abstraction and its reqwest implementation

mod config;
pub mod cookies;
pub mod headers;
mod parameters;
mod request;
mod reqwest_transport;
mod response;
mod spec;
mod transport;

pub use config::TransportConfig;
pub use cookies::CookieJar;
pub use parameters::Parameters;
pub use reqwest::header::{HeaderMap, HeaderValue};
pub use request::{HttpMethod, HttpRequest, RequestBody};
pub use reqwest_transport::ReqwestTransport;
pub use response::{is_success_status, BodyStream, BufferedBody, StepResponse, TransportResponse};
pub use spec::{RawBody, RequestSpec};
pub use transport::Transport;

#[cfg(test)]
pub use transport::MockTransport;
