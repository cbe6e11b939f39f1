//! The transport collaborator.

use super::{HttpRequest, TransportResponse};
use crate::errors::CrawlError;
use async_trait::async_trait;

/// Sends requests and hands back responses with unread bodies.
///
/// Implementations must be safe to share between independent workflow runs.
/// The engine never retries and never imposes its own timeout.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends a request and waits for the status line and headers.
    async fn send(&self, request: HttpRequest) -> Result<TransportResponse, CrawlError>;
}
