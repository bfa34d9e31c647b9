//! Seams between the reconciliation loop and the remote event service.

use super::page::{EventPage, PageSize};
use async_trait::async_trait;

#[derive(Debug)]
pub enum TransportError {
    /// Connection, TLS, timeout or body decoding failure.
    Http(reqwest::Error),
    /// The endpoint answered with a non-success HTTP status.
    Status(reqwest::StatusCode),
    /// The router answered but reported a failure or an unexpected envelope.
    Router(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        TransportError::Http(err)
    }
}

impl std::fmt::Display for TransportError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TransportError::Http(e) if e.is_timeout() => write!(f, "request timed out: {}", e),
            TransportError::Http(e) => write!(f, "HTTP error: {}", e),
            TransportError::Status(status) => write!(f, "server returned status {}", status),
            TransportError::Router(msg) => write!(f, "router error: {}", msg),
        }
    }
}

impl std::error::Error for TransportError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TransportError::Http(e) => Some(e),
            _ => None,
        }
    }
}

/// Fetches pages of open events matching the run's filter.
#[async_trait]
pub trait EventSource: Send + Sync {
    /// Fetch up to `page_size` events starting at `offset`.
    ///
    /// The page is returned verbatim; no retry is attempted on failure.
    async fn fetch(&self, offset: u64, page_size: PageSize) -> Result<EventPage, TransportError>;
}

/// Closes events by id. The call is all-or-nothing.
#[async_trait]
pub trait EventCloser: Send + Sync {
    async fn close(&self, event_ids: &[String]) -> Result<(), TransportError>;
}
