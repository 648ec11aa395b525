//! The transport seam between the dispatcher and the network.
//!
//! A [`Transport`] moves one [`RawRequest`] to the service and returns the
//! [`RawResponse`], whatever its status. The transport owns connection
//! management and retry-with-backoff; the dispatcher above it never retries.

mod http;

pub use http::{HttpTransport, SDK_VERSION};

use async_trait::async_trait;

use crate::request::HttpMethod;

/// A transport-level failure: the request produced no HTTP response.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct TransportError {
    pub message: String,
    /// Whether the same request could plausibly succeed if resent.
    pub retryable: bool,
}

impl TransportError {
    #[must_use]
    pub fn retryable(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            retryable: true,
        }
    }

    #[must_use]
    pub fn fatal(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            retryable: false,
        }
    }
}

/// A fully rendered request, ready to put on the wire.
#[derive(Debug, Clone)]
pub struct RawRequest {
    pub method: HttpMethod,
    /// Absolute URL including the resolved endpoint and path.
    pub url: String,
    /// Query pairs, unencoded.
    pub query: Vec<(String, String)>,
    pub headers: Vec<(String, String)>,
    pub body: Option<String>,
    pub content_type: Option<&'static str>,
}

/// The response as it came off the wire.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl RawResponse {
    /// Whether the status is in the 2xx range.
    #[must_use]
    pub const fn is_success(&self) -> bool {
        self.status >= 200 && self.status < 300
    }

    /// Looks up a header value, case-insensitively.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

/// Delivers requests to the service.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends the request and returns the response, whatever its status.
    ///
    /// # Errors
    ///
    /// Returns [`TransportError`] only when no HTTP response was obtained.
    async fn dispatch(&self, request: RawRequest) -> Result<RawResponse, TransportError>;
}
