//! Upstream catalog client error types.

use std::sync::Arc;

/// Errors from the upstream catalog service.
///
/// Every variant carries the URL that was requested so the message can be
/// surfaced to callers as-is.
#[derive(Debug, Clone, thiserror::Error)]
pub enum UpstreamError {
    /// The request URL could not be built.
    #[error("invalid upstream URL: {0}")]
    InvalidUrl(String),

    /// Transport failure (DNS, connect, reset, body read).
    #[error("error fetching data from {url}: {source}")]
    Network { url: String, source: Arc<reqwest::Error> },

    /// The single attempt exceeded the configured timeout.
    #[error("error fetching data from {url}: request timed out")]
    Timeout { url: String },

    /// Upstream reported that the resource does not exist.
    #[error("error fetching data from {url}: not found")]
    NotFound { url: String },

    /// Upstream answered with a non-success status other than 404.
    #[error("error fetching data from {url}: status {status}")]
    BadStatus { url: String, status: u16 },

    /// The body was not the JSON shape we expected.
    #[error("error fetching data from {url}: malformed body: {reason}")]
    MalformedBody { url: String, reason: String },
}

impl UpstreamError {
    pub(crate) fn from_reqwest(url: &str, err: reqwest::Error) -> Self {
        if err.is_timeout() {
            UpstreamError::Timeout { url: url.to_string() }
        } else {
            UpstreamError::Network { url: url.to_string(), source: Arc::new(err) }
        }
    }

    /// Whether upstream reported absence.
    pub fn is_not_found(&self) -> bool {
        matches!(self, UpstreamError::NotFound { .. })
    }
}
