//! Error types for Confluence integration.

/// Error from Confluence API operations.
#[derive(Debug, thiserror::Error)]
pub enum ConfluenceError {
    /// HTTP request failed (network error, timeout, etc).
    #[error("HTTP request failed: {0}")]
    HttpRequest(#[from] ureq::Error),

    /// HTTP response error (server returned error status).
    #[error("HTTP error: {status} - {body}")]
    HttpResponse {
        /// HTTP status code.
        status: u16,
        /// Response body (may contain error details).
        body: String,
    },

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ConfluenceError {
    /// HTTP status of an error response, if the server answered.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::HttpResponse { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Whether repeating the request may succeed.
    pub(crate) fn is_retryable(&self) -> bool {
        match self {
            Self::HttpRequest(_) => true,
            Self::HttpResponse { status, .. } => *status == 429 || *status >= 500,
            Self::Io(_) | Self::Json(_) => false,
        }
    }
}
