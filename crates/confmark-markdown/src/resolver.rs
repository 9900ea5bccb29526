//! Collaborator interface for blocking lookups during rendering.
//!
//! The renderer itself performs no I/O. Whenever it needs something from the
//! outside world (a local path for a media item, the title of a linked page)
//! it asks a [`Resolver`]. Calls happen sequentially, in document order.

use std::error::Error;

use confmark_adf::MediaRef;

/// Error returned by a [`Resolver`].
///
/// Resolver failures never abort a conversion: the renderer logs them,
/// records a warning and renders the node as empty.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct ResolveError {
    message: String,
    #[source]
    source: Option<Box<dyn Error + Send + Sync>>,
}

impl ResolveError {
    /// Create an error with a message only.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// Create an error wrapping an underlying cause.
    pub fn with_source(
        message: impl Into<String>,
        source: impl Into<Box<dyn Error + Send + Sync>>,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(source.into()),
        }
    }
}

/// External lookups needed while rendering a document.
pub trait Resolver {
    /// Resolve a media item to a path usable in Markdown (`![alt](path)`).
    ///
    /// Return `Ok(None)` when the media cannot be found; the node is skipped.
    fn resolve_media(&mut self, media: &MediaRef) -> Result<Option<String>, ResolveError>;

    /// Look up a human readable title for a linked URL.
    fn fetch_title(&mut self, url: &str) -> Result<Option<String>, ResolveError>;
}

/// Resolver that knows nothing: media is dropped, titles are derived from URLs.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopResolver;

impl Resolver for NoopResolver {
    fn resolve_media(&mut self, _media: &MediaRef) -> Result<Option<String>, ResolveError> {
        Ok(None)
    }

    fn fetch_title(&mut self, _url: &str) -> Result<Option<String>, ResolveError> {
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_error_source() {
        let io = std::io::Error::other("disk full");
        let err = ResolveError::with_source("failed to save media", io);
        assert_eq!(err.to_string(), "failed to save media");
        assert_eq!(err.source().unwrap().to_string(), "disk full");
        assert!(ResolveError::new("plain").source().is_none());
    }
}
