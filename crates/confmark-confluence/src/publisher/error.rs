//! Error types for publish operations.

use std::path::PathBuf;

use crate::error::ConfluenceError;

/// Error during publishing.
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    /// Markdown file could not be read.
    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Confluence API error.
    #[error("Confluence API error: {0}")]
    Confluence(#[from] ConfluenceError),

    /// IO error (reading images).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
