//! Error types for document parsing.

/// Error while reading an ADF document.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum AdfError {
    /// The document body is not valid JSON or does not have a node shape.
    #[error("invalid ADF document")]
    Json(#[from] serde_json::Error),
}
