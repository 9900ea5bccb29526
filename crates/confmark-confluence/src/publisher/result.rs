//! Result types for publish operations.

use std::path::PathBuf;

/// Result of a successful publish.
#[derive(Debug)]
pub struct PublishResult {
    pub page_id: String,
    pub title: String,
    /// Web URL of the page.
    pub url: String,
    /// Page version after publishing.
    pub version: u32,
    /// Whether a new page was created (otherwise an existing one was updated).
    pub created: bool,
    /// Attachment names uploaded.
    pub uploaded: Vec<String>,
    /// Attachment names already present with the same size.
    pub skipped: Vec<String>,
    /// Image references that could not be found on disk.
    pub missing_images: Vec<String>,
}

/// Result of a dry-run publish (nothing sent to Confluence).
#[derive(Debug)]
pub struct DryRunResult {
    pub title: String,
    /// Page id from the document header, if any.
    pub page_id: Option<String>,
    /// Storage markup that would be sent.
    pub markup: String,
    /// Local images that would be uploaded.
    pub images: Vec<PathBuf>,
    /// Image references that could not be found on disk.
    pub missing_images: Vec<String>,
}
