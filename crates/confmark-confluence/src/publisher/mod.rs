//! Publishing Markdown files as Confluence pages.
//!
//! [`PagePublisher`] runs the whole workflow for one file:
//!
//! 1. Split the document header from the body
//! 2. Convert the body to storage format
//! 3. Locate referenced images on disk
//! 4. Create the page, or update the existing one
//! 5. Upload images that are not attached yet
//!
//! # Example
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use std::path::Path;
//! use std::time::Duration;
//! use confmark_confluence::ConfluenceClient;
//! use confmark_confluence::publisher::{PagePublisher, PublishConfig};
//!
//! let client = ConfluenceClient::new(
//!     "https://acme.atlassian.net",
//!     "alice@example.com",
//!     "api-token",
//!     Duration::from_secs(30),
//! );
//! let config = PublishConfig {
//!     space_key: "ENG".to_owned(),
//!     parent: None,
//!     update: true,
//! };
//! // Preview without touching Confluence
//! let preview = PagePublisher::dry_run(Path::new("docs/Release_Plan.md"))?;
//!
//! // Create or update the page
//! let publisher = PagePublisher::new(&client, config);
//! let result = publisher.publish(Path::new("docs/Release_Plan.md"), Some("Sync from git"))?;
//! # Ok(())
//! # }
//! ```

mod error;
mod executor;
mod images;
mod result;

pub use error::PublishError;
pub use executor::PagePublisher;
pub use result::{DryRunResult, PublishResult};

/// Parent page for newly created pages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ParentPage {
    Id(String),
    Title(String),
}

/// Configuration for publishing Markdown files.
#[derive(Debug, Clone)]
pub struct PublishConfig {
    /// Space that receives new pages and title lookups.
    pub space_key: String,
    /// Parent for new pages; pages go to the space root when `None`.
    pub parent: Option<ParentPage>,
    /// Update an existing page (by header page id, then title) instead of
    /// always creating a new one.
    pub update: bool,
}
