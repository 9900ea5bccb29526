//! Confluence Cloud integration for confmark.
//!
//! - [`ConfluenceClient`]: REST API client with Basic authentication
//! - [`PageExporter`]: pages (or whole spaces) to Markdown files
//! - [`PagePublisher`](publisher::PagePublisher): Markdown files to pages
//! - [`ConfluenceResolver`]: media downloads and link titles during rendering
//!
//! # API Client
//!
//! ```no_run
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! use std::time::Duration;
//! use confmark_confluence::ConfluenceClient;
//!
//! let client = ConfluenceClient::new(
//!     "https://acme.atlassian.net",
//!     "alice@example.com",
//!     "api-token",
//!     Duration::from_secs(30),
//! );
//!
//! let page = client.get_page("123456", &["version"])?;
//! println!("{} (version {})", page.title, page.version.number);
//! # Ok(())
//! # }
//! ```

// API client
mod client;
pub use client::ConfluenceClient;

// Types (exposed through client results)
pub mod types;

// Markdown export
mod exporter;
pub use exporter::{ExportError, ExportOptions, ExportResult, ExportSummary, PageExporter};

// Markdown publishing
pub mod publisher;

mod naming;
pub use naming::{ROOT_FOLDER, hierarchy_path, sanitize_filename};

mod resolver;
pub use resolver::ConfluenceResolver;

mod title;

// Errors
pub mod error;
pub use error::ConfluenceError;
