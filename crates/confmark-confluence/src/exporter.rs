//! Export of pages to Markdown files.

use std::fs;
use std::path::{Path, PathBuf};

use confmark_adf::AdfError;
use confmark_config::ExportConfig;
use confmark_markdown::envelope::{DocumentHeader, display_timestamp};
use tracing::{info, warn};

use crate::client::ConfluenceClient;
use crate::error::ConfluenceError;
use crate::naming::{hierarchy_path, page_filename};
use crate::resolver::ConfluenceResolver;

/// Fields requested when fetching a page for export.
const EXPORT_EXPAND: &[&str] = &["body.atlas_doc_format", "version", "history", "ancestors"];

/// Body written when a page has no ADF representation.
const MISSING_BODY: &str = "Content could not be retrieved or converted.";

/// Error during page export.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// Confluence API error.
    #[error("Confluence API error: {0}")]
    Confluence(#[from] ConfluenceError),

    /// Page body is not a valid document tree.
    #[error("invalid page body: {0}")]
    Adf(#[from] AdfError),

    /// IO error writing the output.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Where and how exported files are laid out.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// Directory receiving Markdown files.
    pub output_dir: PathBuf,
    /// Media directory, relative to `output_dir`.
    pub assets_dir: PathBuf,
    /// Place each page in folders named after its ancestors.
    pub hierarchy: bool,
}

impl ExportOptions {
    #[must_use]
    pub fn from_config(config: &ExportConfig, hierarchy: bool) -> Self {
        Self {
            output_dir: config.output_dir.clone(),
            assets_dir: config.assets_dir.clone(),
            hierarchy,
        }
    }
}

/// Result of exporting one page.
#[derive(Debug)]
pub struct ExportResult {
    pub page_id: String,
    pub title: String,
    /// Written Markdown file.
    pub path: PathBuf,
    /// Media files downloaded for this page.
    pub media_count: usize,
    /// Problems absorbed during rendering.
    pub warnings: Vec<String>,
}

/// Outcome of exporting several pages.
#[derive(Debug, Default)]
pub struct ExportSummary {
    pub exported: Vec<ExportResult>,
    /// Page id and error for every page that failed.
    pub failed: Vec<(String, ExportError)>,
}

/// Exports Confluence pages as Markdown documents.
pub struct PageExporter<'a> {
    client: &'a ConfluenceClient,
    options: ExportOptions,
}

impl<'a> PageExporter<'a> {
    /// Create a new page exporter.
    #[must_use]
    pub fn new(client: &'a ConfluenceClient, options: ExportOptions) -> Self {
        Self { client, options }
    }

    /// Export a single page.
    ///
    /// # Errors
    ///
    /// Returns an error if the page cannot be fetched, its body is not a
    /// document tree, or the file cannot be written.
    pub fn export(&self, page_id: &str) -> Result<ExportResult, ExportError> {
        let page = self.client.get_page(page_id, EXPORT_EXPAND)?;

        let folder = if self.options.hierarchy {
            hierarchy_path(&page.ancestors)
        } else {
            PathBuf::new()
        };
        let dir = self.options.output_dir.join(&folder);
        fs::create_dir_all(&dir)?;

        let mut resolver = ConfluenceResolver::new(
            self.client,
            &page.id,
            self.options.output_dir.join(&self.options.assets_dir),
            &link_base(&folder, &self.options.assets_dir),
        );

        let (body, warnings) = match page.adf_body() {
            Some(adf) => {
                let rendered = confmark_markdown::render_json(adf, &mut resolver)?;
                (rendered.markdown, rendered.warnings)
            }
            None => {
                warn!("Page {} has no document body", page.id);
                (MISSING_BODY.to_owned(), Vec::new())
            }
        };

        let header = DocumentHeader {
            title: Some(page.title.clone()),
            page_id: Some(page.id.clone()),
            created: page.created().map(display_timestamp),
            updated: page.updated().map(display_timestamp),
            source_url: Some(self.client.page_url(&page, None)),
        };

        let path = dir.join(page_filename(&page.title));
        fs::write(&path, header.compose(&body))?;
        info!("Saved {}", path.display());

        Ok(ExportResult {
            page_id: page.id,
            title: page.title,
            path,
            media_count: resolver.download_count(),
            warnings,
        })
    }

    /// Export several pages, pausing between them.
    ///
    /// Failing pages are collected instead of aborting the run.
    pub fn export_pages<S: AsRef<str>>(&self, page_ids: &[S]) -> ExportSummary {
        let mut summary = ExportSummary::default();
        for (index, page_id) in page_ids.iter().enumerate() {
            let page_id = page_id.as_ref();
            if index > 0 {
                self.client.pause();
            }
            match self.export(page_id) {
                Ok(exported) => summary.exported.push(exported),
                Err(err) => {
                    warn!("Failed to export page {}: {}", page_id, err);
                    summary.failed.push((page_id.to_owned(), err));
                }
            }
        }
        summary
    }

    /// Export every page of a space.
    ///
    /// # Errors
    ///
    /// Returns an error only if the page list cannot be retrieved.
    pub fn export_space(&self, space_key: &str) -> Result<ExportSummary, ExportError> {
        let pages = self.client.list_space_pages(space_key)?;
        info!("Exporting {} pages from space {}", pages.len(), space_key);

        let ids: Vec<&str> = pages.iter().map(|page| page.id.as_str()).collect();
        Ok(self.export_pages(&ids))
    }
}

/// Media link prefix as seen from a Markdown file placed in `folder`.
fn link_base(folder: &Path, assets_dir: &Path) -> String {
    let up = folder.components().map(|_| "..".to_owned());
    let down = assets_dir
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned());
    up.chain(down).collect::<Vec<_>>().join("/")
}
