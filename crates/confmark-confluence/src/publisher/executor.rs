//! Page publisher implementation.

use std::fs;
use std::path::Path;

use confmark_markdown::envelope::{Document, split_document};
use confmark_storage::StorageOutput;
use tracing::{info, warn};

use super::error::PublishError;
use super::images::{LocatedImages, attachment_name, is_already_attached, locate_images};
use super::result::{DryRunResult, PublishResult};
use super::{ParentPage, PublishConfig};
use crate::client::ConfluenceClient;
use crate::types::Page;

/// Markdown file converted and ready to send.
struct PreparedPage {
    title: String,
    page_id: Option<String>,
    storage: StorageOutput,
    images: LocatedImages,
}

/// Handles publishing Markdown files to Confluence.
pub struct PagePublisher<'a> {
    client: &'a ConfluenceClient,
    config: PublishConfig,
}

impl<'a> PagePublisher<'a> {
    /// Create a new page publisher.
    #[must_use]
    pub fn new(client: &'a ConfluenceClient, config: PublishConfig) -> Self {
        Self { client, config }
    }

    /// Publish a Markdown file.
    ///
    /// With `update` enabled the page named by the document header's page id,
    /// or else the page with the same title in the space, is updated; otherwise
    /// a new page is created. Images are uploaded afterwards.
    ///
    /// # Errors
    ///
    /// Returns an error if the file or an image cannot be read, or a
    /// Confluence API call fails.
    pub fn publish(
        &self,
        path: &Path,
        message: Option<&str>,
    ) -> Result<PublishResult, PublishError> {
        let prepared = Self::prepare(path)?;

        let existing = if self.config.update {
            self.find_existing(&prepared)?
        } else {
            None
        };

        let created = existing.is_none();
        let page = match existing {
            Some(current) => {
                info!(
                    "Updating existing page {} (version {})",
                    current.id, current.version.number
                );
                self.client.update_page(
                    &current.id,
                    &prepared.title,
                    &prepared.storage.markup,
                    current.version.number,
                    message,
                )?
            }
            None => {
                let parent_id = self.resolve_parent()?;
                self.client.create_page(
                    &self.config.space_key,
                    &prepared.title,
                    &prepared.storage.markup,
                    parent_id.as_deref(),
                )?
            }
        };
        self.client.pause();

        let (uploaded, skipped) = self.upload_images(&page.id, &prepared.images)?;

        Ok(PublishResult {
            url: self.client.page_url(&page, Some(&self.config.space_key)),
            page_id: page.id,
            title: prepared.title,
            version: page.version.number,
            created,
            uploaded,
            skipped,
            missing_images: prepared.images.missing,
        })
    }

    /// Convert a Markdown file without contacting Confluence.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read.
    pub fn dry_run(path: &Path) -> Result<DryRunResult, PublishError> {
        let prepared = Self::prepare(path)?;
        Ok(DryRunResult {
            title: prepared.title,
            page_id: prepared.page_id,
            markup: prepared.storage.markup,
            images: prepared.images.found,
            missing_images: prepared.images.missing,
        })
    }

    fn prepare(path: &Path) -> Result<PreparedPage, PublishError> {
        let text = fs::read_to_string(path).map_err(|source| PublishError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let Document { header, body } = split_document(&text);

        let title = header
            .title
            .filter(|title| !title.trim().is_empty())
            .unwrap_or_else(|| title_from_path(path));

        let storage = confmark_storage::parse(&body);
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        let images = locate_images(&storage.images, base_dir);
        info!(
            "Converted '{}' ({} images, {} missing)",
            title,
            images.found.len(),
            images.missing.len()
        );

        Ok(PreparedPage {
            title,
            page_id: header.page_id.filter(|id| is_page_id(id)),
            storage,
            images,
        })
    }

    /// Existing page by header page id, then by title.
    fn find_existing(&self, prepared: &PreparedPage) -> Result<Option<Page>, PublishError> {
        if let Some(page_id) = &prepared.page_id {
            if let Some(page) = self.client.find_page(page_id)? {
                return Ok(Some(page));
            }
            info!("Page {} not found, looking up by title", page_id);
        }
        Ok(self
            .client
            .find_page_by_title(&self.config.space_key, &prepared.title)?)
    }

    fn resolve_parent(&self) -> Result<Option<String>, PublishError> {
        let found = match &self.config.parent {
            None => return Ok(None),
            Some(ParentPage::Id(id)) => self.client.find_page(id)?,
            Some(ParentPage::Title(title)) => self
                .client
                .find_page_by_title(&self.config.space_key, title)?,
        };

        match found {
            Some(parent) => {
                info!("Parent page: {} (id={})", parent.title, parent.id);
                Ok(Some(parent.id))
            }
            None => {
                warn!("Parent page not found, creating at the space root");
                Ok(None)
            }
        }
    }

    /// Upload images, skipping attachments that already exist with the same size.
    fn upload_images(
        &self,
        page_id: &str,
        images: &LocatedImages,
    ) -> Result<(Vec<String>, Vec<String>), PublishError> {
        let mut uploaded = Vec::new();
        let mut skipped = Vec::new();
        if images.found.is_empty() {
            return Ok((uploaded, skipped));
        }

        let attachments = self.client.get_attachments(page_id)?;

        for (index, path) in images.found.iter().enumerate() {
            let Some(filename) = attachment_name(path) else {
                continue;
            };
            let data = fs::read(path)?;
            let existing = attachments.iter().find(|a| a.title == filename);

            if is_already_attached(existing, data.len() as u64) {
                info!("Attachment already exists (same size): {}", filename);
                skipped.push(filename);
                continue;
            }

            if index > 0 {
                self.client.pause();
            }
            let content_type = mime_guess::from_path(path).first_or_octet_stream();
            self.client.upload_attachment(
                page_id,
                &filename,
                &data,
                content_type.essence_str(),
                existing,
            )?;
            uploaded.push(filename);
        }
        Ok((uploaded, skipped))
    }
}

/// Page title from the file name: stem with underscores as spaces.
fn title_from_path(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().replace('_', " "))
        .unwrap_or_default()
}

/// Header page ids are numeric; exported placeholders like `Unknown` are not.
fn is_page_id(value: &str) -> bool {
    !value.is_empty() && value.chars().all(|c| c.is_ascii_digit())
}
