//! [`Resolver`] backed by the Confluence API.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use confmark_adf::MediaRef;
use confmark_markdown::{ResolveError, Resolver};
use tracing::{debug, info};

use crate::client::ConfluenceClient;
use crate::naming::asset_filename;
use crate::title::html_title;
use crate::types::Attachment;

/// Resolves media to downloaded attachments of one page and link titles to
/// the `<title>` of the linked HTML page.
pub struct ConfluenceResolver<'a> {
    client: &'a ConfluenceClient,
    page_id: String,
    /// Where downloaded files are written.
    assets_dir: PathBuf,
    /// Prefix of returned links, relative to the Markdown file.
    link_base: String,
    /// Loaded on first media lookup.
    attachments: Option<Vec<Attachment>>,
    /// Attachment id to returned link.
    downloaded: HashMap<String, String>,
}

impl<'a> ConfluenceResolver<'a> {
    /// Create a resolver for `page_id`.
    ///
    /// Files are saved into `assets_dir` and referenced as `{link_base}/{file}`.
    pub fn new(
        client: &'a ConfluenceClient,
        page_id: &str,
        assets_dir: PathBuf,
        link_base: &str,
    ) -> Self {
        Self {
            client,
            page_id: page_id.to_owned(),
            assets_dir,
            link_base: link_base.trim_end_matches('/').to_owned(),
            attachments: None,
            downloaded: HashMap::new(),
        }
    }

    /// Number of files downloaded so far.
    #[must_use]
    pub fn download_count(&self) -> usize {
        self.downloaded.len()
    }

    fn attachments(&mut self) -> Result<&[Attachment], ResolveError> {
        if self.attachments.is_none() {
            let attachments = self
                .client
                .get_attachments(&self.page_id)
                .map_err(|e| ResolveError::with_source(e.to_string(), e))?;
            self.attachments = Some(attachments);
        }
        Ok(self.attachments.as_deref().unwrap_or_default())
    }

    fn download(&mut self, attachment: &Attachment) -> Result<String, ResolveError> {
        if let Some(link) = self.downloaded.get(&attachment.id) {
            return Ok(link.clone());
        }

        let path = attachment.download_path().ok_or_else(|| {
            ResolveError::new(format!("attachment {} has no download link", attachment.title))
        })?;
        let data = self
            .client
            .download(path)
            .map_err(|e| ResolveError::with_source(e.to_string(), e))?;

        let filename = asset_filename(&attachment.title);
        let target = self.assets_dir.join(&filename);
        fs::create_dir_all(&self.assets_dir)
            .and_then(|()| fs::write(&target, &data))
            .map_err(|e| {
                ResolveError::with_source(format!("cannot write {}: {e}", target.display()), e)
            })?;
        info!("Saved {} ({} bytes)", target.display(), data.len());

        let link = media_link(&self.link_base, &filename);
        self.downloaded.insert(attachment.id.clone(), link.clone());
        Ok(link)
    }
}

impl Resolver for ConfluenceResolver<'_> {
    fn resolve_media(&mut self, media: &MediaRef) -> Result<Option<String>, ResolveError> {
        let found = find_attachment(self.attachments()?, media).cloned();
        match found {
            Some(attachment) => self.download(&attachment).map(Some),
            None => {
                debug!("No attachment matches media {}", media.id);
                Ok(None)
            }
        }
    }

    fn fetch_title(&mut self, url: &str) -> Result<Option<String>, ResolveError> {
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Ok(None);
        }
        let html = self
            .client
            .get_html(url)
            .map_err(|e| ResolveError::with_source(e.to_string(), e))?;
        Ok(html_title(&html))
    }
}

/// Match by media file id, falling back to the file name in `alt`.
fn find_attachment<'a>(attachments: &'a [Attachment], media: &MediaRef) -> Option<&'a Attachment> {
    attachments
        .iter()
        .find(|a| a.extensions.file_id.as_deref() == Some(media.id.as_str()))
        .or_else(|| {
            let alt = media.alt.as_deref()?;
            attachments.iter().find(|a| a.title == alt)
        })
}

/// Markdown link target for a saved file.
fn media_link(link_base: &str, filename: &str) -> String {
    if link_base.is_empty() {
        filename.to_owned()
    } else {
        format!("{link_base}/{filename}")
    }
}
