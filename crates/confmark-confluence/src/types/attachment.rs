//! Confluence attachment types.

use serde::Deserialize;

/// Confluence attachment.
///
/// Only includes fields that are actually used.
/// Serde ignores unknown fields from the API response.
#[derive(Debug, Clone, Deserialize)]
pub struct Attachment {
    /// Attachment ID.
    pub id: String,
    /// Attachment title/filename.
    pub title: String,
    #[serde(default)]
    pub extensions: AttachmentExtensions,
    #[serde(rename = "_links", default)]
    pub links: Option<AttachmentLinks>,
}

impl Attachment {
    /// Download path relative to the site base (`/wiki`), if present.
    #[must_use]
    pub fn download_path(&self) -> Option<&str> {
        self.links.as_ref()?.download.as_deref()
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AttachmentExtensions {
    /// Size in bytes.
    #[serde(rename = "fileSize", default)]
    pub file_size: Option<u64>,
    /// Media file ID, as referenced by media nodes in ADF bodies.
    #[serde(rename = "fileId", default)]
    pub file_id: Option<String>,
    #[serde(rename = "mediaType", default)]
    pub media_type: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AttachmentLinks {
    #[serde(default)]
    pub download: Option<String>,
}

/// Attachments API response.
#[derive(Debug, Clone, Deserialize)]
pub struct AttachmentsResponse {
    /// List of attachments.
    pub results: Vec<Attachment>,
}
