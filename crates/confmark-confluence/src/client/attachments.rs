//! Attachment operations for Confluence API.

use rand::RngExt;
use tracing::info;

use super::{ConfluenceClient, read_json};
use crate::error::ConfluenceError;
use crate::types::{Attachment, AttachmentsResponse};

/// Largest attachment listing requested in one call.
const ATTACHMENT_LIMIT: &str = "200";

/// Cap on downloaded bodies.
const MAX_DOWNLOAD_BYTES: u64 = 100 * 1024 * 1024;

/// Cap on HTML pages fetched for their title.
const MAX_PAGE_BYTES: u64 = 2 * 1024 * 1024;

impl ConfluenceClient {
    /// Upload a new attachment, or a new version of `existing`.
    pub fn upload_attachment(
        &self,
        page_id: &str,
        filename: &str,
        data: &[u8],
        content_type: &str,
        existing: Option<&Attachment>,
    ) -> Result<Attachment, ConfluenceError> {
        let url = if let Some(att) = existing {
            info!(
                "Updating existing attachment '{}' (id={})",
                filename, att.id
            );
            format!(
                "{}/content/{}/child/attachment/{}/data",
                self.api_url(),
                page_id,
                att.id
            )
        } else {
            info!(
                "Uploading new attachment '{}' to page {}",
                filename, page_id
            );
            format!("{}/content/{}/child/attachment", self.api_url(), page_id)
        };

        let boundary = format!(
            "----ConfmarkFormBoundary{:016x}",
            rand::rng().random::<u64>()
        );
        let body = multipart_body(&boundary, filename, content_type, data);

        let response = self
            .agent
            .post(&url)
            .header("Authorization", &self.auth_header)
            .header(
                "Content-Type",
                &format!("multipart/form-data; boundary={boundary}"),
            )
            .header("X-Atlassian-Token", "nocheck")
            .header("Accept", "application/json")
            .send(&body[..])?;

        // Response is a list for new uploads, single object for updates
        if existing.is_some() {
            read_json(response)
        } else {
            let response: AttachmentsResponse = read_json(response)?;
            response
                .results
                .into_iter()
                .next()
                .ok_or_else(|| ConfluenceError::HttpResponse {
                    status: 200,
                    body: "Empty attachment response".to_owned(),
                })
        }
    }

    /// List attachments on a page.
    pub fn get_attachments(&self, page_id: &str) -> Result<Vec<Attachment>, ConfluenceError> {
        let url = format!("{}/content/{}/child/attachment", self.api_url(), page_id);

        info!("Getting attachments for page {}", page_id);

        let response: AttachmentsResponse =
            Self::with_retry(&format!("Listing attachments of {page_id}"), || {
                let response = self
                    .agent
                    .get(&url)
                    .header("Authorization", &self.auth_header)
                    .header("Accept", "application/json")
                    .query("limit", ATTACHMENT_LIMIT)
                    .call()?;
                read_json(response)
            })?;

        Ok(response.results)
    }

    /// Download an attachment.
    ///
    /// `link` is either an absolute URL on this site or a download path as
    /// returned in attachment links (relative to `/wiki`).
    pub fn download(&self, link: &str) -> Result<Vec<u8>, ConfluenceError> {
        let url = if link.starts_with('/') {
            format!("{}/wiki{link}", self.base_url)
        } else {
            link.to_owned()
        };

        info!("Downloading {}", url);

        let mut body = self.fetch(&url, "*/*")?;
        Ok(body.with_config().limit(MAX_DOWNLOAD_BYTES).read_to_vec()?)
    }

    /// Fetch an HTML page as text.
    ///
    /// Credentials are only sent to this Confluence site.
    pub fn get_html(&self, url: &str) -> Result<String, ConfluenceError> {
        let mut body = self.fetch(url, "text/html")?;
        Ok(body.with_config().limit(MAX_PAGE_BYTES).lossy_utf8(true).read_to_string()?)
    }

    fn fetch(&self, url: &str, accept: &str) -> Result<ureq::Body, ConfluenceError> {
        let mut request = self.agent.get(url).header("Accept", accept);
        if self.is_own_site(url) {
            request = request.header("Authorization", &self.auth_header);
        }

        let response = request.call()?;
        let status = response.status().as_u16();
        let mut body = response.into_body();

        if status >= 400 {
            let error_body = body
                .read_to_string()
                .unwrap_or_else(|_| "(unable to read error body)".to_owned());
            return Err(ConfluenceError::HttpResponse {
                status,
                body: error_body,
            });
        }
        Ok(body)
    }

    /// Whether `url` points at this site (same scheme, host and port).
    fn is_own_site(&self, url: &str) -> bool {
        match (url::Url::parse(url), url::Url::parse(&self.base_url)) {
            (Ok(target), Ok(base)) => target.origin() == base.origin(),
            _ => false,
        }
    }
}

/// Build a `multipart/form-data` body with a single `file` part.
fn multipart_body(boundary: &str, filename: &str, content_type: &str, data: &[u8]) -> Vec<u8> {
    let mut body = Vec::with_capacity(data.len() + 256);

    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(
        format!("Content-Disposition: form-data; name=\"file\"; filename=\"{filename}\"\r\n")
            .as_bytes(),
    );
    body.extend_from_slice(format!("Content-Type: {content_type}\r\n\r\n").as_bytes());
    body.extend_from_slice(data);
    body.extend_from_slice(b"\r\n");

    body.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
    body.extend_from_slice(b"Content-Disposition: form-data; name=\"minorEdit\"\r\n\r\ntrue\r\n");

    // End boundary
    body.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());
    body
}
