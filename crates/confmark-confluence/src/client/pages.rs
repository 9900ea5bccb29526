//! Page operations for Confluence API.

use serde_json::json;
use tracing::info;

use super::{ConfluenceClient, read_json};
use crate::error::ConfluenceError;
use crate::types::{Page, PagesResponse};

/// Batch size when listing the pages of a space.
const LIST_LIMIT: usize = 100;

impl ConfluenceClient {
    /// Get page by ID with optional field expansion.
    pub fn get_page(&self, page_id: &str, expand: &[&str]) -> Result<Page, ConfluenceError> {
        let url = format!("{}/content/{}", self.api_url(), page_id);
        let expand = expand.join(",");

        info!("Getting page {}", page_id);

        Self::with_retry(&format!("Getting page {page_id}"), || {
            let mut request = self
                .agent
                .get(&url)
                .header("Authorization", &self.auth_header)
                .header("Accept", "application/json");
            if !expand.is_empty() {
                request = request.query("expand", &expand);
            }
            read_json(request.call()?)
        })
    }

    /// Get page by ID, returning `None` when it does not exist.
    pub fn find_page(&self, page_id: &str) -> Result<Option<Page>, ConfluenceError> {
        match self.get_page(page_id, &["version"]) {
            Ok(page) => Ok(Some(page)),
            Err(err) if err.status() == Some(404) => Ok(None),
            Err(err) => Err(err),
        }
    }

    /// Find a page in a space by its exact title.
    pub fn find_page_by_title(
        &self,
        space_key: &str,
        title: &str,
    ) -> Result<Option<Page>, ConfluenceError> {
        let url = format!("{}/content", self.api_url());

        info!("Looking up page '{}' in space {}", title, space_key);

        let response: PagesResponse = Self::with_retry("Page lookup", || {
            let response = self
                .agent
                .get(&url)
                .header("Authorization", &self.auth_header)
                .header("Accept", "application/json")
                .query("title", title)
                .query("spaceKey", space_key)
                .query("expand", "version")
                .call()?;
            read_json(response)
        })?;

        Ok(response.results.into_iter().next())
    }

    /// List every page in a space, following pagination.
    pub fn list_space_pages(&self, space_key: &str) -> Result<Vec<Page>, ConfluenceError> {
        let url = format!("{}/content", self.api_url());
        let limit = LIST_LIMIT.to_string();
        let mut pages = Vec::new();

        loop {
            let start = pages.len().to_string();
            let batch: PagesResponse = Self::with_retry("Listing pages", || {
                let response = self
                    .agent
                    .get(&url)
                    .header("Authorization", &self.auth_header)
                    .header("Accept", "application/json")
                    .query("spaceKey", space_key)
                    .query("type", "page")
                    .query("start", &start)
                    .query("limit", &limit)
                    .query("expand", "version")
                    .call()?;
                read_json(response)
            })?;

            let count = batch.results.len();
            pages.extend(batch.results);
            info!(
                "Retrieved {} pages from space {} (total {})",
                count,
                space_key,
                pages.len()
            );

            if count < LIST_LIMIT {
                return Ok(pages);
            }
            self.pause();
        }
    }

    /// Create a page in a space, optionally below a parent page.
    pub fn create_page(
        &self,
        space_key: &str,
        title: &str,
        body: &str,
        parent_id: Option<&str>,
    ) -> Result<Page, ConfluenceError> {
        let url = format!("{}/content", self.api_url());

        let mut payload = json!({
            "type": "page",
            "title": title,
            "space": {"key": space_key},
            "body": {
                "storage": {
                    "value": body,
                    "representation": "storage"
                }
            }
        });

        if let Some(parent) = parent_id {
            payload["ancestors"] = json!([{"id": parent}]);
        }

        info!("Creating page '{}' in space {}", title, space_key);

        let payload_bytes = serde_json::to_vec(&payload)?;

        let response = self
            .agent
            .post(&url)
            .header("Authorization", &self.auth_header)
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .send(&payload_bytes[..])?;

        let page: Page = read_json(response)?;
        info!("Created page {}", page.id);
        Ok(page)
    }

    /// Update existing page (auto-increments version).
    pub fn update_page(
        &self,
        page_id: &str,
        title: &str,
        body: &str,
        version: u32,
        message: Option<&str>,
    ) -> Result<Page, ConfluenceError> {
        let url = format!("{}/content/{}", self.api_url(), page_id);

        let mut payload = json!({
            "type": "page",
            "title": title,
            "body": {
                "storage": {
                    "value": body,
                    "representation": "storage"
                }
            },
            "version": {"number": version + 1}
        });

        if let Some(msg) = message {
            payload["version"]["message"] = json!(msg);
        }

        info!(
            "Updating page {} from version {} to {}",
            page_id,
            version,
            version + 1
        );

        let payload_bytes = serde_json::to_vec(&payload)?;

        let response = self
            .agent
            .put(&url)
            .header("Authorization", &self.auth_header)
            .header("Content-Type", "application/json")
            .header("Accept", "application/json")
            .send(&payload_bytes[..])?;

        let page: Page = read_json(response)?;
        info!(
            "Updated page {} to version {}",
            page_id, page.version.number
        );
        Ok(page)
    }

    /// Web URL for a page.
    ///
    /// Prefers the links returned by the API; otherwise builds the space URL,
    /// or the `viewpage.action` URL when the space is unknown.
    #[must_use]
    pub fn page_url(&self, page: &Page, space_key: Option<&str>) -> String {
        if let Some(links) = &page.links
            && let Some(webui) = &links.webui
        {
            let base = links
                .base
                .clone()
                .unwrap_or_else(|| format!("{}/wiki", self.base_url));
            return format!("{base}{webui}");
        }

        match space_key {
            Some(space) => format!("{}/wiki/spaces/{space}/pages/{}", self.base_url, page.id),
            None => format!(
                "{}/wiki/pages/viewpage.action?pageId={}",
                self.base_url, page.id
            ),
        }
    }
}
