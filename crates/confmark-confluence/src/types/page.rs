//! Confluence page types.

use serde::Deserialize;

/// Confluence page.
///
/// Which optional parts are present depends on the `expand` parameter of the
/// request that produced it.
#[derive(Debug, Clone, Deserialize)]
pub struct Page {
    /// Page ID.
    pub id: String,
    /// Page title.
    pub title: String,
    /// Version information.
    #[serde(default)]
    pub version: Version,
    /// Page body content.
    #[serde(default)]
    pub body: Option<Body>,
    /// Creation history.
    #[serde(default)]
    pub history: Option<History>,
    /// Parent pages, root first.
    #[serde(default)]
    pub ancestors: Vec<Ancestor>,
    /// Hypermedia links.
    #[serde(rename = "_links", default)]
    pub links: Option<Links>,
}

impl Page {
    /// ADF JSON of the body, when requested and present.
    #[must_use]
    pub fn adf_body(&self) -> Option<&str> {
        self.body
            .as_ref()
            .and_then(|b| b.atlas_doc_format.as_ref())
            .map(|r| r.value.as_str())
            .filter(|value| !value.trim().is_empty())
    }

    /// Creation timestamp as sent by the server (RFC 3339).
    #[must_use]
    pub fn created(&self) -> Option<&str> {
        self.history.as_ref()?.created_date.as_deref()
    }

    /// Timestamp of the current version (RFC 3339).
    #[must_use]
    pub fn updated(&self) -> Option<&str> {
        self.version.when.as_deref()
    }
}

/// Page version.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Version {
    /// Version number.
    pub number: u32,
    /// When this version was created.
    #[serde(default)]
    pub when: Option<String>,
    /// Version message/comment.
    #[serde(default)]
    pub message: Option<String>,
}

/// Page body content.
#[derive(Debug, Clone, Deserialize)]
pub struct Body {
    /// Storage format content.
    #[serde(default)]
    pub storage: Option<Representation>,
    /// ADF content, serialized as a JSON string.
    #[serde(default)]
    pub atlas_doc_format: Option<Representation>,
}

/// A body in one representation.
#[derive(Debug, Clone, Deserialize)]
pub struct Representation {
    pub value: String,
    pub representation: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct History {
    #[serde(rename = "createdDate", default)]
    pub created_date: Option<String>,
}

/// Parent page reference.
#[derive(Debug, Clone, Deserialize)]
pub struct Ancestor {
    pub id: String,
    #[serde(default)]
    pub title: String,
}

/// Hypermedia links.
#[derive(Debug, Clone, Deserialize)]
pub struct Links {
    /// Web UI path, relative to `base`.
    #[serde(default)]
    pub webui: Option<String>,
    /// Site base URL including `/wiki`.
    #[serde(default)]
    pub base: Option<String>,
}

/// Content search/list response.
#[derive(Debug, Clone, Deserialize)]
pub struct PagesResponse {
    pub results: Vec<Page>,
    /// Number of results in this batch.
    #[serde(default)]
    pub size: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_deserialize_expanded_page() {
        let json = r#"{
            "id": "123456",
            "type": "page",
            "title": "Release Plan",
            "version": {"number": 7, "when": "2024-02-11T17:02:41.000Z", "message": ""},
            "history": {"latest": true, "createdDate": "2024-01-05T09:30:00.000Z"},
            "ancestors": [{"id": "1", "title": "Home"}, {"id": "2", "title": "Engineering"}],
            "body": {"atlas_doc_format": {"value": "{\"type\":\"doc\",\"content\":[]}", "representation": "atlas_doc_format"}},
            "_links": {"webui": "/spaces/ENG/pages/123456", "base": "https://acme.atlassian.net/wiki"}
        }"#;
        let page: Page = serde_json::from_str(json).unwrap();
        assert_eq!(page.version.number, 7);
        assert_eq!(page.created(), Some("2024-01-05T09:30:00.000Z"));
        assert_eq!(page.updated(), Some("2024-02-11T17:02:41.000Z"));
        assert_eq!(page.adf_body(), Some(r#"{"type":"doc","content":[]}"#));
        assert_eq!(page.ancestors[1].title, "Engineering");
    }

    #[test]
    fn test_deserialize_minimal_page() {
        let page: Page = serde_json::from_str(r#"{"id": "9", "title": "Bare"}"#).unwrap();
        assert_eq!(page.version.number, 0);
        assert!(page.adf_body().is_none());
        assert!(page.created().is_none());
        assert!(page.ancestors.is_empty());
    }
}
