//! Header and footer wrapped around exported pages.
//!
//! ```text
//! # Release Plan
//!
//! **Page ID:** 123456
//! **Created:** 2024-01-05 09:30:00
//! **Updated:** 2024-02-11 17:02:41
//!
//! ---
//!
//! ...body...
//!
//! ---
//!
//! *Source: https://acme.atlassian.net/wiki/spaces/ENG/pages/123456*
//! ```

use chrono::DateTime;

const PAGE_ID_LABEL: &str = "**Page ID:**";
const CREATED_LABEL: &str = "**Created:**";
const UPDATED_LABEL: &str = "**Updated:**";
const SOURCE_PREFIX: &str = "*Source:";
const SEPARATOR: &str = "---";

/// Metadata carried in the document header.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct DocumentHeader {
    pub title: Option<String>,
    pub page_id: Option<String>,
    pub created: Option<String>,
    pub updated: Option<String>,
    /// Link back to the page, written as the footer.
    pub source_url: Option<String>,
}

/// Document split into header and body.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Document {
    pub header: DocumentHeader,
    pub body: String,
}

impl DocumentHeader {
    /// Wrap `body` with this header and, when a source URL is known, the footer.
    pub fn compose(&self, body: &str) -> String {
        let mut out = String::new();
        if let Some(title) = &self.title {
            out.push_str(&format!("# {title}\n\n"));
        }
        let unknown = || "Unknown".to_owned();
        out.push_str(&format!(
            "{PAGE_ID_LABEL} {}\n{CREATED_LABEL} {}\n{UPDATED_LABEL} {}\n\n{SEPARATOR}\n\n",
            self.page_id.clone().unwrap_or_else(unknown),
            self.created.clone().unwrap_or_else(unknown),
            self.updated.clone().unwrap_or_else(unknown),
        ));
        out.push_str(body.trim_end());
        if let Some(url) = &self.source_url {
            out.push_str(&format!("\n\n{SEPARATOR}\n\n{SOURCE_PREFIX} {url}*"));
        }
        out.push('\n');
        out
    }
}

/// Split a document into header metadata and body.
///
/// The header ends at the first `---` line and may only contain the title
/// and metadata lines; otherwise the whole text is the body. A trailing
/// `---` followed by the source link is removed from the body.
pub fn split_document(text: &str) -> Document {
    let lines: Vec<&str> = text.lines().collect();
    let mut header = DocumentHeader::default();

    let separator = lines.iter().position(|line| line.trim() == SEPARATOR);
    let body_start = match separator {
        Some(index) if lines[..index].iter().all(|line| is_header_line(line)) => {
            for line in &lines[..index] {
                read_header_line(line.trim(), &mut header);
            }
            index + 1
        }
        _ => {
            header.title = lines
                .iter()
                .find_map(|line| line.trim().strip_prefix("# "))
                .map(|title| title.trim().to_owned());
            0
        }
    };

    let mut body: Vec<&str> = lines[body_start..].to_vec();
    strip_footer(&mut body, &mut header);
    Document {
        header,
        body: body.join("\n").trim().to_owned(),
    }
}

fn is_header_line(line: &str) -> bool {
    let line = line.trim();
    line.is_empty()
        || line.starts_with("# ")
        || (line.starts_with("**") && line.contains(":**"))
}

fn read_header_line(line: &str, header: &mut DocumentHeader) {
    let value = |label: &str| {
        line.strip_prefix(label)
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .map(str::to_owned)
    };
    if let Some(title) = line.strip_prefix("# ") {
        if header.title.is_none() {
            header.title = Some(title.trim().to_owned());
        }
    } else if let Some(id) = value(PAGE_ID_LABEL) {
        header.page_id = Some(id);
    } else if let Some(created) = value(CREATED_LABEL) {
        header.created = Some(created);
    } else if let Some(updated) = value(UPDATED_LABEL) {
        header.updated = Some(updated);
    }
}

fn strip_footer(body: &mut Vec<&str>, header: &mut DocumentHeader) {
    while body.last().is_some_and(|line| line.trim().is_empty()) {
        body.pop();
    }
    let Some(last) = body.last().map(|line| line.trim()) else {
        return;
    };
    if let Some(url) = last
        .strip_prefix(SOURCE_PREFIX)
        .and_then(|rest| rest.strip_suffix('*'))
    {
        header.source_url = Some(url.trim().to_owned());
        body.pop();
        while body.last().is_some_and(|line| line.trim().is_empty()) {
            body.pop();
        }
    }
    if body.last().is_some_and(|line| line.trim() == SEPARATOR) {
        body.pop();
    }
}

/// Render an ISO 8601 timestamp as `YYYY-MM-DD HH:MM:SS` (UTC).
///
/// Values that do not parse are returned unchanged.
pub fn display_timestamp(value: &str) -> String {
    DateTime::parse_from_rfc3339(value).map_or_else(
        |_| value.to_owned(),
        |date| date.to_utc().format("%Y-%m-%d %H:%M:%S").to_string(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn header() -> DocumentHeader {
        DocumentHeader {
            title: Some("Release Plan".to_owned()),
            page_id: Some("123456".to_owned()),
            created: Some("2024-01-05 09:30:00".to_owned()),
            updated: None,
            source_url: Some("https://acme.atlassian.net/wiki/spaces/ENG/pages/123456".to_owned()),
        }
    }

    #[test]
    fn test_compose() {
        let text = header().compose("## Goals\n\nShip it.\n");
        assert_eq!(
            text,
            "# Release Plan\n\n\
             **Page ID:** 123456\n\
             **Created:** 2024-01-05 09:30:00\n\
             **Updated:** Unknown\n\n\
             ---\n\n\
             ## Goals\n\nShip it.\n\n\
             ---\n\n\
             *Source: https://acme.atlassian.net/wiki/spaces/ENG/pages/123456*\n"
        );
    }

    #[test]
    fn test_split_reverses_compose() {
        let body = "## Goals\n\n---\n\nShip it.";
        let document = split_document(&header().compose(body));
        assert_eq!(document.body, body);
        assert_eq!(
            document.header,
            DocumentHeader {
                updated: Some("Unknown".to_owned()),
                ..header()
            }
        );
    }

    #[test]
    fn test_split_without_separator_is_body_only() {
        let document = split_document("# Notes\n\nJust text.\n");
        assert_eq!(document.header.title.as_deref(), Some("Notes"));
        assert_eq!(document.header.page_id, None);
        assert_eq!(document.body, "# Notes\n\nJust text.");
    }

    #[test]
    fn test_rule_inside_plain_body_is_not_a_header() {
        let text = "# Notes\n\nIntro paragraph.\n\n---\n\nMore.";
        let document = split_document(text);
        assert_eq!(document.body, text);
        assert_eq!(document.header.title.as_deref(), Some("Notes"));
    }

    #[test]
    fn test_display_timestamp() {
        assert_eq!(display_timestamp("2024-02-11T17:02:41.123Z"), "2024-02-11 17:02:41");
        assert_eq!(display_timestamp("2024-02-11T19:02:41+02:00"), "2024-02-11 17:02:41");
        assert_eq!(display_timestamp("yesterday"), "yesterday");
    }
}
