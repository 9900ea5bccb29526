//! Table of contents generation.

use confmark_adf::Node;

/// Deepest heading level listed in a generated table of contents.
const TOC_MAX_LEVEL: u8 = 3;

/// Characters dropped from heading text when building an anchor.
const ANCHOR_STRIPPED: &[char] = &['*', '`', '"', '\'', '.', '/', '(', ')', '&', ':'];

/// Table of contents entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TocEntry {
    /// Heading level (1-6).
    pub level: u8,
    /// Heading text without marks.
    pub title: String,
    /// Anchor for linking.
    pub anchor: String,
}

impl TocEntry {
    fn new(level: u8, title: String) -> Self {
        let anchor = toc_anchor(&title);
        Self {
            level,
            title,
            anchor,
        }
    }
}

/// Collect the headings that are direct children of `root`.
///
/// Headings inside expand or layout containers are not collected.
pub(crate) fn collect_headings(root: &Node) -> Vec<TocEntry> {
    root.content
        .iter()
        .filter_map(|node| {
            let level = node.heading_level()?;
            let title = node.plain_text().trim().to_owned();
            (!title.is_empty()).then(|| TocEntry::new(level, title))
        })
        .collect()
}

/// Render headings up to level 3 as a nested Markdown link list.
pub(crate) fn render_toc(entries: &[TocEntry]) -> String {
    entries
        .iter()
        .filter(|entry| entry.level <= TOC_MAX_LEVEL)
        .map(|entry| {
            let indent = " ".repeat(3 * usize::from(entry.level.saturating_sub(2)));
            format!("{indent}- [{}](#{})", entry.title, entry.anchor)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Convert heading text to the anchor used by the table of contents.
///
/// Quotes, emphasis markers and the punctuation in [`ANCHOR_STRIPPED`] are
/// removed, the rest is lower-cased and spaces become dashes.
#[must_use]
pub fn toc_anchor(text: &str) -> String {
    text.trim()
        .chars()
        .filter(|c| !ANCHOR_STRIPPED.contains(c))
        .flat_map(char::to_lowercase)
        .map(|c| if c == ' ' { '-' } else { c })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_toc_anchor() {
        assert_eq!(toc_anchor("Getting Started"), "getting-started");
        assert_eq!(toc_anchor("1. Overview (v2)"), "1-overview-v2");
        assert_eq!(toc_anchor("Q&A: \"Why\" it's `slow`"), "qa-why-its-slow");
        assert_eq!(toc_anchor("  API / SDK  "), "api--sdk");
        assert_eq!(toc_anchor("Übersicht"), "übersicht");
    }

    #[test]
    fn test_collect_headings_top_level_only() {
        let doc = Node::from_value(json!({
            "type": "doc",
            "content": [
                {"type": "heading", "attrs": {"level": 1}, "content": [{"type": "text", "text": "Intro"}]},
                {"type": "expand", "attrs": {"title": "Hidden"}, "content": [
                    {"type": "heading", "attrs": {"level": 2}, "content": [{"type": "text", "text": "Nested"}]}
                ]},
                {"type": "heading", "attrs": {"level": 2}, "content": []},
                {"type": "heading", "attrs": {"level": 2}, "content": [
                    {"type": "text", "text": "Bold", "marks": [{"type": "strong"}]},
                    {"type": "text", "text": " part"}
                ]}
            ]
        }))
        .unwrap();

        let entries = collect_headings(&doc);
        assert_eq!(
            entries,
            vec![
                TocEntry::new(1, "Intro".to_owned()),
                TocEntry::new(2, "Bold part".to_owned()),
            ]
        );
    }

    #[test]
    fn test_render_toc_indentation_and_depth() {
        let entries = vec![
            TocEntry::new(1, "Top".to_owned()),
            TocEntry::new(2, "Second".to_owned()),
            TocEntry::new(3, "Third".to_owned()),
            TocEntry::new(4, "Fourth".to_owned()),
        ];
        assert_eq!(
            render_toc(&entries),
            "- [Top](#top)\n- [Second](#second)\n   - [Third](#third)"
        );
    }
}
