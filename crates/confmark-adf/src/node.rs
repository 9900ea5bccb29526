//! Typed document nodes.

use serde::Deserialize;

use crate::error::AdfError;
use crate::raw::{RawMark, RawNode};

/// A node of the document tree.
///
/// Leaves have an empty `content`. Trees are built once from JSON and are not
/// mutated by any converter.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(from = "RawNode")]
pub struct Node {
    /// Node kind with its kind-specific attributes.
    pub kind: NodeKind,
    /// Ordered children.
    pub content: Vec<Node>,
}

/// Closed set of node kinds understood by the converters.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// Document root.
    Doc,
    /// Text run with marks.
    Text(Text),
    Paragraph,
    /// Heading, level clamped to 1..=6.
    Heading { level: u8 },
    BulletList,
    /// Ordered list starting at `order`.
    OrderedList { order: u32 },
    ListItem,
    Table,
    TableRow,
    TableCell(CellSpan),
    TableHeader(CellSpan),
    /// Code block with optional language tag.
    CodeBlock { language: Option<String> },
    Rule,
    MediaSingle,
    Media(MediaRef),
    Caption,
    LayoutSection,
    LayoutColumn,
    /// Collapsible section (`expand` and `nestedExpand`).
    Expand { title: Option<String> },
    Extension(Extension),
    EmbedCard { url: String },
    InlineCard { url: String },
    /// User mention; `text` is the display text (usually `@Name`).
    Mention { id: String, text: Option<String> },
    Emoji(Emoji),
    /// Date in milliseconds since the Unix epoch.
    Date { timestamp: Option<i64> },
    HardBreak,
    /// Status lozenge.
    Status { text: String },
    /// Any node type that is not modelled; children are kept.
    Unknown { type_name: String },
}

/// Text run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Text {
    /// Raw text.
    pub text: String,
    /// Marks in document order.
    pub marks: Vec<Mark>,
}

impl Text {
    /// Link target if the text carries a `link` mark.
    pub fn link(&self) -> Option<&str> {
        self.marks.iter().find_map(|mark| match mark {
            Mark::Link { href } => Some(href.as_str()),
            _ => None,
        })
    }

    /// Whether the given mark is present.
    pub fn has_mark(&self, mark: &Mark) -> bool {
        self.marks.contains(mark)
    }
}

/// Inline decoration on a text node.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(from = "RawMark")]
pub enum Mark {
    Strong,
    Em,
    Code,
    Link { href: String },
    /// Mark type that is not rendered (underline, textColor, ...).
    Other(String),
}

/// Row and column span of a table cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellSpan {
    pub rowspan: u32,
    pub colspan: u32,
}

impl Default for CellSpan {
    fn default() -> Self {
        Self {
            rowspan: 1,
            colspan: 1,
        }
    }
}

/// Reference to a media item stored by the platform.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MediaRef {
    /// Media (file) identifier.
    pub id: String,
    /// Media collection, e.g. `contentId-123456`.
    pub collection: String,
    /// Alternative text.
    pub alt: Option<String>,
    pub media_type: MediaType,
    /// Source URL for external media.
    pub url: Option<String>,
}

/// Media storage type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaType {
    File,
    Link,
    External,
}

/// Macro/extension node.
#[derive(Debug, Clone, PartialEq)]
pub struct Extension {
    /// Extension key, e.g. `toc` or `jira`.
    pub key: String,
    /// Extension type, e.g. `com.atlassian.confluence.macro.core`.
    pub extension_type: Option<String>,
    /// Free-form macro parameters.
    pub parameters: serde_json::Value,
}

impl Extension {
    /// Look up a `macroParams` value: `parameters.macroParams.{name}.value`.
    pub fn macro_param(&self, name: &str) -> Option<&str> {
        self.parameters
            .get("macroParams")?
            .get(name)?
            .get("value")?
            .as_str()
    }
}

/// Emoji reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Emoji {
    /// Short name including colons, e.g. `:smile:`.
    pub short_name: String,
    /// Emoji id: hex code points for standard emoji, `atlassian-*` for
    /// platform emoji, or an opaque id for uploaded ones.
    pub id: Option<String>,
    /// Fallback text supplied by the editor.
    pub text: Option<String>,
}

impl Node {
    /// Create a node from kind and children.
    #[must_use]
    pub fn new(kind: NodeKind, content: Vec<Node>) -> Self {
        Self { kind, content }
    }

    /// Create a plain text leaf.
    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Self::new(
            NodeKind::Text(Text {
                text: text.into(),
                marks: Vec::new(),
            }),
            Vec::new(),
        )
    }

    /// Parse a document (or any single node) from JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`AdfError::Json`] if the text is not JSON or not a node.
    pub fn from_json(json: &str) -> Result<Self, AdfError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Build a node from an already parsed JSON value.
    ///
    /// # Errors
    ///
    /// Returns [`AdfError::Json`] if the value does not have a node shape.
    pub fn from_value(value: serde_json::Value) -> Result<Self, AdfError> {
        Ok(serde_json::from_value(value)?)
    }

    /// Text payload if this is a text node.
    pub fn as_text(&self) -> Option<&Text> {
        match &self.kind {
            NodeKind::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Heading level if this is a heading.
    pub fn heading_level(&self) -> Option<u8> {
        match self.kind {
            NodeKind::Heading { level } => Some(level),
            _ => None,
        }
    }

    /// Concatenated raw text of all descendant text nodes, marks ignored.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        self.collect_plain_text(&mut out);
        out
    }

    fn collect_plain_text(&self, out: &mut String) {
        match &self.kind {
            NodeKind::Text(text) => out.push_str(&text.text),
            NodeKind::HardBreak => out.push(' '),
            NodeKind::Status { text } => out.push_str(text),
            NodeKind::Mention { text, .. } => out.push_str(text.as_deref().unwrap_or_default()),
            _ => {
                for child in &self.content {
                    child.collect_plain_text(out);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn parse(value: serde_json::Value) -> Node {
        Node::from_value(value).unwrap()
    }

    #[test]
    fn test_heading_from_json() {
        let node = Node::from_json(
            r#"{"type":"heading","attrs":{"level":2},"content":[{"type":"text","text":"Scope"}]}"#,
        )
        .unwrap();
        assert_eq!(node.kind, NodeKind::Heading { level: 2 });
        assert_eq!(node.content, vec![Node::text("Scope")]);
    }

    #[test]
    fn test_heading_level_clamped() {
        let high = parse(json!({"type": "heading", "attrs": {"level": 9}}));
        assert_eq!(high.heading_level(), Some(6));
        let zero = parse(json!({"type": "heading", "attrs": {"level": 0}}));
        assert_eq!(zero.heading_level(), Some(1));
        let missing = parse(json!({"type": "heading"}));
        assert_eq!(missing.heading_level(), Some(1));
    }

    #[test]
    fn test_text_marks() {
        let node = parse(json!({
            "type": "text",
            "text": "docs",
            "marks": [
                {"type": "strong"},
                {"type": "link", "attrs": {"href": "https://example.com"}},
                {"type": "underline"}
            ]
        }));
        let text = node.as_text().unwrap();
        assert_eq!(text.text, "docs");
        assert_eq!(text.link(), Some("https://example.com"));
        assert!(text.has_mark(&Mark::Strong));
        assert_eq!(text.marks[2], Mark::Other("underline".to_owned()));
    }

    #[test]
    fn test_cell_span_defaults_and_values() {
        let cell = parse(json!({"type": "tableCell", "attrs": {"rowspan": 2}}));
        assert_eq!(
            cell.kind,
            NodeKind::TableCell(CellSpan {
                rowspan: 2,
                colspan: 1
            })
        );
        let header = parse(json!({"type": "tableHeader", "attrs": {"colspan": "3"}}));
        assert_eq!(
            header.kind,
            NodeKind::TableHeader(CellSpan {
                rowspan: 1,
                colspan: 3
            })
        );
    }

    #[test]
    fn test_unknown_node_keeps_children() {
        let node = parse(json!({
            "type": "panel",
            "attrs": {"panelType": "info"},
            "content": [{"type": "paragraph", "content": [{"type": "text", "text": "Hi"}]}]
        }));
        assert_eq!(
            node.kind,
            NodeKind::Unknown {
                type_name: "panel".to_owned()
            }
        );
        assert_eq!(node.plain_text(), "Hi");
    }

    #[test]
    fn test_null_attrs_and_content() {
        let node = parse(json!({"type": "paragraph", "attrs": null, "content": null}));
        assert_eq!(node.kind, NodeKind::Paragraph);
        assert!(node.content.is_empty());
    }

    #[test]
    fn test_media_attrs() {
        let node = parse(json!({
            "type": "media",
            "attrs": {"id": "abc", "collection": "contentId-1", "alt": "diagram.png", "type": "file"}
        }));
        assert_eq!(
            node.kind,
            NodeKind::Media(MediaRef {
                id: "abc".to_owned(),
                collection: "contentId-1".to_owned(),
                alt: Some("diagram.png".to_owned()),
                media_type: MediaType::File,
                url: None,
            })
        );
    }

    #[test]
    fn test_extension_macro_param() {
        let node = parse(json!({
            "type": "extension",
            "attrs": {
                "extensionKey": "jira",
                "extensionType": "com.atlassian.confluence.macro.core",
                "parameters": {"macroParams": {"key": {"value": "PROJ-42"}}}
            }
        }));
        let NodeKind::Extension(ext) = node.kind else {
            panic!("expected extension");
        };
        assert_eq!(ext.key, "jira");
        assert_eq!(ext.macro_param("key"), Some("PROJ-42"));
        assert_eq!(ext.macro_param("missing"), None);
    }

    #[test]
    fn test_date_timestamp_string_or_number() {
        let from_string = parse(json!({"type": "date", "attrs": {"timestamp": "1700000000000"}}));
        let from_number = parse(json!({"type": "date", "attrs": {"timestamp": 1_700_000_000_000_i64}}));
        assert_eq!(from_string.kind, from_number.kind);
        assert_eq!(
            from_string.kind,
            NodeKind::Date {
                timestamp: Some(1_700_000_000_000)
            }
        );
    }

    #[test]
    fn test_nested_expand_maps_to_expand() {
        let node = parse(json!({"type": "nestedExpand", "attrs": {"title": "More"}}));
        assert_eq!(
            node.kind,
            NodeKind::Expand {
                title: Some("More".to_owned())
            }
        );
    }

    #[test]
    fn test_invalid_json_is_error() {
        assert!(Node::from_json("{not json").is_err());
        assert!(Node::from_json(r#"{"content": []}"#).is_err());
    }

    #[test]
    fn test_plain_text_ignores_marks() {
        let node = parse(json!({
            "type": "heading",
            "attrs": {"level": 1},
            "content": [
                {"type": "text", "text": "Release "},
                {"type": "text", "text": "notes", "marks": [{"type": "strong"}]}
            ]
        }));
        assert_eq!(node.plain_text(), "Release notes");
    }
}
