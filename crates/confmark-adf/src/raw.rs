//! Wire shapes of ADF JSON and their conversion into typed nodes.
//!
//! ADF attributes are loosely typed (numbers sometimes arrive as strings), so
//! nodes are first read into [`RawNode`] and then converted.

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::node::{
    CellSpan, Emoji, Extension, Mark, MediaRef, MediaType, Node, NodeKind, Text,
};

type Attrs = Map<String, Value>;

#[derive(Deserialize)]
pub(crate) struct RawNode {
    #[serde(rename = "type")]
    node_type: String,
    #[serde(default)]
    attrs: Option<Attrs>,
    #[serde(default)]
    content: Option<Vec<Node>>,
    #[serde(default)]
    marks: Option<Vec<Mark>>,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Deserialize)]
pub(crate) struct RawMark {
    #[serde(rename = "type")]
    mark_type: String,
    #[serde(default)]
    attrs: Option<Attrs>,
}

impl From<RawMark> for Mark {
    fn from(raw: RawMark) -> Self {
        let attrs = raw.attrs.unwrap_or_default();
        match raw.mark_type.as_str() {
            "strong" => Mark::Strong,
            "em" => Mark::Em,
            "code" => Mark::Code,
            "link" => Mark::Link {
                href: str_attr(&attrs, "href").unwrap_or_default(),
            },
            _ => Mark::Other(raw.mark_type),
        }
    }
}

impl From<RawNode> for Node {
    fn from(raw: RawNode) -> Self {
        let attrs = raw.attrs.unwrap_or_default();
        let kind = match raw.node_type.as_str() {
            "doc" => NodeKind::Doc,
            "text" => NodeKind::Text(Text {
                text: raw.text.unwrap_or_default(),
                marks: raw.marks.unwrap_or_default(),
            }),
            "paragraph" => NodeKind::Paragraph,
            "heading" => NodeKind::Heading {
                level: int_attr(&attrs, "level")
                    .map_or(1, |level| level.clamp(1, 6))
                    .try_into()
                    .unwrap_or(1),
            },
            "bulletList" => NodeKind::BulletList,
            "orderedList" => NodeKind::OrderedList {
                order: int_attr(&attrs, "order")
                    .and_then(|order| u32::try_from(order).ok())
                    .unwrap_or(1),
            },
            "listItem" => NodeKind::ListItem,
            "table" => NodeKind::Table,
            "tableRow" => NodeKind::TableRow,
            "tableCell" => NodeKind::TableCell(cell_span(&attrs)),
            "tableHeader" => NodeKind::TableHeader(cell_span(&attrs)),
            "codeBlock" => NodeKind::CodeBlock {
                language: str_attr(&attrs, "language").filter(|lang| !lang.is_empty()),
            },
            "rule" => NodeKind::Rule,
            "mediaSingle" => NodeKind::MediaSingle,
            "media" | "mediaInline" => NodeKind::Media(media_ref(&attrs)),
            "caption" => NodeKind::Caption,
            "layoutSection" => NodeKind::LayoutSection,
            "layoutColumn" => NodeKind::LayoutColumn,
            "expand" | "nestedExpand" => NodeKind::Expand {
                title: str_attr(&attrs, "title").filter(|title| !title.trim().is_empty()),
            },
            "extension" | "inlineExtension" => NodeKind::Extension(Extension {
                key: str_attr(&attrs, "extensionKey").unwrap_or_default(),
                extension_type: str_attr(&attrs, "extensionType"),
                parameters: attrs.get("parameters").cloned().unwrap_or(Value::Null),
            }),
            "embedCard" => NodeKind::EmbedCard {
                url: str_attr(&attrs, "url").unwrap_or_default(),
            },
            "inlineCard" => NodeKind::InlineCard {
                url: str_attr(&attrs, "url").unwrap_or_default(),
            },
            "mention" => NodeKind::Mention {
                id: str_attr(&attrs, "id").unwrap_or_default(),
                text: str_attr(&attrs, "text").filter(|text| !text.is_empty()),
            },
            "emoji" => NodeKind::Emoji(Emoji {
                short_name: str_attr(&attrs, "shortName").unwrap_or_default(),
                id: str_attr(&attrs, "id").filter(|id| !id.is_empty()),
                text: str_attr(&attrs, "text").filter(|text| !text.is_empty()),
            }),
            "date" => NodeKind::Date {
                timestamp: int_attr(&attrs, "timestamp"),
            },
            "hardBreak" => NodeKind::HardBreak,
            "status" => NodeKind::Status {
                text: str_attr(&attrs, "text").unwrap_or_default(),
            },
            _ => NodeKind::Unknown {
                type_name: raw.node_type,
            },
        };

        Node {
            kind,
            content: raw.content.unwrap_or_default(),
        }
    }
}

fn cell_span(attrs: &Attrs) -> CellSpan {
    let span = |key| {
        int_attr(attrs, key)
            .and_then(|n| u32::try_from(n).ok())
            .filter(|&n| n > 0)
            .unwrap_or(1)
    };
    CellSpan {
        rowspan: span("rowspan"),
        colspan: span("colspan"),
    }
}

fn media_ref(attrs: &Attrs) -> MediaRef {
    let media_type = match str_attr(attrs, "type").as_deref() {
        Some("external") => MediaType::External,
        Some("link") => MediaType::Link,
        _ => MediaType::File,
    };
    MediaRef {
        id: str_attr(attrs, "id").unwrap_or_default(),
        collection: str_attr(attrs, "collection").unwrap_or_default(),
        alt: str_attr(attrs, "alt").filter(|alt| !alt.is_empty()),
        media_type,
        url: str_attr(attrs, "url"),
    }
}

/// String attribute; numbers are stringified.
fn str_attr(attrs: &Attrs, key: &str) -> Option<String> {
    match attrs.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Integer attribute; numeric strings are parsed.
fn int_attr(attrs: &Attrs, key: &str) -> Option<i64> {
    match attrs.get(key)? {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f as i64)),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}
