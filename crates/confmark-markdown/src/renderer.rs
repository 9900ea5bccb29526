//! Block-level Markdown renderer.

use std::collections::HashMap;

use confmark_adf::{Extension, MediaRef, MediaType, Node, NodeKind};
use tracing::{debug, warn};

use crate::cards;
use crate::resolver::Resolver;
use crate::toc::{self, TocEntry};

/// Title used for expand sections without one.
const DEFAULT_EXPAND_TITLE: &str = "Details";

/// Marker of top-level bullet items.
const BULLET: &str = "• ";

/// Result of rendering a document.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RenderResult {
    /// Rendered Markdown, blocks separated by a blank line.
    pub markdown: String,
    /// Top-level headings in document order.
    pub toc: Vec<TocEntry>,
    /// Absorbed collaborator failures.
    pub warnings: Vec<String>,
}

/// Document tree to Markdown renderer.
///
/// Holds the state of a single conversion (headings, media cache, warnings)
/// and is consumed by [`MarkdownRenderer::render`].
///
/// # Example
///
/// ```
/// use confmark_adf::Node;
/// use confmark_markdown::{MarkdownRenderer, NoopResolver};
///
/// let doc = Node::from_json(r#"{"type":"doc","content":[
///     {"type":"heading","attrs":{"level":2},"content":[{"type":"text","text":"Scope"}]}
/// ]}"#).unwrap();
/// let mut resolver = NoopResolver;
/// let result = MarkdownRenderer::new(&mut resolver).render(&doc);
/// assert_eq!(result.markdown, "## Scope");
/// ```
pub struct MarkdownRenderer<'r> {
    pub(crate) resolver: &'r mut dyn Resolver,
    toc: Vec<TocEntry>,
    media_cache: HashMap<MediaRef, Option<String>>,
    pub(crate) warnings: Vec<String>,
}

impl<'r> MarkdownRenderer<'r> {
    /// Create a renderer that performs lookups through `resolver`.
    pub fn new(resolver: &'r mut dyn Resolver) -> Self {
        Self {
            resolver,
            toc: Vec::new(),
            media_cache: HashMap::new(),
            warnings: Vec::new(),
        }
    }

    /// Render a document root.
    pub fn render(mut self, root: &Node) -> RenderResult {
        self.toc = toc::collect_headings(root);
        let markdown = self.render_blocks(&root.content).join("\n\n");
        RenderResult {
            markdown,
            toc: self.toc,
            warnings: self.warnings,
        }
    }

    fn render_blocks(&mut self, nodes: &[Node]) -> Vec<String> {
        nodes
            .iter()
            .filter_map(|node| self.render_block(node))
            .filter(|block| !block.trim().is_empty())
            .collect()
    }

    fn render_block(&mut self, node: &Node) -> Option<String> {
        match &node.kind {
            NodeKind::Paragraph => Some(self.inline_children(&node.content)),
            NodeKind::Heading { level } => self.heading(*level, node),
            NodeKind::BulletList | NodeKind::OrderedList { .. } => Some(self.list(node)),
            NodeKind::Table => Some(self.render_table(node)),
            NodeKind::CodeBlock { language } => code_block(language.as_deref(), node),
            NodeKind::Rule => Some("---".to_owned()),
            NodeKind::Expand { title } => Some(self.expand(title.as_deref(), node)),
            NodeKind::Extension(extension) => Some(self.extension(extension)),
            NodeKind::EmbedCard { url } => Some(cards::embed_card(url)),
            NodeKind::MediaSingle => self.media_single(node),
            NodeKind::Media(media) => self.media_markdown(media),
            NodeKind::Doc | NodeKind::LayoutSection | NodeKind::LayoutColumn => {
                Some(self.render_blocks(&node.content).join("\n\n"))
            }
            NodeKind::Text(_)
            | NodeKind::ListItem
            | NodeKind::TableRow
            | NodeKind::TableCell(_)
            | NodeKind::TableHeader(_)
            | NodeKind::Caption
            | NodeKind::InlineCard { .. }
            | NodeKind::Mention { .. }
            | NodeKind::Emoji(_)
            | NodeKind::Date { .. }
            | NodeKind::HardBreak
            | NodeKind::Status { .. }
            | NodeKind::Unknown { .. } => {
                if let NodeKind::Unknown { type_name } = &node.kind {
                    debug!(node_type = %type_name, "Rendering unknown node as text");
                    if node.content.iter().any(is_block) {
                        return Some(self.render_blocks(&node.content).join("\n\n"));
                    }
                }
                Some(self.inline_text(node))
            }
        }
    }

    fn heading(&mut self, level: u8, node: &Node) -> Option<String> {
        let text = self.inline_children(&node.content).replace('\n', " ");
        let text = text.trim();
        (!text.is_empty()).then(|| format!("{} {text}", "#".repeat(usize::from(level))))
    }

    fn list(&mut self, list: &Node) -> String {
        let ordered = matches!(list.kind, NodeKind::OrderedList { .. });
        let continuation = if ordered { 3 } else { 2 };
        let mut lines = Vec::new();
        for (number, item) in (1..).zip(list_items(list)) {
            let marker = if ordered {
                format!("{number}. ")
            } else {
                BULLET.to_owned()
            };
            self.list_item(item, &marker, continuation, &mut lines);
        }
        lines.join("\n")
    }

    /// Nested lists are flattened one indent level below their parent item.
    fn nested_list(&mut self, list: &Node, indent: usize, lines: &mut Vec<String>) {
        let ordered = matches!(list.kind, NodeKind::OrderedList { .. });
        let pad = " ".repeat(indent);
        for (number, item) in (1..).zip(list_items(list)) {
            let (marker, width) = if ordered {
                (format!("{pad}{number}. "), 3)
            } else {
                (format!("{pad}- "), 2)
            };
            self.list_item(item, &marker, indent + width, lines);
        }
    }

    /// First text block is the primary line, later blocks are continuations.
    fn list_item(&mut self, item: &Node, marker: &str, indent: usize, lines: &mut Vec<String>) {
        let pad = " ".repeat(indent);
        let mut primary = true;
        for child in &item.content {
            if matches!(child.kind, NodeKind::BulletList | NodeKind::OrderedList { .. }) {
                self.nested_list(child, indent, lines);
                continue;
            }
            let text = self.inline_text(child);
            let text = text.trim();
            if text.is_empty() {
                continue;
            }
            let text = text.replace('\n', &format!("\n{pad}"));
            if primary {
                lines.push(format!("{marker}{text}"));
                primary = false;
            } else {
                lines.push(format!("{pad}{text}"));
            }
        }
    }

    fn expand(&mut self, title: Option<&str>, node: &Node) -> String {
        let mut blocks = vec![format!("### {}", title.unwrap_or(DEFAULT_EXPAND_TITLE))];
        for child in &node.content {
            let block = match &child.kind {
                NodeKind::Heading { level } => self.heading((level + 1).min(6), child),
                NodeKind::Paragraph
                | NodeKind::BulletList
                | NodeKind::OrderedList { .. }
                | NodeKind::Rule
                | NodeKind::Table
                | NodeKind::CodeBlock { .. } => self.render_block(child),
                _ => Some(self.inline_text(child)),
            };
            if let Some(block) = block.filter(|b| !b.trim().is_empty()) {
                blocks.push(block);
            }
        }
        blocks.join("\n\n")
    }

    pub(crate) fn extension(&mut self, extension: &Extension) -> String {
        match extension.key.as_str() {
            "toc" => toc::render_toc(&self.toc),
            "jira" => extension
                .macro_param("key")
                .unwrap_or_default()
                .to_owned(),
            key => {
                debug!(extension = key, "Skipping extension");
                String::new()
            }
        }
    }

    fn media_single(&mut self, node: &Node) -> Option<String> {
        let media = node.content.iter().find_map(|child| match &child.kind {
            NodeKind::Media(media) => Some(media),
            _ => None,
        })?;
        let mut out = self.media_markdown(media)?;

        let caption = node
            .content
            .iter()
            .find(|child| matches!(child.kind, NodeKind::Caption));
        if let Some(caption) = caption {
            let text = self.inline_children(&caption.content);
            let text = text.trim();
            if !text.is_empty() {
                out.push_str(&format!("\n*{text}*"));
            }
        }
        Some(out)
    }

    /// `![alt](path)` for a media item, or `None` when it cannot be resolved.
    pub(crate) fn media_markdown(&mut self, media: &MediaRef) -> Option<String> {
        let path = self.resolve_media(media)?;
        Some(format!("![{}]({path})", media.alt.as_deref().unwrap_or_default()))
    }

    fn resolve_media(&mut self, media: &MediaRef) -> Option<String> {
        if media.media_type == MediaType::External {
            return media.url.clone().filter(|url| !url.is_empty());
        }
        if let Some(cached) = self.media_cache.get(media) {
            return cached.clone();
        }

        let resolved = match self.resolver.resolve_media(media) {
            Ok(path) => path,
            Err(err) => {
                self.warn(format!("Failed to resolve media {}: {err}", media.id));
                None
            }
        };
        if resolved.is_none() {
            debug!(media_id = %media.id, "Media not resolved");
        }
        self.media_cache.insert(media.clone(), resolved.clone());
        resolved
    }

    pub(crate) fn warn(&mut self, message: String) {
        warn!("{message}");
        self.warnings.push(message);
    }
}

/// Whether a node renders as a block of its own rather than inline text.
fn is_block(node: &Node) -> bool {
    matches!(
        node.kind,
        NodeKind::Paragraph
            | NodeKind::Heading { .. }
            | NodeKind::BulletList
            | NodeKind::OrderedList { .. }
            | NodeKind::Table
            | NodeKind::CodeBlock { .. }
            | NodeKind::Rule
            | NodeKind::Expand { .. }
            | NodeKind::MediaSingle
            | NodeKind::LayoutSection
            | NodeKind::LayoutColumn
    )
}

fn list_items(list: &Node) -> impl Iterator<Item = &Node> {
    list.content
        .iter()
        .filter(|node| matches!(node.kind, NodeKind::ListItem))
}

fn code_block(language: Option<&str>, node: &Node) -> Option<String> {
    let mut body = String::new();
    for child in &node.content {
        match &child.kind {
            NodeKind::Text(text) => body.push_str(&text.text),
            NodeKind::HardBreak => body.push('\n'),
            _ => body.push_str(&child.plain_text()),
        }
    }
    if body.trim().is_empty() {
        return None;
    }
    let newline = if body.ends_with('\n') { "" } else { "\n" };
    Some(format!(
        "```{}\n{body}{newline}```",
        language.unwrap_or_default()
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::{NoopResolver, ResolveError};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn render(content: serde_json::Value) -> RenderResult {
        render_with(content, &mut NoopResolver)
    }

    fn render_with(content: serde_json::Value, resolver: &mut dyn Resolver) -> RenderResult {
        let doc = Node::from_value(json!({"type": "doc", "content": content})).unwrap();
        MarkdownRenderer::new(resolver).render(&doc)
    }

    fn para(text: &str) -> serde_json::Value {
        json!({"type": "paragraph", "content": [{"type": "text", "text": text}]})
    }

    fn heading(level: u8, text: &str) -> serde_json::Value {
        json!({"type": "heading", "attrs": {"level": level}, "content": [{"type": "text", "text": text}]})
    }

    fn item(blocks: Vec<serde_json::Value>) -> serde_json::Value {
        json!({"type": "listItem", "content": blocks})
    }

    /// Resolver that maps media ids to `assets/{id}.png` and counts calls.
    #[derive(Default)]
    struct Assets {
        calls: usize,
    }

    impl Resolver for Assets {
        fn resolve_media(&mut self, media: &MediaRef) -> Result<Option<String>, ResolveError> {
            self.calls += 1;
            match media.id.as_str() {
                "missing" => Ok(None),
                "error" => Err(ResolveError::new("download failed")),
                id => Ok(Some(format!("assets/{id}.png"))),
            }
        }

        fn fetch_title(&mut self, _url: &str) -> Result<Option<String>, ResolveError> {
            Ok(None)
        }
    }

    fn media(id: &str) -> serde_json::Value {
        json!({"type": "media", "attrs": {"id": id, "collection": "contentId-1", "alt": "diagram", "type": "file"}})
    }

    #[test]
    fn test_heading_levels() {
        for level in 1..=6u8 {
            let result = render(json!([heading(level, "Scope")]));
            assert_eq!(result.markdown, format!("{} Scope", "#".repeat(level.into())));
        }
    }

    #[test]
    fn test_empty_heading_dropped() {
        let result = render(json!([heading(2, "  "), para("Body")]));
        assert_eq!(result.markdown, "Body");
    }

    #[test]
    fn test_blocks_joined_with_blank_line() {
        let result = render(json!([
            heading(1, "Title"),
            para("First"),
            {"type": "paragraph", "content": []},
            {"type": "rule"},
            para("Second")
        ]));
        assert_eq!(result.markdown, "# Title\n\nFirst\n\n---\n\nSecond");
    }

    #[test]
    fn test_bullet_list_with_continuation_and_nesting() {
        let result = render(json!([{
            "type": "bulletList",
            "content": [
                item(vec![para("One"), para("more about one")]),
                item(vec![
                    para("Two"),
                    json!({"type": "bulletList", "content": [item(vec![para("Two A")])]}),
                    json!({"type": "orderedList", "content": [item(vec![para("Step")])]})
                ]),
                item(vec![para("  ")])
            ]
        }]));
        assert_eq!(
            result.markdown,
            "• One\n  more about one\n• Two\n  - Two A\n  1. Step"
        );
    }

    #[test]
    fn test_ordered_list_numbering_and_continuation() {
        let result = render(json!([{
            "type": "orderedList",
            "attrs": {"order": 5},
            "content": [
                item(vec![para("First"), para("detail")]),
                item(vec![
                    para("Second"),
                    json!({"type": "bulletList", "content": [item(vec![
                        para("deep"),
                        json!({"type": "bulletList", "content": [item(vec![para("deeper")])]})
                    ])]})
                ])
            ]
        }]));
        assert_eq!(
            result.markdown,
            "1. First\n   detail\n2. Second\n   - deep\n     - deeper"
        );
    }

    #[test]
    fn test_code_block() {
        let result = render(json!([
            {"type": "codeBlock", "attrs": {"language": "rust"}, "content": [{"type": "text", "text": "fn main() {}\n  // *not* markdown"}]},
            {"type": "codeBlock", "content": [{"type": "text", "text": "plain"}]},
            {"type": "codeBlock", "content": [{"type": "text", "text": "  \n"}]}
        ]));
        assert_eq!(
            result.markdown,
            "```rust\nfn main() {}\n  // *not* markdown\n```\n\n```\nplain\n```"
        );
    }

    #[test]
    fn test_expand_shifts_headings() {
        let result = render(json!([{
            "type": "expand",
            "attrs": {"title": "More info"},
            "content": [
                heading(2, "Inside"),
                heading(6, "Deepest"),
                para("Text"),
                {"type": "status", "attrs": {"text": "DONE"}}
            ]
        }, {
            "type": "nestedExpand",
            "content": [para("hidden")]
        }]));
        assert_eq!(
            result.markdown,
            "### More info\n\n### Inside\n\n###### Deepest\n\nText\n\nDONE\n\n### Details\n\nhidden"
        );
    }

    #[test]
    fn test_toc_extension() {
        let result = render(json!([
            {"type": "extension", "attrs": {"extensionKey": "toc"}},
            heading(1, "Intro"),
            heading(2, "Setup Steps"),
            heading(4, "Deep")
        ]));
        assert_eq!(
            result.markdown,
            "- [Intro](#intro)\n- [Setup Steps](#setup-steps)\n\n# Intro\n\n## Setup Steps\n\n#### Deep"
        );
        let levels: Vec<u8> = result.toc.iter().map(|entry| entry.level).collect();
        assert_eq!(levels, vec![1, 2, 4]);
    }

    #[test]
    fn test_toc_indents_third_level() {
        let result = render(json!([
            {"type": "extension", "attrs": {"extensionKey": "toc"}},
            heading(2, "Usage"),
            heading(3, "Flags")
        ]));
        assert!(result.markdown.starts_with("- [Usage](#usage)\n   - [Flags](#flags)\n\n"));
    }

    #[test]
    fn test_jira_and_unknown_extensions() {
        let result = render(json!([
            {"type": "extension", "attrs": {
                "extensionKey": "jira",
                "parameters": {"macroParams": {"key": {"value": "PROJ-7"}}}
            }},
            {"type": "extension", "attrs": {"extensionKey": "children"}},
            para("after")
        ]));
        assert_eq!(result.markdown, "PROJ-7\n\nafter");
    }

    #[test]
    fn test_layout_renders_blocks() {
        let result = render(json!([{
            "type": "layoutSection",
            "content": [
                {"type": "layoutColumn", "content": [heading(2, "Left"), para("l")]},
                {"type": "layoutColumn", "content": [para("r")]}
            ]
        }]));
        assert_eq!(result.markdown, "## Left\n\nl\n\nr");
        assert!(result.toc.is_empty());
    }

    #[test]
    fn test_media_single_with_caption() {
        let mut assets = Assets::default();
        let result = render_with(
            json!([{
                "type": "mediaSingle",
                "content": [
                    media("img1"),
                    {"type": "caption", "content": [{"type": "text", "text": "Architecture"}]}
                ]
            }]),
            &mut assets,
        );
        assert_eq!(result.markdown, "![diagram](assets/img1.png)\n*Architecture*");
    }

    #[test]
    fn test_media_resolved_once_per_reference() {
        let mut assets = Assets::default();
        let result = render_with(
            json!([
                {"type": "mediaSingle", "content": [media("img1")]},
                {"type": "mediaSingle", "content": [media("img1")]},
                {"type": "mediaSingle", "content": [media("missing")]},
                {"type": "mediaSingle", "content": [media("missing")]}
            ]),
            &mut assets,
        );
        assert_eq!(
            result.markdown,
            "![diagram](assets/img1.png)\n\n![diagram](assets/img1.png)"
        );
        assert_eq!(assets.calls, 2);
    }

    #[test]
    fn test_media_failure_becomes_warning() {
        let mut assets = Assets::default();
        let result = render_with(
            json!([
                {"type": "mediaSingle", "content": [
                    media("error"),
                    {"type": "caption", "content": [{"type": "text", "text": "lost"}]}
                ]},
                para("kept")
            ]),
            &mut assets,
        );
        assert_eq!(result.markdown, "kept");
        assert_eq!(result.warnings, vec!["Failed to resolve media error: download failed"]);
    }

    #[test]
    fn test_external_media_uses_url() {
        let mut assets = Assets::default();
        let result = render_with(
            json!([{"type": "mediaSingle", "content": [{
                "type": "media",
                "attrs": {"type": "external", "url": "https://cdn.example.com/a.png", "alt": "logo"}
            }]}]),
            &mut assets,
        );
        assert_eq!(result.markdown, "![logo](https://cdn.example.com/a.png)");
        assert_eq!(assets.calls, 0);
    }

    #[test]
    fn test_embed_card_block() {
        let result = render(json!([
            {"type": "embedCard", "attrs": {"url": "https://www.figma.com/design/K1/Onboarding"}}
        ]));
        assert_eq!(
            result.markdown,
            "**Figma:** [Onboarding](https://www.figma.com/design/K1/Onboarding)"
        );
    }

    #[test]
    fn test_unknown_block_falls_back_to_text() {
        let result = render(json!([{
            "type": "panel",
            "attrs": {"panelType": "warning"},
            "content": [para("Careful")]
        }]));
        assert_eq!(result.markdown, "Careful");
    }

    #[test]
    fn test_unknown_container_keeps_blocks_apart() {
        let result = render(json!([{
            "type": "panel",
            "content": [para("First"), para("Second"), heading(3, "Third")]
        }]));
        assert_eq!(result.markdown, "First\n\nSecond\n\n### Third");
    }

    #[test]
    fn test_unknown_inline_node_stays_inline() {
        let result = render(json!([{
            "type": "placeholder",
            "content": [{"type": "text", "text": "one "}, {"type": "text", "text": "line"}]
        }]));
        assert_eq!(result.markdown, "one line");
    }

    #[test]
    fn test_hard_break_in_heading_stays_on_one_line() {
        let result = render(json!([{
            "type": "heading",
            "attrs": {"level": 2},
            "content": [
                {"type": "text", "text": "Part"},
                {"type": "hardBreak"},
                {"type": "text", "text": "Two"}
            ]
        }]));
        assert_eq!(result.markdown, "## Part Two");
    }

    #[test]
    fn test_table_block() {
        let result = render(json!([{
            "type": "table",
            "content": [{"type": "tableRow", "content": [
                {"type": "tableHeader", "content": [para("a")]},
                {"type": "tableHeader", "content": [para("b")]}
            ]}]
        }]));
        assert_eq!(result.markdown, "| a | b |\n| --- | --- |");
    }
}
