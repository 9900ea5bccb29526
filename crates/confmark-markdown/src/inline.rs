//! Inline text extraction.
//!
//! Renders any subtree to a flat Markdown string. Leaf kinds have their own
//! rendering, every container concatenates its children.

use chrono::DateTime;
use confmark_adf::{Mark, Node, NodeKind, Text};

use crate::cards;
use crate::emoji::render_emoji;
use crate::renderer::MarkdownRenderer;

/// Delimiters that would merge with an adjacent fragment.
const DELIMITERS: &[&str] = &["**", "*", "`"];

impl MarkdownRenderer<'_> {
    /// Render a node as inline Markdown.
    pub(crate) fn inline_text(&mut self, node: &Node) -> String {
        match &node.kind {
            NodeKind::Text(text) => apply_marks(text),
            NodeKind::Status { text } => text.clone(),
            NodeKind::Mention { id, text } => text.clone().unwrap_or_else(|| format!("@{id}")),
            NodeKind::HardBreak => "\n".to_owned(),
            NodeKind::Emoji(emoji) => render_emoji(emoji),
            NodeKind::Date { timestamp } => timestamp.and_then(format_date).unwrap_or_default(),
            NodeKind::InlineCard { url } => self.inline_card(url, None),
            NodeKind::EmbedCard { url } => cards::embed_card(url),
            NodeKind::Media(media) => self.media_markdown(media).unwrap_or_default(),
            NodeKind::Extension(extension) => self.extension(extension),
            NodeKind::Doc
            | NodeKind::Paragraph
            | NodeKind::Heading { .. }
            | NodeKind::BulletList
            | NodeKind::OrderedList { .. }
            | NodeKind::ListItem
            | NodeKind::Table
            | NodeKind::TableRow
            | NodeKind::TableCell(_)
            | NodeKind::TableHeader(_)
            | NodeKind::CodeBlock { .. }
            | NodeKind::Rule
            | NodeKind::MediaSingle
            | NodeKind::Caption
            | NodeKind::LayoutSection
            | NodeKind::LayoutColumn
            | NodeKind::Expand { .. }
            | NodeKind::Unknown { .. } => self.inline_children(&node.content),
        }
    }

    /// Concatenate rendered children.
    ///
    /// A text node directly followed by an inline card becomes the card's label.
    pub(crate) fn inline_children(&mut self, children: &[Node]) -> String {
        let mut fragments = Vec::with_capacity(children.len());
        let mut index = 0;
        while index < children.len() {
            let child = &children[index];
            if let (Some(text), Some(next)) = (child.as_text(), children.get(index + 1))
                && let NodeKind::InlineCard { url } = &next.kind
                && is_card_label(text)
            {
                fragments.push(self.inline_card(url, Some(text.text.trim())));
                index += 2;
                continue;
            }
            fragments.push(self.inline_text(child));
            index += 1;
        }
        join_fragments(&fragments)
    }

    fn inline_card(&mut self, url: &str, label: Option<&str>) -> String {
        if url.is_empty() {
            return label.unwrap_or_default().to_owned();
        }
        let title = match label {
            Some(label) => label.to_owned(),
            None => self.card_title(url),
        };
        format!("[{title}]({url})")
    }

    fn card_title(&mut self, url: &str) -> String {
        match self.resolver.fetch_title(url) {
            Ok(Some(title)) if !title.trim().is_empty() => title.trim().to_owned(),
            Ok(_) => cards::title_from_url(url),
            Err(err) => {
                self.warn(format!("Failed to fetch title for {url}: {err}"));
                cards::title_from_url(url)
            }
        }
    }
}

/// Text usable as an inline card label.
fn is_card_label(text: &Text) -> bool {
    text.link().is_none() && text.text.chars().any(char::is_alphanumeric)
}

/// Apply marks to a text run.
///
/// A link wins outright. Otherwise strong, em and code wrap in that order,
/// with surrounding whitespace kept outside the delimiters.
fn apply_marks(text: &Text) -> String {
    if let Some(href) = text.link() {
        return format!("[{}]({href})", text.text);
    }

    let core = text.text.trim();
    if core.is_empty() {
        return text.text.clone();
    }
    let start = text.text.len() - text.text.trim_start().len();
    let leading = &text.text[..start];
    let trailing = &text.text[start + core.len()..];

    let mut out = core.to_owned();
    if text.has_mark(&Mark::Strong) {
        out = format!("**{out}**");
    }
    if text.has_mark(&Mark::Em) {
        out = format!("*{out}*");
    }
    if text.has_mark(&Mark::Code) {
        out = format!("`{out}`");
    }
    format!("{leading}{out}{trailing}")
}

/// Join fragments, separating a closing delimiter from directly following text.
fn join_fragments(fragments: &[String]) -> String {
    let mut out = String::new();
    for fragment in fragments.iter().filter(|f| !f.is_empty()) {
        let merges = DELIMITERS.iter().any(|d| out.ends_with(d))
            && !fragment.starts_with(char::is_whitespace);
        if merges {
            out.push(' ');
        }
        out.push_str(fragment);
    }
    out
}

/// Format a millisecond timestamp as a UTC calendar date.
fn format_date(millis: i64) -> Option<String> {
    DateTime::from_timestamp_millis(millis).map(|date| date.format("%Y-%m-%d").to_string())
}
