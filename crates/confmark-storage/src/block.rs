//! Line-oriented block scanner.

use std::sync::LazyLock;

use regex::Regex;
use tracing::debug;

use crate::inline::InlineConverter;
use crate::xml::{cdata, escape};
use crate::StorageOutput;

static FENCE_LANGUAGE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^```(\w*)").unwrap());
static RULE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^---+\s*$").unwrap());
static HEADING: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^(#{1,6})\s+(.+)$").unwrap());
static TABLE_SEPARATOR: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^[\s|:-]+$").unwrap());
static LIST_ITEM: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*([-*+•]|\d+\.)\s+(.+)$").unwrap());
static QUOTE_MARKER: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^>\s?").unwrap());

const FENCE: &str = "```";

/// Width of a tab when measuring list indentation.
const TAB_WIDTH: usize = 4;

/// Kind of block starting at a line.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum BlockStart {
    Fence,
    Rule,
    Heading,
    Table,
    List,
    Quote,
    Blank,
    Paragraph,
}

/// List item marker and text.
struct ListLine<'a> {
    ordered: bool,
    text: &'a str,
}

pub(crate) struct BlockParser<'a> {
    lines: Vec<&'a str>,
    pos: usize,
    images: Vec<String>,
}

impl<'a> BlockParser<'a> {
    pub(crate) fn new(markdown: &'a str) -> Self {
        Self {
            lines: markdown.lines().collect(),
            pos: 0,
            images: Vec::new(),
        }
    }

    pub(crate) fn parse(mut self) -> StorageOutput {
        let mut blocks = Vec::new();
        while self.pos < self.lines.len() {
            let block = match self.block_start(self.pos) {
                BlockStart::Fence => self.code_block(),
                BlockStart::Rule => {
                    self.pos += 1;
                    "<hr/>".to_owned()
                }
                BlockStart::Heading => self.heading(),
                BlockStart::Table => self.table(),
                BlockStart::List => {
                    let indent = indent_of(self.lines[self.pos]);
                    self.list(indent)
                }
                BlockStart::Quote => self.blockquote(),
                BlockStart::Blank => {
                    self.pos += 1;
                    continue;
                }
                BlockStart::Paragraph => self.paragraph(),
            };
            blocks.push(block);
        }

        StorageOutput {
            markup: blocks.join("\n"),
            images: self.images,
        }
    }

    /// First matching rule wins.
    fn block_start(&self, index: usize) -> BlockStart {
        let line = self.lines[index];
        let trimmed = line.trim();
        if trimmed.starts_with(FENCE) {
            BlockStart::Fence
        } else if RULE.is_match(trimmed) {
            BlockStart::Rule
        } else if HEADING.is_match(line) {
            BlockStart::Heading
        } else if line.contains('|')
            && self
                .lines
                .get(index + 1)
                .is_some_and(|next| is_table_separator(next))
        {
            BlockStart::Table
        } else if LIST_ITEM.is_match(line) {
            BlockStart::List
        } else if trimmed.starts_with('>') {
            BlockStart::Quote
        } else if trimmed.is_empty() {
            BlockStart::Blank
        } else {
            BlockStart::Paragraph
        }
    }

    fn inline(&mut self, text: &str) -> String {
        InlineConverter::new(&mut self.images).convert(text)
    }

    fn code_block(&mut self) -> String {
        let opening = self.lines[self.pos].trim();
        let language = FENCE_LANGUAGE
            .captures(opening)
            .and_then(|caps| caps.get(1))
            .map_or("", |m| m.as_str());
        self.pos += 1;

        let mut code = Vec::new();
        while let Some(&line) = self.lines.get(self.pos) {
            self.pos += 1;
            if line.trim() == FENCE {
                break;
            }
            code.push(line);
        }

        let mut out = r#"<ac:structured-macro ac:name="code">"#.to_owned();
        if !language.is_empty() {
            out.push_str(&format!(
                r#"<ac:parameter ac:name="language">{}</ac:parameter>"#,
                escape(language)
            ));
        }
        out.push_str(&format!(
            "<ac:plain-text-body>{}</ac:plain-text-body></ac:structured-macro>",
            cdata(&code.join("\n"))
        ));
        out
    }

    fn heading(&mut self) -> String {
        let line = self.lines[self.pos];
        self.pos += 1;
        let Some(caps) = HEADING.captures(line) else {
            return String::new();
        };
        let level = caps[1].len();
        let text = self.inline(caps[2].trim());
        format!("<h{level}>{text}</h{level}>")
    }

    fn table(&mut self) -> String {
        let header = split_row(self.lines[self.pos]);
        self.pos += 2;

        let mut rows = vec![self.table_row(&header, "th")];
        while let Some(&line) = self.lines.get(self.pos) {
            if !line.contains('|') || line.trim().is_empty() {
                break;
            }
            self.pos += 1;
            rows.push(self.table_row(&split_row(line), "td"));
        }
        format!("<table><tbody>{}</tbody></table>", rows.concat())
    }

    fn table_row(&mut self, cells: &[String], tag: &str) -> String {
        let cells: String = cells
            .iter()
            .map(|cell| format!("<{tag}>{}</{tag}>", self.inline(cell)))
            .collect();
        format!("<tr>{cells}</tr>")
    }

    /// List at `indent`. Deeper markers open a nested list inside the previous
    /// item, deeper plain lines continue it. A blank line ends every level.
    fn list(&mut self, indent: usize) -> String {
        let ordered = self
            .list_line(self.pos)
            .is_some_and(|item| item.ordered);
        let mut items: Vec<String> = Vec::new();

        while let Some(&line) = self.lines.get(self.pos) {
            if line.trim().is_empty() {
                break;
            }
            let line_indent = indent_of(line);
            match self.list_line(self.pos) {
                Some(item) if line_indent == indent => {
                    if item.ordered != ordered {
                        break;
                    }
                    let text = item.text.trim();
                    self.pos += 1;
                    items.push(self.inline(text));
                }
                Some(_) if line_indent > indent => {
                    let nested = self.list(line_indent);
                    match items.last_mut() {
                        Some(last) => last.push_str(&nested),
                        None => items.push(nested),
                    }
                }
                None if line_indent > indent && !items.is_empty() => {
                    self.pos += 1;
                    let text = self.inline(line.trim());
                    if let Some(last) = items.last_mut() {
                        last.push_str("<br/>");
                        last.push_str(&text);
                    }
                }
                _ => break,
            }
        }

        let tag = if ordered { "ol" } else { "ul" };
        let items: String = items.iter().map(|item| format!("<li>{item}</li>")).collect();
        format!("<{tag}>{items}</{tag}>")
    }

    fn list_line(&self, index: usize) -> Option<ListLine<'a>> {
        let line = *self.lines.get(index)?;
        let caps = LIST_ITEM.captures(line)?;
        let marker = caps.get(1)?.as_str();
        Some(ListLine {
            ordered: marker.ends_with('.'),
            text: caps.get(2)?.as_str(),
        })
    }

    fn blockquote(&mut self) -> String {
        let mut quoted = Vec::new();
        while let Some(&line) = self.lines.get(self.pos) {
            let trimmed = line.trim_start();
            if !trimmed.starts_with('>') {
                break;
            }
            self.pos += 1;
            quoted.push(QUOTE_MARKER.replace(trimmed, "").into_owned());
        }
        let inner = self.inline(&quoted.join("\n"));
        format!("<blockquote><p>{inner}</p></blockquote>")
    }

    /// Consecutive plain lines form one paragraph joined by line breaks.
    fn paragraph(&mut self) -> String {
        let mut parts = Vec::new();
        loop {
            let line = self.lines[self.pos].trim();
            self.pos += 1;
            parts.push(self.inline(line));
            if self.pos >= self.lines.len() || self.block_start(self.pos) != BlockStart::Paragraph {
                break;
            }
        }
        if parts.len() > 1 {
            debug!(lines = parts.len(), "Joined paragraph lines");
        }
        format!("<p>{}</p>", parts.join("<br/>"))
    }
}

fn is_table_separator(line: &str) -> bool {
    TABLE_SEPARATOR.is_match(line) && line.contains('-')
}

/// Split a table row into trimmed cells, honouring `\|` escapes.
fn split_row(line: &str) -> Vec<String> {
    let line = line.trim();
    let line = line.strip_prefix('|').unwrap_or(line);
    let line = if line.ends_with('|') && !line.ends_with("\\|") {
        &line[..line.len() - 1]
    } else {
        line
    };

    let mut cells = Vec::new();
    let mut cell = String::new();
    let mut chars = line.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\\' if chars.peek() == Some(&'|') => {
                cell.push('|');
                chars.next();
            }
            '|' => cells.push(std::mem::take(&mut cell).trim().to_owned()),
            _ => cell.push(c),
        }
    }
    cells.push(cell.trim().to_owned());
    cells
}

fn indent_of(line: &str) -> usize {
    line.chars()
        .take_while(|c| c.is_whitespace())
        .map(|c| if c == '\t' { TAB_WIDTH } else { 1 })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn markup(markdown: &str) -> String {
        BlockParser::new(markdown).parse().markup
    }

    #[test]
    fn test_two_column_table_header_only() {
        assert_eq!(
            markup("| a | b |\n| --- | --- |"),
            "<table><tbody><tr><th>a</th><th>b</th></tr></tbody></table>"
        );
    }

    #[test]
    fn test_table_rows_and_escaped_pipes() {
        assert_eq!(
            markup("| Key | Value |\n|:---|---:|\n| a\\|b | **x** |\n| c | |\n\nafter"),
            "<table><tbody><tr><th>Key</th><th>Value</th></tr>\
             <tr><td>a|b</td><td><strong>x</strong></td></tr>\
             <tr><td>c</td><td></td></tr></tbody></table>\n<p>after</p>"
        );
    }

    #[test]
    fn test_separator_needs_dash() {
        assert_eq!(markup("a | b\n| |"), "<p>a | b<br/>| |</p>");
    }

    #[test]
    fn test_headings_and_rule() {
        assert_eq!(
            markup("# One\n###### Six\n####### Seven\n---\n#nospace"),
            "<h1>One</h1>\n<h6>Six</h6>\n<p>####### Seven</p>\n<hr/>\n<p>#nospace</p>"
        );
    }

    #[test]
    fn test_code_block() {
        assert_eq!(
            markup("```rust\nlet x = a[b[0]];\n  *raw* <tag>\n```\ntext"),
            "<ac:structured-macro ac:name=\"code\">\
             <ac:parameter ac:name=\"language\">rust</ac:parameter>\
             <ac:plain-text-body><![CDATA[let x = a[b[0]];\n  *raw* <tag>]]></ac:plain-text-body>\
             </ac:structured-macro>\n<p>text</p>"
        );
    }

    #[test]
    fn test_code_block_without_language_or_closing_fence() {
        assert_eq!(
            markup("```\nopen"),
            "<ac:structured-macro ac:name=\"code\">\
             <ac:plain-text-body><![CDATA[open]]></ac:plain-text-body>\
             </ac:structured-macro>"
        );
    }

    #[test]
    fn test_lists_by_marker() {
        assert_eq!(
            markup("• one\n- two\n* three\n\n1. first\n2. second"),
            "<ul><li>one</li><li>two</li><li>three</li></ul>\n<ol><li>first</li><li>second</li></ol>"
        );
    }

    #[test]
    fn test_list_type_change_starts_new_list() {
        assert_eq!(
            markup("- a\n1. b"),
            "<ul><li>a</li></ul>\n<ol><li>b</li></ol>"
        );
    }

    #[test]
    fn test_nested_list_and_continuation() {
        assert_eq!(
            markup("• Two\n  more text\n  - Two A\n    detail\n  1. Step\n• Three"),
            "<ul><li>Two<br/>more text<ul><li>Two A<br/>detail</li></ul>\
             <ol><li>Step</li></ol></li><li>Three</li></ul>"
        );
    }

    #[test]
    fn test_blockquote() {
        assert_eq!(
            markup("> first\n>second\n> **bold**"),
            "<blockquote><p>first\nsecond\n<strong>bold</strong></p></blockquote>"
        );
    }

    #[test]
    fn test_paragraph_lines_joined_until_next_block() {
        assert_eq!(
            markup("line one\nline two\n# Head\n\nsolo"),
            "<p>line one<br/>line two</p>\n<h1>Head</h1>\n<p>solo</p>"
        );
    }

    #[test]
    fn test_split_row() {
        assert_eq!(split_row("| a | b \\| c |"), vec!["a", "b | c"]);
        assert_eq!(split_row("a|b"), vec!["a", "b"]);
        assert_eq!(split_row("| x \\|"), vec!["x |"]);
    }

    #[test]
    fn test_indent_of() {
        assert_eq!(indent_of("   - x"), 3);
        assert_eq!(indent_of("\t- x"), 4);
        assert_eq!(indent_of("- x"), 0);
    }
}
