//! Table layout.
//!
//! Markdown tables have no spans, so merged cells are expanded into filler
//! cells until every row has the header row's column count.

use std::collections::BTreeMap;

use confmark_adf::{CellSpan, Node, NodeKind};
use tracing::debug;

use crate::renderer::MarkdownRenderer;

/// Content of a filler or empty cell.
const EMPTY_CELL: &str = " ";

/// Separator between blocks inside one cell.
const CELL_BREAK: &str = "<br>";

/// Indentation unit for nested lists inside cells.
const NBSP: char = '\u{a0}';

/// Column index to the number of further rows a rowspan still covers.
type Spans = BTreeMap<usize, u32>;

impl MarkdownRenderer<'_> {
    /// Render a table node as a GFM table.
    pub(crate) fn render_table(&mut self, table: &Node) -> String {
        let mut lines = Vec::new();
        let mut spans = Spans::new();
        let mut width = None;

        for row in table
            .content
            .iter()
            .filter(|node| matches!(node.kind, NodeKind::TableRow))
        {
            let mut cells = Vec::new();
            for cell in &row.content {
                let (NodeKind::TableCell(span) | NodeKind::TableHeader(span)) = cell.kind else {
                    continue;
                };
                fill_spanned(&mut spans, &mut cells);
                let column = cells.len();
                cells.push(self.cell_content(cell));
                place_span(&mut spans, &mut cells, column, span);
            }
            fill_trailing(&mut spans, &mut cells);

            if cells.is_empty() {
                continue;
            }
            match width {
                None => {
                    width = Some(cells.len());
                    lines.push(row_line(&cells));
                    lines.push(row_line(&vec!["---".to_owned(); cells.len()]));
                }
                Some(width) => {
                    if cells.len() > width {
                        debug!(extra = cells.len() - width, "dropping cells past header width");
                    }
                    cells.resize(width, EMPTY_CELL.to_owned());
                    lines.push(row_line(&cells));
                }
            }
        }

        lines.join("\n")
    }

    /// Flatten a cell into one line.
    fn cell_content(&mut self, cell: &Node) -> String {
        let mut parts = Vec::new();
        for block in &cell.content {
            self.cell_block(block, 0, &mut parts);
        }

        let text = parts
            .join(CELL_BREAK)
            .replace('|', "\\|")
            .replace("\r\n", " ")
            .replace(['\r', '\n'], " ");
        let text = text.trim();
        if text.is_empty() {
            EMPTY_CELL.to_owned()
        } else {
            text.to_owned()
        }
    }

    fn cell_block(&mut self, node: &Node, depth: usize, parts: &mut Vec<String>) {
        match &node.kind {
            NodeKind::BulletList => {
                for item in list_items(node) {
                    self.cell_list_item(item, depth, "•", parts);
                }
            }
            NodeKind::OrderedList { order } => {
                for (offset, item) in (0..).zip(list_items(node)) {
                    let number = order.saturating_add(offset);
                    let marker = if depth == 0 {
                        format!("{number}.")
                    } else {
                        format!("{}.", alpha_marker(number))
                    };
                    self.cell_list_item(item, depth, &marker, parts);
                }
            }
            NodeKind::CodeBlock { .. } => {
                let code = node.plain_text();
                if !code.trim().is_empty() {
                    parts.push(format!("`{}`", code.trim()));
                }
            }
            _ => {
                let text = self.inline_text(node);
                if !text.trim().is_empty() {
                    parts.push(text.trim().to_owned());
                }
            }
        }
    }

    fn cell_list_item(&mut self, item: &Node, depth: usize, marker: &str, parts: &mut Vec<String>) {
        let indent: String = std::iter::repeat_n(NBSP, 2 * depth).collect();
        let mut first = true;
        for child in &item.content {
            if matches!(child.kind, NodeKind::BulletList | NodeKind::OrderedList { .. }) {
                self.cell_block(child, depth + 1, parts);
                continue;
            }
            let text = self.inline_text(child);
            let text = text.trim();
            if text.is_empty() {
                continue;
            }
            if first {
                parts.push(format!("{indent}{marker} {text}"));
                first = false;
            } else {
                parts.push(format!("{indent}{text}"));
            }
        }
    }
}

fn list_items(list: &Node) -> impl Iterator<Item = &Node> {
    list.content
        .iter()
        .filter(|node| matches!(node.kind, NodeKind::ListItem))
}

/// Consume columns still covered by a rowspan from an earlier row.
fn fill_spanned(spans: &mut Spans, cells: &mut Vec<String>) {
    loop {
        let column = cells.len();
        let Some(remaining) = spans.get_mut(&column) else {
            break;
        };
        *remaining -= 1;
        if *remaining == 0 {
            spans.remove(&column);
        }
        cells.push(EMPTY_CELL.to_owned());
    }
}

/// Fill covered columns after the last physical cell of a row.
fn fill_trailing(spans: &mut Spans, cells: &mut Vec<String>) {
    while let Some(&last) = spans.keys().next_back() {
        if cells.len() > last {
            break;
        }
        if spans.contains_key(&cells.len()) {
            fill_spanned(spans, cells);
        } else {
            cells.push(EMPTY_CELL.to_owned());
        }
    }
}

/// Emit colspan fillers and register rowspans for every covered column.
fn place_span(spans: &mut Spans, cells: &mut Vec<String>, column: usize, span: CellSpan) {
    for _ in 1..span.colspan {
        cells.push(EMPTY_CELL.to_owned());
    }
    if span.rowspan > 1 {
        for covered in column..cells.len() {
            spans.insert(covered, span.rowspan - 1);
        }
    }
}

fn row_line(cells: &[String]) -> String {
    format!("| {} |", cells.join(" | "))
}

/// Alphabetic list marker: 1 → `a`, 26 → `z`, 27 → `aa`.
fn alpha_marker(number: u32) -> String {
    let mut n = number.max(1);
    let mut letters = Vec::new();
    while n > 0 {
        n -= 1;
        letters.push(char::from(b'a' + (n % 26) as u8));
        n /= 26;
    }
    letters.iter().rev().collect()
}
