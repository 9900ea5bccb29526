//! Markdown to Confluence storage format.
//!
//! Accepts the Markdown subset produced by `confmark-markdown` (plus the usual
//! `-`/`*`/`+` bullets and blockquotes) and emits the XHTML-based storage
//! markup used when creating or updating pages. Image references are collected
//! so the caller can upload them as attachments.
//!
//! The parser never fails: lines that match no block rule become paragraphs.
//!
//! # Example
//!
//! ```
//! let output = confmark_storage::parse("## Scope\n\n![Flow|width=600](img/flow.png)");
//! assert_eq!(
//!     output.markup,
//!     "<h2>Scope</h2>\n<p><ac:image ac:alt=\"Flow\" ac:width=\"600\">\
//!      <ri:attachment ri:filename=\"flow.png\"/></ac:image></p>"
//! );
//! assert_eq!(output.images, vec!["img/flow.png"]);
//! ```

mod block;
mod inline;
mod xml;

use block::BlockParser;

/// Converted markup and the image paths it references.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StorageOutput {
    /// Storage markup, one block per line.
    pub markup: String,
    /// Image paths exactly as written in the Markdown, in document order.
    pub images: Vec<String>,
}

/// Convert Markdown to storage markup.
pub fn parse(markdown: &str) -> StorageOutput {
    BlockParser::new(markdown).parse()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_document() {
        let markdown = "# Guide\n\n\
                        Read [the docs](https://example.com/a?b=1&c=2) & enjoy.\n\n\
                        • install\n• run\n\n\
                        ---\n\n\
                        ![Screen](shots/main.png)\n\n\
                        ![Screen](shots/main.png)";
        let output = parse(markdown);
        assert_eq!(
            output.markup,
            "<h1>Guide</h1>\n\
             <p>Read <a href=\"https://example.com/a?b=1&amp;c=2\">the docs</a> &amp; enjoy.</p>\n\
             <ul><li>install</li><li>run</li></ul>\n\
             <hr/>\n\
             <p><ac:image ac:alt=\"Screen\"><ri:attachment ri:filename=\"main.png\"/></ac:image></p>\n\
             <p><ac:image ac:alt=\"Screen\"><ri:attachment ri:filename=\"main.png\"/></ac:image></p>"
        );
        assert_eq!(output.images, vec!["shots/main.png", "shots/main.png"]);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(parse(""), StorageOutput::default());
        assert_eq!(parse("\n\n  \n").markup, "");
    }
}
