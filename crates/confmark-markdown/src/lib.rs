//! Document tree to Markdown renderer.
//!
//! The output is meant for reading and is intentionally lossy: macros other
//! than a table of contents and Jira keys are dropped, merged table cells are
//! expanded, and panels collapse to their text.
//!
//! Everything that needs the outside world (media downloads, page titles)
//! goes through a [`Resolver`], so rendering itself performs no I/O.
//!
//! # Example
//!
//! ```
//! use confmark_markdown::{render_json, NoopResolver};
//!
//! let json = r#"{"type":"doc","content":[
//!     {"type":"paragraph","content":[
//!         {"type":"text","text":"docs","marks":[{"type":"strong"},{"type":"link","attrs":{"href":"https://example.com"}}]}
//!     ]}
//! ]}"#;
//! let result = render_json(json, &mut NoopResolver).unwrap();
//! assert_eq!(result.markdown, "[docs](https://example.com)");
//! ```

mod cards;
mod emoji;
pub mod envelope;
mod inline;
mod renderer;
mod resolver;
mod table;
mod toc;

use confmark_adf::{AdfError, Node};

pub use renderer::{MarkdownRenderer, RenderResult};
pub use resolver::{NoopResolver, ResolveError, Resolver};
pub use toc::{TocEntry, toc_anchor};

/// Render a document without any external lookups.
pub fn render(root: &Node) -> RenderResult {
    MarkdownRenderer::new(&mut NoopResolver).render(root)
}

/// Parse ADF JSON and render it.
///
/// # Errors
///
/// Returns [`AdfError`] if `json` is not a document tree.
pub fn render_json(json: &str, resolver: &mut dyn Resolver) -> Result<RenderResult, AdfError> {
    let root = Node::from_json(json)?;
    Ok(MarkdownRenderer::new(resolver).render(&root))
}
