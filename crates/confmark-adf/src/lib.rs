//! Atlassian Document Format (ADF) tree model.
//!
//! Confluence Cloud stores page bodies as a JSON tree of typed nodes with
//! attributes, ordered children and inline marks. This crate turns that JSON
//! into a closed set of Rust types so that every converter matches on
//! [`NodeKind`] exhaustively.
//!
//! Node types that are not modelled are kept as [`NodeKind::Unknown`] together
//! with their children, so renderers can still fall back to extracting text.
//!
//! # Example
//!
//! ```
//! use confmark_adf::{Node, NodeKind};
//!
//! let json = r#"{"type":"heading","attrs":{"level":2},"content":[{"type":"text","text":"Scope"}]}"#;
//! let node = Node::from_json(json).unwrap();
//! assert_eq!(node.kind, NodeKind::Heading { level: 2 });
//! assert_eq!(node.plain_text(), "Scope");
//! ```

mod error;
mod node;
mod raw;

pub use error::AdfError;
pub use node::{CellSpan, Emoji, Extension, Mark, MediaRef, MediaType, Node, NodeKind, Text};
