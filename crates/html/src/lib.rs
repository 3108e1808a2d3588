#![allow(
    clippy::missing_inline_in_public_items,
    reason = "Inlining decisions left to compiler for this crate"
)]

//! HTML documents for selector queries.
//!
//! A [`Document`] is an arena-backed tree that is built once, either by
//! parsing markup with [`parse_html`] or programmatically with a
//! [`TreeBuilder`], and then only read.

pub mod dom;
pub mod parser;

pub use dom::{Document, DocumentId, DomNode, NodeKey, NodeKind, TreeBuilder};
pub use parser::{HtmlParser, ParseOptions, parse_html};
