//! Type-safe element and attribute lookup.
//!
//! [`query_element`] resolves the first element matching a selector under a
//! scope, and [`query_attribute`] reads one attribute from that element.
//! Both fail with a [`QueryError`] instead of returning an empty result, so
//! callers either guarantee the element exists or handle the error.
//!
//! The scope defaults to the document node of the [`Document`] passed in.
//!
//! ```
//! use dom_query::{AttributeQuery, ElementQuery, parse_html, query_attribute, query_element};
//!
//! let doc = parse_html(r#"<div id="a" title="hello"></div>"#)?;
//! let div = query_element(&doc, &ElementQuery::new("#a"))?;
//! assert_eq!(div.tag_name(), "div");
//! assert_eq!(query_attribute(&doc, &AttributeQuery::new("#a", "title"))?, "hello");
//! # Ok::<(), anyhow::Error>(())
//! ```

mod adapter;
mod error;
mod query;

pub use adapter::DocumentAdapter;
pub use error::QueryError;
pub use query::{AttributeQuery, DomQuery, ElementQuery, ElementRef, query_attribute, query_element};

pub use html::{Document, NodeKey, TreeBuilder, parse_html};
