//! HTML5 parsing using html5ever.

use crate::dom::{Document, NodeKey, TreeBuilder};
use anyhow::Error;
use html5ever::tendril::TendrilSink as _;
use html5ever::tree_builder::TreeBuilderOpts;
use html5ever::{ParseOpts, parse_document};
use markup5ever_rcdom::{Handle, NodeData as RcNodeData, RcDom};

/// Options controlling how markup becomes a [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseOptions {
    /// Parse `<noscript>` content as if scripting were enabled (its content becomes raw text).
    pub scripting_enabled: bool,
    /// Keep text nodes that contain only whitespace.
    pub keep_whitespace_text: bool,
}

impl Default for ParseOptions {
    fn default() -> Self {
        Self {
            scripting_enabled: true,
            keep_whitespace_text: false,
        }
    }
}

impl ParseOptions {
    fn to_html5ever(self) -> ParseOpts {
        ParseOpts {
            tree_builder: TreeBuilderOpts {
                scripting_enabled: self.scripting_enabled,
                ..TreeBuilderOpts::default()
            },
            ..ParseOpts::default()
        }
    }
}

/// HTML parser.
pub struct HtmlParser {
    options: ParseOptions,
    tree_builder: TreeBuilder,
}

impl HtmlParser {
    pub fn new() -> Self {
        Self::with_options(ParseOptions::default())
    }

    pub fn with_options(options: ParseOptions) -> Self {
        Self {
            options,
            tree_builder: TreeBuilder::new(),
        }
    }

    /// Parse a complete HTML document and build the DOM tree.
    ///
    /// # Errors
    /// Returns an error if the markup cannot be read or the tree cannot be converted.
    pub fn parse(mut self, html: &str) -> Result<Document, Error> {
        let dom: RcDom = parse_document(RcDom::default(), self.options.to_html5ever())
            .from_utf8()
            .read_from(&mut html.as_bytes())?;

        let root = self.tree_builder.root();
        self.convert_node(&dom.document, root)?;
        Ok(self.tree_builder.finish())
    }

    /// Convert an html5ever node into the arena, appending it under `parent`.
    fn convert_node(&mut self, rc_node: &Handle, parent: NodeKey) -> Result<(), Error> {
        match &rc_node.data {
            RcNodeData::Document => {
                for child in rc_node.children.borrow().iter() {
                    self.convert_node(child, parent)?;
                }
            }

            RcNodeData::Doctype { .. } | RcNodeData::ProcessingInstruction { .. } => {}

            RcNodeData::Text { contents } => {
                let text = contents.borrow();
                if !self.options.keep_whitespace_text && text.trim().is_empty() {
                    return Ok(());
                }
                let node = self.tree_builder.create_text(&text);
                self.tree_builder.append_child(parent, node)?;
            }

            RcNodeData::Comment { contents } => {
                let node = self.tree_builder.create_comment(contents);
                self.tree_builder.append_child(parent, node)?;
            }

            RcNodeData::Element { name, attrs, .. } => {
                let node = self.tree_builder.create_element(&name.local);
                for attr in attrs.borrow().iter() {
                    // Foreign attributes keep their prefix, as `getAttribute` sees them.
                    let qualified = match &attr.name.prefix {
                        Some(prefix) => format!("{prefix}:{}", attr.name.local),
                        None => attr.name.local.to_string(),
                    };
                    self.tree_builder
                        .set_attribute(node, &qualified, &attr.value)?;
                }
                self.tree_builder.append_child(parent, node)?;

                for child in rc_node.children.borrow().iter() {
                    self.convert_node(child, node)?;
                }
            }
        }
        Ok(())
    }
}

impl Default for HtmlParser {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience function to parse HTML with default options.
///
/// # Errors
/// See [`HtmlParser::parse`].
pub fn parse_html(html: &str) -> Result<Document, Error> {
    let doc = HtmlParser::new().parse(html)?;
    log::debug!(
        target: "html::parser",
        "parsed {} bytes into {} nodes",
        html.len(),
        doc.node_count()
    );
    Ok(doc)
}
