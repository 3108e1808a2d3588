use core::fmt;

use super::{Document, DomNode, NodeKey, NodeKind};
use indextree::NodeId;

use serde_json::{Map, Value, json};

// -----------------------
// Module-scope helpers
// -----------------------

fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            _ => out.push(ch),
        }
    }
    out
}

fn write_indent(formatter: &mut fmt::Formatter<'_>, depth: usize) -> fmt::Result {
    for _ in 0..depth {
        formatter.write_str("  ")?;
    }
    Ok(())
}

/// Attributes in source order, as they would appear in a start tag.
fn write_attrs(formatter: &mut fmt::Formatter<'_>, node: &DomNode) -> fmt::Result {
    for (name, value) in node.attrs.iter() {
        write!(formatter, " {name}=\"{}\"", escape_text(value))?;
    }
    Ok(())
}

fn node_to_json(doc: &Document, id: NodeId) -> Value {
    let Some(node_ref) = doc.arena.get(id) else {
        return Value::Null;
    };
    let DomNode { kind, attrs } = node_ref.get();
    let children = || -> Vec<Value> {
        id.children(&doc.arena)
            .map(|child| node_to_json(doc, child))
            .filter(|value| !value.is_null())
            .collect()
    };
    match kind {
        NodeKind::Document => json!({ "type": "document", "children": children() }),
        NodeKind::Element { tag } => {
            let mut attrs_obj = Map::new();
            for (name, value) in attrs.iter() {
                attrs_obj.insert(name.clone(), Value::String(value.clone()));
            }
            json!({
                "type": "element",
                "tag": tag,
                "attrs": Value::Object(attrs_obj),
                "children": children(),
            })
        }
        NodeKind::Text { text } => json!({ "type": "text", "text": text }),
        NodeKind::Comment { .. } => Value::Null,
    }
}

fn fmt_node(
    doc: &Document,
    id: NodeId,
    formatter: &mut fmt::Formatter<'_>,
    depth: usize,
) -> fmt::Result {
    let Some(node_ref) = doc.arena.get(id) else {
        return Ok(());
    };
    let node = node_ref.get();
    write_indent(formatter, depth)?;
    match &node.kind {
        NodeKind::Document => writeln!(formatter, "#document")?,
        NodeKind::Element { tag } => {
            write!(formatter, "<{tag}")?;
            write_attrs(formatter, node)?;
            writeln!(formatter, ">")?;
        }
        NodeKind::Text { text } => writeln!(formatter, "\"{}\"", escape_text(text))?,
        NodeKind::Comment { text } => writeln!(formatter, "<!--{text}-->")?,
    }
    for child in id.children(&doc.arena) {
        fmt_node(doc, child, formatter, depth.saturating_add(1))?;
    }
    Ok(())
}

/// One-line rendering of a single node, see [`Document::describe`].
struct Described<'doc> {
    doc: &'doc Document,
    key: NodeKey,
}

impl fmt::Display for Described<'_> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let Some(node) = self.doc.node(self.key) else {
            return formatter.write_str("#detached");
        };
        match &node.kind {
            NodeKind::Document => formatter.write_str("#document"),
            NodeKind::Element { tag } => {
                write!(formatter, "<{tag}")?;
                write_attrs(formatter, node)?;
                formatter.write_str(">")
            }
            NodeKind::Text { .. } => formatter.write_str("#text"),
            NodeKind::Comment { .. } => formatter.write_str("#comment"),
        }
    }
}

impl fmt::Debug for Document {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt_node(self, self.root, formatter, 0)
    }
}

impl Document {
    /// Short human-readable form of a node for messages: `#document`,
    /// `<div id="a" class="x">`, `#text`. Keys that do not resolve render as `#detached`.
    pub fn describe(&self, key: NodeKey) -> String {
        Described { doc: self, key }.to_string()
    }

    /// Build a deterministic JSON representation of the document.
    /// Schema:
    /// - Document: { "type":"document", "children":[ ... ] }
    /// - Element: { "type":"element", "tag": "div", "attrs": {..}, "children":[ ... ] }
    /// - Text: { "type":"text", "text":"..." }
    ///
    /// Comments are omitted.
    pub fn to_json_value(&self) -> Value {
        node_to_json(self, self.root)
    }

    /// Pretty JSON string for snapshots and test comparisons.
    pub fn to_json_string(&self) -> String {
        serde_json::to_string_pretty(&self.to_json_value()).unwrap_or_else(|_| String::from("{}"))
    }
}
