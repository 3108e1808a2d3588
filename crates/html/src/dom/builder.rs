use super::{Document, DomNode, NodeKey, NodeKind};
use anyhow::{Error, anyhow};
use indextree::NodeId;

/// Builds a [`Document`] node by node.
///
/// Used by the HTML parser and directly by callers that need a small tree
/// without going through markup.
pub struct TreeBuilder {
    document: Document,
}

impl TreeBuilder {
    pub fn new() -> Self {
        Self {
            document: Document::new(),
        }
    }

    /// The document node of the tree under construction.
    pub fn root(&self) -> NodeKey {
        self.document.root()
    }

    /// Create a detached element. The tag is stored ASCII-lowercase.
    pub fn create_element(&mut self, tag: &str) -> NodeKey {
        self.create(DomNode::element(tag))
    }

    pub fn create_text(&mut self, text: &str) -> NodeKey {
        self.create(DomNode {
            kind: NodeKind::Text {
                text: text.to_owned(),
            },
            ..DomNode::default()
        })
    }

    pub fn create_comment(&mut self, text: &str) -> NodeKey {
        self.create(DomNode {
            kind: NodeKind::Comment {
                text: text.to_owned(),
            },
            ..DomNode::default()
        })
    }

    /// Set an attribute, replacing any existing value for the same name.
    ///
    /// # Errors
    /// Returns an error if `node` is not an element of this document.
    pub fn set_attribute(&mut self, node: NodeKey, name: &str, value: &str) -> Result<(), Error> {
        let id = self.resolve(node)?;
        let dom_node = self
            .document
            .arena
            .get_mut(id)
            .ok_or_else(|| anyhow!("node {node:?} is not in the arena"))?
            .get_mut();
        if !dom_node.is_element() {
            return Err(anyhow!("cannot set attribute '{name}' on non-element {node:?}"));
        }
        let name = name.to_ascii_lowercase();
        if let Some(existing) = dom_node
            .attrs
            .iter_mut()
            .find(|(attr_name, _)| *attr_name == name)
        {
            value.clone_into(&mut existing.1);
        } else {
            dom_node.attrs.push((name, value.to_owned()));
        }
        Ok(())
    }

    /// Append `child` as the last child of `parent`.
    ///
    /// # Errors
    /// Returns an error if either key is foreign to this document or the
    /// append would create a cycle.
    pub fn append_child(&mut self, parent: NodeKey, child: NodeKey) -> Result<(), Error> {
        let parent_id = self.resolve(parent)?;
        let child_id = self.resolve(child)?;
        parent_id.checked_append(child_id, &mut self.document.arena)?;
        Ok(())
    }

    /// Finish construction and hand out the read-only document.
    pub fn finish(self) -> Document {
        log::debug!(
            target: "html::dom",
            "built document {:?} with {} nodes",
            self.document.id(),
            self.document.node_count()
        );
        self.document
    }

    fn create(&mut self, node: DomNode) -> NodeKey {
        let id = self.document.arena.new_node(node);
        self.document.key(id)
    }

    fn resolve(&self, key: NodeKey) -> Result<NodeId, Error> {
        self.document
            .resolve(key)
            .ok_or_else(|| anyhow!("node {key:?} does not belong to this document"))
    }
}

impl Default for TreeBuilder {
    fn default() -> Self {
        Self::new()
    }
}
