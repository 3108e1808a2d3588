//! Arena-backed DOM tree.
//!
//! Nodes live in an [`indextree::Arena`] owned by the [`Document`]. Callers
//! refer to nodes through [`NodeKey`], which also records the document the
//! node belongs to so that a key from one document is never silently
//! resolved against another.

mod builder;
mod printing;

pub use builder::TreeBuilder;

use core::sync::atomic::{AtomicU64, Ordering};
use indextree::{Arena, Node, NodeId};
use smallvec::SmallVec;

/// Source of process-unique document identifiers.
static NEXT_DOCUMENT_ID: AtomicU64 = AtomicU64::new(1);

/// Identity of a single [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DocumentId(u64);

impl DocumentId {
    fn next() -> Self {
        Self(NEXT_DOCUMENT_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn as_u64(self) -> u64 {
        self.0
    }
}

/// Stable handle to a node within a particular document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeKey {
    document: DocumentId,
    node: NodeId,
}

impl NodeKey {
    /// The document this key was issued by.
    pub fn document(self) -> DocumentId {
        self.document
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum NodeKind {
    #[default]
    Document,
    Element {
        tag: String,
    },
    Text {
        text: String,
    },
    Comment {
        text: String,
    },
}

#[derive(Debug, Clone, Default)]
pub struct DomNode {
    pub kind: NodeKind,
    /// Attributes in source order. Names are ASCII-lowercase.
    pub attrs: SmallVec<(String, String), 4>,
}

impl DomNode {
    /// A fresh element node with no attributes.
    pub fn element(tag: &str) -> Self {
        Self {
            kind: NodeKind::Element {
                tag: tag.to_ascii_lowercase(),
            },
            attrs: SmallVec::new(),
        }
    }

    pub fn is_element(&self) -> bool {
        matches!(self.kind, NodeKind::Element { .. })
    }

    pub fn tag_name(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Element { tag } => Some(tag.as_str()),
            _ => None,
        }
    }

    /// Attribute lookup. `None` means absent; an empty string is a present, empty value.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(attr_name, _)| attr_name.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }
}

/// A parsed or programmatically built HTML document.
pub struct Document {
    id: DocumentId,
    arena: Arena<DomNode>,
    root: NodeId,
}

impl Document {
    /// An empty document containing only the document node.
    pub fn new() -> Self {
        let mut arena = Arena::new();
        let root = arena.new_node(DomNode::default());
        Self {
            id: DocumentId::next(),
            arena,
            root,
        }
    }

    pub fn id(&self) -> DocumentId {
        self.id
    }

    /// The document node, the default scope for queries.
    pub fn root(&self) -> NodeKey {
        self.key(self.root)
    }

    /// Number of nodes in the tree, the document node included.
    pub fn node_count(&self) -> usize {
        self.arena.len()
    }

    /// True if `key` names a live node of this document.
    pub fn contains(&self, key: NodeKey) -> bool {
        self.resolve(key).is_some()
    }

    pub fn node(&self, key: NodeKey) -> Option<&DomNode> {
        self.resolve(key)
            .and_then(|id| self.arena.get(id))
            .map(Node::get)
    }

    pub fn is_element(&self, key: NodeKey) -> bool {
        self.node(key).is_some_and(DomNode::is_element)
    }

    pub fn parent(&self, key: NodeKey) -> Option<NodeKey> {
        let id = self.resolve(key)?;
        self.arena
            .get(id)
            .and_then(Node::parent)
            .map(|parent| self.key(parent))
    }

    /// Direct children of `key`, including text and comment nodes.
    pub fn children(&self, key: NodeKey) -> impl Iterator<Item = NodeKey> + '_ {
        self.resolve(key)
            .into_iter()
            .flat_map(move |id| id.children(&self.arena))
            .map(move |child| self.key(child))
    }

    /// Element descendants of `scope` in document order. `scope` itself is not yielded.
    pub fn descendant_elements(&self, scope: NodeKey) -> impl Iterator<Item = NodeKey> + '_ {
        self.resolve(scope)
            .into_iter()
            .flat_map(move |id| id.descendants(&self.arena).skip(1))
            .filter(move |id| self.element_at(*id))
            .map(move |id| self.key(id))
    }

    pub fn previous_sibling_element(&self, key: NodeKey) -> Option<NodeKey> {
        let mut current = self.arena.get(self.resolve(key)?)?.previous_sibling();
        while let Some(id) = current {
            if self.element_at(id) {
                return Some(self.key(id));
            }
            current = self.arena.get(id)?.previous_sibling();
        }
        None
    }

    pub fn next_sibling_element(&self, key: NodeKey) -> Option<NodeKey> {
        let mut current = self.arena.get(self.resolve(key)?)?.next_sibling();
        while let Some(id) = current {
            if self.element_at(id) {
                return Some(self.key(id));
            }
            current = self.arena.get(id)?.next_sibling();
        }
        None
    }

    pub fn tag_name(&self, key: NodeKey) -> Option<&str> {
        self.node(key).and_then(DomNode::tag_name)
    }

    pub fn attribute(&self, key: NodeKey, name: &str) -> Option<&str> {
        self.node(key).and_then(|node| node.attr(name))
    }

    pub fn element_id(&self, key: NodeKey) -> Option<&str> {
        self.attribute(key, "id")
    }

    /// True if the whitespace-separated `class` attribute contains `class`.
    pub fn has_class(&self, key: NodeKey, class: &str) -> bool {
        self.attribute(key, "class")
            .is_some_and(|classes| classes.split_ascii_whitespace().any(|token| token == class))
    }

    fn key(&self, node: NodeId) -> NodeKey {
        NodeKey {
            document: self.id,
            node,
        }
    }

    fn resolve(&self, key: NodeKey) -> Option<NodeId> {
        if key.document != self.id {
            return None;
        }
        self.arena
            .get(key.node)
            .filter(|node| !node.is_removed())
            .map(|_| key.node)
    }

    fn element_at(&self, id: NodeId) -> bool {
        self.arena
            .get(id)
            .is_some_and(|node| node.get().is_element())
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}
