use css_selectors::ElementAdapter;
use html::{Document, NodeKey, NodeKind};

/// Exposes a [`Document`] to the selector matcher.
///
/// Only element keys are handed out: the document node is never reported
/// as a parent, so `:first-child` on `<html>` and `* > html` behave as in a browser.
#[derive(Clone, Copy)]
pub struct DocumentAdapter<'doc> {
    document: &'doc Document,
}

impl<'doc> DocumentAdapter<'doc> {
    pub fn new(document: &'doc Document) -> Self {
        Self { document }
    }
}

impl ElementAdapter for DocumentAdapter<'_> {
    type Handle = NodeKey;

    fn parent(&self, element: NodeKey) -> Option<NodeKey> {
        self.document
            .parent(element)
            .filter(|parent| self.document.is_element(*parent))
    }

    fn previous_sibling_element(&self, element: NodeKey) -> Option<NodeKey> {
        self.document.previous_sibling_element(element)
    }

    fn next_sibling_element(&self, element: NodeKey) -> Option<NodeKey> {
        self.document.next_sibling_element(element)
    }

    fn tag_name(&self, element: NodeKey) -> &str {
        self.document.tag_name(element).unwrap_or_default()
    }

    fn element_id(&self, element: NodeKey) -> Option<&str> {
        self.document.element_id(element)
    }

    fn has_class(&self, element: NodeKey, class: &str) -> bool {
        self.document.has_class(element, class)
    }

    fn attr(&self, element: NodeKey, name: &str) -> Option<&str> {
        self.document.attribute(element, name)
    }

    /// Comments do not count as content; any text node does.
    fn is_empty(&self, element: NodeKey) -> bool {
        self.document.children(element).all(|child| {
            matches!(
                self.document.node(child).map(|node| &node.kind),
                Some(NodeKind::Comment { .. })
            )
        })
    }
}
