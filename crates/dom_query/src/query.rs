use core::fmt;

use crate::adapter::DocumentAdapter;
use crate::error::QueryError;
use css_selectors::{matches_selector_list, parse_selector_list};
use html::{Document, NodeKey, NodeKind};

/// Request for a single element: a selector and an optional scope.
///
/// Without a scope the query runs against the whole document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ElementQuery<'sel> {
    pub selector: &'sel str,
    pub scope: Option<NodeKey>,
}

impl<'sel> ElementQuery<'sel> {
    pub fn new(selector: &'sel str) -> Self {
        Self {
            selector,
            scope: None,
        }
    }

    /// Restrict the query to descendants of `scope`.
    #[must_use]
    pub fn within(self, scope: NodeKey) -> Self {
        Self {
            scope: Some(scope),
            ..self
        }
    }
}

/// An [`ElementQuery`] plus the name of the attribute to read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AttributeQuery<'sel> {
    pub element: ElementQuery<'sel>,
    pub attribute: &'sel str,
}

impl<'sel> AttributeQuery<'sel> {
    pub fn new(selector: &'sel str, attribute: &'sel str) -> Self {
        Self {
            element: ElementQuery::new(selector),
            attribute,
        }
    }

    #[must_use]
    pub fn within(self, scope: NodeKey) -> Self {
        Self {
            element: self.element.within(scope),
            ..self
        }
    }
}

/// A resolved element, borrowed from its document.
#[derive(Clone, Copy)]
pub struct ElementRef<'doc> {
    document: &'doc Document,
    key: NodeKey,
}

impl<'doc> ElementRef<'doc> {
    pub fn id(&self) -> NodeKey {
        self.key
    }

    pub fn document(&self) -> &'doc Document {
        self.document
    }

    pub fn tag_name(&self) -> &'doc str {
        self.document.tag_name(self.key).unwrap_or_default()
    }

    /// Raw attribute value; `None` only when the attribute is absent.
    pub fn attribute(&self, name: &str) -> Option<&'doc str> {
        self.document.attribute(self.key, name)
    }

    /// Resolve an element among this element's descendants.
    ///
    /// # Errors
    /// See [`query_element`].
    pub fn query_element(&self, selector: &str) -> Result<ElementRef<'doc>, QueryError> {
        query_element(self.document, &ElementQuery::new(selector).within(self.key))
    }

    /// Read an attribute of an element among this element's descendants.
    ///
    /// # Errors
    /// See [`query_attribute`].
    pub fn query_attribute(&self, selector: &str, attribute: &str) -> Result<&'doc str, QueryError> {
        query_attribute(
            self.document,
            &AttributeQuery::new(selector, attribute).within(self.key),
        )
    }
}

impl PartialEq for ElementRef<'_> {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl Eq for ElementRef<'_> {}

impl fmt::Display for ElementRef<'_> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str(&self.document.describe(self.key))
    }
}

impl fmt::Debug for ElementRef<'_> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("ElementRef")
            .field("key", &self.key)
            .field("element", &self.document.describe(self.key))
            .finish()
    }
}

/// Queries can only run under the document node or an element.
fn is_queryable_scope(document: &Document, scope: NodeKey) -> bool {
    matches!(
        document.node(scope).map(|node| &node.kind),
        Some(NodeKind::Document | NodeKind::Element { .. })
    )
}

/// Resolve the first element in document order that matches `query.selector`
/// among the descendants of the scope.
///
/// The scope itself is never a candidate, but its ancestors still take part
/// in combinator matching: `section p` scoped to a `div` inside a `section`
/// finds the `p` inside the `div`.
///
/// # Errors
/// - [`QueryError::ScopeUndefined`] if the scope is not a document or element node of `document`.
/// - [`QueryError::Selector`] if the selector does not parse.
/// - [`QueryError::ElementNotFound`] if nothing matches.
pub fn query_element<'doc>(
    document: &'doc Document,
    query: &ElementQuery<'_>,
) -> Result<ElementRef<'doc>, QueryError> {
    let scope = query.scope.unwrap_or_else(|| document.root());
    if !is_queryable_scope(document, scope) {
        log::debug!(target: "dom_query", "rejecting scope {scope:?} for '{}'", query.selector);
        return Err(QueryError::ScopeUndefined {
            scope: document.describe(scope),
        });
    }

    let selectors = parse_selector_list(query.selector)?;
    let adapter = DocumentAdapter::new(document);
    let found = document
        .descendant_elements(scope)
        .find(|candidate| matches_selector_list(&adapter, *candidate, &selectors));

    match found {
        Some(key) => {
            log::trace!(target: "dom_query", "'{}' resolved to {key:?}", query.selector);
            Ok(ElementRef { document, key })
        }
        None => {
            log::debug!(target: "dom_query", "no element matches '{}'", query.selector);
            Err(QueryError::ElementNotFound {
                selector: query.selector.to_owned(),
                scope: document.describe(scope),
            })
        }
    }
}

/// Read the named attribute of the element [`query_element`] resolves.
///
/// An attribute that is present but empty yields `Ok("")`.
///
/// # Errors
/// Any error from [`query_element`], unchanged, or
/// [`QueryError::AttributeNotFound`] if the element lacks the attribute.
pub fn query_attribute<'doc>(
    document: &'doc Document,
    query: &AttributeQuery<'_>,
) -> Result<&'doc str, QueryError> {
    let element = query_element(document, &query.element)?;
    element
        .attribute(query.attribute)
        .ok_or_else(|| QueryError::AttributeNotFound {
            element: element.to_string(),
            attribute: query.attribute.to_owned(),
        })
}

/// Document-scoped shorthands for [`query_element`] and [`query_attribute`].
pub trait DomQuery {
    /// # Errors
    /// See [`query_element`].
    fn query_element(&self, selector: &str) -> Result<ElementRef<'_>, QueryError>;

    /// # Errors
    /// See [`query_attribute`].
    fn query_attribute(&self, selector: &str, attribute: &str) -> Result<&str, QueryError>;
}

impl DomQuery for Document {
    fn query_element(&self, selector: &str) -> Result<ElementRef<'_>, QueryError> {
        query_element(self, &ElementQuery::new(selector))
    }

    fn query_attribute(&self, selector: &str, attribute: &str) -> Result<&str, QueryError> {
        query_attribute(self, &AttributeQuery::new(selector, attribute))
    }
}
