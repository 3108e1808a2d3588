use css_selectors::SelectorParseError;

/// Why a query produced no value.
///
/// Messages embed the selector, attribute and scope so that a failure can
/// be diagnosed from the message alone.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum QueryError {
    /// The scope is not a document or element node of the queried document.
    #[error("The scope '{scope}' is undefined")]
    ScopeUndefined { scope: String },

    /// No element under the scope matches the selector.
    #[error("DOM Element with selector '{selector}' not found in {scope}")]
    ElementNotFound { selector: String, scope: String },

    /// The resolved element has no attribute with the requested name.
    #[error("The element {element} does not have {attribute} as an attribute")]
    AttributeNotFound { element: String, attribute: String },

    /// The selector itself is malformed.
    #[error(transparent)]
    Selector(#[from] SelectorParseError),
}
