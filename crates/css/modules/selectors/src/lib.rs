//! Selectors Level 3 — Element matching.
//! Reference: <https://www.w3.org/TR/selectors-3/>
//!
//! This crate implements the subset needed for single-element queries:
//! - Type, universal, class, and id selectors
//! - Attribute presence and the `=`, `~=`, `|=`, `^=`, `$=`, `*=` operators
//! - Structural pseudo-classes: `:root`, `:empty`, `:first-child`, `:last-child`,
//!   `:only-child`, the `-of-type` forms and `:nth-*(An+B)`
//! - `:not(...)` over a compound selector
//! - Pseudo-elements (`::before`, legacy `:after`, ...), which parse but never match
//! - Combinators: descendant, child, adjacent sibling, general sibling
//!
//! Dynamic and user-action pseudo-classes such as `:hover` are valid CSS but
//! have no meaning for a static tree; they are reported as
//! [`SelectorParseError::UnsupportedPseudoClass`].
//!
//! Parsing is strict: malformed selectors are reported as [`SelectorParseError`]
//! rather than silently matching nothing.

mod error;
mod matcher;
mod parser;

// Re-export public API
pub use error::SelectorParseError;
pub use matcher::{matches_complex, matches_compound, matches_selector_list};
pub use parser::{parse_complex_selector, parse_selector_list};

/// An adapter that abstracts DOM access for selector matching.
/// Implement this for your DOM layer.
///
/// Only elements are ever handed to or returned from the adapter: `parent`
/// must return `None` when the parent is a document or fragment node.
pub trait ElementAdapter {
    type Handle: Copy + Eq;

    /// Parent element if any.
    /// Selectors 3 §8 — Combinators (for tree relationships)
    fn parent(&self, element: Self::Handle) -> Option<Self::Handle>;

    /// Previous sibling element, skipping text and comment nodes.
    /// Selectors 3 §8.3 — Sibling combinators
    fn previous_sibling_element(&self, element: Self::Handle) -> Option<Self::Handle>;

    /// Next sibling element, skipping text and comment nodes.
    fn next_sibling_element(&self, element: Self::Handle) -> Option<Self::Handle>;

    /// Tag name in ASCII lowercase (per HTML parsing conventions).
    fn tag_name(&self, element: Self::Handle) -> &str;

    /// Returns Some(id) if the element has an id attribute, else None.
    fn element_id(&self, element: Self::Handle) -> Option<&str>;

    /// True if the element has the given class token.
    fn has_class(&self, element: Self::Handle, class: &str) -> bool;

    /// Returns the attribute value if present.
    fn attr(&self, element: Self::Handle, name: &str) -> Option<&str>;

    /// True if the element has no element or text children.
    /// Selectors 3 §6.6.5.10 — `:empty`
    fn is_empty(&self, element: Self::Handle) -> bool;
}

/// Simple selectors.
/// Selectors 3 §6
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SimpleSelector {
    /// Type selector, stored ASCII-lowercase.
    Type(String),
    Universal,
    Class(String),
    IdSelector(String),
    Attribute(AttributeSelector),
    Pseudo(PseudoClass),
    /// `:not(...)`; matches when the inner compound does not.
    Negation(CompoundSelector),
    /// `::before` and friends, name ASCII-lowercase. Never matches an element.
    PseudoElement(String),
}

/// `[name]` or `[name <op> value]`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttributeSelector {
    /// Attribute name, ASCII-lowercase.
    pub name: String,
    pub operator: AttrOperator,
}

/// Attribute selector operators.
/// Selectors 3 §6.3.1 and §6.3.2
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum AttrOperator {
    /// `[a]`
    Exists,
    /// `[a=v]`
    Equals(String),
    /// `[a~=v]`: whitespace-separated list contains `v`.
    Includes(String),
    /// `[a|=v]`: exactly `v` or starts with `v-`.
    DashMatch(String),
    /// `[a^=v]`
    Prefix(String),
    /// `[a$=v]`
    Suffix(String),
    /// `[a*=v]`
    Substring(String),
}

/// Structural pseudo-classes.
/// Selectors 3 §6.6.5
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PseudoClass {
    Root,
    Empty,
    FirstChild,
    LastChild,
    OnlyChild,
    FirstOfType,
    LastOfType,
    OnlyOfType,
    NthChild(NthIndex),
    NthLastChild(NthIndex),
    NthOfType(NthIndex),
    NthLastOfType(NthIndex),
}

/// The `An+B` argument of the `:nth-*` pseudo-classes.
/// Selectors 3 §6.6.5.2
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NthIndex {
    /// `A`, the cycle length.
    pub step: i32,
    /// `B`, the offset.
    pub offset: i32,
}

impl NthIndex {
    /// True if some `n >= 0` gives `step * n + offset == position`.
    /// `position` is 1-based.
    pub fn matches(self, position: usize) -> bool {
        let Ok(position) = i64::try_from(position) else {
            return false;
        };
        let step = i64::from(self.step);
        let distance = position - i64::from(self.offset);
        if step == 0 {
            return distance == 0;
        }
        distance % step == 0 && distance / step >= 0
    }
}

/// A compound selector is a sequence of simple selectors (no combinators).
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct CompoundSelector {
    pub simples: Vec<SimpleSelector>,
}

/// Combinators between compounds.
/// Selectors 3 §8
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Combinator {
    Descendant,
    Child,
    AdjacentSibling,
    GeneralSibling,
}

/// A complex selector is one or more compounds separated by combinators.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct ComplexSelector {
    pub first: CompoundSelector,
    pub rest: Vec<(Combinator, CompoundSelector)>,
}

impl ComplexSelector {
    /// Compound at `index`, counting `first` as 0.
    fn compound(&self, index: usize) -> Option<&CompoundSelector> {
        match index.checked_sub(1) {
            None => Some(&self.first),
            Some(rest_index) => self.rest.get(rest_index).map(|pair| &pair.1),
        }
    }
}

/// A selector list separated by commas.
/// Selectors 3 §5 — Groups of selectors
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct SelectorList {
    pub selectors: Vec<ComplexSelector>,
}

impl SelectorList {
    /// Parse a selector list, see [`parse_selector_list`].
    ///
    /// # Errors
    /// Returns a [`SelectorParseError`] when `input` is not a valid selector list.
    pub fn parse(input: &str) -> Result<Self, SelectorParseError> {
        parse_selector_list(input)
    }
}
