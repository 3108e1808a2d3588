//! CSS selector matching engine.
//! Reference: <https://www.w3.org/TR/selectors-3/>

use crate::{
    AttrOperator, AttributeSelector, Combinator, ComplexSelector, CompoundSelector,
    ElementAdapter, PseudoClass, SelectorList, SimpleSelector,
};

/// Match a selector list against an element: true if any selector in the group matches.
pub fn matches_selector_list<A: ElementAdapter>(
    adapter: &A,
    element: A::Handle,
    list: &SelectorList,
) -> bool {
    list.selectors
        .iter()
        .any(|selector_item| matches_complex(adapter, element, selector_item))
}

/// Match a complex selector against an element.
///
/// Matching runs right-to-left. Descendant and general-sibling combinators
/// try every candidate on the left before giving up, so `a > b c` finds a
/// `b` with an `a` parent even when a closer `b` ancestor does not have one.
pub fn matches_complex<A: ElementAdapter>(
    adapter: &A,
    element: A::Handle,
    sel: &ComplexSelector,
) -> bool {
    matches_from(adapter, element, sel, sel.rest.len())
}

/// Match compounds `0..=index` of `sel`, with compound `index` anchored at `element`.
fn matches_from<A: ElementAdapter>(
    adapter: &A,
    element: A::Handle,
    sel: &ComplexSelector,
    index: usize,
) -> bool {
    let Some(compound) = sel.compound(index) else {
        return false;
    };
    if !matches_compound(adapter, element, compound) {
        return false;
    }
    let Some(left_index) = index.checked_sub(1) else {
        return true;
    };
    let Some(&(combinator, _)) = sel.rest.get(left_index) else {
        return false;
    };

    match combinator {
        Combinator::Descendant => {
            let mut current_parent = adapter.parent(element);
            while let Some(ancestor_element) = current_parent {
                if matches_from(adapter, ancestor_element, sel, left_index) {
                    return true;
                }
                current_parent = adapter.parent(ancestor_element);
            }
            false
        }
        Combinator::Child => adapter
            .parent(element)
            .is_some_and(|parent_el| matches_from(adapter, parent_el, sel, left_index)),
        Combinator::AdjacentSibling => adapter
            .previous_sibling_element(element)
            .is_some_and(|prev_el| matches_from(adapter, prev_el, sel, left_index)),
        Combinator::GeneralSibling => {
            let mut current_sibling = adapter.previous_sibling_element(element);
            while let Some(sibling_element) = current_sibling {
                if matches_from(adapter, sibling_element, sel, left_index) {
                    return true;
                }
                current_sibling = adapter.previous_sibling_element(sibling_element);
            }
            false
        }
    }
}

/// Match a compound selector against a single element.
pub fn matches_compound<A: ElementAdapter>(
    adapter: &A,
    element: A::Handle,
    compound: &CompoundSelector,
) -> bool {
    compound
        .simples
        .iter()
        .all(|simple| matches_simple(adapter, element, simple))
}

fn matches_simple<A: ElementAdapter>(
    adapter: &A,
    element: A::Handle,
    simple: &SimpleSelector,
) -> bool {
    match simple {
        SimpleSelector::Universal => true,
        SimpleSelector::Type(type_name) => adapter
            .tag_name(element)
            .eq_ignore_ascii_case(type_name.as_str()),
        SimpleSelector::Class(class_name) => adapter.has_class(element, class_name.as_str()),
        SimpleSelector::IdSelector(id_value) => adapter
            .element_id(element)
            .is_some_and(|value| value == id_value.as_str()),
        SimpleSelector::Attribute(attr) => matches_attribute(adapter, element, attr),
        SimpleSelector::Pseudo(pseudo) => matches_pseudo(adapter, element, *pseudo),
        SimpleSelector::Negation(inner) => !matches_compound(adapter, element, inner),
        // Queries only ever return elements, never pseudo-elements.
        SimpleSelector::PseudoElement(_) => false,
    }
}

/// Selectors 3 §6.6.5 — structural pseudo-classes.
fn matches_pseudo<A: ElementAdapter>(
    adapter: &A,
    element: A::Handle,
    pseudo: PseudoClass,
) -> bool {
    match pseudo {
        PseudoClass::Root => adapter.parent(element).is_none(),
        PseudoClass::Empty => adapter.is_empty(element),
        PseudoClass::FirstChild => adapter.previous_sibling_element(element).is_none(),
        PseudoClass::LastChild => adapter.next_sibling_element(element).is_none(),
        PseudoClass::OnlyChild => {
            adapter.previous_sibling_element(element).is_none()
                && adapter.next_sibling_element(element).is_none()
        }
        PseudoClass::FirstOfType => sibling_position(adapter, element, false, true) == 1,
        PseudoClass::LastOfType => sibling_position(adapter, element, true, true) == 1,
        PseudoClass::OnlyOfType => {
            sibling_position(adapter, element, false, true) == 1
                && sibling_position(adapter, element, true, true) == 1
        }
        PseudoClass::NthChild(nth) => nth.matches(sibling_position(adapter, element, false, false)),
        PseudoClass::NthLastChild(nth) => {
            nth.matches(sibling_position(adapter, element, true, false))
        }
        PseudoClass::NthOfType(nth) => nth.matches(sibling_position(adapter, element, false, true)),
        PseudoClass::NthLastOfType(nth) => {
            nth.matches(sibling_position(adapter, element, true, true))
        }
    }
}

/// 1-based position of `element` among its sibling elements, counted from the
/// front, or from the back when `from_end` is set. With `same_type` only
/// siblings sharing the element's tag are counted.
fn sibling_position<A: ElementAdapter>(
    adapter: &A,
    element: A::Handle,
    from_end: bool,
    same_type: bool,
) -> usize {
    let step = |current: A::Handle| {
        if from_end {
            adapter.next_sibling_element(current)
        } else {
            adapter.previous_sibling_element(current)
        }
    };
    let tag = adapter.tag_name(element);
    let mut position = 1_usize;
    let mut current_sibling = step(element);
    while let Some(sibling_element) = current_sibling {
        if !same_type || adapter.tag_name(sibling_element).eq_ignore_ascii_case(tag) {
            position = position.saturating_add(1);
        }
        current_sibling = step(sibling_element);
    }
    position
}

/// Selectors 3 §6.3 — attribute presence and value selectors.
/// Empty operands never match for `~=`, `^=`, `$=` and `*=`.
fn matches_attribute<A: ElementAdapter>(
    adapter: &A,
    element: A::Handle,
    attr: &AttributeSelector,
) -> bool {
    let Some(actual) = adapter.attr(element, attr.name.as_str()) else {
        return false;
    };
    match &attr.operator {
        AttrOperator::Exists => true,
        AttrOperator::Equals(expected) => actual == expected,
        AttrOperator::Includes(expected) => {
            !expected.is_empty()
                && !expected.contains(|ch: char| ch.is_ascii_whitespace())
                && actual
                    .split_ascii_whitespace()
                    .any(|token| token == expected)
        }
        AttrOperator::DashMatch(expected) => {
            actual == expected
                || actual
                    .strip_prefix(expected.as_str())
                    .is_some_and(|tail| tail.starts_with('-'))
        }
        AttrOperator::Prefix(expected) => {
            !expected.is_empty() && actual.starts_with(expected.as_str())
        }
        AttrOperator::Suffix(expected) => {
            !expected.is_empty() && actual.ends_with(expected.as_str())
        }
        AttrOperator::Substring(expected) => {
            !expected.is_empty() && actual.contains(expected.as_str())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parse_selector_list;

    /// Flat test tree: each element records its parent and attributes.
    struct Fixture {
        elements: Vec<FixtureElement>,
    }

    struct FixtureElement {
        tag: &'static str,
        parent: Option<usize>,
        attrs: Vec<(&'static str, &'static str)>,
    }

    impl Fixture {
        fn siblings(&self, element: usize) -> Vec<usize> {
            let parent = self.elements[element].parent;
            (0..self.elements.len())
                .filter(|&other| self.elements[other].parent == parent)
                .collect()
        }
    }

    impl ElementAdapter for Fixture {
        type Handle = usize;

        fn parent(&self, element: usize) -> Option<usize> {
            self.elements[element].parent
        }

        fn previous_sibling_element(&self, element: usize) -> Option<usize> {
            let siblings = self.siblings(element);
            let pos = siblings.iter().position(|&other| other == element)?;
            pos.checked_sub(1).map(|prev| siblings[prev])
        }

        fn next_sibling_element(&self, element: usize) -> Option<usize> {
            let siblings = self.siblings(element);
            let pos = siblings.iter().position(|&other| other == element)?;
            siblings.get(pos + 1).copied()
        }

        fn tag_name(&self, element: usize) -> &str {
            self.elements[element].tag
        }

        fn element_id(&self, element: usize) -> Option<&str> {
            self.attr(element, "id")
        }

        fn has_class(&self, element: usize, class: &str) -> bool {
            self.attr(element, "class")
                .is_some_and(|classes| classes.split_ascii_whitespace().any(|token| token == class))
        }

        fn attr(&self, element: usize, name: &str) -> Option<&str> {
            self.elements[element]
                .attrs
                .iter()
                .find(|(attr_name, _)| *attr_name == name)
                .map(|(_, value)| *value)
        }

        fn is_empty(&self, element: usize) -> bool {
            !self
                .elements
                .iter()
                .any(|other| other.parent == Some(element))
        }
    }

    /// ```text
    /// 0 <section class="outer">
    /// 1   <div class="inner">
    /// 2     <p id="first" lang="en-US">
    /// 3     <p id="second" class="note warn" data-x="">
    /// 4     <span title="hello world">
    /// 5       <em>
    /// ```
    fn fixture() -> Fixture {
        let element = |tag, parent, attrs| FixtureElement { tag, parent, attrs };
        Fixture {
            elements: vec![
                element("section", None, vec![("class", "outer")]),
                element("div", Some(0), vec![("class", "inner")]),
                element("p", Some(1), vec![("id", "first"), ("lang", "en-US")]),
                element(
                    "p",
                    Some(1),
                    vec![("id", "second"), ("class", "note warn"), ("data-x", "")],
                ),
                element("span", Some(1), vec![("title", "hello world")]),
                element("em", Some(4), vec![]),
            ],
        }
    }

    fn matches(fixture: &Fixture, element: usize, selector: &str) -> bool {
        let list = parse_selector_list(selector).unwrap();
        matches_selector_list(fixture, element, &list)
    }

    #[test]
    fn simple_selectors() {
        let tree = fixture();
        assert!(matches(&tree, 2, "p"));
        assert!(matches(&tree, 2, "P"));
        assert!(matches(&tree, 2, "#first"));
        assert!(!matches(&tree, 2, "#First"));
        assert!(matches(&tree, 3, ".warn.note"));
        assert!(matches(&tree, 3, "*"));
        assert!(!matches(&tree, 2, ".note"));
    }

    #[test]
    fn attribute_selectors() {
        let tree = fixture();
        assert!(matches(&tree, 3, "[data-x]"));
        assert!(matches(&tree, 3, "[data-x='']"));
        assert!(!matches(&tree, 2, "[data-x]"));
        assert!(matches(&tree, 2, "[lang|=en]"));
        assert!(!matches(&tree, 2, "[lang|=e]"));
        assert!(matches(&tree, 4, "[title~=world]"));
        assert!(!matches(&tree, 4, "[title~='hello world']"));
        assert!(matches(&tree, 4, "[title^=hel]"));
        assert!(matches(&tree, 4, "[title$=rld]"));
        assert!(matches(&tree, 4, "[title*='o w']"));
        assert!(!matches(&tree, 4, "[title^='']"));
    }

    #[test]
    fn combinators() {
        let tree = fixture();
        assert!(matches(&tree, 2, "section p"));
        assert!(matches(&tree, 2, "div > p"));
        assert!(!matches(&tree, 2, "section > p"));
        assert!(matches(&tree, 3, "#first + p"));
        assert!(matches(&tree, 4, "#first ~ span"));
        assert!(!matches(&tree, 4, "#first + span"));
    }

    #[test]
    fn descendant_combinator_backtracks() {
        let tree = fixture();
        // The nearest `*` ancestor of the em is the span, whose parent is the
        // div rather than `.outer`; the match has to continue up to the div.
        assert!(matches(&tree, 5, ".outer > * em"));
        assert!(!matches(&tree, 5, ".missing > * em"));
    }

    #[test]
    fn structural_pseudo_classes_and_negation() {
        let tree = fixture();
        assert!(matches(&tree, 2, "p:first-child"));
        assert!(!matches(&tree, 3, "p:first-child"));
        assert!(matches(&tree, 4, ":last-child"));
        assert!(matches(&tree, 1, ":only-child"));
        assert!(matches(&tree, 2, "p:not(.note)"));
        assert!(!matches(&tree, 3, "p:not(.note)"));
    }

    #[test]
    fn typed_and_nth_pseudo_classes() {
        let tree = fixture();
        // Children of the div: p#first, p#second, span.
        assert!(matches(&tree, 2, "p:first-of-type"));
        assert!(matches(&tree, 3, "p:last-of-type"));
        assert!(!matches(&tree, 3, "p:first-of-type"));
        assert!(matches(&tree, 4, "span:first-of-type:only-of-type"));
        assert!(!matches(&tree, 2, ":only-of-type"));
        assert!(matches(&tree, 3, ":nth-child(2)"));
        assert!(matches(&tree, 4, ":nth-child(odd)"));
        assert!(!matches(&tree, 3, ":nth-child(odd)"));
        assert!(matches(&tree, 2, ":nth-last-child(3)"));
        assert!(matches(&tree, 3, "p:nth-of-type(2)"));
        assert!(matches(&tree, 2, "p:nth-last-of-type(2)"));
        assert!(matches(&tree, 2, ":nth-child(-n+2)"));
        assert!(matches(&tree, 3, ":nth-child(-n+2)"));
        assert!(!matches(&tree, 4, ":nth-child(-n+2)"));
        assert!(matches(&tree, 4, ":nth-child(3n)"));
        assert!(!matches(&tree, 2, ":nth-child(0)"));
    }

    #[test]
    fn root_empty_and_pseudo_elements() {
        let tree = fixture();
        assert!(matches(&tree, 0, ":root"));
        assert!(!matches(&tree, 1, ":root"));
        assert!(matches(&tree, 5, "em:empty"));
        assert!(!matches(&tree, 4, ":empty"));
        assert!(!matches(&tree, 2, "p::before"));
        assert!(!matches(&tree, 2, "p:after"));
        assert!(matches(&tree, 2, "p::before, #first"));
    }

    #[test]
    fn selector_list_matches_any() {
        let tree = fixture();
        assert!(matches(&tree, 4, "p, span"));
        assert!(!matches(&tree, 1, "p, span"));
    }
}
