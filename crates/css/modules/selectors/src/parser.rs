//! CSS selector parsing.
//! Reference: <https://www.w3.org/TR/selectors-3/#w3cselgrammar>

use crate::{
    AttrOperator, AttributeSelector, Combinator, ComplexSelector, CompoundSelector, NthIndex,
    PseudoClass, SelectorList, SelectorParseError, SimpleSelector,
};

/// Largest number of hex digits in a CSS escape.
const MAX_HEX_ESCAPE_DIGITS: usize = 6;

/// Pseudo-elements accepted after `::`.
const PSEUDO_ELEMENTS: &[&str] = &[
    "after",
    "backdrop",
    "before",
    "cue",
    "file-selector-button",
    "first-letter",
    "first-line",
    "marker",
    "placeholder",
    "selection",
];

/// Pseudo-elements that CSS 2 allowed with a single colon.
const LEGACY_PSEUDO_ELEMENTS: &[&str] = &["after", "before", "first-letter", "first-line"];

/// Valid pseudo-classes whose state a static tree does not have.
const UNSUPPORTED_PSEUDO_CLASSES: &[&str] = &[
    "active",
    "any-link",
    "checked",
    "default",
    "defined",
    "dir",
    "disabled",
    "enabled",
    "focus",
    "focus-visible",
    "focus-within",
    "has",
    "hover",
    "in-range",
    "indeterminate",
    "invalid",
    "is",
    "lang",
    "link",
    "optional",
    "out-of-range",
    "placeholder-shown",
    "read-only",
    "read-write",
    "required",
    "scope",
    "target",
    "valid",
    "visited",
    "where",
];

/// Name-start code points: letters, '_' and anything non-ASCII.
fn is_name_start(byte: u8) -> bool {
    byte.is_ascii_alphabetic() || byte == b'_' || !byte.is_ascii()
}

fn ends_with_pseudo_element(compound: &CompoundSelector) -> bool {
    matches!(
        compound.simples.last(),
        Some(SimpleSelector::PseudoElement(_))
    )
}

fn is_css_whitespace(ch: char) -> bool {
    ch.is_ascii_whitespace()
}

/// Digits only, no sign.
fn parse_unsigned(text: &str) -> Option<i32> {
    if text.is_empty() || !text.bytes().all(|byte| byte.is_ascii_digit()) {
        return None;
    }
    text.parse().ok()
}

/// Digits with an optional leading '+' or '-'.
fn parse_signed(text: &str) -> Option<i32> {
    if let Some(digits) = text.strip_prefix('-') {
        return parse_unsigned(digits)?.checked_neg();
    }
    parse_unsigned(text.strip_prefix('+').unwrap_or(text))
}

/// Parse the text between the parentheses of an `:nth-*` pseudo-class.
/// CSS Syntax 3 §6 — the An+B microsyntax
fn parse_an_plus_b(text: &str) -> Option<NthIndex> {
    let text = text.trim_matches(is_css_whitespace).to_ascii_lowercase();
    match text.as_str() {
        "odd" => return Some(NthIndex { step: 2, offset: 1 }),
        "even" => return Some(NthIndex { step: 2, offset: 0 }),
        _ => {}
    }
    let Some((step_text, offset_text)) = text.split_once('n') else {
        return Some(NthIndex {
            step: 0,
            offset: parse_signed(&text)?,
        });
    };
    let step = match step_text {
        "" | "+" => 1,
        "-" => -1,
        digits => parse_signed(digits)?,
    };
    let offset_text = offset_text.trim_start_matches(is_css_whitespace);
    let offset = if offset_text.is_empty() {
        0
    } else if let Some(magnitude) = offset_text.strip_prefix('+') {
        parse_unsigned(magnitude.trim_start_matches(is_css_whitespace))?
    } else if let Some(magnitude) = offset_text.strip_prefix('-') {
        parse_unsigned(magnitude.trim_start_matches(is_css_whitespace))?.checked_neg()?
    } else {
        return None;
    };
    Some(NthIndex { step, offset })
}

/// Cursor over a selector string.
struct SelectorTokenizer<'src> {
    /// The selector text.
    input: &'src str,
    /// Byte offset of the cursor; always on a char boundary.
    index: usize,
}

impl<'src> SelectorTokenizer<'src> {
    fn new(input: &'src str) -> Self {
        Self { input, index: 0 }
    }

    fn peek(&self) -> Option<u8> {
        self.input.as_bytes().get(self.index).copied()
    }

    fn peek_at(&self, offset: usize) -> Option<u8> {
        self.input
            .as_bytes()
            .get(self.index.saturating_add(offset))
            .copied()
    }

    fn current_char(&self) -> Option<char> {
        self.input.get(self.index..)?.chars().next()
    }

    /// Advance past an ASCII byte.
    fn bump(&mut self) {
        self.index = self.index.saturating_add(1);
    }

    fn advance_char(&mut self, ch: char) {
        self.index = self.index.saturating_add(ch.len_utf8());
    }

    /// Error for whatever sits under the cursor.
    fn unexpected(&self) -> SelectorParseError {
        match self.current_char() {
            Some(found) => SelectorParseError::UnexpectedChar {
                found,
                position: self.index,
            },
            None => SelectorParseError::UnexpectedEnd {
                position: self.index,
            },
        }
    }

    /// Skip ASCII whitespace, reporting whether any was seen.
    fn skip_whitespace(&mut self) -> bool {
        let start = self.index;
        while self.peek().is_some_and(|byte| byte.is_ascii_whitespace()) {
            self.bump();
        }
        self.index != start
    }

    /// True if an identifier starts under the cursor: no leading digit, and a
    /// leading '-' must be followed by a name-start, another '-' or an escape.
    /// CSS Syntax 3 §4.3.9
    fn starts_ident(&self) -> bool {
        match self.peek() {
            Some(b'-') => self
                .peek_at(1)
                .is_some_and(|next| is_name_start(next) || next == b'-' || next == b'\\'),
            Some(byte) => is_name_start(byte) || byte == b'\\',
            None => false,
        }
    }

    /// Consume a CSS identifier: ASCII alphanumerics, '-', '_', non-ASCII and escapes.
    fn consume_ident(&mut self) -> Result<String, SelectorParseError> {
        let start = self.index;
        if !self.starts_ident() {
            return Err(SelectorParseError::ExpectedIdent { position: start });
        }
        let mut out = String::new();
        while let Some(byte) = self.peek() {
            if byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_' {
                out.push(char::from(byte));
                self.bump();
            } else if byte == b'\\' {
                out.push(self.consume_escape()?);
            } else if let Some(ch) = self.current_char().filter(|ch| !ch.is_ascii()) {
                out.push(ch);
                self.advance_char(ch);
            } else {
                break;
            }
        }
        if out.is_empty() {
            return Err(SelectorParseError::ExpectedIdent { position: start });
        }
        Ok(out)
    }

    /// Consume a backslash escape: up to six hex digits plus one optional
    /// whitespace, or any single character taken literally.
    fn consume_escape(&mut self) -> Result<char, SelectorParseError> {
        self.bump();
        let hex_start = self.index;
        while self.index.saturating_sub(hex_start) < MAX_HEX_ESCAPE_DIGITS
            && self.peek().is_some_and(|byte| byte.is_ascii_hexdigit())
        {
            self.bump();
        }
        if self.index > hex_start {
            let digits = self.input.get(hex_start..self.index).unwrap_or_default();
            let code = u32::from_str_radix(digits, 16).unwrap_or(0);
            if self.peek().is_some_and(|byte| byte.is_ascii_whitespace()) {
                self.bump();
            }
            return Ok(char::from_u32(code)
                .filter(|ch| *ch != '\0')
                .unwrap_or(char::REPLACEMENT_CHARACTER));
        }
        match self.current_char() {
            Some(ch) => {
                self.advance_char(ch);
                Ok(ch)
            }
            None => Err(SelectorParseError::UnexpectedEnd {
                position: self.index,
            }),
        }
    }

    /// Consume a quoted string whose opening quote is under the cursor.
    fn consume_string(&mut self, quote: u8) -> Result<String, SelectorParseError> {
        let start = self.index;
        self.bump();
        let mut out = String::new();
        loop {
            match self.peek() {
                None => return Err(SelectorParseError::UnterminatedString { position: start }),
                Some(byte) if byte == quote => {
                    self.bump();
                    return Ok(out);
                }
                Some(b'\\') => out.push(self.consume_escape()?),
                Some(_) => {
                    let Some(ch) = self.current_char() else {
                        return Err(SelectorParseError::UnterminatedString { position: start });
                    };
                    out.push(ch);
                    self.advance_char(ch);
                }
            }
        }
    }

    /// Parse `[name]` or `[name <op> value]` with the '[' under the cursor.
    fn parse_attribute(&mut self) -> Result<AttributeSelector, SelectorParseError> {
        self.bump();
        self.skip_whitespace();
        let name = self.consume_ident()?.to_ascii_lowercase();
        self.skip_whitespace();
        let operator_byte = match self.peek() {
            Some(b']') => {
                self.bump();
                return Ok(AttributeSelector {
                    name,
                    operator: AttrOperator::Exists,
                });
            }
            Some(b'=') => {
                self.bump();
                None
            }
            Some(byte @ (b'~' | b'|' | b'^' | b'$' | b'*')) if self.peek_at(1) == Some(b'=') => {
                self.index = self.index.saturating_add(2);
                Some(byte)
            }
            _ => return Err(self.unexpected()),
        };
        self.skip_whitespace();
        let value = match self.peek() {
            Some(quote @ (b'"' | b'\'')) => self.consume_string(quote)?,
            Some(_) => self.consume_ident()?,
            None => return Err(self.unexpected()),
        };
        self.skip_whitespace();
        if self.peek() != Some(b']') {
            return Err(self.unexpected());
        }
        self.bump();
        let operator = match operator_byte {
            None => AttrOperator::Equals(value),
            Some(b'~') => AttrOperator::Includes(value),
            Some(b'|') => AttrOperator::DashMatch(value),
            Some(b'^') => AttrOperator::Prefix(value),
            Some(b'$') => AttrOperator::Suffix(value),
            Some(_) => AttrOperator::Substring(value),
        };
        Ok(AttributeSelector { name, operator })
    }

    /// Parse a pseudo-class or pseudo-element with the first ':' under the cursor.
    fn parse_pseudo(&mut self) -> Result<SimpleSelector, SelectorParseError> {
        let position = self.index;
        self.bump();
        if self.peek() == Some(b':') {
            self.bump();
            let name = self.consume_ident()?.to_ascii_lowercase();
            if PSEUDO_ELEMENTS.contains(&name.as_str()) {
                return Ok(SimpleSelector::PseudoElement(name));
            }
            return Err(SelectorParseError::UnknownPseudoElement { name, position });
        }

        let name = self.consume_ident()?.to_ascii_lowercase();
        if self.peek() == Some(b'(') {
            self.bump();
            return self.parse_functional_pseudo(name, position);
        }
        let pseudo = match name.as_str() {
            "root" => PseudoClass::Root,
            "empty" => PseudoClass::Empty,
            "first-child" => PseudoClass::FirstChild,
            "last-child" => PseudoClass::LastChild,
            "only-child" => PseudoClass::OnlyChild,
            "first-of-type" => PseudoClass::FirstOfType,
            "last-of-type" => PseudoClass::LastOfType,
            "only-of-type" => PseudoClass::OnlyOfType,
            _ if LEGACY_PSEUDO_ELEMENTS.contains(&name.as_str()) => {
                return Ok(SimpleSelector::PseudoElement(name));
            }
            _ if UNSUPPORTED_PSEUDO_CLASSES.contains(&name.as_str()) => {
                return Err(SelectorParseError::UnsupportedPseudoClass { name, position });
            }
            _ => return Err(SelectorParseError::UnknownPseudoClass { name, position }),
        };
        Ok(SimpleSelector::Pseudo(pseudo))
    }

    /// Parse the argument of `:name(` with the cursor just past the '('.
    fn parse_functional_pseudo(
        &mut self,
        name: String,
        position: usize,
    ) -> Result<SimpleSelector, SelectorParseError> {
        let nth_kind: fn(NthIndex) -> PseudoClass = match name.as_str() {
            "not" => return self.parse_negation(),
            "nth-child" => PseudoClass::NthChild,
            "nth-last-child" => PseudoClass::NthLastChild,
            "nth-of-type" => PseudoClass::NthOfType,
            "nth-last-of-type" => PseudoClass::NthLastOfType,
            _ if UNSUPPORTED_PSEUDO_CLASSES.contains(&name.as_str()) => {
                return Err(SelectorParseError::UnsupportedPseudoClass { name, position });
            }
            _ => return Err(SelectorParseError::UnknownPseudoClass { name, position }),
        };
        let nth = self.parse_nth()?;
        Ok(SimpleSelector::Pseudo(nth_kind(nth)))
    }

    /// Parse `An+B)` with the cursor just past the '('.
    fn parse_nth(&mut self) -> Result<NthIndex, SelectorParseError> {
        let start = self.index;
        let Some(length) = self.input.get(start..).and_then(|rest| rest.find(')')) else {
            return Err(SelectorParseError::UnexpectedEnd {
                position: self.input.len(),
            });
        };
        let close = start.saturating_add(length);
        let nth = self
            .input
            .get(start..close)
            .and_then(parse_an_plus_b)
            .ok_or(SelectorParseError::InvalidNth { position: start })?;
        self.index = close.saturating_add(1);
        Ok(nth)
    }

    /// Parse `compound)` with the cursor just past `:not(`.
    fn parse_negation(&mut self) -> Result<SimpleSelector, SelectorParseError> {
        self.skip_whitespace();
        let inner_position = self.index;
        let inner = self.parse_compound()?;
        if inner.simples.is_empty() {
            return Err(if self.peek() == Some(b')') {
                SelectorParseError::EmptySelector {
                    position: inner_position,
                }
            } else {
                self.unexpected()
            });
        }
        if ends_with_pseudo_element(&inner) {
            return Err(SelectorParseError::MisplacedPseudoElement {
                position: inner_position,
            });
        }
        self.skip_whitespace();
        if self.peek() != Some(b')') {
            return Err(self.unexpected());
        }
        self.bump();
        Ok(SimpleSelector::Negation(inner))
    }

    /// Parse a run of simple selectors with no whitespace between them.
    /// May return an empty compound; callers decide whether that is an error.
    fn parse_compound(&mut self) -> Result<CompoundSelector, SelectorParseError> {
        let mut compound = CompoundSelector::default();
        match self.peek() {
            Some(b'*') => {
                self.bump();
                compound.simples.push(SimpleSelector::Universal);
            }
            Some(_) if self.starts_ident() => {
                let name = self.consume_ident()?;
                compound
                    .simples
                    .push(SimpleSelector::Type(name.to_ascii_lowercase()));
            }
            _ => {}
        }
        loop {
            let simple = match self.peek() {
                Some(b'.') => {
                    self.bump();
                    SimpleSelector::Class(self.consume_ident()?)
                }
                Some(b'#') => {
                    self.bump();
                    SimpleSelector::IdSelector(self.consume_ident()?)
                }
                Some(b'[') => SimpleSelector::Attribute(self.parse_attribute()?),
                Some(b':') => self.parse_pseudo()?,
                _ => break,
            };
            let closes_compound = matches!(simple, SimpleSelector::PseudoElement(_));
            compound.simples.push(simple);
            if closes_compound {
                break;
            }
        }
        Ok(compound)
    }

    /// Parse one complex selector, stopping before a ',' or the end of input.
    fn parse_complex(&mut self) -> Result<ComplexSelector, SelectorParseError> {
        self.skip_whitespace();
        let position = self.index;
        let first = self.parse_compound()?;
        if first.simples.is_empty() {
            return Err(match self.peek() {
                None | Some(b',') => SelectorParseError::EmptySelector { position },
                Some(_) => self.unexpected(),
            });
        }

        let mut rest = Vec::new();
        let mut closed = ends_with_pseudo_element(&first);
        loop {
            let saw_whitespace = self.skip_whitespace();
            let combinator_position = self.index;
            let combinator = match self.peek() {
                None | Some(b',') => break,
                Some(_) if closed => {
                    return Err(SelectorParseError::MisplacedPseudoElement {
                        position: combinator_position,
                    });
                }
                Some(b'>') => Combinator::Child,
                Some(b'+') => Combinator::AdjacentSibling,
                Some(b'~') => Combinator::GeneralSibling,
                Some(_) if saw_whitespace => Combinator::Descendant,
                Some(_) => return Err(self.unexpected()),
            };
            if combinator != Combinator::Descendant {
                self.bump();
                self.skip_whitespace();
            }
            let compound = self.parse_compound()?;
            if compound.simples.is_empty() {
                return Err(match self.peek() {
                    None | Some(b',') => SelectorParseError::DanglingCombinator {
                        position: combinator_position,
                    },
                    Some(_) => self.unexpected(),
                });
            }
            closed = ends_with_pseudo_element(&compound);
            rest.push((combinator, compound));
        }

        Ok(ComplexSelector { first, rest })
    }
}

/// Parse a comma-separated selector list.
///
/// # Errors
/// Returns a [`SelectorParseError`] describing the first syntax error.
pub fn parse_selector_list(input: &str) -> Result<SelectorList, SelectorParseError> {
    let mut tokens = SelectorTokenizer::new(input);
    let mut list = SelectorList::default();
    loop {
        list.selectors.push(tokens.parse_complex()?);
        match tokens.peek() {
            None => break,
            Some(b',') => tokens.bump(),
            Some(_) => return Err(tokens.unexpected()),
        }
    }
    log::trace!(
        target: "css_selectors",
        "parsed '{input}' into {} selector(s)",
        list.selectors.len()
    );
    Ok(list)
}

/// Parse exactly one complex selector.
///
/// # Errors
/// Returns a [`SelectorParseError`] on a syntax error, including a trailing ','.
pub fn parse_complex_selector(input: &str) -> Result<ComplexSelector, SelectorParseError> {
    let mut tokens = SelectorTokenizer::new(input);
    let selector = tokens.parse_complex()?;
    if tokens.peek().is_some() {
        return Err(tokens.unexpected());
    }
    Ok(selector)
}
