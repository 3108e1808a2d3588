//! Selector syntax errors. Positions are byte offsets into the selector text.

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum SelectorParseError {
    #[error("empty selector at position {position}")]
    EmptySelector { position: usize },

    #[error("expected identifier at position {position}")]
    ExpectedIdent { position: usize },

    #[error("unexpected character '{found}' at position {position}")]
    UnexpectedChar { found: char, position: usize },

    #[error("unexpected end of selector at position {position}")]
    UnexpectedEnd { position: usize },

    #[error("unterminated string starting at position {position}")]
    UnterminatedString { position: usize },

    #[error("unknown pseudo-class ':{name}' at position {position}")]
    UnknownPseudoClass { name: String, position: usize },

    /// A valid pseudo-class that cannot be evaluated against a static tree.
    #[error("pseudo-class ':{name}' at position {position} is not supported")]
    UnsupportedPseudoClass { name: String, position: usize },

    #[error("unknown pseudo-element '::{name}' at position {position}")]
    UnknownPseudoElement { name: String, position: usize },

    #[error("invalid An+B expression at position {position}")]
    InvalidNth { position: usize },

    /// A pseudo-element followed by anything other than the end of its selector.
    #[error("pseudo-element must end its selector, found more at position {position}")]
    MisplacedPseudoElement { position: usize },

    #[error("combinator at position {position} has no selector after it")]
    DanglingCombinator { position: usize },
}
