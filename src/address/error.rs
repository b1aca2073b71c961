use thiserror::Error;

/// Raised when a raw string cannot be decomposed into local-part and domain.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("address is empty")]
    Empty,
    #[error("address contains multi-byte character {ch:?} at byte {position}")]
    MultiByte { ch: char, position: usize },
    #[error("unterminated quoted string")]
    UnterminatedQuote,
    #[error("unbalanced comment parentheses")]
    UnbalancedComment,
    #[error("unbalanced angle brackets")]
    UnbalancedAngle,
    #[error("unexpected content after angle address: {content:?}")]
    TrailingContent { content: String },
    #[error("invalid character {ch:?} in {segment}")]
    InvalidCharacter { ch: char, segment: &'static str },
    #[error("unexpected whitespace in {segment}")]
    UnexpectedWhitespace { segment: &'static str },
    #[error("local part is empty")]
    EmptyLocal,
    #[error("domain is empty")]
    EmptyDomain,
}

impl ParseError {
    pub(crate) fn invalid_char(ch: char, segment: &'static str) -> Self {
        Self::InvalidCharacter { ch, segment }
    }

    pub(crate) fn whitespace(segment: &'static str) -> Self {
        Self::UnexpectedWhitespace { segment }
    }
}
