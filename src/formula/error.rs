use crate::foundation::core::{ImageIndex, Span};
use crate::formula::token::{Token, covering_span, describe_tokens};

/// Lexical failure: the text contains something that is not a token.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum LexError {
    #[error("unexpected character '{ch}' at {span}")]
    UnexpectedChar { ch: char, span: Span },

    #[error("invalid number \"{text}\" at {span}")]
    InvalidNumber { text: String, span: Span },

    #[error("unknown identifier \"{name}\" at {span}")]
    UnknownIdentifier { name: String, span: Span },

    #[error("brackets nested deeper than {limit} at {span}")]
    NestingTooDeep { limit: usize, span: Span },

    #[error("formula longer than {limit} tokens at {span}")]
    TooManyTokens { limit: usize, span: Span },
}

impl LexError {
    /// Source region of the offending text.
    pub fn span(&self) -> Span {
        match self {
            LexError::UnexpectedChar { span, .. }
            | LexError::InvalidNumber { span, .. }
            | LexError::UnknownIdentifier { span, .. }
            | LexError::NestingTooDeep { span, .. }
            | LexError::TooManyTokens { span, .. } => *span,
        }
    }
}

/// Rewrite failure: the token sequence could not be reduced to a single value.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ReduceError {
    #[error("empty formula")]
    Empty,

    /// No rule matches and more than one token (or a lone non-value token) remains.
    #[error("no rule applies to {}", describe_tokens(.residual))]
    Stuck { residual: Vec<Token> },

    /// A rule produced a replacement that is not shorter than its match.
    #[error("rule '{rule}' did not shrink the token sequence")]
    NonShrinkingRule { rule: &'static str },
}

impl ReduceError {
    /// Source region covered by the residual tokens, when there are any.
    pub fn span(&self) -> Option<Span> {
        match self {
            ReduceError::Stuck { residual } => covering_span(residual),
            ReduceError::Empty | ReduceError::NonShrinkingRule { .. } => None,
        }
    }

    pub fn is_stuck(&self) -> bool {
        matches!(self, ReduceError::Stuck { .. })
    }
}

/// Grammar-level failure, either lexical or during reduction.
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum SyntaxError {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error(transparent)]
    Reduce(#[from] ReduceError),
}

impl SyntaxError {
    pub fn span(&self) -> Option<Span> {
        match self {
            SyntaxError::Lex(e) => Some(e.span()),
            SyntaxError::Reduce(e) => e.span(),
        }
    }
}

/// Failure of [`Formula::apply_formula`](crate::Formula::apply_formula).
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum FormulaError {
    #[error("syntax error: {0}")]
    Syntax(#[from] SyntaxError),

    /// Grammatically valid reference to an image slot beyond the supplied count.
    #[error("unknown image {0}")]
    UnknownImage(ImageIndex),
}

impl FormulaError {
    /// Source region to highlight, when known.
    pub fn span(&self) -> Option<Span> {
        match self {
            FormulaError::Syntax(e) => e.span(),
            FormulaError::UnknownImage(_) => None,
        }
    }

    /// Return `true` for reduction that got stuck.
    pub fn is_stuck(&self) -> bool {
        matches!(self, FormulaError::Syntax(SyntaxError::Reduce(e)) if e.is_stuck())
    }
}

impl From<LexError> for FormulaError {
    fn from(e: LexError) -> Self {
        FormulaError::Syntax(e.into())
    }
}

impl From<ReduceError> for FormulaError {
    fn from(e: ReduceError) -> Self {
        FormulaError::Syntax(e.into())
    }
}
