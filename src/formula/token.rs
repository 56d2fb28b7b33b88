use std::fmt;

use crate::foundation::core::{ImageIndex, Span};

/// Precedence class of an operator token, tightest first.
///
/// The class is part of the token's kind tag so that rule patterns can tell `*` from `+`
/// without ever looking at payloads.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum OpClass {
    /// Unary minus in operand position.
    Sign,
    /// `^`
    Power,
    /// `*` `/`
    Multiplicative,
    /// `+` `-`
    Additive,
    /// `<` `<=` `>` `>=` `==` `!=`
    Comparison,
}

/// Number of arguments a function token expects, as listed in the function catalog.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Arity {
    /// One argument.
    Unary,
    /// Two arguments.
    Binary,
    /// Three arguments.
    Ternary,
    /// Name not in the catalog; no rule reduces it.
    Unknown,
}

/// Payload-free tag of a [`Token`]. Rule patterns are sequences of these.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// An operand: literal, image reference or reduced sub-expression.
    Value,
    /// `name(` with the opening bracket absorbed.
    Function(Arity),
    /// Arithmetic or comparison symbol.
    Operator(OpClass),
    /// `,`
    Separator,
    /// `(`
    BracketOpen,
    /// `)`
    BracketClose,
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Value => f.write_str("Value"),
            TokenKind::Function(arity) => write!(f, "Function({arity:?})"),
            TokenKind::Operator(class) => write!(f, "Operator({class:?})"),
            TokenKind::Separator => f.write_str("Separator"),
            TokenKind::BracketOpen => f.write_str("BracketOpen"),
            TokenKind::BracketClose => f.write_str("BracketClose"),
        }
    }
}

/// Binary operators, evaluated component-wise.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Pow,
    Lt,
    Le,
    Gt,
    Ge,
    Eq,
    Ne,
}

impl BinaryOp {
    /// Source symbol.
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Pow => "^",
            BinaryOp::Lt => "<",
            BinaryOp::Le => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::Ge => ">=",
            BinaryOp::Eq => "==",
            BinaryOp::Ne => "!=",
        }
    }

    /// Precedence class used in the operator's kind tag.
    pub fn class(self) -> OpClass {
        match self {
            BinaryOp::Pow => OpClass::Power,
            BinaryOp::Mul | BinaryOp::Div => OpClass::Multiplicative,
            BinaryOp::Add | BinaryOp::Sub => OpClass::Additive,
            BinaryOp::Lt
            | BinaryOp::Le
            | BinaryOp::Gt
            | BinaryOp::Ge
            | BinaryOp::Eq
            | BinaryOp::Ne => OpClass::Comparison,
        }
    }
}

/// Unary operators.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnaryOp {
    Neg,
}

/// Payload of an operator token.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operator {
    /// Unary minus.
    Negate,
    /// Any binary operator.
    Binary(BinaryOp),
}

impl Operator {
    /// Precedence class used in the token's kind tag.
    pub fn class(self) -> OpClass {
        match self {
            Operator::Negate => OpClass::Sign,
            Operator::Binary(op) => op.class(),
        }
    }

    /// Source symbol.
    pub fn symbol(self) -> &'static str {
        match self {
            Operator::Negate => "-",
            Operator::Binary(op) => op.symbol(),
        }
    }
}

/// Reduced expression tree: the payload of a [`TokenKind::Value`] token and the output of
/// a successful reduction.
///
/// The tree never contains functions, operators, separators or brackets in unreduced
/// form, so downstream consumers only ever walk these variants.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Expr {
    /// Numeric literal, broadcast to all channels.
    Number { value: f32 },
    /// Sample of an input image.
    Image { index: ImageIndex },
    Unary {
        op: UnaryOp,
        operand: Box<Expr>,
    },
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    UnaryFunction {
        name: String,
        arg: Box<Expr>,
    },
    BinaryFunction {
        name: String,
        left: Box<Expr>,
        right: Box<Expr>,
    },
    TernaryFunction {
        name: String,
        args: Box<[Expr; 3]>,
    },
    /// Parenthesized sub-expression. Kept so the tree prints back with the user's grouping.
    Group { inner: Box<Expr> },
}

impl Expr {
    /// Literal constructor.
    pub fn number(value: f32) -> Self {
        Expr::Number { value }
    }

    /// Image reference constructor.
    pub fn image(index: u32) -> Self {
        Expr::Image {
            index: ImageIndex(index),
        }
    }

    /// Direct children in evaluation order.
    pub fn children(&self) -> Vec<&Expr> {
        match self {
            Expr::Number { .. } | Expr::Image { .. } => Vec::new(),
            Expr::Unary { operand, .. } => vec![&**operand],
            Expr::UnaryFunction { arg, .. } => vec![&**arg],
            Expr::Group { inner } => vec![&**inner],
            Expr::Binary { left, right, .. } | Expr::BinaryFunction { left, right, .. } => {
                vec![&**left, &**right]
            }
            Expr::TernaryFunction { args, .. } => args.iter().collect(),
        }
    }

    /// Visit every node, parents before children.
    pub fn walk<'a>(&'a self, f: &mut impl FnMut(&'a Expr)) {
        f(self);
        for c in self.children() {
            c.walk(f);
        }
    }

    /// Every image index referenced by the tree, in source order (duplicates kept).
    pub fn images(&self) -> Vec<ImageIndex> {
        let mut out = Vec::new();
        self.walk(&mut |e| {
            if let Expr::Image { index } = e {
                out.push(*index);
            }
        });
        out
    }

    /// Highest referenced image index, if any.
    pub fn max_image(&self) -> Option<ImageIndex> {
        self.images().into_iter().max()
    }

    /// Total number of nodes.
    pub fn node_count(&self) -> usize {
        let mut n = 0usize;
        self.walk(&mut |_| n += 1);
        n
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Number { value } => write!(f, "{value}"),
            Expr::Image { index } => write!(f, "{index}"),
            // A sign glued to a literal lexes as part of it; the space keeps the negation.
            Expr::Unary {
                op: UnaryOp::Neg,
                operand,
            } if matches!(**operand, Expr::Number { .. }) => write!(f, "- {operand}"),
            Expr::Unary {
                op: UnaryOp::Neg,
                operand,
            } => write!(f, "-{operand}"),
            Expr::Binary { op, left, right } => write!(f, "{left} {} {right}", op.symbol()),
            Expr::UnaryFunction { name, arg } => write!(f, "{name}({arg})"),
            Expr::BinaryFunction { name, left, right } => write!(f, "{name}({left}, {right})"),
            Expr::TernaryFunction { name, args } => {
                let [a, b, c] = &**args;
                write!(f, "{name}({a}, {b}, {c})")
            }
            Expr::Group { inner } => write!(f, "({inner})"),
        }
    }
}

/// Token payload.
#[derive(Clone, Debug, PartialEq)]
pub enum TokenData {
    Value(Expr),
    Function { name: String, arity: Arity },
    Operator(Operator),
    Separator,
    BracketOpen,
    BracketClose,
}

/// A lexed or rewritten token plus the source region it covers.
#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub data: TokenData,
    pub span: Span,
}

impl Token {
    pub fn new(data: TokenData, span: Span) -> Self {
        Self { data, span }
    }

    /// Value token wrapping `expr`.
    pub fn value(expr: Expr, span: Span) -> Self {
        Self::new(TokenData::Value(expr), span)
    }

    /// Kind tag used for pattern matching.
    pub fn kind(&self) -> TokenKind {
        match &self.data {
            TokenData::Value(_) => TokenKind::Value,
            TokenData::Function { arity, .. } => TokenKind::Function(*arity),
            TokenData::Operator(op) => TokenKind::Operator(op.class()),
            TokenData::Separator => TokenKind::Separator,
            TokenData::BracketOpen => TokenKind::BracketOpen,
            TokenData::BracketClose => TokenKind::BracketClose,
        }
    }

    pub fn as_value(&self) -> Option<&Expr> {
        match &self.data {
            TokenData::Value(e) => Some(e),
            _ => None,
        }
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.data {
            TokenData::Value(e) => write!(f, "{e}"),
            TokenData::Function { name, .. } => write!(f, "{name}("),
            TokenData::Operator(op) => f.write_str(op.symbol()),
            TokenData::Separator => f.write_str(","),
            TokenData::BracketOpen => f.write_str("("),
            TokenData::BracketClose => f.write_str(")"),
        }
    }
}

/// Render a token sequence as `text [kinds]` for diagnostics.
pub fn describe_tokens(tokens: &[Token]) -> String {
    let text = tokens
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ");
    let kinds = tokens
        .iter()
        .map(|t| t.kind().to_string())
        .collect::<Vec<_>>()
        .join(", ");
    format!("`{text}` [{kinds}]")
}

/// Smallest span covering every token, or `None` for an empty slice.
pub fn covering_span(tokens: &[Token]) -> Option<Span> {
    let first = tokens.first()?.span;
    Some(tokens.iter().fold(first, |acc, t| acc.join(t.span)))
}

#[cfg(test)]
#[path = "../../tests/unit/formula/token.rs"]
mod tests;
