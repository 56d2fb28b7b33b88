use std::borrow::Cow;

use crate::formula::error::ReduceError;
use crate::formula::token::{
    Arity, BinaryOp, Expr, OpClass, Operator, Token, TokenData, TokenKind, UnaryOp, covering_span,
};

/// Rewrite applied to a matched window. The window is moved in and the returned tokens
/// take its place; a rewrite that cannot handle its input hands it back unchanged, which
/// the engine reports as [`ReduceError::NonShrinkingRule`].
pub type Rewrite = fn(Vec<Token>) -> Vec<Token>;

/// One production of the Markov algorithm: a pattern of kind tags plus a rewrite.
///
/// `not_before` / `not_after` name kinds that must not sit directly left / right of the
/// window. They are checked but never consumed. A missing neighbour always passes.
#[derive(Clone, Copy)]
pub struct MarkovRule {
    pub name: &'static str,
    pub pattern: &'static [TokenKind],
    pub not_before: &'static [TokenKind],
    pub not_after: &'static [TokenKind],
    rewrite: Rewrite,
}

impl std::fmt::Debug for MarkovRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MarkovRule")
            .field("name", &self.name)
            .field("pattern", &self.pattern)
            .field("not_before", &self.not_before)
            .field("not_after", &self.not_after)
            .finish_non_exhaustive()
    }
}

impl MarkovRule {
    pub const fn new(name: &'static str, pattern: &'static [TokenKind], rewrite: Rewrite) -> Self {
        Self {
            name,
            pattern,
            not_before: &[],
            not_after: &[],
            rewrite,
        }
    }

    pub const fn not_before(mut self, kinds: &'static [TokenKind]) -> Self {
        self.not_before = kinds;
        self
    }

    pub const fn not_after(mut self, kinds: &'static [TokenKind]) -> Self {
        self.not_after = kinds;
        self
    }

    /// Return `true` when the window starting at `pos` matches the pattern and both
    /// neighbour constraints hold.
    pub fn matches_at(&self, tokens: &[Token], pos: usize) -> bool {
        let end = pos + self.pattern.len();
        if end > tokens.len() {
            return false;
        }
        let window_ok = tokens[pos..end]
            .iter()
            .zip(self.pattern)
            .all(|(t, k)| t.kind() == *k);
        if !window_ok {
            return false;
        }
        if pos > 0 && self.not_before.contains(&tokens[pos - 1].kind()) {
            return false;
        }
        if let Some(next) = tokens.get(end)
            && self.not_after.contains(&next.kind())
        {
            return false;
        }
        true
    }

    /// Leftmost position where this rule matches.
    pub fn find(&self, tokens: &[Token]) -> Option<usize> {
        if tokens.len() < self.pattern.len() {
            return None;
        }
        (0..=tokens.len() - self.pattern.len()).find(|&pos| self.matches_at(tokens, pos))
    }

    pub fn apply(&self, matched: Vec<Token>) -> Vec<Token> {
        (self.rewrite)(matched)
    }
}

/// Ordered, immutable list of rules, highest priority first.
#[derive(Clone, Debug)]
pub struct RuleSet {
    rules: Cow<'static, [MarkovRule]>,
}

impl RuleSet {
    /// The formula grammar: grouping, function calls, then operators from tightest to
    /// loosest binding.
    pub fn standard() -> Self {
        Self {
            rules: Cow::Borrowed(STANDARD_RULES),
        }
    }

    /// Build a custom rule set. Every pattern must span at least two tokens so that
    /// each application strictly shrinks the sequence.
    pub fn new(rules: Vec<MarkovRule>) -> Result<Self, ReduceError> {
        if let Some(r) = rules.iter().find(|r| r.pattern.len() < 2) {
            return Err(ReduceError::NonShrinkingRule { rule: r.name });
        }
        Ok(Self {
            rules: Cow::Owned(rules),
        })
    }

    pub fn rules(&self) -> &[MarkovRule] {
        &self.rules
    }

    pub fn get(&self, name: &str) -> Option<&MarkovRule> {
        self.rules.iter().find(|r| r.name == name)
    }

    /// First rule (in priority order) that matches anywhere, with its leftmost position.
    pub fn find_match(&self, tokens: &[Token]) -> Option<(&MarkovRule, usize)> {
        self.rules
            .iter()
            .find_map(|rule| rule.find(tokens).map(|pos| (rule, pos)))
    }
}

impl Default for RuleSet {
    fn default() -> Self {
        Self::standard()
    }
}

const VALUE: TokenKind = TokenKind::Value;
const SEP: TokenKind = TokenKind::Separator;
const OPEN: TokenKind = TokenKind::BracketOpen;
const CLOSE: TokenKind = TokenKind::BracketClose;
const SIGN: TokenKind = TokenKind::Operator(OpClass::Sign);
const POW: TokenKind = TokenKind::Operator(OpClass::Power);
const MUL: TokenKind = TokenKind::Operator(OpClass::Multiplicative);
const ADD: TokenKind = TokenKind::Operator(OpClass::Additive);
const CMP: TokenKind = TokenKind::Operator(OpClass::Comparison);

static STANDARD_RULES: &[MarkovRule] = &[
    MarkovRule::new("group", &[OPEN, VALUE, CLOSE], group),
    MarkovRule::new(
        "unary_function",
        &[TokenKind::Function(Arity::Unary), VALUE, CLOSE],
        unary_function,
    ),
    MarkovRule::new(
        "binary_function",
        &[TokenKind::Function(Arity::Binary), VALUE, SEP, VALUE, CLOSE],
        binary_function,
    ),
    MarkovRule::new(
        "ternary_function",
        &[
            TokenKind::Function(Arity::Ternary),
            VALUE,
            SEP,
            VALUE,
            SEP,
            VALUE,
            CLOSE,
        ],
        ternary_function,
    ),
    // Right associative: `a ^ b ^ c` waits until `b ^ c` is reduced.
    MarkovRule::new("power", &[VALUE, POW, VALUE], binary_operator).not_after(&[POW]),
    MarkovRule::new("negate", &[SIGN, VALUE], negate).not_after(&[POW]),
    MarkovRule::new("multiplicative", &[VALUE, MUL, VALUE], binary_operator)
        .not_before(&[POW, SIGN])
        .not_after(&[POW]),
    MarkovRule::new("additive", &[VALUE, ADD, VALUE], binary_operator)
        .not_before(&[POW, MUL, SIGN])
        .not_after(&[POW, MUL]),
    MarkovRule::new("comparison", &[VALUE, CMP, VALUE], binary_operator)
        .not_before(&[POW, MUL, ADD, SIGN])
        .not_after(&[POW, MUL, ADD]),
];

fn group(matched: Vec<Token>) -> Vec<Token> {
    let span = covering_span(&matched).unwrap_or_default();
    match <[Token; 3]>::try_from(matched) {
        Ok(
            [
                _,
                Token {
                    data: TokenData::Value(inner),
                    ..
                },
                _,
            ],
        ) => vec![Token::value(
            Expr::Group {
                inner: Box::new(inner),
            },
            span,
        )],
        Ok(other) => other.into(),
        Err(v) => v,
    }
}

fn unary_function(matched: Vec<Token>) -> Vec<Token> {
    let span = covering_span(&matched).unwrap_or_default();
    match <[Token; 3]>::try_from(matched) {
        Ok(
            [
                Token {
                    data: TokenData::Function { name, .. },
                    ..
                },
                Token {
                    data: TokenData::Value(arg),
                    ..
                },
                _,
            ],
        ) => vec![Token::value(
            Expr::UnaryFunction {
                name,
                arg: Box::new(arg),
            },
            span,
        )],
        Ok(other) => other.into(),
        Err(v) => v,
    }
}

fn binary_function(matched: Vec<Token>) -> Vec<Token> {
    let span = covering_span(&matched).unwrap_or_default();
    match <[Token; 5]>::try_from(matched) {
        Ok(
            [
                Token {
                    data: TokenData::Function { name, .. },
                    ..
                },
                Token {
                    data: TokenData::Value(left),
                    ..
                },
                _,
                Token {
                    data: TokenData::Value(right),
                    ..
                },
                _,
            ],
        ) => vec![Token::value(
            Expr::BinaryFunction {
                name,
                left: Box::new(left),
                right: Box::new(right),
            },
            span,
        )],
        Ok(other) => other.into(),
        Err(v) => v,
    }
}

fn ternary_function(matched: Vec<Token>) -> Vec<Token> {
    let span = covering_span(&matched).unwrap_or_default();
    match <[Token; 7]>::try_from(matched) {
        Ok(
            [
                Token {
                    data: TokenData::Function { name, .. },
                    ..
                },
                Token {
                    data: TokenData::Value(a),
                    ..
                },
                _,
                Token {
                    data: TokenData::Value(b),
                    ..
                },
                _,
                Token {
                    data: TokenData::Value(c),
                    ..
                },
                _,
            ],
        ) => vec![Token::value(
            Expr::TernaryFunction {
                name,
                args: Box::new([a, b, c]),
            },
            span,
        )],
        Ok(other) => other.into(),
        Err(v) => v,
    }
}

fn binary_operator(matched: Vec<Token>) -> Vec<Token> {
    let span = covering_span(&matched).unwrap_or_default();
    match <[Token; 3]>::try_from(matched) {
        Ok(
            [
                Token {
                    data: TokenData::Value(left),
                    ..
                },
                Token {
                    data: TokenData::Operator(Operator::Binary(op)),
                    ..
                },
                Token {
                    data: TokenData::Value(right),
                    ..
                },
            ],
        ) => vec![Token::value(binary(op, left, right), span)],
        Ok(other) => other.into(),
        Err(v) => v,
    }
}

fn negate(matched: Vec<Token>) -> Vec<Token> {
    let span = covering_span(&matched).unwrap_or_default();
    match <[Token; 2]>::try_from(matched) {
        Ok(
            [
                Token {
                    data: TokenData::Operator(Operator::Negate),
                    ..
                },
                Token {
                    data: TokenData::Value(operand),
                    ..
                },
            ],
        ) => vec![Token::value(
            Expr::Unary {
                op: UnaryOp::Neg,
                operand: Box::new(operand),
            },
            span,
        )],
        Ok(other) => other.into(),
        Err(v) => v,
    }
}

fn binary(op: BinaryOp, left: Expr, right: Expr) -> Expr {
    Expr::Binary {
        op,
        left: Box::new(left),
        right: Box::new(right),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/formula/rules.rs"]
mod tests;
