use crate::formula::error::ReduceError;
use crate::formula::rules::RuleSet;
use crate::formula::token::{Expr, Token, TokenData};

/// Outcome of a successful reduction.
#[derive(Clone, Debug, PartialEq)]
pub struct Reduction {
    /// Tree carried by the single remaining Value token.
    pub root: Expr,
    /// Number of rule applications performed.
    pub steps: usize,
}

/// Reduce `tokens` to a single Value token by repeatedly applying the first matching rule
/// at its leftmost match, and return that token's tree.
pub fn reduce(tokens: Vec<Token>, rules: &RuleSet) -> Result<Expr, ReduceError> {
    reduce_traced(tokens, rules).map(|r| r.root)
}

/// Like [`reduce`], also reporting how many rewrite steps were taken.
///
/// Every step strictly shrinks the sequence, so `steps < tokens.len()` on success.
pub fn reduce_traced(mut tokens: Vec<Token>, rules: &RuleSet) -> Result<Reduction, ReduceError> {
    if tokens.is_empty() {
        return Err(ReduceError::Empty);
    }

    let mut steps = 0usize;
    while tokens.len() > 1 {
        let Some((rule, pos)) = rules.find_match(&tokens) else {
            return Err(ReduceError::Stuck { residual: tokens });
        };

        let before = tokens.len();
        let end = pos + rule.pattern.len();
        let matched: Vec<Token> = tokens.drain(pos..end).collect();
        let replacement = rule.apply(matched);
        if replacement.len() >= rule.pattern.len() {
            return Err(ReduceError::NonShrinkingRule { rule: rule.name });
        }
        tokens.splice(pos..pos, replacement);
        debug_assert!(tokens.len() < before);

        steps += 1;
        tracing::trace!(rule = rule.name, pos, remaining = tokens.len(), "rewrite");
    }

    let root = tokens.pop().ok_or(ReduceError::Empty)?;
    match root.data {
        TokenData::Value(expr) => Ok(Reduction { root: expr, steps }),
        _ => Err(ReduceError::Stuck {
            residual: vec![root],
        }),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/formula/engine.rs"]
mod tests;
