//! Formula compiler: text → tokens → Markov-rule reduction → validated expression tree.

pub mod engine;
pub mod error;
pub mod functions;
pub mod lexer;
pub mod rules;
pub mod token;

use crate::foundation::core::ImageIndex;
use crate::formula::engine::reduce;
use crate::formula::error::FormulaError;
use crate::formula::lexer::tokenize;
use crate::formula::rules::RuleSet;
use crate::formula::token::Expr;

/// Compile `text` into a reduced tree whose image references are all `< num_images`.
///
/// Stateless; [`Formula`] wraps this with accepted-state tracking.
pub fn compile(text: &str, num_images: usize) -> Result<Expr, FormulaError> {
    compile_with(text, num_images, &RuleSet::standard())
}

/// [`compile`] with a caller-supplied rule set.
pub fn compile_with(text: &str, num_images: usize, rules: &RuleSet) -> Result<Expr, FormulaError> {
    let tokens = tokenize(text)?;
    let expr = reduce(tokens, rules)?;
    validate_images(&expr, num_images)?;
    Ok(expr)
}

/// Reject the first (leftmost) image reference that is out of range.
fn validate_images(expr: &Expr, num_images: usize) -> Result<(), FormulaError> {
    match expr.images().into_iter().find(|i| !i.is_within(num_images)) {
        Some(bad) => Err(FormulaError::UnknownImage(bad)),
        None => Ok(()),
    }
}

/// One user-editable formula: its last accepted text and the tree compiled from it.
///
/// Failed applies leave the accepted state untouched.
#[derive(Clone, Debug, PartialEq)]
pub struct Formula {
    source: String,
    root: Option<Expr>,
    num_images: usize,
}

impl Default for Formula {
    fn default() -> Self {
        Self::empty()
    }
}

impl Formula {
    /// A formula that has never been applied.
    pub fn empty() -> Self {
        Self {
            source: String::new(),
            root: None,
            num_images: 0,
        }
    }

    /// Construct from a previously applied expression.
    pub fn new(text: &str, num_images: usize) -> Result<Self, FormulaError> {
        let mut f = Self::empty();
        f.apply_formula(text, num_images)?;
        Ok(f)
    }

    /// Tokenize, reduce and validate `text`; on success replace the stored tree and
    /// remember `text` verbatim.
    #[tracing::instrument(level = "debug", skip(self), err)]
    pub fn apply_formula(&mut self, text: &str, num_images: usize) -> Result<(), FormulaError> {
        let expr = compile(text, num_images)?;
        tracing::debug!(tree = %expr, nodes = expr.node_count(), "formula accepted");
        self.root = Some(expr);
        self.source = text.to_owned();
        self.num_images = num_images;
        Ok(())
    }

    /// Return `true` when `candidate` differs from the last accepted text. No re-parse.
    pub fn has_changes(&self, candidate: &str) -> bool {
        self.root.is_none() || self.source != candidate
    }

    /// Last accepted text (empty before the first successful apply).
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Reduced tree, if a formula has been accepted.
    pub fn root(&self) -> Option<&Expr> {
        self.root.as_ref()
    }

    /// Image count the accepted tree was validated against.
    pub fn num_images(&self) -> usize {
        self.num_images
    }

    /// Highest image index referenced by the accepted tree.
    pub fn max_image(&self) -> Option<ImageIndex> {
        self.root.as_ref().and_then(Expr::max_image)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/formula/formula.rs"]
mod tests;
