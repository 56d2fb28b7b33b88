//! texformula compiles per-pixel image formulas such as `blend(I0, I1 * 0.5)` into
//! expression trees and evaluates them.
//!
//! # Pipeline overview
//!
//! 1. **Tokenize**: formula text -> flat token sequence ([`formula::lexer::tokenize`])
//! 2. **Reduce**: ordered Markov rewrite rules collapse the tokens into one value
//!    ([`formula::engine::reduce`], rules in [`RuleSet::standard`])
//! 3. **Validate**: every image reference must address one of the supplied images
//! 4. **Consume**: emit GLSL ([`codegen::glsl`]) or lower to bytecode and evaluate on the
//!    CPU ([`codegen::vm`], [`combine`])
//!
//! Compilation is deterministic and side-effect free; [`Formula`] and [`Equations`] add
//! accepted-state tracking on top of it.
#![forbid(unsafe_code)]

mod assets;
mod equations;
mod foundation;
mod render;

/// Backends for reduced trees.
pub mod codegen;
/// Formula tokenizer, rewrite rules and reduction engine.
pub mod formula;

pub use assets::decode::{decode_image, encode_png, load_image, save_image};
pub use codegen::CodegenError;
pub use codegen::bytecode::Program;
pub use codegen::glsl::{GlslOptions, emit as emit_glsl, fragment_shader};
pub use codegen::lower::lower;
pub use codegen::vm::{VmError, eval, eval_samples};
pub use equations::{
    ApplyErrors, Channel, DEFAULT_SLOTS, EquationError, EquationSource, Equations,
    EquationsConfig, ImageEquation,
};
pub use formula::error::{FormulaError, LexError, ReduceError, SyntaxError};
pub use formula::rules::{MarkovRule, RuleSet};
pub use formula::token::{BinaryOp, Expr, Token, TokenKind, UnaryOp};
pub use formula::{Formula, compile, compile_with};
pub use foundation::core::{ImageIndex, Rgba, Span};
pub use foundation::error::{TexError, TexResult};
pub use render::combine::{CombineSettings, LinearImage, combine};
