//! Consumers of reduced formula trees: GLSL emission and a CPU bytecode evaluator.

pub mod bytecode;
pub mod glsl;
pub mod lower;
pub mod vm;

/// Tree shapes a backend cannot translate.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CodegenError {
    /// Trees deserialized from outside the compiler may name anything.
    #[error("unknown function \"{name}\" with {argc} argument(s)")]
    UnknownFunction { name: String, argc: u8 },
}
