use crate::formula::error::FormulaError;

/// Convenience result type used across texformula.
pub type TexResult<T> = Result<T, TexError>;

/// Top-level error taxonomy used by the compile, evaluate and combine APIs.
#[derive(thiserror::Error, Debug)]
pub enum TexError {
    /// A formula failed to compile or validate.
    #[error("formula error: {0}")]
    Formula(#[from] FormulaError),

    /// Input data failed validation (mismatched image sizes, bad config).
    #[error("validation error: {0}")]
    Validation(String),

    /// A compiled program could not be evaluated.
    #[error("evaluation error: {0}")]
    Evaluation(String),

    /// Image decode/encode failure.
    #[error("image error: {0}")]
    Image(String),

    /// Config (de)serialization failure.
    #[error("serialization error: {0}")]
    Serde(String),

    /// Wrapped lower-level error.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl TexError {
    /// Build a [`TexError::Validation`].
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`TexError::Evaluation`].
    pub fn evaluation(msg: impl Into<String>) -> Self {
        Self::Evaluation(msg.into())
    }

    /// Build a [`TexError::Image`].
    pub fn image(msg: impl Into<String>) -> Self {
        Self::Image(msg.into())
    }

    /// Build a [`TexError::Serde`].
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
