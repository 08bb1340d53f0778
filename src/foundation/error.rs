use crate::validate::issue::LayoutValidationIssue;

/// Convenience result type used across deckplan.
pub type DeckResult<T> = Result<T, DeckError>;

/// Top-level error taxonomy used by engine APIs.
#[derive(thiserror::Error, Debug)]
pub enum DeckError {
    /// Invalid user-provided request or configuration data.
    #[error("validation error: {0}")]
    Validation(String),

    /// Document-level planning failures (for example, no usable images).
    #[error("planning error: {0}")]
    Planning(String),

    /// Reference index construction or snapshot failures.
    #[error("reference index error: {0}")]
    Reference(String),

    /// Errors when serializing or deserializing data structures.
    #[error("serialization error: {0}")]
    Serde(String),

    /// The export gate refused the generation.
    #[error("generation rejected with {} issue(s)", issues.len())]
    Rejected {
        /// Every page and audit issue that blocked the export.
        issues: Vec<LayoutValidationIssue>,
    },

    /// Wrapped lower-level error from dependencies or IO.
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl DeckError {
    /// Build a [`DeckError::Validation`] value.
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    /// Build a [`DeckError::Planning`] value.
    pub fn planning(msg: impl Into<String>) -> Self {
        Self::Planning(msg.into())
    }

    /// Build a [`DeckError::Reference`] value.
    pub fn reference(msg: impl Into<String>) -> Self {
        Self::Reference(msg.into())
    }

    /// Build a [`DeckError::Serde`] value.
    pub fn serde(msg: impl Into<String>) -> Self {
        Self::Serde(msg.into())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/error.rs"]
mod tests;
