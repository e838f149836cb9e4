//! Error types for formula-calc

use thiserror::Error;

/// Evaluation errors
///
/// Closed taxonomy: every failure the evaluator can produce is one of
/// these kinds, so callers can branch on the kind instead of parsing
/// message text.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EvalError {
    /// The formula does not conform to the grammar
    #[error("syntax error: {0}")]
    Syntax(String),

    /// A name is neither a supplied variable nor a built-in constant
    #[error("unknown identifier: {0}")]
    UnknownIdentifier(String),

    /// The formula uses a construct outside the whitelist
    #[error("disallowed operation: {0}")]
    Disallowed(String),

    /// A mathematically undefined operation (division by zero, overflow, ...)
    #[error("domain error: {0}")]
    Domain(String),

    /// A value has the wrong type for the operation applied to it
    #[error("type mismatch: {0}")]
    TypeMismatch(String),
}

impl EvalError {
    pub fn syntax(msg: impl Into<String>) -> Self {
        Self::Syntax(msg.into())
    }

    pub fn unknown_identifier(name: impl Into<String>) -> Self {
        Self::UnknownIdentifier(name.into())
    }

    pub fn disallowed(msg: impl Into<String>) -> Self {
        Self::Disallowed(msg.into())
    }

    pub fn domain(msg: impl Into<String>) -> Self {
        Self::Domain(msg.into())
    }

    pub fn type_mismatch(msg: impl Into<String>) -> Self {
        Self::TypeMismatch(msg.into())
    }
}

pub type Result<T> = std::result::Result<T, EvalError>;
