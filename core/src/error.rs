//! Validation error types for VGraph.

use thiserror::Error;

/// Errors raised when caller input fails one of the VGraph grammars.
///
/// The messages are surfaced verbatim to API callers.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Not a UUIDv4.
    #[error("Invalid Id")]
    InvalidId,

    /// Label does not match the label grammar.
    #[error("Invalid Label")]
    InvalidLabel,

    /// Property key does not match the key grammar.
    #[error("Invalid Key")]
    InvalidKey,

    /// Property value is not a scalar or a homogeneous scalar array.
    #[error("Invalid Value")]
    InvalidValue,

    /// Repo identifier is empty, too long, or not allowed here.
    #[error("Invalid Repo")]
    InvalidRepo,
}

/// Result type for validation.
pub type ValidationResult<T> = Result<T, ValidationError>;
