//! Error types for series evaluation and truncation control
//!
//! Every error here reports caller misuse at the point it happens; nothing is
//! retried or clamped internally.

use thiserror::Error;

/// Main error type for the helioseries library
#[derive(Debug, Error)]
pub enum VsopError {
    /// Malformed truncation vector or a negative error budget
    #[error("Domain error: {0}")]
    DomainError(String),

    /// Unknown quantity, error mode or accuracy level, or an unusable configuration
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Observation time that cannot drive an evaluation
    #[error("Time error: {0}")]
    TimeError(String),

    /// Coefficient or preset data that could not be read
    #[error("Data error: {0}")]
    DataError(String),

    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),
}

/// Result type for helioseries operations
pub type Result<T> = std::result::Result<T, VsopError>;

/// Helper to build a [`VsopError::DomainError`] from anything printable
pub fn domain_err(msg: impl Into<String>) -> VsopError {
    VsopError::DomainError(msg.into())
}

/// Helper to build a [`VsopError::InvalidArgument`] from anything printable
pub fn invalid_arg(msg: impl Into<String>) -> VsopError {
    VsopError::InvalidArgument(msg.into())
}
