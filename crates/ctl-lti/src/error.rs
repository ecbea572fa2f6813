//! Error types for linear system operations.

use ctl_core::CtlError;
use thiserror::Error;

/// Result type for linear system operations.
pub type LtiResult<T> = Result<T, LtiError>;

/// Errors that can occur while building, evaluating or connecting systems.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum LtiError {
    /// Invalid argument provided to a constructor or operation.
    #[error("Invalid argument: {what}")]
    InvalidArg { what: String },

    /// Input/output, state or frequency-grid sizes do not agree.
    #[error("Dimension mismatch: {what}")]
    DimensionMismatch { what: String },

    /// Operation not available for this kind of system.
    #[error("Not implemented: {what}")]
    NotImplemented { what: String },

    /// Singular matrix or failed decomposition.
    #[error("Numeric error: {what}")]
    Numeric { what: String },

    #[error(transparent)]
    Core(#[from] CtlError),
}

impl LtiError {
    pub(crate) fn invalid(what: impl Into<String>) -> Self {
        Self::InvalidArg { what: what.into() }
    }

    pub(crate) fn dims(what: impl Into<String>) -> Self {
        Self::DimensionMismatch { what: what.into() }
    }

    pub(crate) fn not_implemented(what: impl Into<String>) -> Self {
        Self::NotImplemented { what: what.into() }
    }

    pub(crate) fn numeric(what: impl Into<String>) -> Self {
        Self::Numeric { what: what.into() }
    }
}
