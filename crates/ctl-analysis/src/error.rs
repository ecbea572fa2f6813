use ctl_core::CtlError;
use ctl_lti::LtiError;
use thiserror::Error;

pub type AnalysisResult<T> = Result<T, AnalysisError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnalysisError {
    #[error("Invalid argument: {what}")]
    InvalidArg { what: String },

    #[error("Dimension mismatch: {what}")]
    DimensionMismatch { what: String },

    #[error("Not implemented: {what}")]
    NotImplemented { what: String },

    #[error(transparent)]
    Lti(#[from] LtiError),

    #[error(transparent)]
    Core(#[from] CtlError),
}
