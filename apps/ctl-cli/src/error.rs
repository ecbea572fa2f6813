//! Error type for the command-line front end.

use ctl_analysis::AnalysisError;
use ctl_core::CtlError;
use ctl_lti::LtiError;
use ctl_project::ProjectError;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("Project error: {0}")]
    Project(#[from] ProjectError),

    #[error("Configuration error: {0}")]
    Config(#[from] CtlError),

    #[error("System error: {0}")]
    System(#[from] LtiError),

    #[error("Analysis error: {0}")]
    Analysis(#[from] AnalysisError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type CliResult<T> = Result<T, CliError>;
