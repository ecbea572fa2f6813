use thiserror::Error;

pub type CtlResult<T> = Result<T, CtlError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CtlError {
    #[error("Non-finite numeric value for {what}: {value}")]
    NonFinite { what: &'static str, value: f64 },

    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("Incompatible timebases: {left} and {right}")]
    TimebaseMismatch { left: String, right: String },

    #[error("Failed to read config file {path}: {what}")]
    ConfigRead { path: String, what: String },

    #[error("Failed to parse config: {what}")]
    ConfigParse { what: String },
}
