//! System timebases.
//!
//! A system is either continuous time, discrete time (with or without a known
//! sample period) or has no timebase committed yet. Unspecified systems adopt
//! the timebase of whatever they are combined with.

use core::fmt;

use crate::error::{CtlError, CtlResult};

#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub enum Timebase {
    /// No timebase committed; combines with anything.
    #[default]
    Unspecified,
    /// Continuous time.
    Continuous,
    /// Discrete time with an optional sample period in seconds.
    Discrete(Option<f64>),
}

impl Timebase {
    /// Discrete timebase with a known, positive sample period.
    pub fn sampled(dt: f64) -> CtlResult<Self> {
        if !(dt.is_finite() && dt > 0.0) {
            return Err(CtlError::InvalidArg {
                what: "sample period must be positive and finite",
            });
        }
        Ok(Self::Discrete(Some(dt)))
    }

    /// Continuous check. With `strict == false` an unspecified timebase also
    /// counts as continuous.
    pub fn is_continuous(self, strict: bool) -> bool {
        match self {
            Self::Continuous => true,
            Self::Unspecified => !strict,
            Self::Discrete(_) => false,
        }
    }

    /// Discrete check. With `strict == false` an unspecified timebase also
    /// counts as discrete.
    pub fn is_discrete(self, strict: bool) -> bool {
        match self {
            Self::Discrete(_) => true,
            Self::Unspecified => !strict,
            Self::Continuous => false,
        }
    }

    /// Sample period, if discrete with a known period.
    pub fn sample_period(self) -> Option<f64> {
        match self {
            Self::Discrete(dt) => dt,
            _ => None,
        }
    }
}

impl fmt::Display for Timebase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unspecified => write!(f, "unspecified"),
            Self::Continuous => write!(f, "continuous"),
            Self::Discrete(None) => write!(f, "discrete"),
            Self::Discrete(Some(dt)) => write!(f, "discrete (dt = {dt})"),
        }
    }
}

/// Timebase compatible with both arguments.
pub fn common_timebase(a: Timebase, b: Timebase) -> CtlResult<Timebase> {
    use Timebase::*;
    match (a, b) {
        (Unspecified, other) | (other, Unspecified) => Ok(other),
        (Continuous, Continuous) => Ok(Continuous),
        (Discrete(None), Discrete(dt)) | (Discrete(dt), Discrete(None)) => Ok(Discrete(dt)),
        (Discrete(Some(x)), Discrete(Some(y))) if x == y => Ok(a),
        _ => Err(CtlError::TimebaseMismatch {
            left: a.to_string(),
            right: b.to_string(),
        }),
    }
}
