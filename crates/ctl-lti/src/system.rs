//! Any supported system representation behind one type.

use std::fmt;

use ctl_core::{IoSignature, Timebase};
use num_complex::Complex64;

use crate::convert::{ss2tf, tf2ss};
use crate::error::{LtiError, LtiResult};
use crate::frd::{FrdOperand, FrequencyResponseData};
use crate::lti::{CMatrix, Lti};
use crate::statesp::StateSpace;
use crate::xferfcn::TransferFunction;

/// A transfer function, state-space system or frequency response data.
///
/// Interconnections pick a representation for the result: anything
/// involving FRD stays FRD on that grid, two SISO transfer functions stay a
/// transfer function, and everything else is done in state space.
#[derive(Debug, Clone)]
pub enum System {
    Tf(TransferFunction),
    Ss(StateSpace),
    Frd(FrequencyResponseData),
}

impl System {
    pub fn kind(&self) -> &'static str {
        match self {
            System::Tf(_) => "transfer function",
            System::Ss(_) => "state space",
            System::Frd(_) => "frequency response data",
        }
    }

    fn as_lti(&self) -> &dyn Lti {
        match self {
            System::Tf(tf) => tf,
            System::Ss(ss) => ss,
            System::Frd(frd) => frd,
        }
    }

    pub fn to_state_space(&self) -> LtiResult<StateSpace> {
        match self {
            System::Tf(tf) => tf2ss(tf),
            System::Ss(ss) => Ok(ss.clone()),
            System::Frd(_) => Err(LtiError::not_implemented(
                "state-space realization of frequency response data",
            )),
        }
    }

    pub fn to_transfer_function(&self) -> LtiResult<TransferFunction> {
        match self {
            System::Tf(tf) => Ok(tf.clone()),
            System::Ss(ss) => ss2tf(ss),
            System::Frd(_) => Err(LtiError::not_implemented(
                "transfer function of frequency response data",
            )),
        }
    }

    fn siso_tfs<'a>(&'a self, other: &'a System) -> Option<(&'a TransferFunction, &'a TransferFunction)> {
        match (self, other) {
            (System::Tf(a), System::Tf(b)) if a.is_siso() && b.is_siso() => Some((a, b)),
            _ => None,
        }
    }

    /// Series connection `self * other`: `other` drives `self`.
    pub fn series(&self, other: &System) -> LtiResult<System> {
        match (self, other) {
            (System::Frd(f), _) => f.series(other).map(System::Frd),
            (_, System::Frd(g)) => g.rseries(self).map(System::Frd),
            _ => match self.siso_tfs(other) {
                Some((a, b)) => a.series(b).map(System::Tf),
                None => self
                    .to_state_space()?
                    .series(&other.to_state_space()?)
                    .map(System::Ss),
            },
        }
    }

    /// Parallel connection `self + other`.
    pub fn parallel(&self, other: &System) -> LtiResult<System> {
        match (self, other) {
            (System::Frd(f), _) => f.parallel(other).map(System::Frd),
            (_, System::Frd(g)) => g.parallel(self).map(System::Frd),
            _ => match self.siso_tfs(other) {
                Some((a, b)) => a.parallel(b).map(System::Tf),
                None => self
                    .to_state_space()?
                    .parallel(&other.to_state_space()?)
                    .map(System::Ss),
            },
        }
    }

    /// Feedback connection with `other` in the return path. `sign = -1.0`
    /// gives negative feedback.
    pub fn feedback(&self, other: &System, sign: f64) -> LtiResult<System> {
        match (self, other) {
            (System::Frd(f), _) => f.feedback(other, sign).map(System::Frd),
            (_, System::Frd(h)) => h
                .convert(self.into(), self.ninputs(), self.noutputs())?
                .feedback(h, sign)
                .map(System::Frd),
            _ => match self.siso_tfs(other) {
                Some((a, b)) => a.feedback(b, sign).map(System::Tf),
                None => self
                    .to_state_space()?
                    .feedback(&other.to_state_space()?, sign)
                    .map(System::Ss),
            },
        }
    }

    /// Block-diagonal stacking.
    pub fn append(&self, other: &System) -> LtiResult<System> {
        match (self, other) {
            (System::Frd(f), _) => f.append(other).map(System::Frd),
            (_, System::Frd(g)) => g
                .convert(self.into(), self.ninputs(), self.noutputs())?
                .append(g)
                .map(System::Frd),
            (System::Tf(a), System::Tf(b)) => a.append(b).map(System::Tf),
            _ => self
                .to_state_space()?
                .append(&other.to_state_space()?)
                .map(System::Ss),
        }
    }

    pub fn negate(&self) -> System {
        match self {
            System::Tf(tf) => System::Tf(tf.negate()),
            System::Ss(ss) => System::Ss(ss.negate()),
            System::Frd(frd) => System::Frd(frd.negate()),
        }
    }

    pub fn with_name(self, name: impl Into<String>) -> System {
        match self {
            System::Tf(tf) => System::Tf(tf.with_name(name)),
            System::Ss(ss) => System::Ss(ss.with_name(name)),
            System::Frd(frd) => System::Frd(frd.with_name(name)),
        }
    }
}

impl From<TransferFunction> for System {
    fn from(tf: TransferFunction) -> Self {
        System::Tf(tf)
    }
}

impl From<StateSpace> for System {
    fn from(ss: StateSpace) -> Self {
        System::Ss(ss)
    }
}

impl From<FrequencyResponseData> for System {
    fn from(frd: FrequencyResponseData) -> Self {
        System::Frd(frd)
    }
}

impl<'a> From<&'a System> for FrdOperand<'a> {
    fn from(sys: &'a System) -> Self {
        match sys {
            System::Frd(frd) => FrdOperand::Frd(frd),
            other => FrdOperand::System(other.as_lti()),
        }
    }
}

impl Lti for System {
    fn ninputs(&self) -> usize {
        self.as_lti().ninputs()
    }

    fn noutputs(&self) -> usize {
        self.as_lti().noutputs()
    }

    fn timebase(&self) -> Timebase {
        self.as_lti().timebase()
    }

    fn signature(&self) -> &IoSignature {
        self.as_lti().signature()
    }

    fn eval(&self, s: Complex64) -> LtiResult<CMatrix> {
        self.as_lti().eval(s)
    }

    fn eval_frequency(&self, omega: f64) -> LtiResult<CMatrix> {
        self.as_lti().eval_frequency(omega)
    }

    fn poles(&self) -> LtiResult<Vec<Complex64>> {
        self.as_lti().poles()
    }

    fn zeros(&self) -> LtiResult<Vec<Complex64>> {
        self.as_lti().zeros()
    }
}

impl fmt::Display for System {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            System::Tf(tf) => fmt::Display::fmt(tf, f),
            System::Ss(ss) => fmt::Display::fmt(ss, f),
            System::Frd(frd) => fmt::Display::fmt(frd, f),
        }
    }
}
