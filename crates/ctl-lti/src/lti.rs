//! The common interface of linear time-invariant systems.

use ctl_core::{IoSignature, Timebase};
use nalgebra::DMatrix;
use num_complex::Complex64;

use crate::error::LtiResult;

/// Complex matrix, one response value per output (row) and input (column).
pub type CMatrix = DMatrix<Complex64>;

/// A linear time-invariant input/output system.
pub trait Lti: Send + Sync {
    fn ninputs(&self) -> usize;

    fn noutputs(&self) -> usize;

    fn timebase(&self) -> Timebase;

    fn signature(&self) -> &IoSignature;

    fn name(&self) -> &str {
        &self.signature().name
    }

    fn is_siso(&self) -> bool {
        self.ninputs() == 1 && self.noutputs() == 1
    }

    /// Transfer matrix evaluated at the complex point `s` (or `z`).
    fn eval(&self, s: Complex64) -> LtiResult<CMatrix>;

    fn poles(&self) -> LtiResult<Vec<Complex64>>;

    fn zeros(&self) -> LtiResult<Vec<Complex64>>;

    /// Transfer matrix at the real frequency `omega` (rad/s).
    fn eval_frequency(&self, omega: f64) -> LtiResult<CMatrix> {
        self.eval(frequency_point(self.timebase(), omega))
    }
}

/// Point of the complex plane that corresponds to frequency `omega`:
/// `j omega` for continuous (or unspecified) systems, `exp(j omega dt)` for
/// discrete ones. A discrete system without a period uses `dt = 1`.
pub fn frequency_point(timebase: Timebase, omega: f64) -> Complex64 {
    match timebase {
        Timebase::Discrete(dt) => Complex64::new(0.0, omega * dt.unwrap_or(1.0)).exp(),
        Timebase::Continuous | Timebase::Unspecified => Complex64::new(0.0, omega),
    }
}

/// Lift a real matrix into the complex field.
pub fn to_complex(m: &DMatrix<f64>) -> CMatrix {
    m.map(|x| Complex64::new(x, 0.0))
}

/// Indeterminate used when printing: `z` for strictly discrete systems.
pub fn variable_name(timebase: Timebase) -> &'static str {
    if timebase.is_discrete(true) { "z" } else { "s" }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn continuous_point_is_imaginary_axis() {
        let s = frequency_point(Timebase::Continuous, 2.0);
        assert_eq!(s, Complex64::new(0.0, 2.0));
        let s = frequency_point(Timebase::Unspecified, 3.0);
        assert_eq!(s, Complex64::new(0.0, 3.0));
    }

    #[test]
    fn discrete_point_is_unit_circle() {
        let z = frequency_point(Timebase::Discrete(Some(0.1)), core::f64::consts::PI * 10.0);
        assert!((z - Complex64::new(-1.0, 0.0)).norm() < 1e-12);
        let z = frequency_point(Timebase::Discrete(None), core::f64::consts::FRAC_PI_2);
        assert!((z - Complex64::new(0.0, 1.0)).norm() < 1e-12);
    }

    #[test]
    fn complex_lift() {
        let m = DMatrix::from_row_slice(1, 2, &[1.0, -2.0]);
        let c = to_complex(&m);
        assert_eq!(c[(0, 1)], Complex64::new(-2.0, 0.0));
    }
}
