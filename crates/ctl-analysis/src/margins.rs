//! Disk-based stability margins.
//!
//! For a loop transfer matrix `L` and skew `σ`, the disk margin at each
//! frequency is `α = 1 / σ̄(S + (σ - 1)/2 I)` with `S = (I + L)^-1`. The
//! disk of simultaneous gain and phase variations it certifies gives the
//! gain margin `γ_max` (in dB) and phase margin (in degrees).

use ctl_core::{ensure_finite, mag2db, rad2deg};
use ctl_lti::{CMatrix, Lti, LtiError, StateSpace, System};
use nalgebra::DMatrix;
use num_complex::Complex64;
use rayon::prelude::*;
use tracing::debug;

use crate::error::{AnalysisError, AnalysisResult};

/// Margins over a frequency grid.
#[derive(Debug, Clone, PartialEq)]
pub struct DiskMargins {
    pub omega: Vec<f64>,
    pub disk: Vec<f64>,
    pub gain_db: Vec<f64>,
    pub phase_deg: Vec<f64>,
}

/// Smallest margins over the grid, each with its frequency.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MarginSummary {
    pub disk: (f64, f64),
    pub gain_db: (f64, f64),
    pub phase_deg: (f64, f64),
}

fn argmin(values: &[f64], omega: &[f64]) -> Option<(f64, f64)> {
    values
        .iter()
        .zip(omega)
        .min_by(|a, b| a.0.total_cmp(b.0))
        .map(|(v, w)| (*v, *w))
}

impl DiskMargins {
    pub fn len(&self) -> usize {
        self.omega.len()
    }

    pub fn is_empty(&self) -> bool {
        self.omega.is_empty()
    }

    /// `None` for an empty grid.
    pub fn minimum(&self) -> Option<MarginSummary> {
        Some(MarginSummary {
            disk: argmin(&self.disk, &self.omega)?,
            gain_db: argmin(&self.gain_db, &self.omega)?,
            phase_deg: argmin(&self.phase_deg, &self.omega)?,
        })
    }
}

/// Margins certified by a disk of size `alpha` with the given skew:
/// `(gain_db, phase_deg)`.
pub fn disk_to_margins(alpha: f64, skew: f64) -> (f64, f64) {
    let lower = 1.0 - alpha * (1.0 + skew) / 2.0;
    let gamma_max = if lower <= 0.0 {
        f64::INFINITY
    } else {
        (1.0 + alpha * (1.0 - skew) / 2.0) / lower
    };
    let gamma_min = (1.0 - alpha * (1.0 - skew) / 2.0) / (1.0 + alpha * (1.0 + skew) / 2.0);

    let cos_phase = if gamma_max.is_infinite() {
        gamma_min
    } else {
        (1.0 + gamma_min * gamma_max) / (gamma_min + gamma_max)
    };
    (mag2db(gamma_max), rad2deg(cos_phase.clamp(-1.0, 1.0).acos()))
}

fn disk_from_sensitivity(s: CMatrix, skew: f64) -> f64 {
    let n = s.nrows();
    let shifted = s + CMatrix::identity(n, n) * Complex64::new((skew - 1.0) / 2.0, 0.0);
    let peak = shifted
        .singular_values()
        .iter()
        .fold(0.0f64, |acc, v| acc.max(*v));
    1.0 / peak
}

/// Realization of `S = (I + L)^-1`. Its poles are the closed-loop poles,
/// so imaginary-axis poles of `L` do not break the sweep. `None` for
/// frequency response data and for loops with `I + D` singular.
fn sensitivity(sys: &System) -> AnalysisResult<Option<StateSpace>> {
    if let System::Frd(_) = sys {
        return Ok(None);
    }
    let l = sys.to_state_space()?;
    let n = l.noutputs();
    let identity = StateSpace::static_gain(DMatrix::identity(n, n))?.with_timebase(l.timebase());
    match identity.feedback(&l, -1.0) {
        Ok(s) => Ok(Some(s)),
        Err(LtiError::Numeric { .. }) => Ok(None),
        Err(e) => Err(e.into()),
    }
}

/// Disk size at one frequency; zero when `I + L` is singular there.
fn disk_at(
    sys: &System,
    sens: Option<&StateSpace>,
    omega: f64,
    skew: f64,
) -> AnalysisResult<f64> {
    let s = match sens {
        Some(realized) => match realized.eval_frequency(omega) {
            Ok(s) => s,
            Err(LtiError::Numeric { .. }) => return Ok(0.0),
            Err(e) => return Err(e.into()),
        },
        None => {
            let l = sys.eval_frequency(omega)?;
            let n = l.nrows();
            match (CMatrix::identity(n, n) + l).try_inverse() {
                Some(s) => s,
                None => return Ok(0.0),
            }
        }
    };
    Ok(disk_from_sensitivity(s, skew))
}

/// Disk margins of a square loop transfer matrix on the frequency grid
/// `omega`. `skew` is 1 for S-based, -1 for T-based and 0 for balanced
/// disks.
pub fn disk_margins(sys: &System, omega: &[f64], skew: f64) -> AnalysisResult<DiskMargins> {
    ensure_finite(skew, "disk skew")?;
    if sys.ninputs() != sys.noutputs() {
        return Err(AnalysisError::DimensionMismatch {
            what: format!(
                "disk margins need a square loop, got {} output(s) and {} input(s)",
                sys.noutputs(),
                sys.ninputs()
            ),
        });
    }

    let sens = sensitivity(sys)?;
    let disk = omega
        .par_iter()
        .map(|&w| disk_at(sys, sens.as_ref(), w, skew))
        .collect::<AnalysisResult<Vec<_>>>()?;
    let (gain_db, phase_deg) = disk.iter().map(|&a| disk_to_margins(a, skew)).unzip();
    debug!(system = sys.name(), points = omega.len(), skew, "computed disk margins");

    Ok(DiskMargins {
        omega: omega.to_vec(),
        disk,
        gain_db,
        phase_deg,
    })
}
