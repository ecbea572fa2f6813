//! Pole/zero maps.

use ctl_core::Timebase;
use ctl_lti::Lti;
use num_complex::Complex64;

use crate::error::AnalysisResult;

/// Plot-ready pole/zero data, optionally with root-locus branches.
#[derive(Debug, Clone, PartialEq)]
pub struct PoleZeroData {
    pub poles: Vec<Complex64>,
    pub zeros: Vec<Complex64>,
    /// Feedback gains, one per row of `loci`.
    pub gains: Option<Vec<f64>>,
    /// `loci[k][b]` is branch `b` of the closed-loop roots at `gains[k]`.
    pub loci: Option<Vec<Vec<Complex64>>>,
    pub xlim: Option<(f64, f64)>,
    pub ylim: Option<(f64, f64)>,
    pub timebase: Timebase,
    pub sysname: String,
}

/// Natural frequency and damping ratio of one pole.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PoleDamping {
    pub pole: Complex64,
    pub natural_frequency: f64,
    /// NaN for a pole at the origin of the s-plane.
    pub damping_ratio: f64,
}

impl PoleZeroData {
    pub fn as_tuple(&self) -> (&[Complex64], &[Complex64]) {
        (&self.poles, &self.zeros)
    }

    /// Damping of every pole. Discrete poles are mapped to the s-plane
    /// through `ln(z) / dt`, with `dt = 1` when the period is unknown.
    pub fn damping(&self) -> Vec<PoleDamping> {
        self.poles
            .iter()
            .map(|&pole| {
                let s = match self.timebase {
                    Timebase::Discrete(dt) => pole.ln() / dt.unwrap_or(1.0),
                    Timebase::Continuous | Timebase::Unspecified => pole,
                };
                let natural_frequency = s.norm();
                PoleDamping {
                    pole,
                    natural_frequency,
                    damping_ratio: -s.re / natural_frequency,
                }
            })
            .collect()
    }
}

/// Poles and zeros of one system.
pub fn pole_zero_map_one(sys: &dyn Lti) -> AnalysisResult<PoleZeroData> {
    Ok(PoleZeroData {
        poles: sys.poles()?,
        zeros: sys.zeros()?,
        gains: None,
        loci: None,
        xlim: None,
        ylim: None,
        timebase: sys.timebase(),
        sysname: sys.name().to_string(),
    })
}

pub fn pole_zero_map(systems: &[&dyn Lti]) -> AnalysisResult<Vec<PoleZeroData>> {
    systems.iter().map(|sys| pole_zero_map_one(*sys)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ctl_lti::TransferFunction;

    #[test]
    fn continuous_damping() {
        // s^2 + 2 s + 4: wn = 2, zeta = 0.5
        let g = TransferFunction::siso(&[1.0], &[1.0, 2.0, 4.0]).unwrap();
        let pz = pole_zero_map_one(&g).unwrap();
        for d in pz.damping() {
            assert!((d.natural_frequency - 2.0).abs() < 1e-9);
            assert!((d.damping_ratio - 0.5).abs() < 1e-9);
        }
    }

    #[test]
    fn discrete_damping_uses_log_map() {
        let dt = 0.1;
        let z = (-1.0f64 * dt).exp();
        let g = TransferFunction::siso(&[1.0], &[1.0, -z])
            .unwrap()
            .with_timebase(Timebase::Discrete(Some(dt)));
        let pz = pole_zero_map_one(&g).unwrap();
        let d = pz.damping();
        assert_eq!(d.len(), 1);
        assert!((d[0].natural_frequency - 1.0).abs() < 1e-9);
        assert!((d[0].damping_ratio - 1.0).abs() < 1e-9);
    }

    #[test]
    fn integrator_damping_is_undefined() {
        let g = TransferFunction::siso(&[1.0], &[1.0, 0.0]).unwrap();
        let d = pole_zero_map_one(&g).unwrap().damping();
        assert_eq!(d[0].natural_frequency, 0.0);
        assert!(d[0].damping_ratio.is_nan());
    }
}
