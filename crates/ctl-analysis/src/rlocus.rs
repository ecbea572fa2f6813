//! Root-locus maps for SISO systems.

use ctl_core::config::RootLocusDefaults;
use ctl_core::logspace;
use ctl_lti::{Lti, System, poly};
use num_complex::Complex64;
use tracing::debug;

use crate::error::{AnalysisError, AnalysisResult};
use crate::pzmap::PoleZeroData;

/// Closed-loop roots of `den + k num` for each gain. Roots lost to a
/// vanishing leading coefficient are reported at infinity.
pub fn closed_loop_roots(
    num: &[f64],
    den: &[f64],
    gains: &[f64],
) -> AnalysisResult<Vec<Vec<Complex64>>> {
    let order = poly::degree(den).max(poly::degree(num));
    gains
        .iter()
        .map(|&k| -> AnalysisResult<Vec<Complex64>> {
            let mut roots = poly::roots(&poly::add(den, &poly::scale(num, k)))?;
            roots.resize(order, Complex64::new(f64::INFINITY, 0.0));
            Ok(roots)
        })
        .collect()
}

fn distance(a: Complex64, b: Complex64) -> f64 {
    let d = (a - b).norm();
    if d.is_nan() { f64::INFINITY } else { d }
}

/// Reorder each row so that column `b` follows one continuous branch:
/// every root takes the nearest still unassigned slot of the previous row.
pub fn sort_loci(rows: Vec<Vec<Complex64>>) -> Vec<Vec<Complex64>> {
    let mut sorted: Vec<Vec<Complex64>> = Vec::with_capacity(rows.len());
    for row in rows {
        let Some(prev) = sorted.last() else {
            sorted.push(row);
            continue;
        };
        let mut next = vec![Complex64::new(f64::NAN, f64::NAN); prev.len()];
        let mut available: Vec<usize> = (0..prev.len()).collect();
        for root in row {
            let Some((pos, _)) = available
                .iter()
                .enumerate()
                .min_by(|&(_, &a), &(_, &b)| {
                    distance(root, prev[a]).total_cmp(&distance(root, prev[b]))
                })
            else {
                break;
            };
            let slot = available.remove(pos);
            next[slot] = root;
        }
        sorted.push(next);
    }
    sorted
}

/// Gain 0 followed by `points - 1` log-spaced gains over six decades
/// centred on `|lead(den) / lead(num)|`.
pub fn default_gains(num: &[f64], den: &[f64], points: usize) -> AnalysisResult<Vec<f64>> {
    if poly::is_zero(num) {
        return Err(AnalysisError::InvalidArg {
            what: "root locus of a system with zero numerator".into(),
        });
    }
    if points < 2 {
        return Err(AnalysisError::InvalidArg {
            what: "root locus needs at least two gains".into(),
        });
    }
    let k0 = (poly::leading(den) / poly::leading(num)).abs();
    let center = k0.log10();
    let mut gains = vec![0.0];
    gains.extend(logspace(center - 3.0, center + 3.0, points - 1));
    Ok(gains)
}

fn padded_limits(lo: f64, hi: f64) -> (f64, f64) {
    let margin = 0.1 * (hi - lo);
    ((lo - margin).min(-1.0), (hi + margin).max(1.0))
}

fn bounding_limits(points: &[Complex64]) -> ((f64, f64), (f64, f64)) {
    let finite = points.iter().filter(|p| p.re.is_finite() && p.im.is_finite());
    let (mut xlo, mut xhi, mut ylo, mut yhi) = (0.0f64, 0.0f64, 0.0f64, 0.0f64);
    for p in finite {
        xlo = xlo.min(p.re);
        xhi = xhi.max(p.re);
        ylo = ylo.min(p.im);
        yhi = yhi.max(p.im);
    }
    (padded_limits(xlo, xhi), padded_limits(ylo, yhi))
}

/// Axis limits chosen by the caller. A `None` axis falls back to the
/// configured discrete-time limits or the bounding box of the loci.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LocusLimits {
    pub xlim: Option<(f64, f64)>,
    pub ylim: Option<(f64, f64)>,
}

/// Root locus of a SISO system under static output feedback `u = -k y`.
pub fn root_locus_map(
    sys: &System,
    gains: Option<&[f64]>,
    defaults: &RootLocusDefaults,
) -> AnalysisResult<PoleZeroData> {
    root_locus_map_with(sys, gains, LocusLimits::default(), defaults)
}

/// Root locus with caller-supplied axis limits.
pub fn root_locus_map_with(
    sys: &System,
    gains: Option<&[f64]>,
    limits: LocusLimits,
    defaults: &RootLocusDefaults,
) -> AnalysisResult<PoleZeroData> {
    if !sys.is_siso() {
        return Err(AnalysisError::NotImplemented {
            what: "root locus of a MIMO system".into(),
        });
    }
    let tf = sys.to_transfer_function()?;
    let (num, den) = (tf.num(0, 0), tf.den(0, 0));

    let gains = match gains {
        Some(g) => g.to_vec(),
        None => default_gains(num, den, defaults.points)?,
    };
    let loci = sort_loci(closed_loop_roots(num, den, &gains)?);
    let poles = sys.poles()?;
    let zeros = sys.zeros()?;

    let (xlim, ylim) = if sys.timebase().is_discrete(true) {
        (defaults.discrete_xlim, defaults.discrete_ylim)
    } else {
        let all: Vec<Complex64> = loci
            .iter()
            .flatten()
            .chain(&poles)
            .chain(&zeros)
            .copied()
            .collect();
        bounding_limits(&all)
    };
    debug!(system = sys.name(), gains = gains.len(), "computed root locus");

    Ok(PoleZeroData {
        poles,
        zeros,
        gains: Some(gains),
        loci: Some(loci),
        xlim: Some(limits.xlim.unwrap_or(xlim)),
        ylim: Some(limits.ylim.unwrap_or(ylim)),
        timebase: sys.timebase(),
        sysname: sys.name().to_string(),
    })
}

/// Root loci of several systems sharing gains and limits.
pub fn root_locus_maps(
    systems: &[&System],
    gains: Option<&[f64]>,
    limits: LocusLimits,
    defaults: &RootLocusDefaults,
) -> AnalysisResult<Vec<PoleZeroData>> {
    systems
        .iter()
        .map(|sys| root_locus_map_with(sys, gains, limits, defaults))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use ctl_core::Timebase;
    use ctl_lti::TransferFunction;

    fn c(re: f64, im: f64) -> Complex64 {
        Complex64::new(re, im)
    }

    #[test]
    fn gain_zero_gives_open_loop_poles() {
        let g: System = TransferFunction::siso(&[1.0], &[1.0, 3.0, 2.0]).unwrap().into();
        let rl = root_locus_map(&g, Some(&[0.0, 1.0]), &RootLocusDefaults::default()).unwrap();
        let loci = rl.loci.unwrap();
        let mut first = loci[0].clone();
        poly::sort_complex(&mut first);
        assert!((first[0] - c(-2.0, 0.0)).norm() < 1e-9);
        assert!((first[1] - c(-1.0, 0.0)).norm() < 1e-9);
    }

    #[test]
    fn default_gains_span_six_decades() {
        let gains = default_gains(&[2.0], &[4.0, 1.0], 7).unwrap();
        assert_eq!(gains.len(), 7);
        assert_eq!(gains[0], 0.0);
        assert!((gains[1] - 2e-3).abs() < 1e-12);
        assert!((gains[6] - 2e3).abs() < 1e-9);
    }

    #[test]
    fn branches_are_continuous() {
        // s^2 + 2 s + k: two real roots meeting at -1, then splitting
        let gains: Vec<f64> = (0..=40).map(|k| k as f64 * 0.05).collect();
        let rows = closed_loop_roots(&[1.0], &[1.0, 2.0, 0.0], &gains).unwrap();
        let loci = sort_loci(rows);
        for pair in loci.windows(2) {
            for b in 0..2 {
                assert!((pair[1][b] - pair[0][b]).norm() < 0.5);
            }
        }
    }

    #[test]
    fn vanishing_leading_coefficient_goes_to_infinity() {
        // (s + 1) + k (-s): leading coefficient cancels at k = 1
        let rows = closed_loop_roots(&[-1.0, 0.0], &[1.0, 1.0], &[1.0]).unwrap();
        assert_eq!(rows[0].len(), 1);
        assert!(rows[0][0].re.is_infinite());
    }

    #[test]
    fn limits() {
        let defaults = RootLocusDefaults::default();
        let g: System = TransferFunction::siso(&[1.0], &[1.0, 0.5])
            .unwrap()
            .with_timebase(Timebase::Discrete(Some(0.1)))
            .into();
        let rl = root_locus_map(&g, None, &defaults).unwrap();
        assert_eq!(rl.xlim, Some((-1.2, 1.2)));
        assert_eq!(rl.ylim, Some((-1.3, 1.3)));
        assert_eq!(rl.gains.as_ref().map(Vec::len), Some(defaults.points));

        let small: System = TransferFunction::siso(&[1.0], &[1.0, 0.2]).unwrap().into();
        let rl = root_locus_map(&small, Some(&[0.0]), &defaults).unwrap();
        assert_eq!(rl.xlim, Some((-1.0, 1.0)));
    }

    #[test]
    fn caller_limits_win_per_axis() {
        let defaults = RootLocusDefaults::default();
        let discrete: System = TransferFunction::siso(&[1.0], &[1.0, 0.5])
            .unwrap()
            .with_timebase(Timebase::Discrete(Some(0.1)))
            .into();
        let limits = LocusLimits {
            xlim: Some((-3.0, 2.0)),
            ylim: None,
        };
        let rl = root_locus_map_with(&discrete, Some(&[0.0, 1.0]), limits, &defaults).unwrap();
        assert_eq!(rl.xlim, Some((-3.0, 2.0)));
        assert_eq!(rl.ylim, Some((-1.3, 1.3)));

        let continuous: System = TransferFunction::siso(&[1.0], &[1.0, 0.2]).unwrap().into();
        let limits = LocusLimits {
            xlim: None,
            ylim: Some((-5.0, 5.0)),
        };
        let rl = root_locus_map_with(&continuous, Some(&[0.0]), limits, &defaults).unwrap();
        assert_eq!(rl.xlim, Some((-1.0, 1.0)));
        assert_eq!(rl.ylim, Some((-5.0, 5.0)));
    }

    #[test]
    fn several_systems_share_the_gains() {
        let a: System = TransferFunction::siso(&[1.0], &[1.0, 1.0]).unwrap().into();
        let b: System = TransferFunction::siso(&[1.0], &[1.0, 3.0, 2.0]).unwrap().into();
        let gains = [0.0, 0.5, 2.0];
        let maps = root_locus_maps(
            &[&a, &b],
            Some(&gains),
            LocusLimits::default(),
            &RootLocusDefaults::default(),
        )
        .unwrap();
        assert_eq!(maps.len(), 2);
        assert_eq!(maps[0].loci.as_ref().map(|l| l[0].len()), Some(1));
        assert_eq!(maps[1].loci.as_ref().map(|l| l[0].len()), Some(2));
        // 1/(s+1) with k = 2: s + 3 = 0
        assert!((maps[0].loci.as_ref().unwrap()[2][0] - c(-3.0, 0.0)).norm() < 1e-9);
    }

    #[test]
    fn mimo_is_rejected() {
        let g: System = TransferFunction::new(
            vec![vec![vec![1.0], vec![1.0]]],
            vec![vec![vec![1.0, 1.0], vec![1.0, 2.0]]],
        )
        .unwrap()
        .into();
        assert!(matches!(
            root_locus_map(&g, None, &RootLocusDefaults::default()),
            Err(AnalysisError::NotImplemented { .. })
        ));
    }
}
