//! Transfer function representation.
//!
//! A transfer function holds one rational entry `num / den` per output and
//! input pair. Coefficients are stored highest degree first.

use std::fmt;

use ctl_core::{IoSignature, Timebase, Tolerances, common_timebase, ensure_all_finite, nearly_equal};
use nalgebra::DMatrix;
use num_complex::Complex64;

use crate::error::{LtiError, LtiResult};
use crate::lti::{CMatrix, Lti, variable_name};
use crate::poly;

type PolyMatrix = Vec<Vec<Vec<f64>>>;

/// Coefficientwise comparison with the default tolerances.
fn same_poly(a: &[f64], b: &[f64]) -> bool {
    a.len() == b.len()
        && a.iter()
            .zip(b)
            .all(|(&x, &y)| nearly_equal(x, y, Tolerances::default()))
}

/// Single rational entry.
#[derive(Debug, Clone, PartialEq)]
struct Rational {
    num: Vec<f64>,
    den: Vec<f64>,
}

impl Rational {
    fn zero() -> Self {
        Self {
            num: vec![0.0],
            den: vec![1.0],
        }
    }

    fn is_zero(&self) -> bool {
        poly::is_zero(&self.num)
    }

    fn add(&self, other: &Rational) -> Rational {
        if self.is_zero() {
            return other.clone();
        }
        if other.is_zero() {
            return self.clone();
        }
        if same_poly(&self.den, &other.den) {
            return Rational {
                num: poly::add(&self.num, &other.num),
                den: self.den.clone(),
            };
        }
        Rational {
            num: poly::add(
                &poly::mul(&self.num, &other.den),
                &poly::mul(&other.num, &self.den),
            ),
            den: poly::mul(&self.den, &other.den),
        }
    }

    fn mul(&self, other: &Rational) -> Rational {
        if self.is_zero() || other.is_zero() {
            return Rational::zero();
        }
        Rational {
            num: poly::mul(&self.num, &other.num),
            den: poly::mul(&self.den, &other.den),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TransferFunction {
    num: PolyMatrix,
    den: PolyMatrix,
    timebase: Timebase,
    signature: IoSignature,
}

impl TransferFunction {
    /// Create a MIMO transfer function from `num[output][input]` and
    /// `den[output][input]` coefficient lists. The timebase defaults to
    /// continuous.
    pub fn new(num: PolyMatrix, den: PolyMatrix) -> LtiResult<Self> {
        let noutputs = num.len();
        if noutputs == 0 || num[0].is_empty() {
            return Err(LtiError::invalid(
                "transfer function needs at least one input and one output",
            ));
        }
        let ninputs = num[0].len();
        if den.len() != noutputs {
            return Err(LtiError::dims(format!(
                "numerator has {noutputs} output row(s), denominator has {}",
                den.len()
            )));
        }
        for (i, (nrow, drow)) in num.iter().zip(&den).enumerate() {
            if nrow.len() != ninputs || drow.len() != ninputs {
                return Err(LtiError::dims(format!(
                    "output row {i} must have {ninputs} entries in numerator and denominator"
                )));
            }
            for (n, d) in nrow.iter().zip(drow) {
                if n.is_empty() || d.is_empty() {
                    return Err(LtiError::invalid("empty coefficient list"));
                }
                ensure_all_finite(n, "numerator coefficient")?;
                ensure_all_finite(d, "denominator coefficient")?;
                if poly::is_zero(d) {
                    return Err(LtiError::invalid("denominator polynomial is zero"));
                }
            }
        }

        let trim_all = |m: PolyMatrix| -> PolyMatrix {
            m.into_iter()
                .map(|row| row.into_iter().map(|p| poly::trim(&p)).collect())
                .collect()
        };
        Ok(Self {
            num: trim_all(num),
            den: trim_all(den),
            timebase: Timebase::Continuous,
            signature: IoSignature::generic(ninputs, noutputs, 0),
        })
    }

    /// Single-input single-output transfer function `num / den`.
    pub fn siso(num: &[f64], den: &[f64]) -> LtiResult<Self> {
        Self::new(vec![vec![num.to_vec()]], vec![vec![den.to_vec()]])
    }

    /// Constant gain matrix as a transfer function.
    pub fn static_gain(gain: &DMatrix<f64>) -> LtiResult<Self> {
        let num = (0..gain.nrows())
            .map(|i| (0..gain.ncols()).map(|j| vec![gain[(i, j)]]).collect())
            .collect();
        let den = (0..gain.nrows())
            .map(|_| (0..gain.ncols()).map(|_| vec![1.0]).collect())
            .collect();
        Self::new(num, den)
    }

    fn from_entries(entries: Vec<Vec<Rational>>, timebase: Timebase) -> LtiResult<Self> {
        let mut num = PolyMatrix::with_capacity(entries.len());
        let mut den = PolyMatrix::with_capacity(entries.len());
        for row in entries {
            let (n, d): (Vec<Vec<f64>>, Vec<Vec<f64>>) =
                row.into_iter().map(|r| (r.num, r.den)).unzip();
            num.push(n);
            den.push(d);
        }
        Ok(Self::new(num, den)?.with_timebase(timebase))
    }

    fn entry(&self, out: usize, inp: usize) -> Rational {
        Rational {
            num: self.num[out][inp].clone(),
            den: self.den[out][inp].clone(),
        }
    }

    pub fn with_timebase(mut self, timebase: Timebase) -> Self {
        self.timebase = timebase;
        self
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.signature.name = name.into();
        self
    }

    pub fn with_signature(mut self, signature: IoSignature) -> LtiResult<Self> {
        if signature.ninputs() != self.ninputs() || signature.noutputs() != self.noutputs() {
            return Err(LtiError::dims("signature does not match system size"));
        }
        self.signature = signature;
        Ok(self)
    }

    /// Numerator coefficients from input `inp` to output `out`.
    pub fn num(&self, out: usize, inp: usize) -> &[f64] {
        &self.num[out][inp]
    }

    /// Denominator coefficients from input `inp` to output `out`.
    pub fn den(&self, out: usize, inp: usize) -> &[f64] {
        &self.den[out][inp]
    }

    /// No entry has a numerator of higher degree than its denominator.
    pub fn is_proper(&self) -> bool {
        self.num
            .iter()
            .flatten()
            .zip(self.den.iter().flatten())
            .all(|(n, d)| poly::degree(n) <= poly::degree(d))
    }

    pub fn negate(&self) -> Self {
        self.scale(-1.0)
    }

    pub fn scale(&self, k: f64) -> Self {
        let num = self
            .num
            .iter()
            .map(|row| row.iter().map(|p| poly::scale(p, k)).collect())
            .collect();
        Self {
            num,
            den: self.den.clone(),
            timebase: self.timebase,
            signature: IoSignature::generic(self.ninputs(), self.noutputs(), 0),
        }
    }

    /// Parallel connection `self + other`.
    pub fn parallel(&self, other: &TransferFunction) -> LtiResult<Self> {
        if self.ninputs() != other.ninputs() {
            return Err(LtiError::dims(format!(
                "the first summand has {} input(s), but the second has {}",
                self.ninputs(),
                other.ninputs()
            )));
        }
        if self.noutputs() != other.noutputs() {
            return Err(LtiError::dims(format!(
                "the first summand has {} output(s), but the second has {}",
                self.noutputs(),
                other.noutputs()
            )));
        }
        let timebase = common_timebase(self.timebase, other.timebase)?;
        let entries = (0..self.noutputs())
            .map(|i| {
                (0..self.ninputs())
                    .map(|j| self.entry(i, j).add(&other.entry(i, j)))
                    .collect()
            })
            .collect();
        Self::from_entries(entries, timebase)
    }

    /// Series connection `self * other`: `other` drives `self`.
    pub fn series(&self, other: &TransferFunction) -> LtiResult<Self> {
        if self.ninputs() != other.noutputs() {
            return Err(LtiError::dims(format!(
                "H = G1*G2: G1 has {} input(s), G2 has {} output(s)",
                self.ninputs(),
                other.noutputs()
            )));
        }
        let timebase = common_timebase(self.timebase, other.timebase)?;
        let entries = (0..self.noutputs())
            .map(|i| {
                (0..other.ninputs())
                    .map(|j| {
                        (0..self.ninputs()).fold(Rational::zero(), |acc, k| {
                            acc.add(&self.entry(i, k).mul(&other.entry(k, j)))
                        })
                    })
                    .collect()
            })
            .collect();
        Self::from_entries(entries, timebase)
    }

    /// Feedback connection with `other` in the return path. `sign = -1.0`
    /// gives negative feedback. SISO only.
    pub fn feedback(&self, other: &TransferFunction, sign: f64) -> LtiResult<Self> {
        if !self.is_siso() || !other.is_siso() {
            return Err(LtiError::not_implemented(
                "transfer function feedback is only implemented for SISO systems",
            ));
        }
        let timebase = common_timebase(self.timebase, other.timebase)?;
        let (n1, d1) = (&self.num[0][0], &self.den[0][0]);
        let (n2, d2) = (&other.num[0][0], &other.den[0][0]);
        let num = poly::mul(n1, d2);
        let den = poly::sub(&poly::mul(d1, d2), &poly::scale(&poly::mul(n1, n2), sign));
        Ok(Self::siso(&num, &den)?.with_timebase(timebase))
    }

    /// Block-diagonal stacking: inputs and outputs of `other` follow those
    /// of `self`.
    pub fn append(&self, other: &TransferFunction) -> LtiResult<Self> {
        let timebase = common_timebase(self.timebase, other.timebase)?;
        let (p1, m1) = (self.noutputs(), self.ninputs());
        let (p2, m2) = (other.noutputs(), other.ninputs());
        let entries = (0..p1 + p2)
            .map(|i| {
                (0..m1 + m2)
                    .map(|j| match (i < p1, j < m1) {
                        (true, true) => self.entry(i, j),
                        (false, false) => other.entry(i - p1, j - m1),
                        _ => Rational::zero(),
                    })
                    .collect()
            })
            .collect();
        Self::from_entries(entries, timebase)
    }
}

impl Lti for TransferFunction {
    fn ninputs(&self) -> usize {
        self.num[0].len()
    }

    fn noutputs(&self) -> usize {
        self.num.len()
    }

    fn timebase(&self) -> Timebase {
        self.timebase
    }

    fn signature(&self) -> &IoSignature {
        &self.signature
    }

    fn eval(&self, s: Complex64) -> LtiResult<CMatrix> {
        let mut out = CMatrix::zeros(self.noutputs(), self.ninputs());
        for i in 0..self.noutputs() {
            for j in 0..self.ninputs() {
                let d = poly::eval(&self.den[i][j], s);
                if d.norm() == 0.0 {
                    return Err(LtiError::numeric(format!(
                        "{s} is a pole of entry ({i}, {j})"
                    )));
                }
                out[(i, j)] = poly::eval(&self.num[i][j], s) / d;
            }
        }
        Ok(out)
    }

    /// Roots of the denominator. For MIMO systems, the roots of every
    /// distinct denominator are collected.
    fn poles(&self) -> LtiResult<Vec<Complex64>> {
        let mut distinct: Vec<&Vec<f64>> = Vec::new();
        for d in self.den.iter().flatten() {
            if !distinct.iter().any(|seen| same_poly(seen, d)) {
                distinct.push(d);
            }
        }
        let mut out = Vec::new();
        for d in distinct {
            out.extend(poly::roots(d)?);
        }
        poly::sort_complex(&mut out);
        Ok(out)
    }

    fn zeros(&self) -> LtiResult<Vec<Complex64>> {
        if !self.is_siso() {
            return Err(LtiError::not_implemented(
                "zeros of MIMO transfer functions",
            ));
        }
        poly::roots(&self.num[0][0])
    }
}

impl fmt::Display for TransferFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{}: TransferFunction, {} input(s), {} output(s), {}",
            self.signature.name,
            self.ninputs(),
            self.noutputs(),
            self.timebase
        )?;
        let var = variable_name(self.timebase);
        let mimo = !self.is_siso();
        for j in 0..self.ninputs() {
            for i in 0..self.noutputs() {
                if mimo {
                    writeln!(f, "Input {} to output {}:", j + 1, i + 1)?;
                }
                let num = poly::to_string(&self.num[i][j], var);
                let den = poly::to_string(&self.den[i][j], var);
                let width = num.len().max(den.len());
                writeln!(f, "  {num:^width$}")?;
                writeln!(f, "  {}", "-".repeat(width))?;
                writeln!(f, "  {den:^width$}")?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(re: f64, im: f64) -> Complex64 {
        Complex64::new(re, im)
    }

    #[test]
    fn siso_creation_and_eval() {
        let g = TransferFunction::siso(&[1.0], &[1.0, 2.0, 2.0]).unwrap();
        assert!(g.is_siso());
        assert_eq!(g.timebase(), Timebase::Continuous);
        let v = g.eval(c(0.0, 1.0)).unwrap()[(0, 0)];
        // 1 / (-1 + 2j + 2) = 1 / (1 + 2j)
        assert!((v - c(1.0, 0.0) / c(1.0, 2.0)).norm() < 1e-12);
    }

    #[test]
    fn rejects_bad_shapes() {
        assert!(TransferFunction::siso(&[1.0], &[0.0]).is_err());
        assert!(TransferFunction::siso(&[], &[1.0]).is_err());
        assert!(TransferFunction::new(vec![], vec![]).is_err());
        assert!(
            TransferFunction::new(
                vec![vec![vec![1.0], vec![1.0]]],
                vec![vec![vec![1.0]]]
            )
            .is_err()
        );
        assert!(TransferFunction::siso(&[f64::NAN], &[1.0]).is_err());
    }

    #[test]
    fn poles_and_zeros() {
        let g = TransferFunction::siso(&[1.0, 1.0], &[1.0, 3.0, 2.0]).unwrap();
        let p = g.poles().unwrap();
        assert_eq!(p.len(), 2);
        assert!((p[0] - c(-2.0, 0.0)).norm() < 1e-9);
        assert!((p[1] - c(-1.0, 0.0)).norm() < 1e-9);
        let z = g.zeros().unwrap();
        assert_eq!(z.len(), 1);
        assert!((z[0] - c(-1.0, 0.0)).norm() < 1e-9);
    }

    #[test]
    fn mimo_zeros_not_implemented() {
        let g = TransferFunction::new(
            vec![vec![vec![1.0], vec![1.0]]],
            vec![vec![vec![1.0, 1.0], vec![1.0, 2.0]]],
        )
        .unwrap();
        assert!(matches!(g.zeros(), Err(LtiError::NotImplemented { .. })));
        assert_eq!(g.poles().unwrap().len(), 2);
    }

    #[test]
    fn feedback_closes_loop() {
        // 1/s with unity negative feedback is 1/(s+1)
        let g = TransferFunction::siso(&[1.0], &[1.0, 0.0]).unwrap();
        let k = TransferFunction::siso(&[1.0], &[1.0]).unwrap();
        let cl = g.feedback(&k, -1.0).unwrap();
        assert_eq!(cl.num(0, 0), &[1.0]);
        assert_eq!(cl.den(0, 0), &[1.0, 1.0]);
    }

    #[test]
    fn series_and_parallel_evaluate_consistently() {
        let g1 = TransferFunction::siso(&[1.0], &[1.0, 1.0]).unwrap();
        let g2 = TransferFunction::siso(&[2.0, 0.0], &[1.0, 3.0]).unwrap();
        let s = c(0.3, 1.7);
        let v1 = g1.eval(s).unwrap()[(0, 0)];
        let v2 = g2.eval(s).unwrap()[(0, 0)];
        let sum = g1.parallel(&g2).unwrap().eval(s).unwrap()[(0, 0)];
        let prod = g1.series(&g2).unwrap().eval(s).unwrap()[(0, 0)];
        assert!((sum - (v1 + v2)).norm() < 1e-12);
        assert!((prod - v1 * v2).norm() < 1e-12);
    }

    #[test]
    fn mimo_series_is_matrix_product() {
        let a = TransferFunction::static_gain(&DMatrix::from_row_slice(2, 2, &[1.0, 2.0, 3.0, 4.0]))
            .unwrap();
        let b = TransferFunction::new(
            vec![vec![vec![1.0]], vec![vec![1.0]]],
            vec![vec![vec![1.0, 1.0]], vec![vec![1.0, 2.0]]],
        )
        .unwrap();
        let ab = a.series(&b).unwrap();
        assert_eq!(ab.noutputs(), 2);
        assert_eq!(ab.ninputs(), 1);
        let s = c(0.0, 1.0);
        let expected = a.eval(s).unwrap() * b.eval(s).unwrap();
        assert!((ab.eval(s).unwrap() - expected).norm() < 1e-12);
    }

    #[test]
    fn append_is_block_diagonal() {
        let g1 = TransferFunction::siso(&[1.0], &[1.0, 1.0]).unwrap();
        let g2 = TransferFunction::siso(&[3.0], &[1.0]).unwrap();
        let g = g1.append(&g2).unwrap();
        assert_eq!((g.noutputs(), g.ninputs()), (2, 2));
        let v = g.eval(c(0.0, 0.0)).unwrap();
        assert_eq!(v[(0, 0)], c(1.0, 0.0));
        assert_eq!(v[(0, 1)], c(0.0, 0.0));
        assert_eq!(v[(1, 1)], c(3.0, 0.0));
    }

    #[test]
    fn dimension_mismatch_is_reported() {
        let siso = TransferFunction::siso(&[1.0], &[1.0, 1.0]).unwrap();
        let wide = TransferFunction::new(
            vec![vec![vec![1.0], vec![1.0]]],
            vec![vec![vec![1.0], vec![1.0]]],
        )
        .unwrap();
        assert!(matches!(
            siso.parallel(&wide),
            Err(LtiError::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn timebase_mismatch_is_reported() {
        let g1 = TransferFunction::siso(&[1.0], &[1.0, 1.0]).unwrap();
        let g2 = TransferFunction::siso(&[1.0], &[1.0, 0.5])
            .unwrap()
            .with_timebase(Timebase::Discrete(Some(0.1)));
        assert!(matches!(g1.parallel(&g2), Err(LtiError::Core(_))));
    }

    #[test]
    fn eval_at_pole_is_error() {
        let g = TransferFunction::siso(&[1.0], &[1.0, 0.0]).unwrap();
        assert!(g.eval(c(0.0, 0.0)).is_err());
    }

    #[test]
    fn display_shows_fraction() {
        let g = TransferFunction::siso(&[1.0, 1.0], &[1.0, 3.0, 2.0])
            .unwrap()
            .with_name("G");
        let text = g.to_string();
        assert!(text.starts_with("G: TransferFunction"));
        assert!(text.contains("s + 1"));
        assert!(text.contains("s^2 + 3 s + 2"));
    }
}
