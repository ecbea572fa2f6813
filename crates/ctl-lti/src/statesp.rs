//! State-space representation `dx = A x + B u`, `y = C x + D u`.

use std::fmt;

use ctl_core::{IoSignature, Timebase, common_timebase, ensure_all_finite};
use nalgebra::DMatrix;
use num_complex::Complex64;

use crate::convert::ss2tf;
use crate::error::{LtiError, LtiResult};
use crate::lti::{CMatrix, Lti, to_complex};
use crate::poly;

#[derive(Debug, Clone, PartialEq)]
pub struct StateSpace {
    a: DMatrix<f64>,
    b: DMatrix<f64>,
    c: DMatrix<f64>,
    d: DMatrix<f64>,
    timebase: Timebase,
    signature: IoSignature,
}

impl StateSpace {
    /// Create a continuous-time system after checking that the four
    /// matrices agree in size.
    pub fn new(
        a: DMatrix<f64>,
        b: DMatrix<f64>,
        c: DMatrix<f64>,
        d: DMatrix<f64>,
    ) -> LtiResult<Self> {
        let n = a.nrows();
        if a.ncols() != n {
            return Err(LtiError::dims(format!(
                "A must be square, got {}x{}",
                a.nrows(),
                a.ncols()
            )));
        }
        let (p, m) = d.shape();
        if b.shape() != (n, m) {
            return Err(LtiError::dims(format!(
                "B must be {n}x{m}, got {}x{}",
                b.nrows(),
                b.ncols()
            )));
        }
        if c.shape() != (p, n) {
            return Err(LtiError::dims(format!(
                "C must be {p}x{n}, got {}x{}",
                c.nrows(),
                c.ncols()
            )));
        }
        if p == 0 || m == 0 {
            return Err(LtiError::invalid(
                "state-space system needs at least one input and one output",
            ));
        }
        for (mat, what) in [(&a, "A"), (&b, "B"), (&c, "C"), (&d, "D")] {
            ensure_all_finite(mat.as_slice(), "state-space matrix entry").map_err(|_| {
                LtiError::invalid(format!("matrix {what} has non-finite entries"))
            })?;
        }
        Ok(Self {
            a,
            b,
            c,
            d,
            timebase: Timebase::Continuous,
            signature: IoSignature::generic(m, p, n),
        })
    }

    /// Memoryless system `y = D u`.
    pub fn static_gain(d: DMatrix<f64>) -> LtiResult<Self> {
        let (p, m) = d.shape();
        Self::new(
            DMatrix::zeros(0, 0),
            DMatrix::zeros(0, m),
            DMatrix::zeros(p, 0),
            d,
        )
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
        if signature.ninputs() != self.ninputs()
            || signature.noutputs() != self.noutputs()
            || signature.states.len() != self.nstates()
        {
            return Err(LtiError::dims("signature does not match system size"));
        }
        self.signature = signature;
        Ok(self)
    }

    pub fn a(&self) -> &DMatrix<f64> {
        &self.a
    }

    pub fn b(&self) -> &DMatrix<f64> {
        &self.b
    }

    pub fn c(&self) -> &DMatrix<f64> {
        &self.c
    }

    pub fn d(&self) -> &DMatrix<f64> {
        &self.d
    }

    pub fn nstates(&self) -> usize {
        self.a.nrows()
    }

    fn derived(
        &self,
        a: DMatrix<f64>,
        b: DMatrix<f64>,
        c: DMatrix<f64>,
        d: DMatrix<f64>,
        timebase: Timebase,
    ) -> LtiResult<Self> {
        Ok(Self::new(a, b, c, d)?.with_timebase(timebase))
    }

    pub fn negate(&self) -> Self {
        self.scale(-1.0)
    }

    /// Output scaling `k * self`.
    pub fn scale(&self, k: f64) -> Self {
        Self {
            a: self.a.clone(),
            b: self.b.clone(),
            c: &self.c * k,
            d: &self.d * k,
            timebase: self.timebase,
            signature: IoSignature::generic(self.ninputs(), self.noutputs(), self.nstates()),
        }
    }

    /// Parallel connection `self + other`.
    pub fn parallel(&self, other: &StateSpace) -> LtiResult<Self> {
        if self.ninputs() != other.ninputs() || self.noutputs() != other.noutputs() {
            return Err(LtiError::dims(format!(
                "cannot add {}x{} and {}x{} systems",
                self.noutputs(),
                self.ninputs(),
                other.noutputs(),
                other.ninputs()
            )));
        }
        let timebase = common_timebase(self.timebase, other.timebase)?;
        let a = block_diag(&self.a, &other.a);
        let b = vstack(&self.b, &other.b);
        let c = hstack(&self.c, &other.c);
        let d = &self.d + &other.d;
        self.derived(a, b, c, d, timebase)
    }

    /// Series connection `self * other`: `other` drives `self`.
    pub fn series(&self, other: &StateSpace) -> LtiResult<Self> {
        if self.ninputs() != other.noutputs() {
            return Err(LtiError::dims(format!(
                "H = G1*G2: G1 has {} input(s), G2 has {} output(s)",
                self.ninputs(),
                other.noutputs()
            )));
        }
        let timebase = common_timebase(self.timebase, other.timebase)?;
        let (n1, n2) = (self.nstates(), other.nstates());

        let mut a = DMatrix::zeros(n1 + n2, n1 + n2);
        a.view_mut((0, 0), (n1, n1)).copy_from(&self.a);
        a.view_mut((0, n1), (n1, n2)).copy_from(&(&self.b * &other.c));
        a.view_mut((n1, n1), (n2, n2)).copy_from(&other.a);

        let b = vstack(&(&self.b * &other.d), &other.b);
        let c = hstack(&self.c, &(&self.d * &other.c));
        let d = &self.d * &other.d;
        self.derived(a, b, c, d, timebase)
    }

    /// Feedback connection with `other` in the return path. `sign = -1.0`
    /// gives negative feedback. Fails when `I - sign * D2 * D1` is singular.
    pub fn feedback(&self, other: &StateSpace, sign: f64) -> LtiResult<Self> {
        if self.ninputs() != other.noutputs() || self.noutputs() != other.ninputs() {
            return Err(LtiError::dims(format!(
                "feedback of a {}x{} system with a {}x{} system",
                self.noutputs(),
                self.ninputs(),
                other.noutputs(),
                other.ninputs()
            )));
        }
        let timebase = common_timebase(self.timebase, other.timebase)?;
        let (a1, b1, c1, d1) = (&self.a, &self.b, &self.c, &self.d);
        let (a2, b2, c2, d2) = (&other.a, &other.b, &other.c, &other.d);
        let (n1, n2) = (self.nstates(), other.nstates());
        let m1 = self.ninputs();
        let p1 = self.noutputs();

        let f = DMatrix::identity(m1, m1) - d2 * d1 * sign;
        let lu = f.lu();
        let e_d2 = lu
            .solve(d2)
            .ok_or_else(|| LtiError::numeric("I - sign*D2*D1 is singular"))?;
        let e_c2 = lu
            .solve(c2)
            .ok_or_else(|| LtiError::numeric("I - sign*D2*D1 is singular"))?;
        let t1 = DMatrix::identity(p1, p1) + d1 * &e_d2 * sign;
        let t2 = DMatrix::identity(m1, m1) + &e_d2 * d1 * sign;

        let mut a = DMatrix::zeros(n1 + n2, n1 + n2);
        a.view_mut((0, 0), (n1, n1))
            .copy_from(&(a1 + b1 * &e_d2 * c1 * sign));
        a.view_mut((0, n1), (n1, n2)).copy_from(&(b1 * &e_c2 * sign));
        a.view_mut((n1, 0), (n2, n1)).copy_from(&(b2 * &t1 * c1));
        a.view_mut((n1, n1), (n2, n2))
            .copy_from(&(a2 + b2 * d1 * &e_c2 * sign));

        let b = vstack(&(b1 * &t2), &(b2 * d1 * &t2));
        let c = hstack(&(&t1 * c1), &(d1 * &e_c2 * sign));
        let d = d1 * &t2;
        self.derived(a, b, c, d, timebase)
    }

    /// Block-diagonal stacking of two systems.
    pub fn append(&self, other: &StateSpace) -> LtiResult<Self> {
        let timebase = common_timebase(self.timebase, other.timebase)?;
        self.derived(
            block_diag(&self.a, &other.a),
            block_diag(&self.b, &other.b),
            block_diag(&self.c, &other.c),
            block_diag(&self.d, &other.d),
            timebase,
        )
    }
}

fn block_diag(x: &DMatrix<f64>, y: &DMatrix<f64>) -> DMatrix<f64> {
    let (r1, c1) = x.shape();
    let (r2, c2) = y.shape();
    let mut out = DMatrix::zeros(r1 + r2, c1 + c2);
    out.view_mut((0, 0), (r1, c1)).copy_from(x);
    out.view_mut((r1, c1), (r2, c2)).copy_from(y);
    out
}

fn vstack(x: &DMatrix<f64>, y: &DMatrix<f64>) -> DMatrix<f64> {
    let cols = x.ncols();
    let mut out = DMatrix::zeros(x.nrows() + y.nrows(), cols);
    out.view_mut((0, 0), (x.nrows(), cols)).copy_from(x);
    out.view_mut((x.nrows(), 0), (y.nrows(), cols)).copy_from(y);
    out
}

fn hstack(x: &DMatrix<f64>, y: &DMatrix<f64>) -> DMatrix<f64> {
    let rows = x.nrows();
    let mut out = DMatrix::zeros(rows, x.ncols() + y.ncols());
    out.view_mut((0, 0), (rows, x.ncols())).copy_from(x);
    out.view_mut((0, x.ncols()), (rows, y.ncols())).copy_from(y);
    out
}

fn eigenvalues(m: &DMatrix<f64>) -> Vec<Complex64> {
    if m.nrows() == 0 {
        return Vec::new();
    }
    let mut out: Vec<Complex64> = m.complex_eigenvalues().iter().copied().collect();
    poly::sort_complex(&mut out);
    out
}

impl Lti for StateSpace {
    fn ninputs(&self) -> usize {
        self.d.ncols()
    }

    fn noutputs(&self) -> usize {
        self.d.nrows()
    }

    fn timebase(&self) -> Timebase {
        self.timebase
    }

    fn signature(&self) -> &IoSignature {
        &self.signature
    }

    fn eval(&self, s: Complex64) -> LtiResult<CMatrix> {
        let d = to_complex(&self.d);
        let n = self.nstates();
        if n == 0 {
            return Ok(d);
        }
        let si_a = CMatrix::identity(n, n) * s - to_complex(&self.a);
        let x = si_a
            .lu()
            .solve(&to_complex(&self.b))
            .ok_or_else(|| LtiError::numeric(format!("sI - A is singular at s = {s}")))?;
        Ok(to_complex(&self.c) * x + d)
    }

    fn poles(&self) -> LtiResult<Vec<Complex64>> {
        Ok(eigenvalues(&self.a))
    }

    /// SISO zeros come from the transfer-function numerator. Square MIMO
    /// systems with an invertible feedthrough use `eig(A - B D^-1 C)`.
    fn zeros(&self) -> LtiResult<Vec<Complex64>> {
        if self.is_siso() {
            return ss2tf(self)?.zeros();
        }
        if self.ninputs() == self.noutputs() {
            if let Some(d_inv) = self.d.clone().try_inverse() {
                return Ok(eigenvalues(&(&self.a - &self.b * d_inv * &self.c)));
            }
        }
        Err(LtiError::not_implemented(
            "zeros of MIMO state-space systems with singular or non-square D",
        ))
    }
}

fn write_matrix(f: &mut fmt::Formatter<'_>, label: &str, m: &DMatrix<f64>) -> fmt::Result {
    if m.is_empty() {
        return writeln!(f, "{label} = []");
    }
    for i in 0..m.nrows() {
        let prefix = if i == 0 { format!("{label} = ") } else { "    ".to_string() };
        let row: Vec<String> = m.row(i).iter().map(|v| format!("{v:>10.4}")).collect();
        writeln!(f, "{prefix}[{}]", row.join(" "))?;
    }
    Ok(())
}

impl fmt::Display for StateSpace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{}: StateSpace, {} input(s), {} output(s), {} state(s), {}",
            self.signature.name,
            self.ninputs(),
            self.noutputs(),
            self.nstates(),
            self.timebase
        )?;
        writeln!(f)?;
        write_matrix(f, "A", &self.a)?;
        write_matrix(f, "B", &self.b)?;
        write_matrix(f, "C", &self.c)?;
        write_matrix(f, "D", &self.d)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn c(re: f64, im: f64) -> Complex64 {
        Complex64::new(re, im)
    }

    fn first_order(pole: f64) -> StateSpace {
        // 1 / (s - pole)
        StateSpace::new(
            DMatrix::from_element(1, 1, pole),
            DMatrix::from_element(1, 1, 1.0),
            DMatrix::from_element(1, 1, 1.0),
            DMatrix::zeros(1, 1),
        )
        .unwrap()
    }

    #[test]
    fn shape_validation() {
        let bad = StateSpace::new(
            DMatrix::zeros(2, 2),
            DMatrix::zeros(1, 1),
            DMatrix::zeros(1, 2),
            DMatrix::zeros(1, 1),
        );
        assert!(matches!(bad, Err(LtiError::DimensionMismatch { .. })));
        let nan = StateSpace::new(
            DMatrix::from_element(1, 1, f64::NAN),
            DMatrix::zeros(1, 1),
            DMatrix::zeros(1, 1),
            DMatrix::zeros(1, 1),
        );
        assert!(matches!(nan, Err(LtiError::InvalidArg { .. })));
    }

    #[test]
    fn eval_first_order() {
        let g = first_order(-2.0);
        let v = g.eval(c(0.0, 1.0)).unwrap()[(0, 0)];
        assert!((v - c(1.0, 0.0) / c(2.0, 1.0)).norm() < 1e-12);
        assert!(g.eval(c(-2.0, 0.0)).is_err());
    }

    #[test]
    fn static_gain_has_no_states() {
        let k = StateSpace::static_gain(DMatrix::from_row_slice(1, 2, &[1.0, -2.0])).unwrap();
        assert_eq!(k.nstates(), 0);
        assert_eq!(k.eval(c(0.0, 5.0)).unwrap()[(0, 1)], c(-2.0, 0.0));
        assert!(k.poles().unwrap().is_empty());
    }

    #[test]
    fn poles_are_eigenvalues() {
        let g = StateSpace::new(
            DMatrix::from_row_slice(2, 2, &[0.0, 10.0, -10.0, 0.0]),
            DMatrix::identity(2, 2),
            DMatrix::identity(2, 2),
            DMatrix::zeros(2, 2),
        )
        .unwrap();
        let p = g.poles().unwrap();
        assert_eq!(p.len(), 2);
        assert!((p[0] - c(0.0, -10.0)).norm() < 1e-9);
        assert!((p[1] - c(0.0, 10.0)).norm() < 1e-9);
    }

    #[test]
    fn interconnections_match_pointwise_algebra() {
        let g1 = first_order(-1.0);
        let g2 = first_order(-3.0).scale(2.0);
        let s = c(0.2, 0.9);
        let v1 = g1.eval(s).unwrap()[(0, 0)];
        let v2 = g2.eval(s).unwrap()[(0, 0)];

        let sum = g1.parallel(&g2).unwrap().eval(s).unwrap()[(0, 0)];
        assert!((sum - (v1 + v2)).norm() < 1e-12);
        let prod = g1.series(&g2).unwrap().eval(s).unwrap()[(0, 0)];
        assert!((prod - v1 * v2).norm() < 1e-12);
        let cl = g1.feedback(&g2, -1.0).unwrap().eval(s).unwrap()[(0, 0)];
        assert!((cl - v1 / (1.0 + v1 * v2)).norm() < 1e-12);
        let pos = g1.feedback(&g2, 1.0).unwrap().eval(s).unwrap()[(0, 0)];
        assert!((pos - v1 / (1.0 - v1 * v2)).norm() < 1e-12);
    }

    #[test]
    fn feedback_with_feedthrough() {
        // G = 2 (static), H = 1/(s+1): G / (1 + G H)
        let g = StateSpace::static_gain(DMatrix::from_element(1, 1, 2.0)).unwrap();
        let h = first_order(-1.0);
        let s = c(0.0, 2.0);
        let hv = h.eval(s).unwrap()[(0, 0)];
        let cl = g.feedback(&h, -1.0).unwrap().eval(s).unwrap()[(0, 0)];
        assert!((cl - c(2.0, 0.0) / (1.0 + 2.0 * hv)).norm() < 1e-12);
    }

    #[test]
    fn algebraic_loop_is_reported() {
        let g = StateSpace::static_gain(DMatrix::from_element(1, 1, 1.0)).unwrap();
        assert!(matches!(g.feedback(&g, 1.0), Err(LtiError::Numeric { .. })));
    }

    #[test]
    fn mimo_zeros_with_invertible_feedthrough() {
        // (s + 2) / (s + 1) on both channels
        let g = StateSpace::new(
            -DMatrix::identity(2, 2),
            DMatrix::identity(2, 2),
            DMatrix::identity(2, 2),
            DMatrix::identity(2, 2),
        )
        .unwrap();
        let z = g.zeros().unwrap();
        assert_eq!(z.len(), 2);
        assert!(z.iter().all(|v| (v - c(-2.0, 0.0)).norm() < 1e-9));

        let singular = StateSpace::new(
            -DMatrix::identity(2, 2),
            DMatrix::identity(2, 2),
            DMatrix::identity(2, 2),
            DMatrix::zeros(2, 2),
        )
        .unwrap();
        assert!(matches!(singular.zeros(), Err(LtiError::NotImplemented { .. })));
    }

    #[test]
    fn append_keeps_channels_separate() {
        let g = first_order(-1.0).append(&first_order(-2.0)).unwrap();
        assert_eq!((g.noutputs(), g.ninputs(), g.nstates()), (2, 2, 2));
        let v = g.eval(c(0.0, 0.0)).unwrap();
        assert!((v[(0, 0)] - c(1.0, 0.0)).norm() < 1e-12);
        assert!((v[(1, 1)] - c(0.5, 0.0)).norm() < 1e-12);
        assert_eq!(v[(0, 1)], c(0.0, 0.0));
    }

    #[test]
    fn display_lists_matrices() {
        let text = first_order(-1.0).with_name("P").to_string();
        assert!(text.starts_with("P: StateSpace"));
        assert!(text.contains("A = "));
        assert!(text.contains("D = "));
    }
}
