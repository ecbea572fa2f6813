//! Natural cubic splines used by interpolating frequency response data.

use num_complex::Complex64;

use crate::error::{LtiError, LtiResult};
use crate::lti::CMatrix;

/// Natural cubic spline through `(x[k], y[k])`.
///
/// One knot gives a constant and two knots a straight line. Outside the
/// knot range the end cubics are extended.
#[derive(Debug, Clone, PartialEq)]
pub struct CubicSpline {
    x: Vec<f64>,
    y: Vec<f64>,
    /// Second derivatives at the knots.
    m: Vec<f64>,
}

impl CubicSpline {
    pub fn new(x: &[f64], y: &[f64]) -> LtiResult<Self> {
        if x.is_empty() {
            return Err(LtiError::invalid("spline needs at least one knot"));
        }
        if x.len() != y.len() {
            return Err(LtiError::dims(format!(
                "spline has {} abscissae and {} values",
                x.len(),
                y.len()
            )));
        }
        if x.windows(2).any(|w| !(w[1] > w[0])) {
            return Err(LtiError::invalid("spline knots must be strictly increasing"));
        }
        Ok(Self {
            x: x.to_vec(),
            y: y.to_vec(),
            m: second_derivatives(x, y),
        })
    }

    pub fn eval(&self, xq: f64) -> f64 {
        let n = self.x.len();
        if n == 1 {
            return self.y[0];
        }
        // Interval index, clamped so extrapolation uses the end pieces
        let i = self.x.partition_point(|&v| v <= xq).clamp(1, n - 1) - 1;
        let h = self.x[i + 1] - self.x[i];
        let a = (self.x[i + 1] - xq) / h;
        let b = 1.0 - a;
        a * self.y[i]
            + b * self.y[i + 1]
            + ((a * a * a - a) * self.m[i] + (b * b * b - b) * self.m[i + 1]) * h * h / 6.0
    }
}

/// Tridiagonal solve for the natural end conditions `m[0] = m[n-1] = 0`.
fn second_derivatives(x: &[f64], y: &[f64]) -> Vec<f64> {
    let n = x.len();
    let mut m = vec![0.0; n];
    if n < 3 {
        return m;
    }
    let mut diag = vec![0.0; n];
    let mut rhs = vec![0.0; n];
    let mut upper = vec![0.0; n];
    for i in 1..n - 1 {
        let h0 = x[i] - x[i - 1];
        let h1 = x[i + 1] - x[i];
        let lower = h0 / 6.0;
        let mut d = (h0 + h1) / 3.0;
        let mut r = (y[i + 1] - y[i]) / h1 - (y[i] - y[i - 1]) / h0;
        // Forward elimination
        if i > 1 {
            let w = lower / diag[i - 1];
            d -= w * upper[i - 1];
            r -= w * rhs[i - 1];
        }
        diag[i] = d;
        rhs[i] = r;
        upper[i] = h1 / 6.0;
    }
    for i in (1..n - 1).rev() {
        let next = if i + 1 < n - 1 { m[i + 1] } else { 0.0 };
        m[i] = (rhs[i] - upper[i] * next) / diag[i];
    }
    m
}

/// Spline through complex samples, real and imaginary parts separately.
#[derive(Debug, Clone, PartialEq)]
pub struct ComplexSpline {
    re: CubicSpline,
    im: CubicSpline,
}

impl ComplexSpline {
    pub fn new(x: &[f64], values: &[Complex64]) -> LtiResult<Self> {
        let re: Vec<f64> = values.iter().map(|v| v.re).collect();
        let im: Vec<f64> = values.iter().map(|v| v.im).collect();
        Ok(Self {
            re: CubicSpline::new(x, &re)?,
            im: CubicSpline::new(x, &im)?,
        })
    }

    pub fn eval(&self, xq: f64) -> Complex64 {
        Complex64::new(self.re.eval(xq), self.im.eval(xq))
    }
}

/// Elementwise interpolation of a sampled transfer matrix.
#[derive(Debug, Clone, PartialEq)]
pub struct Interpolant {
    noutputs: usize,
    ninputs: usize,
    /// Row-major over (output, input).
    splines: Vec<ComplexSpline>,
}

impl Interpolant {
    /// `fresp[k]` is the response at `omega[k]`; all matrices share a shape.
    pub fn new(omega: &[f64], fresp: &[CMatrix]) -> LtiResult<Self> {
        let (noutputs, ninputs) = fresp
            .first()
            .map(|m| m.shape())
            .ok_or_else(|| LtiError::invalid("interpolant needs at least one sample"))?;
        let mut splines = Vec::with_capacity(noutputs * ninputs);
        for i in 0..noutputs {
            for j in 0..ninputs {
                let values: Vec<Complex64> = fresp.iter().map(|m| m[(i, j)]).collect();
                splines.push(ComplexSpline::new(omega, &values)?);
            }
        }
        Ok(Self {
            noutputs,
            ninputs,
            splines,
        })
    }

    pub fn eval(&self, omega: f64) -> CMatrix {
        CMatrix::from_fn(self.noutputs, self.ninputs, |i, j| {
            self.splines[i * self.ninputs + j].eval(omega)
        })
    }
}
