//! Frequency response data.
//!
//! An FRD model stores complex transfer matrices at a finite grid of real
//! frequencies. Without an interpolant it can only be evaluated at stored
//! frequencies; with one, responses between grid points come from cubic
//! splines of the real and imaginary parts.

use std::fmt;
use std::io::{self, Write};

use ctl_core::{AnalysisDefaults, IoSignature, Timebase, common_timebase, ensure_all_finite};
use nalgebra::DMatrix;
use num_complex::Complex64;
use rayon::prelude::*;
use tracing::{debug, warn};

use crate::error::{LtiError, LtiResult};
use crate::interp::Interpolant;
use crate::lti::{CMatrix, Lti, to_complex};
use crate::statesp::StateSpace;
use crate::xferfcn::TransferFunction;

/// Default bound for matching requested frequencies to stored ones.
pub const DEFAULT_MATCH_TOLERANCE: f64 = 1e-8;

#[derive(Debug, Clone)]
pub struct FrequencyResponseData {
    omega: Vec<f64>,
    fresp: Vec<CMatrix>,
    interp: Option<Interpolant>,
    match_tolerance: f64,
    timebase: Timebase,
    signature: IoSignature,
}

impl FrequencyResponseData {
    /// Create exact-match frequency response data. `fresp[k]` is the
    /// transfer matrix at `omega[k]`; the pairs are sorted by frequency.
    pub fn new(fresp: Vec<CMatrix>, omega: Vec<f64>) -> LtiResult<Self> {
        if omega.is_empty() {
            return Err(LtiError::invalid("frequency response data needs at least one frequency"));
        }
        if fresp.len() != omega.len() {
            return Err(LtiError::dims(format!(
                "{} frequencies but {} response matrices",
                omega.len(),
                fresp.len()
            )));
        }
        ensure_all_finite(&omega, "frequency")?;
        let shape = fresp[0].shape();
        if shape.0 == 0 || shape.1 == 0 {
            return Err(LtiError::invalid("response matrices must not be empty"));
        }
        if fresp.iter().any(|m| m.shape() != shape) {
            return Err(LtiError::dims("response matrices differ in shape"));
        }

        let mut pairs: Vec<(f64, CMatrix)> = omega.into_iter().zip(fresp).collect();
        pairs.sort_by(|a, b| a.0.total_cmp(&b.0));
        if pairs.windows(2).any(|w| w[0].0 == w[1].0) {
            return Err(LtiError::invalid("duplicate frequencies in frequency response data"));
        }
        let (omega, fresp): (Vec<f64>, Vec<CMatrix>) = pairs.into_iter().unzip();

        Ok(Self {
            omega,
            fresp,
            interp: None,
            match_tolerance: DEFAULT_MATCH_TOLERANCE,
            timebase: Timebase::Continuous,
            signature: IoSignature::generic(shape.1, shape.0, 0),
        })
    }

    /// Single-input single-output data.
    pub fn siso(values: &[Complex64], omega: Vec<f64>) -> LtiResult<Self> {
        let fresp = values
            .iter()
            .map(|&v| CMatrix::from_element(1, 1, v))
            .collect();
        Self::new(fresp, omega)
    }

    /// Sample a system on the given frequencies.
    pub fn from_system(sys: &dyn Lti, omega: &[f64]) -> LtiResult<Self> {
        let mut omega = omega.to_vec();
        omega.sort_by(f64::total_cmp);
        let fresp = omega
            .par_iter()
            .map(|&w| sys.eval_frequency(w))
            .collect::<LtiResult<Vec<_>>>()?;
        debug!(system = sys.name(), points = omega.len(), "sampled frequency response");
        let mut frd = Self::new(fresp, omega)?;
        frd.timebase = sys.timebase();
        frd.signature = sys.signature().clone();
        Ok(frd)
    }

    /// Turn spline interpolation on or off.
    pub fn with_smoothing(mut self, smooth: bool) -> LtiResult<Self> {
        self.interp = if smooth {
            Some(Interpolant::new(&self.omega, &self.fresp)?)
        } else {
            None
        };
        Ok(self)
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

    pub fn with_match_tolerance(mut self, tolerance: f64) -> LtiResult<Self> {
        if !(tolerance.is_finite() && tolerance >= 0.0) {
            return Err(LtiError::invalid("match tolerance must be finite and non-negative"));
        }
        self.match_tolerance = tolerance;
        Ok(self)
    }

    pub fn with_defaults(self, defaults: &AnalysisDefaults) -> LtiResult<Self> {
        self.with_match_tolerance(defaults.frd.match_tolerance)
    }

    /// Stored frequencies in rad/s, strictly increasing.
    pub fn frequency(&self) -> &[f64] {
        &self.omega
    }

    /// Stored transfer matrices, one per frequency.
    pub fn response(&self) -> &[CMatrix] {
        &self.fresp
    }

    pub fn len(&self) -> usize {
        self.omega.len()
    }

    pub fn is_empty(&self) -> bool {
        self.omega.is_empty()
    }

    pub fn is_smooth(&self) -> bool {
        self.interp.is_some()
    }

    pub fn match_tolerance(&self) -> f64 {
        self.match_tolerance
    }

    /// Response from input `inp` to output `out` across the grid.
    pub fn entry(&self, out: usize, inp: usize) -> Vec<Complex64> {
        self.fresp.iter().map(|m| m[(out, inp)]).collect()
    }

    pub fn magnitude(&self) -> Vec<DMatrix<f64>> {
        self.fresp.iter().map(|m| m.map(|v| v.norm())).collect()
    }

    /// Phase in radians.
    pub fn phase(&self) -> Vec<DMatrix<f64>> {
        self.fresp.iter().map(|m| m.map(|v| v.arg())).collect()
    }

    /// `(omega, response)` pair.
    pub fn omega_response(&self) -> (&[f64], &[CMatrix]) {
        (&self.omega, &self.fresp)
    }

    /// `(magnitude, phase, omega)` triple.
    pub fn mag_phase(&self) -> (Vec<DMatrix<f64>>, Vec<DMatrix<f64>>, Vec<f64>) {
        (self.magnitude(), self.phase(), self.omega.clone())
    }

    /// Singular values of the transfer matrix at each frequency, largest
    /// first.
    pub fn singular_values(&self) -> Vec<Vec<f64>> {
        self.fresp
            .iter()
            .map(|m| {
                let mut sv: Vec<f64> = m.singular_values().iter().copied().collect();
                sv.sort_by(|a, b| b.total_cmp(a));
                sv
            })
            .collect()
    }

    fn stored_index(&self, w: f64) -> Option<usize> {
        let i = self.omega.partition_point(|&v| v < w);
        [i.checked_sub(1), Some(i)]
            .into_iter()
            .flatten()
            .filter(|&k| k < self.omega.len())
            .find(|&k| (self.omega[k] - w).abs() <= self.match_tolerance)
    }

    /// Transfer matrices at the requested frequencies, in request order.
    pub fn eval(&self, omega: &[f64]) -> LtiResult<Vec<CMatrix>> {
        if let Some(interp) = &self.interp {
            return Ok(omega.iter().map(|&w| interp.eval(w)).collect());
        }
        let indices: Vec<Option<usize>> = omega.iter().map(|&w| self.stored_index(w)).collect();
        let missing: Vec<String> = omega
            .iter()
            .zip(&indices)
            .filter(|(_, idx)| idx.is_none())
            .map(|(w, _)| w.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(LtiError::invalid(format!(
                "frequencies [{}] not in frequency data; try an interpolating FRD",
                missing.join(", ")
            )));
        }
        Ok(indices
            .into_iter()
            .flatten()
            .map(|k| self.fresp[k].clone())
            .collect())
    }

    pub fn eval_one(&self, omega: f64) -> LtiResult<CMatrix> {
        let mut out = self.eval(&[omega])?;
        out.pop()
            .ok_or_else(|| LtiError::numeric("evaluation returned no response"))
    }

    /// Data at the requested frequencies, same smoothing.
    pub fn frequency_response(&self, omega: &[f64]) -> LtiResult<Self> {
        let mut omega = omega.to_vec();
        omega.sort_by(f64::total_cmp);
        let fresp = self.eval(&omega)?;
        self.rebuild(fresp, omega, self.is_smooth(), self.timebase)
    }

    /// `(magnitude, phase, omega)` at the requested frequencies.
    #[deprecated(note = "use `frequency_response` and `mag_phase`")]
    pub fn freqresp(
        &self,
        omega: &[f64],
    ) -> LtiResult<(Vec<DMatrix<f64>>, Vec<DMatrix<f64>>, Vec<f64>)> {
        Ok(self.frequency_response(omega)?.mag_phase())
    }

    fn rebuild(
        &self,
        fresp: Vec<CMatrix>,
        omega: Vec<f64>,
        smooth: bool,
        timebase: Timebase,
    ) -> LtiResult<Self> {
        Self::new(fresp, omega)?
            .with_timebase(timebase)
            .with_match_tolerance(self.match_tolerance)?
            .with_smoothing(smooth)
    }

    fn map_response(&self, f: impl Fn(&CMatrix) -> CMatrix, smooth: bool) -> LtiResult<Self> {
        let fresp = self.fresp.iter().map(f).collect();
        self.rebuild(fresp, self.omega.clone(), smooth, self.timebase)
    }

    fn zip_response(
        &self,
        other: &FrequencyResponseData,
        f: impl Fn(&CMatrix, &CMatrix) -> LtiResult<CMatrix>,
        smooth: bool,
    ) -> LtiResult<Self> {
        let timebase = common_timebase(self.timebase, other.timebase)?;
        let fresp = self
            .fresp
            .iter()
            .zip(&other.fresp)
            .map(|(a, b)| f(a, b))
            .collect::<LtiResult<Vec<_>>>()?;
        self.rebuild(fresp, self.omega.clone(), smooth, timebase)
    }

    pub(crate) fn convert(
        &self,
        other: FrdOperand<'_>,
        ninputs: usize,
        noutputs: usize,
    ) -> LtiResult<Self> {
        convert_to_frd(other, &self.omega, ninputs, noutputs)?
            .with_match_tolerance(self.match_tolerance)
    }

    pub fn negate(&self) -> Self {
        Self {
            omega: self.omega.clone(),
            fresp: self.fresp.iter().map(|m| -m).collect(),
            interp: None,
            match_tolerance: self.match_tolerance,
            timebase: self.timebase,
            signature: IoSignature::generic(self.ninputs(), self.noutputs(), 0),
        }
    }

    /// Parallel connection `self + other`.
    pub fn parallel<'a>(&self, other: impl Into<FrdOperand<'a>>) -> LtiResult<Self> {
        let other = self.convert(other.into(), self.ninputs(), self.noutputs())?;
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
        self.zip_response(&other, |a, b| Ok(a + b), false)
    }

    /// `self - other`.
    pub fn subtract<'a>(&self, other: impl Into<FrdOperand<'a>>) -> LtiResult<Self> {
        let other = self.convert(other.into(), self.ninputs(), self.noutputs())?;
        self.parallel(&other.negate())
    }

    /// `other - self`.
    pub fn rsubtract<'a>(&self, other: impl Into<FrdOperand<'a>>) -> LtiResult<Self> {
        self.negate().parallel(other)
    }

    /// Output scaling `k * self`.
    pub fn scale(&self, k: impl Into<Complex64>) -> LtiResult<Self> {
        let k = k.into();
        self.map_response(|m| m * k, self.is_smooth())
    }

    /// Series connection `self * other`: `other` drives `self`.
    pub fn series<'a>(&self, other: impl Into<FrdOperand<'a>>) -> LtiResult<Self> {
        let other = other.into();
        if let FrdOperand::Scalar(k) = other {
            return self.scale(k);
        }
        let other = self.convert(other, self.ninputs(), self.ninputs())?;
        if self.ninputs() != other.noutputs() {
            return Err(LtiError::dims(format!(
                "H = G1*G2: G1 has {} input(s), G2 has {} output(s)",
                self.ninputs(),
                other.noutputs()
            )));
        }
        let smooth = self.is_smooth() && other.is_smooth();
        self.zip_response(&other, |a, b| Ok(a * b), smooth)
    }

    /// Series connection `other * self`: `self` drives `other`.
    pub fn rseries<'a>(&self, other: impl Into<FrdOperand<'a>>) -> LtiResult<Self> {
        let other = other.into();
        if let FrdOperand::Scalar(k) = other {
            return self.scale(k);
        }
        let other = self.convert(other, self.noutputs(), self.noutputs())?;
        other.series(self)
    }

    /// `self / other`, SISO only.
    pub fn divide<'a>(&self, other: impl Into<FrdOperand<'a>>) -> LtiResult<Self> {
        let other = other.into();
        if let FrdOperand::Scalar(k) = other {
            return self.scale(k.inv());
        }
        let other = self.convert(other, self.ninputs(), self.noutputs())?;
        if !self.is_siso() || !other.is_siso() {
            return Err(LtiError::not_implemented(
                "FRD division is only implemented for SISO systems",
            ));
        }
        let smooth = self.is_smooth() && other.is_smooth();
        self.zip_response(&other, |a, b| Ok(a.component_div(b)), smooth)
    }

    /// `other / self`, SISO only.
    pub fn rdivide<'a>(&self, other: impl Into<FrdOperand<'a>>) -> LtiResult<Self> {
        let other = self.convert(other.into(), self.ninputs(), self.noutputs())?;
        other.divide(self)
    }

    /// Integer power. Zero gives the identity response and negative powers
    /// go through the matrix inverse at each frequency.
    pub fn powi(&self, n: i32) -> LtiResult<Self> {
        let size = self.ninputs();
        if self.noutputs() != size {
            return Err(LtiError::dims(format!(
                "power of a non-square {}x{} system",
                self.noutputs(),
                size
            )));
        }
        let base = if n < 0 {
            let inverted = self
                .fresp
                .iter()
                .map(|m| {
                    m.clone()
                        .try_inverse()
                        .ok_or_else(|| LtiError::numeric("response is singular"))
                })
                .collect::<LtiResult<Vec<_>>>()?;
            self.rebuild(inverted, self.omega.clone(), self.is_smooth(), self.timebase)?
        } else {
            self.clone()
        };
        let exponent = n.unsigned_abs();
        base.map_response(
            |m| {
                (0..exponent).fold(CMatrix::identity(size, size), |acc, _| acc * m)
            },
            self.is_smooth(),
        )
    }

    /// Feedback connection with `other` in the return path:
    /// `G (I - sign H G)^-1`. `sign = -1.0` gives negative feedback.
    pub fn feedback<'a>(&self, other: impl Into<FrdOperand<'a>>, sign: f64) -> LtiResult<Self> {
        let other = self.convert(other.into(), self.noutputs(), self.ninputs())?;
        if self.noutputs() != other.ninputs() || self.ninputs() != other.noutputs() {
            return Err(LtiError::dims(format!(
                "feedback of a {}x{} system with a {}x{} system",
                self.noutputs(),
                self.ninputs(),
                other.noutputs(),
                other.ninputs()
            )));
        }
        let size = self.ninputs();
        let sign = Complex64::new(sign, 0.0);
        self.zip_response(
            &other,
            |g, h| {
                let loop_matrix = CMatrix::identity(size, size) - h * g * sign;
                let inv = loop_matrix
                    .try_inverse()
                    .ok_or_else(|| LtiError::numeric("I - sign*H*G is singular"))?;
                Ok(g * inv)
            },
            self.is_smooth(),
        )
    }

    /// Block-diagonal stacking on the grid of `self`. Scalars count as
    /// 1x1 systems.
    pub fn append<'a>(&self, other: impl Into<FrdOperand<'a>>) -> LtiResult<Self> {
        let other = self.convert(other.into(), 1, 1)?;
        let (p1, m1) = (self.noutputs(), self.ninputs());
        let (p2, m2) = (other.noutputs(), other.ninputs());
        let smooth = self.is_smooth() && other.is_smooth();
        self.zip_response(
            &other,
            |a, b| {
                let mut out = CMatrix::zeros(p1 + p2, m1 + m2);
                out.view_mut((0, 0), (p1, m1)).copy_from(a);
                out.view_mut((p1, m1), (p2, m2)).copy_from(b);
                Ok(out)
            },
            smooth,
        )
    }

    /// One column per output/input pair next to the frequency column.
    pub fn to_table(&self) -> ResponseTable {
        let mut columns = Vec::with_capacity(self.noutputs() * self.ninputs());
        for i in 0..self.noutputs() {
            for j in 0..self.ninputs() {
                let name = format!(
                    "H_{{{}, {}}}",
                    self.signature.outputs[i], self.signature.inputs[j]
                );
                columns.push((name, self.entry(i, j)));
            }
        }
        ResponseTable {
            omega: self.omega.clone(),
            columns,
        }
    }

    pub fn write_csv<W: Write>(&self, writer: W) -> io::Result<()> {
        self.to_table().write_csv(writer)
    }
}

impl std::ops::Neg for FrequencyResponseData {
    type Output = FrequencyResponseData;

    fn neg(self) -> Self::Output {
        self.negate()
    }
}

/// Frequency response data in tabular form.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseTable {
    pub omega: Vec<f64>,
    pub columns: Vec<(String, Vec<Complex64>)>,
}

impl ResponseTable {
    /// CSV with an `omega` column and a real and imaginary column per entry.
    pub fn write_csv<W: Write>(&self, mut writer: W) -> io::Result<()> {
        let mut header = vec!["omega".to_string()];
        for (name, _) in &self.columns {
            header.push(format!("\"{name} re\""));
            header.push(format!("\"{name} im\""));
        }
        writeln!(writer, "{}", header.join(","))?;
        for (k, w) in self.omega.iter().enumerate() {
            let mut row = vec![w.to_string()];
            for (_, values) in &self.columns {
                row.push(values[k].re.to_string());
                row.push(values[k].im.to_string());
            }
            writeln!(writer, "{}", row.join(","))?;
        }
        Ok(())
    }
}

/// Right-hand side of FRD arithmetic.
#[derive(Clone, Copy)]
pub enum FrdOperand<'a> {
    Frd(&'a FrequencyResponseData),
    System(&'a dyn Lti),
    Scalar(Complex64),
    Matrix(&'a DMatrix<f64>),
}

impl<'a> From<&'a FrequencyResponseData> for FrdOperand<'a> {
    fn from(frd: &'a FrequencyResponseData) -> Self {
        Self::Frd(frd)
    }
}

impl<'a> From<&'a TransferFunction> for FrdOperand<'a> {
    fn from(tf: &'a TransferFunction) -> Self {
        Self::System(tf)
    }
}

impl<'a> From<&'a StateSpace> for FrdOperand<'a> {
    fn from(ss: &'a StateSpace) -> Self {
        Self::System(ss)
    }
}

impl<'a> From<&'a dyn Lti> for FrdOperand<'a> {
    fn from(sys: &'a dyn Lti) -> Self {
        Self::System(sys)
    }
}

impl<'a> From<&'a DMatrix<f64>> for FrdOperand<'a> {
    fn from(m: &'a DMatrix<f64>) -> Self {
        Self::Matrix(m)
    }
}

impl From<f64> for FrdOperand<'_> {
    fn from(k: f64) -> Self {
        Self::Scalar(Complex64::new(k, 0.0))
    }
}

impl From<Complex64> for FrdOperand<'_> {
    fn from(k: Complex64) -> Self {
        Self::Scalar(k)
    }
}

fn same_grid(a: &[f64], b: &[f64], tolerance: f64) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| (x - y).abs() <= tolerance)
}

/// Express an operand as frequency response data on the grid `omega`.
///
/// FRD operands must already live on that grid. Systems are sampled and
/// get an interpolant. Scalars become a constant `noutputs x ninputs`
/// response; matrices keep their own shape.
pub fn convert_to_frd(
    operand: FrdOperand<'_>,
    omega: &[f64],
    ninputs: usize,
    noutputs: usize,
) -> LtiResult<FrequencyResponseData> {
    match operand {
        FrdOperand::Frd(frd) => {
            if same_grid(&frd.omega, omega, frd.match_tolerance) {
                Ok(frd.clone())
            } else {
                warn!(
                    system = frd.name(),
                    stored = frd.len(),
                    requested = omega.len(),
                    "frequency grids differ"
                );
                Err(LtiError::not_implemented(
                    "frequency ranges of FRD do not match, conversion not implemented",
                ))
            }
        }
        FrdOperand::System(sys) => {
            FrequencyResponseData::from_system(sys, omega)?.with_smoothing(true)
        }
        FrdOperand::Scalar(k) => {
            let fresp = vec![CMatrix::from_element(noutputs, ninputs, k); omega.len()];
            FrequencyResponseData::new(fresp, omega.to_vec())?.with_smoothing(true)
        }
        FrdOperand::Matrix(m) => {
            let fresp = vec![to_complex(m); omega.len()];
            FrequencyResponseData::new(fresp, omega.to_vec())?.with_smoothing(true)
        }
    }
}

/// Sample any system on a frequency grid.
pub fn frequency_response(sys: &dyn Lti, omega: &[f64]) -> LtiResult<FrequencyResponseData> {
    FrequencyResponseData::from_system(sys, omega)
}

impl Lti for FrequencyResponseData {
    fn ninputs(&self) -> usize {
        self.fresp[0].ncols()
    }

    fn noutputs(&self) -> usize {
        self.fresp[0].nrows()
    }

    fn timebase(&self) -> Timebase {
        self.timebase
    }

    fn signature(&self) -> &IoSignature {
        &self.signature
    }

    /// Only points on the imaginary axis are accepted; `s = j omega`.
    fn eval(&self, s: Complex64) -> LtiResult<CMatrix> {
        if s.re.abs() > 0.0 {
            return Err(LtiError::invalid(
                "frequency response data can only be evaluated on the imaginary axis",
            ));
        }
        self.eval_one(s.im)
    }

    fn eval_frequency(&self, omega: f64) -> LtiResult<CMatrix> {
        self.eval_one(omega)
    }

    fn poles(&self) -> LtiResult<Vec<Complex64>> {
        Err(LtiError::not_implemented("poles of frequency response data"))
    }

    fn zeros(&self) -> LtiResult<Vec<Complex64>> {
        Err(LtiError::not_implemented("zeros of frequency response data"))
    }
}

/// `%g`-style rendering with `sig` significant digits.
fn general(v: f64, sig: usize) -> String {
    if v == 0.0 || !v.is_finite() {
        return format!("{v}");
    }
    let exp = v.abs().log10().floor() as i32;
    if exp < -4 || exp >= sig as i32 {
        let s = format!("{:.*e}", sig.saturating_sub(1), v);
        match s.split_once('e') {
            Some((mantissa, e)) => format!("{}e{e}", strip_zeros(mantissa)),
            None => s,
        }
    } else {
        let decimals = (sig as i32 - 1 - exp).max(0) as usize;
        strip_zeros(&format!("{v:.decimals$}"))
    }
}

fn strip_zeros(s: &str) -> String {
    if s.contains('.') {
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    } else {
        s.to_string()
    }
}

impl fmt::Display for FrequencyResponseData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{}: FrequencyResponseData, {} input(s), {} output(s), {}",
            self.signature.name,
            self.ninputs(),
            self.noutputs(),
            self.timebase
        )?;
        writeln!(
            f,
            "Inputs ({}): {}",
            self.ninputs(),
            self.signature.inputs.join(", ")
        )?;
        writeln!(
            f,
            "Outputs ({}): {}",
            self.noutputs(),
            self.signature.outputs.join(", ")
        )?;
        let mimo = !self.is_siso();
        for j in 0..self.ninputs() {
            for i in 0..self.noutputs() {
                writeln!(f)?;
                if mimo {
                    writeln!(f, "Input {} to output {}:", j + 1, i + 1)?;
                }
                writeln!(f, "Freq [rad/s]  Response")?;
                writeln!(f, "------------  ---------------------")?;
                for (w, m) in self.omega.iter().zip(&self.fresp) {
                    let v = m[(i, j)];
                    let im = if v.im >= 0.0 {
                        format!("+{}", general(v.im, 4))
                    } else {
                        general(v.im, 4)
                    };
                    writeln!(f, "{w:12.3}  {:>10}{im:>10}j", general(v.re, 4))?;
                }
            }
        }
        Ok(())
    }
}
