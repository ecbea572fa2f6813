//! Conversion between transfer-function and state-space representations.

use nalgebra::DMatrix;
use tracing::debug;

use crate::error::{LtiError, LtiResult};
use crate::lti::Lti;
use crate::poly;
use crate::statesp::StateSpace;
use crate::xferfcn::TransferFunction;

/// Relative size below which leading numerator coefficients produced by
/// `ss2tf` are treated as round-off.
const NUMERATOR_TRIM: f64 = 1e-10;

/// Controllable canonical realization of one proper SISO entry:
/// `(A, b, c, d)` with `b = e1`.
fn realize_siso(num: &[f64], den: &[f64]) -> LtiResult<(DMatrix<f64>, Vec<f64>, Vec<f64>, f64)> {
    let den = poly::trim(den);
    let num = poly::trim(num);
    let n = poly::degree(&den);
    if poly::degree(&num) > n && !poly::is_zero(&num) {
        return Err(LtiError::invalid(
            "transfer function is improper and has no state-space realization",
        ));
    }
    let lead = den[0];
    let a_coef: Vec<f64> = den.iter().map(|v| v / lead).collect();
    let b_coef: Vec<f64> = poly::pad_to(&num, n + 1).iter().map(|v| v / lead).collect();
    let d = b_coef[0];

    let mut a = DMatrix::zeros(n, n);
    for j in 0..n {
        a[(0, j)] = -a_coef[j + 1];
    }
    for i in 1..n {
        a[(i, i - 1)] = 1.0;
    }
    let mut b = vec![0.0; n];
    if n > 0 {
        b[0] = 1.0;
    }
    let c = (0..n).map(|k| b_coef[k + 1] - d * a_coef[k + 1]).collect();
    Ok((a, b, c, d))
}

/// State-space realization of a transfer function.
///
/// Every entry is realized in controllable canonical form and the entries
/// are assembled block-diagonally, so MIMO realizations are not minimal.
pub fn tf2ss(tf: &TransferFunction) -> LtiResult<StateSpace> {
    let (p, m) = (tf.noutputs(), tf.ninputs());
    let mut blocks = Vec::with_capacity(p * m);
    for i in 0..p {
        for j in 0..m {
            blocks.push((i, j, realize_siso(tf.num(i, j), tf.den(i, j))?));
        }
    }
    let n: usize = blocks.iter().map(|(_, _, (a, ..))| a.nrows()).sum();

    let mut a = DMatrix::zeros(n, n);
    let mut b = DMatrix::zeros(n, m);
    let mut c = DMatrix::zeros(p, n);
    let mut d = DMatrix::zeros(p, m);
    let mut offset = 0;
    for (i, j, (ak, bk, ck, dk)) in blocks {
        let nk = ak.nrows();
        a.view_mut((offset, offset), (nk, nk)).copy_from(&ak);
        for k in 0..nk {
            b[(offset + k, j)] = bk[k];
            c[(i, offset + k)] = ck[k];
        }
        d[(i, j)] = dk;
        offset += nk;
    }
    debug!(states = n, inputs = m, outputs = p, "realized transfer function");

    let ss = StateSpace::new(a, b, c, d)?.with_timebase(tf.timebase());
    let mut signature = ss.signature().clone();
    signature.name = tf.name().to_string();
    signature.inputs = tf.signature().inputs.clone();
    signature.outputs = tf.signature().outputs.clone();
    ss.with_signature(signature)
}

fn charpoly(a: &DMatrix<f64>) -> LtiResult<Vec<f64>> {
    let roots = if a.nrows() == 0 {
        Vec::new()
    } else {
        a.complex_eigenvalues().iter().copied().collect()
    };
    Ok(poly::from_roots(&roots))
}

/// Transfer function of a state-space system.
///
/// Entry `(i, j)` uses `det(sI - A + b c) = det(sI - A) (1 + c (sI - A)^-1 b)`
/// with `b` column `j` of `B` and `c` row `i` of `C`.
pub fn ss2tf(ss: &StateSpace) -> LtiResult<TransferFunction> {
    let den = charpoly(ss.a())?;
    let mut num = Vec::with_capacity(ss.noutputs());
    let mut dens = Vec::with_capacity(ss.noutputs());
    for i in 0..ss.noutputs() {
        let mut num_row = Vec::with_capacity(ss.ninputs());
        for j in 0..ss.ninputs() {
            let bc = ss.b().column(j) * ss.c().row(i);
            let closed = charpoly(&(ss.a() - bc))?;
            let d = ss.d()[(i, j)];
            let entry = poly::add(&poly::sub(&closed, &den), &poly::scale(&den, d));
            num_row.push(poly::trim_relative(&entry, NUMERATOR_TRIM));
        }
        num.push(num_row);
        dens.push(vec![den.clone(); ss.ninputs()]);
    }
    let tf = TransferFunction::new(num, dens)?.with_timebase(ss.timebase());
    let mut signature = tf.signature().clone();
    signature.name = ss.name().to_string();
    signature.inputs = ss.signature().inputs.clone();
    signature.outputs = ss.signature().outputs.clone();
    tf.with_signature(signature)
}
