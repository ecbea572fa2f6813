//! Real polynomials stored highest degree first.
//!
//! `[1.0, 3.0, 2.0]` is `s^2 + 3 s + 2`. The zero polynomial is `[0.0]`.

use nalgebra::DMatrix;
use num_complex::Complex64;

use crate::error::{LtiError, LtiResult};

/// Drop leading zero coefficients. Never returns an empty vector.
pub fn trim(p: &[f64]) -> Vec<f64> {
    match p.iter().position(|&c| c != 0.0) {
        Some(first) => p[first..].to_vec(),
        None => vec![0.0],
    }
}

/// Drop leading coefficients that are negligible next to the largest one.
pub fn trim_relative(p: &[f64], rel_tol: f64) -> Vec<f64> {
    let scale = p.iter().fold(0.0_f64, |acc, c| acc.max(c.abs()));
    let cutoff = rel_tol * scale;
    match p.iter().position(|c| c.abs() > cutoff) {
        Some(first) => p[first..].to_vec(),
        None => vec![0.0],
    }
}

pub fn is_zero(p: &[f64]) -> bool {
    p.iter().all(|&c| c == 0.0)
}

pub fn degree(p: &[f64]) -> usize {
    trim(p).len() - 1
}

/// Leading (highest degree) nonzero coefficient, 0 for the zero polynomial.
pub fn leading(p: &[f64]) -> f64 {
    trim(p)[0]
}

/// Horner evaluation at a complex point.
pub fn eval(p: &[f64], s: Complex64) -> Complex64 {
    p.iter()
        .fold(Complex64::new(0.0, 0.0), |acc, &c| acc * s + c)
}

pub fn add(a: &[f64], b: &[f64]) -> Vec<f64> {
    let n = a.len().max(b.len());
    let mut out = vec![0.0; n];
    for (i, &c) in a.iter().enumerate() {
        out[n - a.len() + i] += c;
    }
    for (i, &c) in b.iter().enumerate() {
        out[n - b.len() + i] += c;
    }
    trim(&out)
}

pub fn sub(a: &[f64], b: &[f64]) -> Vec<f64> {
    add(a, &scale(b, -1.0))
}

/// Polynomial product (coefficient convolution).
pub fn mul(a: &[f64], b: &[f64]) -> Vec<f64> {
    if a.is_empty() || b.is_empty() {
        return vec![0.0];
    }
    let mut out = vec![0.0; a.len() + b.len() - 1];
    for (i, &x) in a.iter().enumerate() {
        for (j, &y) in b.iter().enumerate() {
            out[i + j] += x * y;
        }
    }
    trim(&out)
}

pub fn scale(p: &[f64], k: f64) -> Vec<f64> {
    trim(&p.iter().map(|c| c * k).collect::<Vec<_>>())
}

/// Pad with leading zeros up to `len` coefficients.
pub fn pad_to(p: &[f64], len: usize) -> Vec<f64> {
    if p.len() >= len {
        return p.to_vec();
    }
    let mut out = vec![0.0; len - p.len()];
    out.extend_from_slice(p);
    out
}

/// Roots via the eigenvalues of the companion matrix, sorted by real then
/// imaginary part. Constant and zero polynomials have no roots.
pub fn roots(p: &[f64]) -> LtiResult<Vec<Complex64>> {
    let p = trim(p);
    if p.len() <= 1 {
        return Ok(Vec::new());
    }
    if p.iter().any(|c| !c.is_finite()) {
        return Err(LtiError::invalid("polynomial has non-finite coefficients"));
    }

    // Trailing zeros are roots at the origin
    let nonzero_len = p
        .iter()
        .rposition(|&c| c != 0.0)
        .map(|i| i + 1)
        .unwrap_or(0);
    let mut out = vec![Complex64::new(0.0, 0.0); p.len() - nonzero_len];
    let q = &p[..nonzero_len];
    let n = q.len() - 1;

    if n == 1 {
        out.push(Complex64::new(-q[1] / q[0], 0.0));
    } else if n > 1 {
        let mut companion = DMatrix::<f64>::zeros(n, n);
        for j in 0..n {
            companion[(0, j)] = -q[j + 1] / q[0];
        }
        for i in 1..n {
            companion[(i, i - 1)] = 1.0;
        }
        out.extend(companion.complex_eigenvalues().iter().copied());
    }

    sort_complex(&mut out);
    Ok(out)
}

/// Monic polynomial with the given roots. Complex roots are expected in
/// conjugate pairs; the imaginary residue of the expansion is dropped.
pub fn from_roots(roots: &[Complex64]) -> Vec<f64> {
    let mut acc = vec![Complex64::new(1.0, 0.0)];
    for &r in roots {
        let mut next = vec![Complex64::new(0.0, 0.0); acc.len() + 1];
        for (i, &c) in acc.iter().enumerate() {
            next[i] += c;
            next[i + 1] -= c * r;
        }
        acc = next;
    }
    acc.iter().map(|c| c.re).collect()
}

/// Sort complex values by real part, then imaginary part.
pub fn sort_complex(values: &mut [Complex64]) {
    values.sort_by(|a, b| a.re.total_cmp(&b.re).then(a.im.total_cmp(&b.im)));
}

/// Render with `var` as the indeterminate, e.g. `s^2 + 3 s + 2`.
pub fn to_string(p: &[f64], var: &str) -> String {
    let p = trim(p);
    let n = p.len() - 1;
    let mut out = String::new();
    for (i, &c) in p.iter().enumerate() {
        if c == 0.0 && n != 0 {
            continue;
        }
        let power = n - i;
        let mag = c.abs();
        let coeff = if power > 0 && mag == 1.0 {
            String::new()
        } else {
            format!("{mag}")
        };
        let term = match power {
            0 => coeff,
            1 if coeff.is_empty() => var.to_string(),
            1 => format!("{coeff} {var}"),
            _ if coeff.is_empty() => format!("{var}^{power}"),
            _ => format!("{coeff} {var}^{power}"),
        };
        if out.is_empty() {
            if c < 0.0 {
                out.push('-');
            }
            out.push_str(&term);
        } else {
            out.push_str(if c < 0.0 { " - " } else { " + " });
            out.push_str(&term);
        }
    }
    out
}
