use crate::CtlError;

pub type Real = f64;

/// Absolute and relative bounds for comparing coefficients.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tolerances {
    pub abs: Real,
    pub rel: Real,
}

impl Tolerances {
    pub const COEFFICIENTS: Tolerances = Tolerances {
        abs: 1e-12,
        rel: 1e-9,
    };
}

impl Default for Tolerances {
    fn default() -> Self {
        Self::COEFFICIENTS
    }
}

/// `a` and `b` agree within `tol.abs`, or within `tol.rel` of the larger
/// magnitude.
pub fn nearly_equal(a: Real, b: Real, tol: Tolerances) -> bool {
    let diff = (a - b).abs();
    diff <= tol.abs || diff <= tol.rel * a.abs().max(b.abs())
}

pub fn ensure_finite(v: Real, what: &'static str) -> Result<Real, CtlError> {
    if v.is_finite() {
        Ok(v)
    } else {
        Err(CtlError::NonFinite { what, value: v })
    }
}

/// Check every value of a slice, reporting the first offender.
pub fn ensure_all_finite(values: &[Real], what: &'static str) -> Result<(), CtlError> {
    for &v in values {
        ensure_finite(v, what)?;
    }
    Ok(())
}

/// `n` points spaced evenly on a log scale between `10^start` and `10^stop`.
pub fn logspace(start: Real, stop: Real, n: usize) -> Vec<Real> {
    match n {
        0 => Vec::new(),
        1 => vec![10f64.powf(stop)],
        _ => {
            let step = (stop - start) / (n - 1) as Real;
            (0..n)
                .map(|i| 10f64.powf(start + step * i as Real))
                .collect()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coefficient_comparison() {
        let tol = Tolerances::default();
        assert!(nearly_equal(2.0, 2.0 + 1e-10, tol));
        assert!(nearly_equal(0.0, -5e-13, tol));
        assert!(nearly_equal(1e6, 1e6 + 1e-4, tol));
        assert!(!nearly_equal(1.0, 1.001, tol));
    }

    #[test]
    fn non_finite_values_are_named() {
        let err = ensure_finite(Real::NAN, "sample period").unwrap_err();
        assert!(err.to_string().contains("sample period"));
    }

    #[test]
    fn ensure_all_finite_reports_infinity() {
        assert!(ensure_all_finite(&[1.0, 2.0], "coeffs").is_ok());
        assert!(ensure_all_finite(&[1.0, Real::INFINITY], "coeffs").is_err());
    }

    #[test]
    fn logspace_endpoints() {
        let w = logspace(-1.0, 2.0, 4);
        assert_eq!(w.len(), 4);
        assert!((w[0] - 0.1).abs() < 1e-12);
        assert!((w[1] - 1.0).abs() < 1e-12);
        assert!((w[3] - 100.0).abs() < 1e-9);
        assert!(logspace(0.0, 1.0, 0).is_empty());
    }
}
