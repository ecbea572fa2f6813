//! Integration tests for frequency response data arithmetic.

use ctl_core::logspace;
use ctl_lti::{
    FrequencyResponseData, Lti, LtiError, StateSpace, System, TransferFunction, frequency_response,
};
use nalgebra::DMatrix;
use num_complex::Complex64;

fn plant() -> TransferFunction {
    TransferFunction::siso(&[1.0, 2.0], &[1.0, 3.0, 5.0]).unwrap()
}

fn controller() -> TransferFunction {
    TransferFunction::siso(&[4.0, 1.0], &[1.0, 0.5]).unwrap()
}

fn assert_matches_system(frd: &FrequencyResponseData, sys: &dyn Lti) {
    for (w, m) in frd.frequency().iter().zip(frd.response()) {
        let expected = sys.eval_frequency(*w).unwrap();
        assert!(
            (m - &expected).norm() < 1e-9,
            "mismatch at {w}: {m} vs {expected}"
        );
    }
}

#[test]
fn sampled_response_equals_system_response() {
    let omega = logspace(-2.0, 2.0, 41);
    let g = plant();
    let frd = frequency_response(&g, &omega).unwrap();
    assert_eq!(frd.len(), 41);
    assert_matches_system(&frd, &g);
}

#[test]
fn arithmetic_matches_transfer_function_algebra() {
    let omega = logspace(-1.0, 1.0, 21);
    let (g, k) = (plant(), controller());
    let gf = FrequencyResponseData::from_system(&g, &omega).unwrap();

    assert_matches_system(&gf.parallel(&k).unwrap(), &g.parallel(&k).unwrap());
    assert_matches_system(&gf.series(&k).unwrap(), &g.series(&k).unwrap());
    assert_matches_system(&gf.rseries(&k).unwrap(), &k.series(&g).unwrap());
    assert_matches_system(&gf.subtract(&k).unwrap(), &g.parallel(&k.negate()).unwrap());
    assert_matches_system(&gf.feedback(&k, -1.0).unwrap(), &g.feedback(&k, -1.0).unwrap());
    assert_matches_system(&gf.feedback(&k, 1.0).unwrap(), &g.feedback(&k, 1.0).unwrap());
}

#[test]
fn mimo_feedback_matches_state_space() {
    // sampling needs a grid that misses the plant poles at +-10j
    let omega = logspace(-1.0, 2.0, 15);
    let p = StateSpace::new(
        DMatrix::from_row_slice(2, 2, &[0.0, 10.0, -10.0, 0.0]),
        DMatrix::identity(2, 2),
        DMatrix::from_row_slice(2, 2, &[1.0, 10.0, -10.0, 1.0]),
        DMatrix::zeros(2, 2),
    )
    .unwrap();
    let k = StateSpace::static_gain(DMatrix::from_row_slice(2, 2, &[1.0, -2.0, 0.0, 1.0])).unwrap();
    let pf = FrequencyResponseData::from_system(&p, &omega).unwrap();

    assert_matches_system(&pf.series(&k).unwrap(), &p.series(&k).unwrap());
    assert_matches_system(&pf.feedback(&k, -1.0).unwrap(), &p.feedback(&k, -1.0).unwrap());
    let constant = DMatrix::from_row_slice(2, 2, &[1.0, 0.0, 0.0, 1.0]);
    assert_matches_system(
        &pf.parallel(&constant).unwrap(),
        &p.parallel(&StateSpace::static_gain(constant.clone()).unwrap()).unwrap(),
    );
}

#[test]
fn mimo_dimension_checks() {
    let omega = [1.0, 2.0];
    let wide = TransferFunction::new(
        vec![vec![vec![1.0], vec![2.0]]],
        vec![vec![vec![1.0, 1.0], vec![1.0, 2.0]]],
    )
    .unwrap();
    let frd = FrequencyResponseData::from_system(&wide, &omega).unwrap();
    assert!(matches!(
        frd.parallel(&plant()),
        Err(LtiError::DimensionMismatch { .. })
    ));
    assert!(matches!(frd.divide(&plant()), Err(LtiError::NotImplemented { .. })));
    assert!(matches!(frd.powi(2), Err(LtiError::DimensionMismatch { .. })));
}

#[test]
fn interpolating_data_approximates_between_points() {
    let omega = logspace(-1.0, 1.0, 101);
    let g = plant();
    let smooth = FrequencyResponseData::from_system(&g, &omega)
        .unwrap()
        .with_smoothing(true)
        .unwrap();
    let exact = FrequencyResponseData::from_system(&g, &omega).unwrap();

    let w = 0.5 * (omega[40] + omega[41]);
    assert!(exact.eval(&[w]).is_err());
    let got = smooth.eval_one(w).unwrap()[(0, 0)];
    let expected = g.eval(Complex64::new(0.0, w)).unwrap()[(0, 0)];
    assert!((got - expected).norm() < 1e-5);
}

#[test]
fn discrete_systems_sample_the_unit_circle() {
    let dt = 0.1;
    let g = TransferFunction::siso(&[0.5], &[1.0, -0.5])
        .unwrap()
        .with_timebase(ctl_core::Timebase::Discrete(Some(dt)));
    let frd = frequency_response(&g, &[1.0, 5.0]).unwrap();
    assert!(frd.timebase().is_discrete(true));
    let z = Complex64::new(0.0, 5.0 * dt).exp();
    let expected = Complex64::new(0.5, 0.0) / (z - 0.5);
    assert!((frd.response()[1][(0, 0)] - expected).norm() < 1e-12);
}

#[test]
fn system_wrapper_routes_frd_arithmetic() {
    let omega = logspace(-1.0, 1.0, 5);
    let g: System = plant().into();
    let data: System = FrequencyResponseData::from_system(&controller(), &omega)
        .unwrap()
        .into();
    let loop_gain = data.series(&g).unwrap();
    let System::Frd(frd) = &loop_gain else {
        panic!("expected frequency response data, got {}", loop_gain.kind());
    };
    assert_matches_system(frd, &controller().series(&plant()).unwrap());
}
