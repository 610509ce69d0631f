use std::ops::ControlFlow;

use olympic_goal::flight::integrator::{DormandPrince, IntegratorError};
use olympic_goal::flight::root::brent;

#[test]
fn exponential_decay_matches_closed_form() {
    let solver = DormandPrince::new(1e-9, 1e-12, f64::INFINITY);
    let summary = solver
        .integrate(|_, y: &[f64; 1]| [-y[0]], 0.0, [1.0], 1.0, |_| ControlFlow::Continue(()))
        .expect("integrate");
    assert_eq!(summary.t, 1.0);
    assert!(!summary.stopped);
    let expected = (-1.0f64).exp();
    assert!(
        (summary.y[0] - expected).abs() < 1e-8,
        "got {}, expected {expected}",
        summary.y[0]
    );
}

#[test]
fn harmonic_oscillator_returns_after_one_period() {
    let solver = DormandPrince::new(1e-10, 1e-12, 0.1);
    let period = 2.0 * std::f64::consts::PI;
    let summary = solver
        .integrate(
            |_, y: &[f64; 2]| [y[1], -y[0]],
            0.0,
            [1.0, 0.0],
            period,
            |_| ControlFlow::Continue(()),
        )
        .expect("integrate");
    assert!((summary.y[0] - 1.0).abs() < 1e-6, "x = {}", summary.y[0]);
    assert!(summary.y[1].abs() < 1e-6, "v = {}", summary.y[1]);
    assert!(summary.accepted_steps > 0);
}

#[test]
fn observer_can_stop_early() {
    let solver = DormandPrince::default();
    let mut seen = 0;
    let summary = solver
        .integrate(
            |_, y: &[f64; 1]| [-y[0]],
            0.0,
            [1.0],
            10.0,
            |step| {
                seen += 1;
                if step.t1 > 0.5 {
                    ControlFlow::Break(())
                } else {
                    ControlFlow::Continue(())
                }
            },
        )
        .expect("integrate");
    assert!(summary.stopped);
    assert!(summary.t > 0.5 && summary.t < 10.0);
    assert_eq!(seen, summary.accepted_steps);
}

#[test]
fn steps_are_contiguous_and_interpolate_their_endpoints() {
    let solver = DormandPrince::new(1e-8, 1e-10, 0.25);
    let mut previous_end = 0.0;
    let mut max_interior_error: f64 = 0.0;
    solver
        .integrate(
            |_, y: &[f64; 1]| [-y[0]],
            0.0,
            [1.0],
            2.0,
            |step| {
                assert_eq!(step.t0, previous_end);
                assert!(step.t1 > step.t0);
                assert_eq!(step.interpolate(step.t0), step.y0);
                assert_eq!(step.interpolate(step.t1), step.y1);
                let mid = 0.5 * (step.t0 + step.t1);
                let err = (step.interpolate(mid)[0] - (-mid).exp()).abs();
                max_interior_error = max_interior_error.max(err);
                previous_end = step.t1;
                ControlFlow::Continue(())
            },
        )
        .expect("integrate");
    assert_eq!(previous_end, 2.0);
    assert!(max_interior_error < 1e-4, "interior error {max_interior_error}");
}

#[test]
fn rejects_empty_span() {
    let solver = DormandPrince::default();
    let err = solver
        .integrate(|_, y: &[f64; 1]| [y[0]], 1.0, [1.0], 1.0, |_| ControlFlow::Continue(()))
        .unwrap_err();
    assert!(matches!(err, IntegratorError::InvalidSpan { .. }));
}

#[test]
fn exhausting_the_step_budget_is_an_error() {
    let solver = DormandPrince {
        max_steps: 3,
        ..DormandPrince::new(1e-6, 1e-9, 0.01)
    };
    let err = solver
        .integrate(|_, y: &[f64; 1]| [-y[0]], 0.0, [1.0], 10.0, |_| ControlFlow::Continue(()))
        .unwrap_err();
    assert!(matches!(err, IntegratorError::StepBudgetExhausted { steps: 3, .. }));
}

#[test]
fn non_finite_initial_state_is_rejected() {
    let solver = DormandPrince::default();
    let err = solver
        .integrate(|_, y: &[f64; 1]| [y[0]], 0.0, [f64::NAN], 1.0, |_| ControlFlow::Continue(()))
        .unwrap_err();
    assert!(matches!(err, IntegratorError::NonFinite { .. }));
}

#[test]
fn brent_finds_square_root_of_two() {
    let root = brent(|x| x * x - 2.0, 0.0, 2.0, 1e-12, 100).expect("bracketed root");
    assert!((root - std::f64::consts::SQRT_2).abs() < 1e-10);
}

#[test]
fn brent_requires_a_sign_change() {
    assert_eq!(brent(|x| x * x + 1.0, -1.0, 1.0, 1e-12, 100), None);
    assert_eq!(brent(|x| x - 1.0, 1.0, 3.0, 1e-12, 100), Some(1.0));
}
