use olympic_goal::flight::PhysicalConstants;
use olympic_goal::flight::forces::{
    acceleration, drag_force, gravity_force, magnus_force, state_derivative,
};
use olympic_goal::vector;

fn assert_close(actual: f64, expected: f64, tol: f64) {
    assert!(
        (actual - expected).abs() <= tol,
        "expected {expected}, got {actual} (tol {tol})"
    );
}

#[test]
fn drag_opposes_velocity_with_quadratic_magnitude() {
    let constants = PhysicalConstants::default();
    let velocity = [10.0, 0.0, 0.0];
    let drag = drag_force(&velocity, &constants);
    let expected = 0.5 * 1.2 * std::f64::consts::PI * 0.11 * 0.11 * 0.33 * 100.0;
    assert_close(drag[0], -expected, 1e-12);
    assert_close(drag[1], 0.0, 1e-12);
    assert_close(drag[2], 0.0, 1e-12);

    let doubled = drag_force(&[20.0, 0.0, 0.0], &constants);
    assert_close(doubled[0], 4.0 * drag[0], 1e-12);
}

#[test]
fn forces_vanish_at_rest_leaving_gravity() {
    let constants = PhysicalConstants::default();
    assert_eq!(drag_force(&vector::ZERO, &constants), vector::ZERO);
    assert_eq!(
        magnus_force(&vector::ZERO, &[0.0, 0.0, -100.0], &constants),
        vector::ZERO
    );
    let a = acceleration(&vector::ZERO, &[0.0, 0.0, -100.0], &constants);
    assert_close(a[0], 0.0, 1e-12);
    assert_close(a[1], 0.0, 1e-12);
    assert_close(a[2], -9.81, 1e-12);
    assert_close(gravity_force(&constants)[2], -0.45 * 9.81, 1e-12);
}

#[test]
fn magnus_is_zero_without_spin() {
    let constants = PhysicalConstants::default();
    assert_eq!(
        magnus_force(&[5.0, 20.0, 3.0], &vector::ZERO, &constants),
        vector::ZERO
    );
}

#[test]
fn magnus_is_perpendicular_to_velocity() {
    let constants = PhysicalConstants::default();
    let velocity = [5.0, 20.0, 3.0];
    let lift = magnus_force(&velocity, &[0.0, 0.0, -100.0], &constants);
    assert!(vector::norm(&lift) > 0.0);
    assert_close(vector::dot(&lift, &velocity), 0.0, 1e-9);
}

#[test]
fn negative_spin_curls_ball_back_towards_goal_line() {
    let constants = PhysicalConstants::default();
    // Travelling along the goal line towards the goal.
    let lift = magnus_force(&[0.0, 20.0, 0.0], &[0.0, 0.0, -100.0], &constants);
    assert!(lift[0] < 0.0, "lift should point back over the goal line: {lift:?}");
    let expected = 0.5 * 1.2 * std::f64::consts::PI * 0.11 * 0.11 * 0.30 * 400.0;
    assert_close(vector::norm(&lift), expected, 1e-12);

    let mirrored = magnus_force(&[0.0, 20.0, 0.0], &[0.0, 0.0, 100.0], &constants);
    assert_close(mirrored[0], -lift[0], 1e-12);
}

#[test]
fn state_derivative_carries_velocity_into_position_rate() {
    let constants = PhysicalConstants::default();
    let state = [1.0, -30.0, 2.0, 4.0, 18.0, 6.0];
    let derivative = state_derivative(&state, &[0.0, 0.0, -90.0], &constants);
    assert_eq!(&derivative[..3], &state[3..]);
    let a = acceleration(&[4.0, 18.0, 6.0], &[0.0, 0.0, -90.0], &constants);
    assert_eq!(&derivative[3..], &a[..]);
}

#[test]
fn overflowing_speed_yields_non_finite_forces() {
    let constants = PhysicalConstants::default();
    let velocity = [1e200, 1e200, 0.0];
    assert!(drag_force(&velocity, &constants).iter().all(|f| f.is_nan()));
    assert!(
        magnus_force(&velocity, &[0.0, 0.0, -100.0], &constants)
            .iter()
            .all(|f| f.is_nan())
    );
    let state = [0.0, -34.0, 0.0, 1e200, 1e200, 0.0];
    let derivative = state_derivative(&state, &[0.0, 0.0, -100.0], &constants);
    assert!(derivative[3..].iter().all(|a| !a.is_finite()));
}
