//! Aerodynamic and gravitational forces on the ball.
//!
//! - Drag opposes the velocity with magnitude `0.5 · ρ · A · C_D · |v|²`.
//! - Magnus lift acts along `v × ω` with magnitude `0.5 · ρ · A · C_L · |v|²`.
//! - Gravity pulls straight down.

use olympic_core::vector::{self, Vector3};

use crate::physics::PhysicalConstants;

/// Drag force (N). Zero for a ball at rest; non-finite once `|v|²` overflows.
pub fn drag_force(velocity: &Vector3, constants: &PhysicalConstants) -> Vector3 {
    let speed_sq = vector::dot(velocity, velocity);
    if !speed_sq.is_finite() {
        return [f64::NAN; 3];
    }
    match vector::normalize(velocity) {
        Some(direction) => {
            let magnitude = constants.dynamic_pressure_area() * constants.drag_coefficient * speed_sq;
            vector::scale(&direction, -magnitude)
        }
        None => vector::ZERO,
    }
}

/// Magnus lift force (N). Zero when the ball does not spin or moves along
/// the spin axis.
pub fn magnus_force(velocity: &Vector3, spin: &Vector3, constants: &PhysicalConstants) -> Vector3 {
    let speed_sq = vector::dot(velocity, velocity);
    if !speed_sq.is_finite() {
        return [f64::NAN; 3];
    }
    match vector::normalize(&vector::cross(velocity, spin)) {
        Some(direction) => {
            let magnitude = constants.dynamic_pressure_area() * constants.lift_coefficient * speed_sq;
            vector::scale(&direction, magnitude)
        }
        None => vector::ZERO,
    }
}

/// Weight of the ball (N).
pub fn gravity_force(constants: &PhysicalConstants) -> Vector3 {
    [0.0, 0.0, -constants.mass_kg * constants.gravity_m_s2]
}

/// Net acceleration for the given velocity and spin.
pub fn acceleration(velocity: &Vector3, spin: &Vector3, constants: &PhysicalConstants) -> Vector3 {
    let net = vector::add(
        &vector::add(
            &drag_force(velocity, constants),
            &magnus_force(velocity, spin, constants),
        ),
        &gravity_force(constants),
    );
    vector::scale(&net, 1.0 / constants.mass_kg)
}

/// Right-hand side of the equations of motion in `[x, y, z, vx, vy, vz]`
/// layout. Position does not enter the force model.
pub fn state_derivative(state: &[f64; 6], spin: &Vector3, constants: &PhysicalConstants) -> [f64; 6] {
    let velocity = [state[3], state[4], state[5]];
    let [ax, ay, az] = acceleration(&velocity, spin, constants);
    [velocity[0], velocity[1], velocity[2], ax, ay, az]
}
