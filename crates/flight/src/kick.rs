//! Kick parameters and the kinematic state they launch.

use olympic_core::units::deg_to_rad;
use olympic_core::vector::Vector3;
use serde::{Deserialize, Serialize};

use crate::FlightError;
use crate::physics::FieldGeometry;

/// One point of the search space: launch speed, elevation and azimuth in
/// degrees, and spin about the vertical axis (negative curls toward goal).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KickParameters {
    pub speed_m_s: f64,
    pub elevation_deg: f64,
    pub azimuth_deg: f64,
    pub spin_rad_s: f64,
}

impl KickParameters {
    pub fn new(speed_m_s: f64, elevation_deg: f64, azimuth_deg: f64, spin_rad_s: f64) -> Self {
        Self {
            speed_m_s,
            elevation_deg,
            azimuth_deg,
            spin_rad_s,
        }
    }

    /// Reject non-finite values and negative speeds. Values are never clamped.
    pub fn validate(&self) -> Result<(), FlightError> {
        if !self.speed_m_s.is_finite() || self.speed_m_s < 0.0 {
            return Err(FlightError::InvalidKick(format!(
                "speed must be finite and non-negative (got {})",
                self.speed_m_s
            )));
        }
        let angles = [
            ("elevation", self.elevation_deg),
            ("azimuth", self.azimuth_deg),
            ("spin", self.spin_rad_s),
        ];
        for (name, value) in angles {
            if !value.is_finite() {
                return Err(FlightError::InvalidKick(format!(
                    "{name} must be finite (got {value})"
                )));
            }
        }
        Ok(())
    }

    /// Spin vector; rotation is about the vertical axis only.
    pub fn spin_vector(&self) -> Vector3 {
        [0.0, 0.0, self.spin_rad_s]
    }

    /// Launch velocity. Elevation splits vertical from horizontal; azimuth
    /// splits the horizontal part between the run along the goal line (`y`)
    /// and the run into the pitch (`x`).
    pub fn launch_velocity(&self) -> Vector3 {
        let elevation = deg_to_rad(self.elevation_deg);
        let azimuth = deg_to_rad(self.azimuth_deg);
        let horizontal = self.speed_m_s * elevation.cos();
        [
            horizontal * azimuth.sin(),
            horizontal * azimuth.cos(),
            self.speed_m_s * elevation.sin(),
        ]
    }

    /// State at the moment of the kick, on the ground at the corner.
    pub fn initial_state(&self, field: &FieldGeometry) -> KinematicState {
        KinematicState {
            position: field.corner(),
            velocity: self.launch_velocity(),
        }
    }
}

/// Position (m, `z` is height) and velocity (m/s) of the ball.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KinematicState {
    pub position: Vector3,
    pub velocity: Vector3,
}

impl KinematicState {
    pub fn height(&self) -> f64 {
        self.position[2]
    }

    /// Flatten into the integrator's `[x, y, z, vx, vy, vz]` layout.
    pub fn to_array(&self) -> [f64; 6] {
        let [x, y, z] = self.position;
        let [vx, vy, vz] = self.velocity;
        [x, y, z, vx, vy, vz]
    }

    pub fn from_array(state: &[f64; 6]) -> Self {
        Self {
            position: [state[0], state[1], state[2]],
            velocity: [state[3], state[4], state[5]],
        }
    }
}
