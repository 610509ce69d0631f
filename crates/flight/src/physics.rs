//! Immutable inputs shared by every simulation in a batch.

use olympic_core::constants::{AIR_DENSITY, BALL_MASS, BALL_RADIUS, GRAVITY};
use olympic_core::units::disc_area;
use olympic_core::vector::Vector3;
use serde::Serialize;

use crate::FlightError;

/// Ball and atmosphere properties.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PhysicalConstants {
    pub mass_kg: f64,
    pub radius_m: f64,
    pub area_m2: f64,
    pub gravity_m_s2: f64,
    pub air_density_kg_m3: f64,
    pub drag_coefficient: f64,
    pub lift_coefficient: f64,
}

impl PhysicalConstants {
    /// Build constants from a ball radius, deriving the cross-sectional area.
    pub fn new(
        mass_kg: f64,
        radius_m: f64,
        gravity_m_s2: f64,
        air_density_kg_m3: f64,
        drag_coefficient: f64,
        lift_coefficient: f64,
    ) -> Self {
        Self {
            mass_kg,
            radius_m,
            area_m2: disc_area(radius_m),
            gravity_m_s2,
            air_density_kg_m3,
            drag_coefficient,
            lift_coefficient,
        }
    }

    /// Copy of these constants with a different drag coefficient.
    pub fn with_drag_coefficient(self, drag_coefficient: f64) -> Self {
        Self {
            drag_coefficient,
            ..self
        }
    }

    /// `0.5 · ρ · A`, the factor shared by drag and lift magnitudes.
    #[inline]
    pub fn dynamic_pressure_area(&self) -> f64 {
        0.5 * self.air_density_kg_m3 * self.area_m2
    }

    pub fn validate(&self) -> Result<(), FlightError> {
        let positive = [
            ("mass", self.mass_kg),
            ("radius", self.radius_m),
            ("area", self.area_m2),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(FlightError::InvalidConstants(format!(
                    "{name} must be positive and finite (got {value})"
                )));
            }
        }
        let non_negative = [
            ("gravity", self.gravity_m_s2),
            ("air density", self.air_density_kg_m3),
            ("drag coefficient", self.drag_coefficient),
            ("lift coefficient", self.lift_coefficient),
        ];
        for (name, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(FlightError::InvalidConstants(format!(
                    "{name} must be non-negative and finite (got {value})"
                )));
            }
        }
        Ok(())
    }
}

impl Default for PhysicalConstants {
    fn default() -> Self {
        Self::new(BALL_MASS, BALL_RADIUS, GRAVITY, AIR_DENSITY, 0.33, 0.30)
    }
}

/// Pitch and goal dimensions.
///
/// The goal line is the plane `x = 0` with the pitch on the positive side and
/// the net behind it. The goal mouth is centred on `y = 0`; the kick is taken
/// from the corner at `y = -width / 2`, so the near post sits at
/// `y = -goal_width / 2`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct FieldGeometry {
    pub length_m: f64,
    pub width_m: f64,
    pub goal_width_m: f64,
    pub goal_height_m: f64,
    pub goal_depth_m: f64,
    pub boundary_margin_m: f64,
    pub near_post_distance_m: f64,
}

impl FieldGeometry {
    /// Kick-off spot on the ground at the corner flag.
    pub fn corner(&self) -> Vector3 {
        [0.0, -0.5 * self.width_m, 0.0]
    }

    /// Centre of the goal mouth, used as the near-miss target.
    pub fn goal_center(&self) -> Vector3 {
        [0.0, 0.0, 0.5 * self.goal_height_m]
    }

    /// Lateral coordinate of the post on the corner's side.
    pub fn near_post_y(&self) -> f64 {
        -0.5 * self.goal_width_m
    }

    /// Signed clearance to the extended boundary; non-positive once outside.
    pub fn boundary_clearance(&self, position: &Vector3) -> f64 {
        let m = self.boundary_margin_m;
        let beyond_far_end = self.length_m + m - position[0];
        let behind_goal = position[0] + self.goal_depth_m + m;
        let lateral = 0.5 * self.width_m + m - position[1].abs();
        beyond_far_end.min(behind_goal).min(lateral)
    }

    pub fn validate(&self) -> Result<(), FlightError> {
        let positive = [
            ("field length", self.length_m),
            ("field width", self.width_m),
            ("goal width", self.goal_width_m),
            ("goal height", self.goal_height_m),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(FlightError::InvalidField(format!(
                    "{name} must be positive and finite (got {value})"
                )));
            }
        }
        let non_negative = [
            ("goal depth", self.goal_depth_m),
            ("boundary margin", self.boundary_margin_m),
            ("near-post distance", self.near_post_distance_m),
        ];
        for (name, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(FlightError::InvalidField(format!(
                    "{name} must be non-negative and finite (got {value})"
                )));
            }
        }
        if self.goal_width_m >= self.width_m {
            return Err(FlightError::InvalidField(
                "goal must be narrower than the field".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for FieldGeometry {
    fn default() -> Self {
        Self {
            length_m: 20.0,
            width_m: 68.0,
            goal_width_m: 7.32,
            goal_height_m: 2.44,
            goal_depth_m: 2.0,
            boundary_margin_m: 2.0,
            near_post_distance_m: 1.0,
        }
    }
}

/// Integration tolerances, reporting cadence, and the simulated-time bound.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SimulationSettings {
    pub max_time_s: f64,
    pub frame_rate_hz: f64,
    pub rtol: f64,
    pub atol: f64,
    pub max_step_s: f64,
}

impl SimulationSettings {
    pub fn validate(&self) -> Result<(), FlightError> {
        let positive = [
            ("max time", self.max_time_s),
            ("frame rate", self.frame_rate_hz),
            ("rtol", self.rtol),
            ("atol", self.atol),
            ("max step", self.max_step_s),
        ];
        for (name, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(FlightError::InvalidSettings(format!(
                    "{name} must be positive and finite (got {value})"
                )));
            }
        }
        Ok(())
    }
}

impl Default for SimulationSettings {
    fn default() -> Self {
        Self {
            max_time_s: 7.0,
            frame_rate_hz: 50.0,
            rtol: 1e-6,
            atol: 1e-9,
            max_step_s: 0.1,
        }
    }
}
