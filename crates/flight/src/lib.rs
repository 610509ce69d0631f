//! Trajectory engine: integrates a kicked, spinning ball under gravity, drag,
//! and Magnus lift until it lands, leaves the pitch, or crosses the goal line.

pub mod forces;
pub mod integrator;
pub mod kick;
pub mod physics;
pub mod root;
pub mod trajectory;

pub use kick::{KickParameters, KinematicState};
pub use physics::{FieldGeometry, PhysicalConstants, SimulationSettings};
pub use trajectory::{
    CrossingKind, GoalLineCrossing, Termination, TrajectoryResult, TrajectorySample,
    classify_crossing, simulate,
};

use thiserror::Error;

/// Errors raised before any integration takes place.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum FlightError {
    #[error("invalid kick: {0}")]
    InvalidKick(String),
    #[error("invalid physical constants: {0}")]
    InvalidConstants(String),
    #[error("invalid field geometry: {0}")]
    InvalidField(String),
    #[error("invalid simulation settings: {0}")]
    InvalidSettings(String),
}
