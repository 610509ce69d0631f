//! Parameter search engine: sweeps launch speed, elevation, azimuth, and spin,
//! simulates every combination, and picks a fast, time-diverse set of goals.

pub mod outcome;
pub mod plan;
pub mod progress;
pub mod select;
pub mod sweep;

pub use outcome::{Candidate, GoalRecord, Outcome, compare_outcomes};
pub use plan::{GridResolution, ParameterBounds, ParameterGrid, ParameterRange, RandomPlan, SweepPlan};
pub use progress::{NoProgress, ProgressSink, ProgressTracker, ProgressUpdate, TracingProgress};
pub use select::{Selection, select_diverse};
pub use sweep::{
    CandidatePool, FlightEvaluator, KickEvaluator, SearchOptions, SearchReport, SelectedKick,
    optimize,
};

use olympic_flight::FlightError;
use thiserror::Error;

/// Errors surfaced by a sweep.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("invalid parameter bounds: {0}")]
    InvalidBounds(String),
    #[error("invalid search options: {0}")]
    InvalidOptions(String),
    #[error("no goals found in {evaluated} evaluated kicks (stopped early: {stopped_early})")]
    NoGoals { evaluated: usize, stopped_early: bool },
    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
    #[error("simulation failed: {0}")]
    Flight(#[from] FlightError),
}
