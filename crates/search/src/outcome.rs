//! Ranking of simulated kicks.

use std::cmp::Ordering;

use olympic_flight::{GoalLineCrossing, KickParameters, TrajectoryResult};
use serde::{Deserialize, Serialize};

/// How good one kick was.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Outcome {
    Goal { near_post: bool, flight_time_s: f64 },
    Miss { min_distance_m: f64 },
}

impl Outcome {
    pub fn from_result(result: &TrajectoryResult) -> Self {
        if result.is_goal {
            Outcome::Goal {
                near_post: result.is_near_post,
                flight_time_s: result.flight_time,
            }
        } else {
            Outcome::Miss {
                min_distance_m: result.min_distance_to_target,
            }
        }
    }

    pub fn is_goal(&self) -> bool {
        matches!(self, Outcome::Goal { .. })
    }

    pub fn is_near_post(&self) -> bool {
        matches!(self, Outcome::Goal { near_post: true, .. })
    }

    pub fn flight_time(&self) -> Option<f64> {
        match self {
            Outcome::Goal { flight_time_s, .. } => Some(*flight_time_s),
            Outcome::Miss { .. } => None,
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Outcome::Goal {
                near_post: true, ..
            } => 0,
            Outcome::Goal {
                near_post: false, ..
            } => 1,
            Outcome::Miss { .. } => 2,
        }
    }
}

/// Total order, best first: near-post goals, then far-post goals, then misses.
///
/// Goals within a class order by flight time and misses by closest approach.
pub fn compare_outcomes(a: &Outcome, b: &Outcome) -> Ordering {
    a.rank().cmp(&b.rank()).then_with(|| match (a, b) {
        (
            Outcome::Goal {
                flight_time_s: ta, ..
            },
            Outcome::Goal {
                flight_time_s: tb, ..
            },
        ) => ta.total_cmp(tb),
        (
            Outcome::Miss { min_distance_m: da },
            Outcome::Miss { min_distance_m: db },
        ) => da.total_cmp(db),
        _ => Ordering::Equal,
    })
}

/// One evaluated kick kept for selection.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Candidate {
    pub kick: KickParameters,
    pub outcome: Outcome,
    pub crossing: Option<GoalLineCrossing>,
}

impl Candidate {
    pub fn from_result(result: &TrajectoryResult) -> Self {
        Self {
            kick: result.kick,
            outcome: Outcome::from_result(result),
            crossing: result.crossing,
        }
    }

    /// Flight time for goals, infinity for misses.
    pub fn flight_time(&self) -> f64 {
        self.outcome.flight_time().unwrap_or(f64::INFINITY)
    }

    pub fn is_near_post(&self) -> bool {
        self.outcome.is_near_post()
    }
}

/// A goal found during a sweep, flattened for export.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GoalRecord {
    pub speed_m_s: f64,
    pub elevation_deg: f64,
    pub azimuth_deg: f64,
    pub spin_rad_s: f64,
    pub flight_time_s: f64,
    pub y_pos: f64,
    pub z_pos: f64,
    pub is_near_post: bool,
}

impl GoalRecord {
    /// `None` for candidates that are not goals.
    pub fn from_candidate(candidate: &Candidate) -> Option<Self> {
        let flight_time_s = candidate.outcome.flight_time()?;
        let crossing = candidate.crossing?;
        Some(Self {
            speed_m_s: candidate.kick.speed_m_s,
            elevation_deg: candidate.kick.elevation_deg,
            azimuth_deg: candidate.kick.azimuth_deg,
            spin_rad_s: candidate.kick.spin_rad_s,
            flight_time_s,
            y_pos: crossing.y_m,
            z_pos: crossing.z_m,
            is_near_post: candidate.is_near_post(),
        })
    }
}
