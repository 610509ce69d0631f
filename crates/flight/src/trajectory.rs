//! Flight simulation: event handling, fixed-cadence sampling, and outcome
//! classification for a single kick.

use std::ops::ControlFlow;

use olympic_core::time::frame_interval;
use olympic_core::vector::{self, Vector3};
use serde::Serialize;

use crate::FlightError;
use crate::forces;
use crate::integrator::{DormandPrince, Step};
use crate::kick::{KickParameters, KinematicState};
use crate::physics::{FieldGeometry, PhysicalConstants, SimulationSettings};
use crate::root;

const ROOT_TOLERANCE_S: f64 = 1e-10;
const ROOT_MAX_ITERATIONS: usize = 100;

/// Why the flight ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Termination {
    /// Height crossed zero while descending.
    Ground,
    /// The ball came back over the goal line.
    GoalLine,
    /// The ball left the pitch plus its margin.
    OutOfBounds,
    /// Maximum simulated time reached without any event.
    TimeLimit,
    /// The integrator gave up (step underflow, non-finite state, step budget).
    Diverged,
}

impl Termination {
    pub fn as_str(&self) -> &'static str {
        match self {
            Termination::Ground => "ground",
            Termination::GoalLine => "goal_line",
            Termination::OutOfBounds => "out_of_bounds",
            Termination::TimeLimit => "time_limit",
            Termination::Diverged => "diverged",
        }
    }
}

/// Where the ball crossed the goal line relative to the frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum CrossingKind {
    /// Clean pass between the posts and under the crossbar.
    Inside,
    /// Contact with a post or the crossbar.
    Frame,
    /// Wide of the posts or over the bar.
    Wide,
}

/// Goal-line crossing point at the located crossing time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GoalLineCrossing {
    pub time_s: f64,
    pub y_m: f64,
    pub z_m: f64,
    pub kind: CrossingKind,
    pub near_post: bool,
}

/// A time-stamped state on the reporting grid.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrajectorySample {
    pub time_s: f64,
    pub state: KinematicState,
}

/// Full output of one simulation call.
///
/// `samples` are evenly spaced at the reporting cadence, followed by the
/// terminal state at `flight_time`; times are strictly increasing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrajectoryResult {
    pub kick: KickParameters,
    pub samples: Vec<TrajectorySample>,
    pub termination: Termination,
    pub crossing: Option<GoalLineCrossing>,
    pub is_goal: bool,
    pub is_near_post: bool,
    pub flight_time: f64,
    pub min_distance_to_target: f64,
}

impl TrajectoryResult {
    pub fn final_state(&self) -> Option<&KinematicState> {
        self.samples.last().map(|sample| &sample.state)
    }

    /// Highest point reached, in metres.
    pub fn max_height(&self) -> f64 {
        self.samples
            .iter()
            .map(|sample| sample.state.height())
            .fold(0.0, f64::max)
    }

    /// Horizontal distance from the kick spot to the terminal position.
    pub fn horizontal_range(&self) -> f64 {
        match (self.samples.first(), self.samples.last()) {
            (Some(first), Some(last)) => {
                let dx = last.state.position[0] - first.state.position[0];
                let dy = last.state.position[1] - first.state.position[1];
                dx.hypot(dy)
            }
            _ => 0.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Event {
    Ground,
    GoalLine,
    OutOfBounds,
}

const EVENTS: [Event; 3] = [Event::Ground, Event::GoalLine, Event::OutOfBounds];

impl Event {
    fn value(&self, state: &[f64; 6], field: &FieldGeometry) -> f64 {
        match self {
            Event::Ground => state[2],
            Event::GoalLine => state[0],
            Event::OutOfBounds => field.boundary_clearance(&[state[0], state[1], state[2]]),
        }
    }

    /// Directional crossing test between two consecutive step ends.
    fn crossed(&self, before: f64, after: f64) -> bool {
        match self {
            // A ball resting on the ground at the start still counts once it dips.
            Event::Ground => before >= 0.0 && after < 0.0,
            Event::GoalLine | Event::OutOfBounds => before > 0.0 && after <= 0.0,
        }
    }

    fn termination(&self) -> Termination {
        match self {
            Event::Ground => Termination::Ground,
            Event::GoalLine => Termination::GoalLine,
            Event::OutOfBounds => Termination::OutOfBounds,
        }
    }

    /// Earliest crossing of this event inside `step`, if any.
    fn locate(&self, step: &Step<6>, field: &FieldGeometry) -> Option<f64> {
        let before = self.value(&step.y0, field);
        let after = self.value(&step.y1, field);
        if !self.crossed(before, after) {
            return None;
        }
        root::brent(
            |t| self.value(&step.interpolate(t), field),
            step.t0,
            step.t1,
            ROOT_TOLERANCE_S,
            ROOT_MAX_ITERATIONS,
        )
    }
}

/// Classify a goal-line crossing at lateral offset `y` and height `z`.
///
/// The ball must clear the frame by its own radius to count as inside; any
/// overlap with a post or the crossbar is frame contact.
pub fn classify_crossing(field: &FieldGeometry, ball_radius: f64, y: f64, z: f64) -> CrossingKind {
    let half_width = 0.5 * field.goal_width_m;
    let lateral = y.abs();
    if lateral <= half_width - ball_radius && z <= field.goal_height_m - ball_radius {
        CrossingKind::Inside
    } else if lateral <= half_width + ball_radius && z <= field.goal_height_m + ball_radius {
        CrossingKind::Frame
    } else {
        CrossingKind::Wide
    }
}

/// Near-post test on the signed lateral coordinate of a crossing.
pub fn is_near_post(field: &FieldGeometry, y: f64) -> bool {
    y <= field.near_post_y() + field.near_post_distance_m
}

/// Simulate one kick until an event or the time limit.
///
/// Inputs are validated up front; everything after that, including integrator
/// failure, is reported through the result rather than as an error.
pub fn simulate(
    kick: &KickParameters,
    constants: &PhysicalConstants,
    field: &FieldGeometry,
    settings: &SimulationSettings,
) -> Result<TrajectoryResult, FlightError> {
    kick.validate()?;
    constants.validate()?;
    field.validate()?;
    settings.validate()?;

    let initial = kick.initial_state(field);
    let mut samples = vec![TrajectorySample {
        time_s: 0.0,
        state: initial,
    }];

    if initial.position[2] <= 0.0 && initial.velocity[2] <= 0.0 {
        return Ok(finish(
            kick,
            samples,
            Termination::Ground,
            (0.0, initial),
            constants,
            field,
        ));
    }

    let spin = kick.spin_vector();
    let dt = frame_interval(settings.frame_rate_hz);
    let solver = DormandPrince::new(settings.rtol, settings.atol, settings.max_step_s);

    let mut next_frame: u64 = 1;
    let mut hit: Option<(f64, Event, [f64; 6])> = None;
    let mut last_state = (0.0, initial.to_array());

    let run = solver.integrate(
        |_, y| forces::state_derivative(y, &spin, constants),
        0.0,
        initial.to_array(),
        settings.max_time_s,
        |step| {
            let earliest = EVENTS
                .iter()
                .filter_map(|event| event.locate(step, field).map(|t| (t, *event)))
                .min_by(|a, b| a.0.total_cmp(&b.0));
            let horizon = earliest.map_or(step.t1, |(t, _)| t);

            loop {
                let t = next_frame as f64 * dt;
                if t >= horizon {
                    break;
                }
                samples.push(TrajectorySample {
                    time_s: t,
                    state: KinematicState::from_array(&step.interpolate(t)),
                });
                next_frame += 1;
            }

            last_state = (step.t1, step.y1);
            match earliest {
                Some((t, event)) => {
                    hit = Some((t, event, step.interpolate(t)));
                    ControlFlow::Break(())
                }
                None => ControlFlow::Continue(()),
            }
        },
    );

    let (termination, terminal) = match (run, hit) {
        (Ok(_), Some((t, event, state))) => (event.termination(), (t, state)),
        (Ok(summary), None) => (Termination::TimeLimit, (summary.t, summary.y)),
        (Err(err), _) => {
            tracing::debug!(?kick, error = %err, "integration diverged");
            (Termination::Diverged, last_state)
        }
    };

    Ok(finish(
        kick,
        samples,
        termination,
        (terminal.0, KinematicState::from_array(&terminal.1)),
        constants,
        field,
    ))
}

fn finish(
    kick: &KickParameters,
    mut samples: Vec<TrajectorySample>,
    termination: Termination,
    terminal: (f64, KinematicState),
    constants: &PhysicalConstants,
    field: &FieldGeometry,
) -> TrajectoryResult {
    let (flight_time, state) = terminal;
    let terminal_sample = TrajectorySample {
        time_s: flight_time,
        state,
    };
    match samples.last_mut() {
        Some(last) if last.time_s >= flight_time => *last = terminal_sample,
        _ => samples.push(terminal_sample),
    }

    let crossing = (termination == Termination::GoalLine).then(|| {
        let [_, y, z] = state.position;
        let kind = classify_crossing(field, constants.radius_m, y, z);
        GoalLineCrossing {
            time_s: flight_time,
            y_m: y,
            z_m: z,
            kind,
            near_post: kind == CrossingKind::Inside && is_near_post(field, y),
        }
    });
    let is_goal = crossing.is_some_and(|c| c.kind == CrossingKind::Inside);
    let is_near_post = crossing.is_some_and(|c| c.near_post);

    let target: Vector3 = field.goal_center();
    let min_distance_to_target = samples
        .iter()
        .map(|sample| vector::distance(&sample.state.position, &target))
        .fold(f64::INFINITY, f64::min);

    TrajectoryResult {
        kick: *kick,
        samples,
        termination,
        crossing,
        is_goal,
        is_near_post,
        flight_time,
        min_distance_to_target,
    }
}
