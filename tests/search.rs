use std::sync::atomic::AtomicBool;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use olympic_goal::flight::{
    CrossingKind, FieldGeometry, FlightError, GoalLineCrossing, KickParameters, PhysicalConstants,
    SimulationSettings, Termination, TrajectoryResult,
};
use olympic_goal::search::{
    CandidatePool, FlightEvaluator, GridResolution, KickEvaluator, NoProgress, ParameterBounds,
    ParameterGrid, ParameterRange, ProgressSink, ProgressUpdate, SearchError, SearchOptions,
    SweepPlan, optimize,
};

/// Scores every kick from its parameters alone: speed sets flight time and
/// azimuth decides the outcome.
struct TableEvaluator;

impl KickEvaluator for TableEvaluator {
    fn evaluate(&self, kick: &KickParameters) -> Result<TrajectoryResult, FlightError> {
        let flight_time = kick.speed_m_s / 10.0;
        let (kind, near_post) = if kick.azimuth_deg < 10.0 {
            (CrossingKind::Inside, true)
        } else if kick.azimuth_deg < 20.0 {
            (CrossingKind::Inside, false)
        } else {
            (CrossingKind::Wide, false)
        };
        let y_m = if near_post { -3.0 } else { 0.0 };
        Ok(TrajectoryResult {
            kick: *kick,
            samples: Vec::new(),
            termination: Termination::GoalLine,
            crossing: Some(GoalLineCrossing {
                time_s: flight_time,
                y_m,
                z_m: 1.0,
                kind,
                near_post,
            }),
            is_goal: kind == CrossingKind::Inside,
            is_near_post: near_post,
            flight_time,
            min_distance_to_target: if kind == CrossingKind::Inside { 0.5 } else { 6.0 },
        })
    }
}

fn range(min: f64, max: f64) -> ParameterRange {
    ParameterRange::new(min, max)
}

fn grid(bounds: ParameterBounds, per_axis: usize) -> SweepPlan {
    SweepPlan::Grid(ParameterGrid::new(bounds, GridResolution::uniform(per_axis)))
}

fn table_bounds(azimuth: ParameterRange) -> ParameterBounds {
    ParameterBounds {
        speed_m_s: range(20.0, 30.0),
        elevation_deg: range(15.0, 15.0),
        azimuth_deg: azimuth,
        spin_rad_s: range(-100.0, -100.0),
    }
}

#[derive(Default)]
struct RecordingSink {
    updates: Mutex<Vec<ProgressUpdate>>,
}

impl ProgressSink for RecordingSink {
    fn report(&self, update: &ProgressUpdate) {
        self.updates
            .lock()
            .expect("sink lock")
            .push(*update);
    }
}

#[test]
fn selects_fastest_time_separated_near_post_goals() {
    // Speeds 20, 22, ..., 30 give flight times 2.0 ... 3.0 s.
    let plan = SweepPlan::Grid(ParameterGrid::new(
        table_bounds(range(5.0, 5.0)),
        GridResolution {
            speed: 6,
            elevation: 1,
            azimuth: 1,
            spin: 1,
        },
    ));
    let options = SearchOptions {
        top_k: 3,
        min_time_diff_s: 0.3,
        ..SearchOptions::default()
    };
    let report = optimize(&plan, &TableEvaluator, &options, &NoProgress).expect("search");

    assert_eq!(report.pool, CandidatePool::Primary);
    assert!(report.diversity_satisfied);
    assert_eq!(report.evaluated, 6);
    assert_eq!(report.goals.len(), 6);
    let times: Vec<f64> = report
        .selections
        .iter()
        .map(|s| s.trajectory.flight_time)
        .collect();
    assert_eq!(times.len(), 3);
    assert!((times[0] - 2.0).abs() < 1e-12);
    assert!((times[1] - 2.4).abs() < 1e-9);
    assert!((times[2] - 2.8).abs() < 1e-9);
    assert!(report.selections.iter().all(|s| s.outcome.is_near_post()));
}

#[test]
fn relaxes_diversity_when_too_few_goals_are_separated() {
    let plan = SweepPlan::Grid(ParameterGrid::new(
        table_bounds(range(5.0, 5.0)),
        GridResolution {
            speed: 3,
            elevation: 1,
            azimuth: 1,
            spin: 1,
        },
    ));
    let options = SearchOptions {
        top_k: 3,
        min_time_diff_s: 5.0,
        ..SearchOptions::default()
    };
    let report = optimize(&plan, &TableEvaluator, &options, &NoProgress).expect("search");
    assert!(!report.diversity_satisfied);
    assert_eq!(report.selections.len(), 3);
    let times: Vec<f64> = report
        .selections
        .iter()
        .map(|s| s.trajectory.flight_time)
        .collect();
    assert!(times.windows(2).all(|w| w[0] <= w[1]), "{times:?}");
}

#[test]
fn falls_back_to_far_post_goals() {
    let plan = grid(table_bounds(range(12.0, 25.0)), 2);
    let report = optimize(&plan, &TableEvaluator, &SearchOptions::default(), &NoProgress)
        .expect("search");
    assert_eq!(report.pool, CandidatePool::FarPostFallback);
    assert_eq!(report.near_post_goals(), 0);
    assert!(!report.goals.is_empty());
    assert!(report.selections.iter().all(|s| s.trajectory.is_goal));
}

#[test]
fn reports_no_goals_when_nothing_scores() {
    let plan = grid(table_bounds(range(25.0, 40.0)), 2);
    let err = optimize(&plan, &TableEvaluator, &SearchOptions::default(), &NoProgress)
        .unwrap_err();
    assert!(matches!(
        err,
        SearchError::NoGoals {
            evaluated: 16,
            stopped_early: false
        }
    ));
}

#[test]
fn slow_kicks_never_reach_the_goal() {
    let bounds = ParameterBounds {
        speed_m_s: range(0.0, 0.5),
        elevation_deg: range(10.0, 20.0),
        azimuth_deg: range(5.0, 45.0),
        spin_rad_s: range(-120.0, -70.0),
    };
    let evaluator = FlightEvaluator::new(
        PhysicalConstants::default(),
        FieldGeometry::default(),
        SimulationSettings::default(),
    );
    let err = optimize(&grid(bounds, 2), &evaluator, &SearchOptions::default(), &NoProgress)
        .unwrap_err();
    assert!(matches!(
        err,
        SearchError::NoGoals {
            evaluated: 16,
            stopped_early: false
        }
    ));
}

#[test]
fn real_flights_pick_near_post_goals() {
    let bounds = ParameterBounds {
        speed_m_s: range(32.0, 32.0),
        elevation_deg: range(16.0, 16.0),
        azimuth_deg: range(14.0, 14.1),
        spin_rad_s: range(-100.0, -80.0),
    };
    let plan = SweepPlan::Grid(ParameterGrid::new(
        bounds,
        GridResolution {
            speed: 1,
            elevation: 1,
            azimuth: 2,
            spin: 2,
        },
    ));
    let evaluator = FlightEvaluator::new(
        PhysicalConstants::default(),
        FieldGeometry::default(),
        SimulationSettings::default(),
    );
    let options = SearchOptions {
        top_k: 2,
        min_time_diff_s: 0.005,
        threads: Some(2),
        chunk_size: 1,
        ..SearchOptions::default()
    };
    let report = optimize(&plan, &evaluator, &options, &NoProgress).expect("search");

    assert_eq!(report.pool, CandidatePool::Primary);
    assert_eq!(report.goals.len(), 4);
    assert!(report.goals.iter().all(|g| g.is_near_post));
    assert!(report.diversity_satisfied);
    assert_eq!(report.selections.len(), 2);
    let first = &report.selections[0].trajectory;
    let second = &report.selections[1].trajectory;
    assert!(second.flight_time - first.flight_time >= 0.005);
    assert!((first.kick.azimuth_deg - 14.0).abs() < 1e-12);
    assert!(first.is_near_post && second.is_near_post);
    assert!(!first.samples.is_empty());
}

#[test]
fn raised_stop_flag_skips_all_work() {
    let plan = grid(table_bounds(range(5.0, 15.0)), 2);
    let options = SearchOptions {
        stop: Some(Arc::new(AtomicBool::new(true))),
        ..SearchOptions::default()
    };
    let err = optimize(&plan, &TableEvaluator, &options, &NoProgress).unwrap_err();
    assert!(matches!(
        err,
        SearchError::NoGoals {
            evaluated: 0,
            stopped_early: true
        }
    ));
}

#[test]
fn exhausted_time_budget_stops_the_sweep() {
    let plan = grid(table_bounds(range(5.0, 15.0)), 2);
    let options = SearchOptions {
        time_budget: Some(Duration::ZERO),
        ..SearchOptions::default()
    };
    let err = optimize(&plan, &TableEvaluator, &options, &NoProgress).unwrap_err();
    assert!(matches!(
        err,
        SearchError::NoGoals {
            stopped_early: true,
            ..
        }
    ));
}

#[test]
fn progress_is_monotonic_and_ends_complete() {
    let plan = grid(table_bounds(range(5.0, 15.0)), 5);
    let options = SearchOptions {
        chunk_size: 7,
        threads: Some(4),
        ..SearchOptions::default()
    };
    let sink = RecordingSink::default();
    optimize(&plan, &TableEvaluator, &options, &sink).expect("search");

    let updates = sink.updates.into_inner().expect("sink lock");
    assert!(!updates.is_empty());
    for pair in updates.windows(2) {
        assert!(pair[1].percent >= pair[0].percent);
        assert!(pair[1].completed >= pair[0].completed);
        assert!(pair[1].remaining <= pair[0].remaining);
    }
    let last = updates.last().expect("final update");
    assert_eq!(last.completed, 625);
    assert_eq!(last.total, 625);
    assert_eq!(last.percent, 100.0);
}

#[test]
fn invalid_options_are_rejected_before_any_work() {
    let plan = grid(table_bounds(range(5.0, 15.0)), 2);
    for options in [
        SearchOptions {
            top_k: 0,
            ..SearchOptions::default()
        },
        SearchOptions {
            min_time_diff_s: -0.1,
            ..SearchOptions::default()
        },
        SearchOptions {
            chunk_size: 0,
            ..SearchOptions::default()
        },
    ] {
        let err = optimize(&plan, &TableEvaluator, &options, &NoProgress).unwrap_err();
        assert!(matches!(err, SearchError::InvalidOptions(_)), "{err}");
    }

    let inverted = grid(table_bounds(range(15.0, 5.0)), 2);
    let err = optimize(&inverted, &TableEvaluator, &SearchOptions::default(), &NoProgress)
        .unwrap_err();
    assert!(matches!(err, SearchError::InvalidBounds(_)));
}
