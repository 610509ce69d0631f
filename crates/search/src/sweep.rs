//! Parallel evaluation of a sweep plan and assembly of the final report.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use olympic_flight::{
    FieldGeometry, FlightError, KickParameters, PhysicalConstants, SimulationSettings,
    TrajectoryResult, simulate,
};
use rayon::prelude::*;
use serde::Serialize;

use crate::SearchError;
use crate::outcome::{Candidate, GoalRecord, Outcome};
use crate::plan::SweepPlan;
use crate::progress::{ProgressSink, ProgressTracker};
use crate::select::select_diverse;

/// Anything that can turn kick parameters into a trajectory.
pub trait KickEvaluator: Sync {
    fn evaluate(&self, kick: &KickParameters) -> Result<TrajectoryResult, FlightError>;
}

/// Evaluates kicks with the full flight model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FlightEvaluator {
    pub constants: PhysicalConstants,
    pub field: FieldGeometry,
    pub settings: SimulationSettings,
}

impl FlightEvaluator {
    pub fn new(
        constants: PhysicalConstants,
        field: FieldGeometry,
        settings: SimulationSettings,
    ) -> Self {
        Self {
            constants,
            field,
            settings,
        }
    }
}

impl KickEvaluator for FlightEvaluator {
    fn evaluate(&self, kick: &KickParameters) -> Result<TrajectoryResult, FlightError> {
        simulate(kick, &self.constants, &self.field, &self.settings)
    }
}

/// Knobs for [`optimize`].
#[derive(Debug, Clone)]
pub struct SearchOptions {
    pub top_k: usize,
    pub min_time_diff_s: f64,
    /// Evaluations per work unit; progress is reported once per unit.
    pub chunk_size: usize,
    /// Worker threads; `None` uses the global rayon pool.
    pub threads: Option<usize>,
    /// Wall-clock budget after which remaining kicks are skipped.
    pub time_budget: Option<Duration>,
    /// External cancellation flag.
    pub stop: Option<Arc<AtomicBool>>,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            top_k: 3,
            min_time_diff_s: 0.05,
            chunk_size: 256,
            threads: None,
            time_budget: None,
            stop: None,
        }
    }
}

impl SearchOptions {
    pub fn validate(&self) -> Result<(), SearchError> {
        if self.top_k == 0 {
            return Err(SearchError::InvalidOptions("top_k must be at least 1".into()));
        }
        if !self.min_time_diff_s.is_finite() || self.min_time_diff_s < 0.0 {
            return Err(SearchError::InvalidOptions(format!(
                "min_time_diff must be finite and non-negative (got {})",
                self.min_time_diff_s
            )));
        }
        if self.chunk_size == 0 {
            return Err(SearchError::InvalidOptions(
                "chunk_size must be at least 1".into(),
            ));
        }
        if self.threads == Some(0) {
            return Err(SearchError::InvalidOptions(
                "threads must be at least 1".into(),
            ));
        }
        Ok(())
    }
}

/// Which goals the selection was drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CandidatePool {
    /// Near-post goals.
    Primary,
    /// No near-post goal was found; all goals were considered.
    FarPostFallback,
}

impl CandidatePool {
    pub fn as_str(&self) -> &'static str {
        match self {
            CandidatePool::Primary => "primary",
            CandidatePool::FarPostFallback => "far_post_fallback",
        }
    }
}

/// A chosen kick together with its re-simulated trajectory.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectedKick {
    pub kick: KickParameters,
    pub outcome: Outcome,
    pub trajectory: TrajectoryResult,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchReport {
    pub plan: SweepPlan,
    pub selections: Vec<SelectedKick>,
    pub pool: CandidatePool,
    pub diversity_satisfied: bool,
    pub requested: usize,
    pub total: usize,
    pub evaluated: usize,
    pub failed: usize,
    /// Every goal found, in plan order.
    pub goals: Vec<GoalRecord>,
    pub stopped_early: bool,
    pub elapsed: Duration,
}

impl SearchReport {
    pub fn near_post_goals(&self) -> usize {
        self.goals.iter().filter(|goal| goal.is_near_post).count()
    }
}

#[derive(Default)]
struct ChunkTally {
    goals: Vec<Candidate>,
    evaluated: usize,
    failed: usize,
}

/// Evaluate every kick in `plan`, then pick up to `top_k` fast, time-diverse goals.
///
/// Evaluation runs on rayon in chunks. Goals are collected in plan order so the
/// report is independent of thread scheduling. When the stop flag is raised or
/// the time budget runs out, remaining kicks are skipped and selection runs on
/// whatever was found.
pub fn optimize<E: KickEvaluator>(
    plan: &SweepPlan,
    evaluator: &E,
    options: &SearchOptions,
    sink: &dyn ProgressSink,
) -> Result<SearchReport, SearchError> {
    plan.validate()?;
    options.validate()?;

    let started = Instant::now();
    let total = plan.len();
    let chunk_size = options.chunk_size;
    let chunks = total.div_ceil(chunk_size);
    let tracker = Mutex::new(ProgressTracker::starting_at(total, started));
    let halted = AtomicBool::new(false);

    tracing::info!(
        mode = plan.label(),
        total,
        top_k = options.top_k,
        "starting corner-kick sweep"
    );

    let should_stop = || {
        if halted.load(Ordering::Relaxed) {
            return true;
        }
        let cancelled = options
            .stop
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed));
        let out_of_time = options
            .time_budget
            .is_some_and(|budget| started.elapsed() >= budget);
        if cancelled || out_of_time {
            halted.store(true, Ordering::Relaxed);
        }
        cancelled || out_of_time
    };

    let run = || {
        (0..chunks)
            .into_par_iter()
            .map(|chunk| {
                let mut tally = ChunkTally::default();
                let start = chunk * chunk_size;
                let end = (start + chunk_size).min(total);
                for index in start..end {
                    if should_stop() {
                        break;
                    }
                    let kick = plan.kick_at(index);
                    match evaluator.evaluate(&kick) {
                        Ok(result) => {
                            tally.evaluated += 1;
                            if result.is_goal {
                                tally.goals.push(Candidate::from_result(&result));
                            }
                        }
                        Err(err) => {
                            tally.failed += 1;
                            tracing::warn!(?kick, error = %err, "kick evaluation failed");
                        }
                    }
                }

                let processed = tally.evaluated + tally.failed;
                if processed == 0 {
                    return tally;
                }
                // Report under the lock so the sink sees updates in order.
                let mut progress = tracker
                    .lock()
                    .unwrap_or_else(|poisoned| poisoned.into_inner());
                if let Some(update) = progress.advance(processed) {
                    sink.report(&update);
                }
                tally
            })
            .collect::<Vec<_>>()
    };

    let tallies = match options.threads {
        Some(threads) => rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build()?
            .install(run),
        None => run(),
    };

    let mut goals = Vec::new();
    let mut evaluated = 0;
    let mut failed = 0;
    for tally in tallies {
        evaluated += tally.evaluated;
        failed += tally.failed;
        goals.extend(tally.goals);
    }
    let stopped_early = evaluated + failed < total;

    if goals.is_empty() {
        tracing::warn!(evaluated, stopped_early, "sweep found no goals");
        return Err(SearchError::NoGoals {
            evaluated,
            stopped_early,
        });
    }

    let near_post: Vec<Candidate> = goals
        .iter()
        .filter(|goal| goal.is_near_post())
        .copied()
        .collect();
    let (pool, candidates) = if near_post.is_empty() {
        tracing::warn!(
            goals = goals.len(),
            "no near-post goals found; falling back to all goals"
        );
        (CandidatePool::FarPostFallback, goals.clone())
    } else {
        (CandidatePool::Primary, near_post)
    };

    let selection = select_diverse(&candidates, options.top_k, options.min_time_diff_s);
    if !selection.diversity_satisfied {
        tracing::warn!(
            requested = options.top_k,
            min_time_diff_s = options.min_time_diff_s,
            "not enough time-separated goals; filled with fastest remaining"
        );
    }

    let selections = selection
        .picks
        .iter()
        .map(|pick| {
            Ok(SelectedKick {
                kick: pick.kick,
                outcome: pick.outcome,
                trajectory: evaluator.evaluate(&pick.kick)?,
            })
        })
        .collect::<Result<Vec<_>, FlightError>>()?;

    let elapsed = started.elapsed();
    tracing::info!(
        evaluated,
        failed,
        goals = goals.len(),
        selected = selections.len(),
        pool = pool.as_str(),
        stopped_early,
        elapsed_s = elapsed.as_secs_f64(),
        "sweep finished"
    );

    Ok(SearchReport {
        plan: *plan,
        selections,
        pool,
        diversity_satisfied: selection.diversity_satisfied,
        requested: options.top_k,
        total,
        evaluated,
        failed,
        goals: goals.iter().filter_map(GoalRecord::from_candidate).collect(),
        stopped_early,
        elapsed,
    })
}
