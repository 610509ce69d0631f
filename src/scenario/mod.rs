use std::path::Path;
use std::time::Duration;

use thiserror::Error;

use olympic_config::{ConfigError, OutputConfig, ScenarioConfig, SearchMode};
use olympic_flight::{
    FieldGeometry, FlightError, KickParameters, PhysicalConstants, SimulationSettings,
    TrajectoryResult, simulate,
};
use olympic_search::{
    FlightEvaluator, GridResolution, ParameterBounds, ParameterGrid, ParameterRange, ProgressSink,
    RandomPlan, SearchError, SearchOptions, SearchReport, SweepPlan, optimize,
};

#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Flight(#[from] FlightError),
    #[error(transparent)]
    Search(#[from] SearchError),
}

/// Runtime view of a scenario file, ready to simulate or search.
#[derive(Debug, Clone)]
pub struct Scenario {
    pub constants: PhysicalConstants,
    pub field: FieldGeometry,
    pub settings: SimulationSettings,
    pub plan: SweepPlan,
    pub options: SearchOptions,
    pub output: OutputConfig,
}

/// Command-line adjustments applied on top of a loaded search section.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchOverrides {
    pub mode: Option<SearchMode>,
    pub samples_per_axis: Option<usize>,
    pub random_budget: Option<usize>,
    pub seed: Option<u64>,
    pub top_k: Option<usize>,
    pub min_time_diff_s: Option<f64>,
    pub threads: Option<usize>,
    pub time_budget_s: Option<f64>,
}

impl SearchOverrides {
    pub fn apply(&self, config: &mut ScenarioConfig) {
        let search = &mut config.search;
        if let Some(mode) = self.mode {
            search.mode = mode;
        }
        if let Some(samples) = self.samples_per_axis {
            search.samples_per_axis = samples;
        }
        if let Some(budget) = self.random_budget {
            search.random_budget = budget;
        }
        if let Some(seed) = self.seed {
            search.seed = seed;
        }
        if let Some(top_k) = self.top_k {
            search.top_k = top_k;
        }
        if let Some(diff) = self.min_time_diff_s {
            search.min_time_diff_s = diff;
        }
        if let Some(threads) = self.threads {
            search.threads = Some(threads);
        }
        if let Some(budget) = self.time_budget_s {
            search.time_budget_s = Some(budget);
        }
    }
}

impl Scenario {
    /// Load, override, validate, and convert in one go.
    ///
    /// Without a path the built-in defaults are used.
    pub fn load(path: Option<&Path>, overrides: &SearchOverrides) -> Result<Self, ScenarioError> {
        let mut config = match path {
            Some(path) => olympic_config::load_scenario(path)?,
            None => ScenarioConfig::default(),
        };
        overrides.apply(&mut config);
        config.validate()?;
        Scenario::try_from(&config)
    }

    pub fn evaluator(&self) -> FlightEvaluator {
        FlightEvaluator::new(self.constants, self.field, self.settings)
    }

    pub fn simulate(&self, kick: &KickParameters) -> Result<TrajectoryResult, ScenarioError> {
        Ok(simulate(kick, &self.constants, &self.field, &self.settings)?)
    }

    pub fn search(&self, progress: &dyn ProgressSink) -> Result<SearchReport, ScenarioError> {
        Ok(optimize(&self.plan, &self.evaluator(), &self.options, progress)?)
    }
}

impl TryFrom<&ScenarioConfig> for Scenario {
    type Error = ScenarioError;

    fn try_from(config: &ScenarioConfig) -> Result<Self, Self::Error> {
        let constants = PhysicalConstants::new(
            config.ball.mass_kg,
            config.ball.radius_m,
            config.environment.gravity_m_s2,
            config.environment.air_density_kg_m3,
            config.aero.drag_coefficient,
            config.aero.lift_coefficient,
        );
        constants.validate()?;

        let field = FieldGeometry {
            length_m: config.field.length_m,
            width_m: config.field.width_m,
            goal_width_m: config.field.goal_width_m,
            goal_height_m: config.field.goal_height_m,
            goal_depth_m: config.field.goal_depth_m,
            boundary_margin_m: config.field.boundary_margin_m,
            near_post_distance_m: config.field.near_post_distance_m,
        };
        field.validate()?;

        let settings = SimulationSettings {
            max_time_s: config.simulation.max_time_s,
            frame_rate_hz: config.simulation.frame_rate_hz,
            rtol: config.simulation.rtol,
            atol: config.simulation.atol,
            max_step_s: config.simulation.max_step_s,
        };
        settings.validate()?;

        let search = &config.search;
        let range = |r: &olympic_config::RangeConfig| ParameterRange::new(r.min, r.max);
        let bounds = ParameterBounds {
            speed_m_s: range(&search.bounds.speed_m_s),
            elevation_deg: range(&search.bounds.elevation_deg),
            azimuth_deg: range(&search.bounds.azimuth_deg),
            spin_rad_s: range(&search.bounds.spin_rad_s),
        };
        let plan = match search.mode {
            SearchMode::Grid => {
                let [speed, elevation, azimuth, spin] = search.grid_points();
                SweepPlan::Grid(ParameterGrid::new(
                    bounds,
                    GridResolution {
                        speed,
                        elevation,
                        azimuth,
                        spin,
                    },
                ))
            }
            SearchMode::Random => {
                SweepPlan::Random(RandomPlan::new(bounds, search.random_budget, search.seed))
            }
        };
        plan.validate()?;

        let time_budget = search
            .time_budget_s
            .map(|secs| {
                Duration::try_from_secs_f64(secs).map_err(|_| {
                    ConfigError::Invalid(format!(
                        "search.time_budget_s must be a non-negative number of seconds (got {secs})"
                    ))
                })
            })
            .transpose()?;
        let options = SearchOptions {
            top_k: search.top_k,
            min_time_diff_s: search.min_time_diff_s,
            chunk_size: search.chunk_size,
            threads: search.threads,
            time_budget,
            stop: None,
        };
        options.validate()?;

        Ok(Scenario {
            constants,
            field,
            settings,
            plan,
            options,
            output: config.output.clone(),
        })
    }
}
