//! Configuration models and loaders for corner-kick scenarios.
//!
//! Every field carries a default, so an empty file (or no file at all) yields
//! the standard pitch, ball, and search settings.

use std::fs::File;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Root of a scenario manifest.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ScenarioConfig {
    pub ball: BallConfig,
    pub environment: EnvironmentConfig,
    pub aero: AeroConfig,
    pub field: FieldConfig,
    pub simulation: SimulationConfig,
    pub search: SearchConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BallConfig {
    pub mass_kg: f64,
    pub radius_m: f64,
}

impl Default for BallConfig {
    fn default() -> Self {
        Self {
            mass_kg: 0.45,
            radius_m: 0.11,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnvironmentConfig {
    pub gravity_m_s2: f64,
    pub air_density_kg_m3: f64,
}

impl Default for EnvironmentConfig {
    fn default() -> Self {
        Self {
            gravity_m_s2: 9.81,
            air_density_kg_m3: 1.2,
        }
    }
}

/// Constant drag and lift coefficients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AeroConfig {
    pub drag_coefficient: f64,
    pub lift_coefficient: f64,
}

impl Default for AeroConfig {
    fn default() -> Self {
        Self {
            drag_coefficient: 0.33,
            lift_coefficient: 0.30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldConfig {
    pub length_m: f64,
    pub width_m: f64,
    pub goal_width_m: f64,
    pub goal_height_m: f64,
    pub goal_depth_m: f64,
    pub boundary_margin_m: f64,
    pub near_post_distance_m: f64,
}

impl Default for FieldConfig {
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

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimulationConfig {
    pub max_time_s: f64,
    pub frame_rate_hz: f64,
    pub rtol: f64,
    pub atol: f64,
    pub max_step_s: f64,
}

impl Default for SimulationConfig {
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

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SearchMode {
    #[default]
    Grid,
    Random,
}

/// `[min, max]` pair as written in manifests.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RangeConfig {
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BoundsConfig {
    pub speed_m_s: RangeConfig,
    pub elevation_deg: RangeConfig,
    pub azimuth_deg: RangeConfig,
    pub spin_rad_s: RangeConfig,
}

impl Default for BoundsConfig {
    fn default() -> Self {
        Self {
            speed_m_s: RangeConfig { min: 20.0, max: 35.0 },
            elevation_deg: RangeConfig { min: 10.0, max: 30.0 },
            azimuth_deg: RangeConfig { min: 5.0, max: 45.0 },
            spin_rad_s: RangeConfig {
                min: -120.0,
                max: -70.0,
            },
        }
    }
}

impl BoundsConfig {
    fn ranges(&self) -> [(&'static str, &RangeConfig); 4] {
        [
            ("speed_m_s", &self.speed_m_s),
            ("elevation_deg", &self.elevation_deg),
            ("azimuth_deg", &self.azimuth_deg),
            ("spin_rad_s", &self.spin_rad_s),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchConfig {
    pub mode: SearchMode,
    pub bounds: BoundsConfig,
    /// Grid points per axis.
    pub samples_per_axis: usize,
    /// Per-axis grid points; unset axes use `samples_per_axis`.
    pub resolution: ResolutionConfig,
    /// Number of kicks drawn in random mode.
    pub random_budget: usize,
    pub seed: u64,
    pub top_k: usize,
    pub min_time_diff_s: f64,
    pub chunk_size: usize,
    pub threads: Option<usize>,
    pub time_budget_s: Option<f64>,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            mode: SearchMode::Grid,
            bounds: BoundsConfig::default(),
            samples_per_axis: 12,
            resolution: ResolutionConfig::default(),
            random_budget: 5000,
            seed: 42,
            top_k: 3,
            min_time_diff_s: 0.05,
            chunk_size: 256,
            threads: None,
            time_budget_s: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ResolutionConfig {
    pub speed: Option<usize>,
    pub elevation: Option<usize>,
    pub azimuth: Option<usize>,
    pub spin: Option<usize>,
}

impl ResolutionConfig {
    fn axes(&self) -> [(&'static str, Option<usize>); 4] {
        [
            ("speed", self.speed),
            ("elevation", self.elevation),
            ("azimuth", self.azimuth),
            ("spin", self.spin),
        ]
    }
}

impl SearchConfig {
    /// Grid points per axis as `[speed, elevation, azimuth, spin]`.
    pub fn grid_points(&self) -> [usize; 4] {
        self.resolution
            .axes()
            .map(|(_, points)| points.unwrap_or(self.samples_per_axis))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub directory: PathBuf,
    pub plot: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("results"),
            plot: false,
        }
    }
}

/// Errors that can occur while loading configuration files.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse YAML: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("failed to parse TOML: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

impl ScenarioConfig {
    /// Check cross-field consistency; reports the first offending value.
    pub fn validate(&self) -> Result<(), ConfigError> {
        positive("ball.mass_kg", self.ball.mass_kg)?;
        positive("ball.radius_m", self.ball.radius_m)?;
        non_negative("environment.gravity_m_s2", self.environment.gravity_m_s2)?;
        non_negative(
            "environment.air_density_kg_m3",
            self.environment.air_density_kg_m3,
        )?;
        non_negative("aero.drag_coefficient", self.aero.drag_coefficient)?;
        non_negative("aero.lift_coefficient", self.aero.lift_coefficient)?;

        let field = &self.field;
        positive("field.length_m", field.length_m)?;
        positive("field.width_m", field.width_m)?;
        positive("field.goal_width_m", field.goal_width_m)?;
        positive("field.goal_height_m", field.goal_height_m)?;
        non_negative("field.goal_depth_m", field.goal_depth_m)?;
        non_negative("field.boundary_margin_m", field.boundary_margin_m)?;
        non_negative("field.near_post_distance_m", field.near_post_distance_m)?;
        if field.goal_width_m >= field.width_m {
            return Err(ConfigError::Invalid(format!(
                "field.goal_width_m ({}) must be narrower than field.width_m ({})",
                field.goal_width_m, field.width_m
            )));
        }

        let sim = &self.simulation;
        positive("simulation.max_time_s", sim.max_time_s)?;
        positive("simulation.frame_rate_hz", sim.frame_rate_hz)?;
        positive("simulation.rtol", sim.rtol)?;
        positive("simulation.atol", sim.atol)?;
        positive("simulation.max_step_s", sim.max_step_s)?;

        let search = &self.search;
        for (name, range) in search.bounds.ranges() {
            if !range.min.is_finite() || !range.max.is_finite() || range.min > range.max {
                return Err(ConfigError::Invalid(format!(
                    "search.bounds.{name} must satisfy min <= max (got [{}, {}])",
                    range.min, range.max
                )));
            }
        }
        if search.bounds.speed_m_s.min < 0.0 {
            return Err(ConfigError::Invalid(
                "search.bounds.speed_m_s must be non-negative".into(),
            ));
        }
        at_least_one("search.samples_per_axis", search.samples_per_axis)?;
        for (axis, points) in search.resolution.axes() {
            if let Some(points) = points {
                at_least_one(&format!("search.resolution.{axis}"), points)?;
            }
        }
        at_least_one("search.random_budget", search.random_budget)?;
        at_least_one("search.top_k", search.top_k)?;
        at_least_one("search.chunk_size", search.chunk_size)?;
        non_negative("search.min_time_diff_s", search.min_time_diff_s)?;
        if let Some(threads) = search.threads {
            at_least_one("search.threads", threads)?;
        }
        if let Some(budget) = search.time_budget_s {
            positive("search.time_budget_s", budget)?;
        }
        Ok(())
    }
}

fn positive(name: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!(
            "{name} must be positive (got {value})"
        )))
    }
}

fn non_negative(name: &str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!(
            "{name} must be non-negative (got {value})"
        )))
    }
}

fn at_least_one(name: &str, value: usize) -> Result<(), ConfigError> {
    if value >= 1 {
        Ok(())
    } else {
        Err(ConfigError::Invalid(format!("{name} must be at least 1")))
    }
}

/// Load and validate a scenario from a `.toml` or YAML file.
pub fn load_scenario<P: AsRef<Path>>(path: P) -> Result<ScenarioConfig, ConfigError> {
    let config: ScenarioConfig = load_record(path)?;
    config.validate()?;
    Ok(config)
}

/// Load every `.toml`/`.yaml`/`.yml` scenario in a directory, sorted by file name.
pub fn load_scenarios<P: AsRef<Path>>(dir: P) -> Result<Vec<ScenarioConfig>, ConfigError> {
    let mut entries: Vec<PathBuf> = std::fs::read_dir(dir.as_ref())?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| is_toml(path) || is_yaml(path))
        .collect();
    entries.sort();
    entries.into_iter().map(load_scenario).collect()
}

fn load_record<T, P>(path: P) -> Result<T, ConfigError>
where
    T: for<'de> Deserialize<'de>,
    P: AsRef<Path>,
{
    let path = path.as_ref();
    if is_toml(path) {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    } else {
        let reader = File::open(path)?;
        Ok(serde_yaml::from_reader(reader)?)
    }
}

fn is_toml(path: &Path) -> bool {
    path.extension().map(|ext| ext == "toml").unwrap_or(false)
}

fn is_yaml(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext == "yaml" || ext == "yml")
        .unwrap_or(false)
}
