//! Sweep plans: a lazily enumerated Cartesian grid or a seeded random sample
//! over the four kick parameters.

use olympic_flight::KickParameters;
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::SearchError;

/// Closed interval `[min, max]` for one kick parameter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParameterRange {
    pub min: f64,
    pub max: f64,
}

impl ParameterRange {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    pub fn span(&self) -> f64 {
        self.max - self.min
    }

    /// `index`-th of `count` evenly spaced values, endpoints included.
    ///
    /// A single-point axis sits at `min`.
    pub fn linspace(&self, count: usize, index: usize) -> f64 {
        if count <= 1 {
            return self.min;
        }
        if index + 1 == count {
            return self.max;
        }
        self.min + self.span() * index as f64 / (count - 1) as f64
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }

    fn sample<R: Rng>(&self, rng: &mut R) -> f64 {
        if self.min == self.max {
            self.min
        } else {
            rng.gen_range(self.min..=self.max)
        }
    }

    fn validate(&self, name: &str) -> Result<(), SearchError> {
        if !self.min.is_finite() || !self.max.is_finite() {
            return Err(SearchError::InvalidBounds(format!(
                "{name} bounds must be finite (got [{}, {}])",
                self.min, self.max
            )));
        }
        if self.min > self.max {
            return Err(SearchError::InvalidBounds(format!(
                "{name} minimum {} exceeds maximum {}",
                self.min, self.max
            )));
        }
        Ok(())
    }
}

/// Search bounds for every kick parameter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParameterBounds {
    pub speed_m_s: ParameterRange,
    pub elevation_deg: ParameterRange,
    pub azimuth_deg: ParameterRange,
    pub spin_rad_s: ParameterRange,
}

impl Default for ParameterBounds {
    fn default() -> Self {
        Self {
            speed_m_s: ParameterRange::new(20.0, 35.0),
            elevation_deg: ParameterRange::new(10.0, 30.0),
            azimuth_deg: ParameterRange::new(5.0, 45.0),
            spin_rad_s: ParameterRange::new(-120.0, -70.0),
        }
    }
}

impl ParameterBounds {
    pub fn validate(&self) -> Result<(), SearchError> {
        self.speed_m_s.validate("speed")?;
        self.elevation_deg.validate("elevation")?;
        self.azimuth_deg.validate("azimuth")?;
        self.spin_rad_s.validate("spin")?;
        if self.speed_m_s.min < 0.0 {
            return Err(SearchError::InvalidBounds(format!(
                "speed must be non-negative (got minimum {})",
                self.speed_m_s.min
            )));
        }
        Ok(())
    }

    pub fn contains(&self, kick: &KickParameters) -> bool {
        self.speed_m_s.contains(kick.speed_m_s)
            && self.elevation_deg.contains(kick.elevation_deg)
            && self.azimuth_deg.contains(kick.azimuth_deg)
            && self.spin_rad_s.contains(kick.spin_rad_s)
    }
}

/// Number of grid points along each axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GridResolution {
    pub speed: usize,
    pub elevation: usize,
    pub azimuth: usize,
    pub spin: usize,
}

impl GridResolution {
    pub fn uniform(count: usize) -> Self {
        Self {
            speed: count,
            elevation: count,
            azimuth: count,
            spin: count,
        }
    }
}

impl Default for GridResolution {
    fn default() -> Self {
        Self::uniform(12)
    }
}

/// Full Cartesian product of the four axes, enumerated by index.
///
/// Speed varies slowest and spin fastest.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ParameterGrid {
    pub bounds: ParameterBounds,
    pub resolution: GridResolution,
}

impl ParameterGrid {
    pub fn new(bounds: ParameterBounds, resolution: GridResolution) -> Self {
        Self { bounds, resolution }
    }

    pub fn validate(&self) -> Result<(), SearchError> {
        self.bounds.validate()?;
        let GridResolution {
            speed,
            elevation,
            azimuth,
            spin,
        } = self.resolution;
        if [speed, elevation, azimuth, spin].contains(&0) {
            return Err(SearchError::InvalidBounds(
                "grid resolution must be at least 1 on every axis".into(),
            ));
        }
        if self.checked_len().is_none() {
            return Err(SearchError::InvalidBounds(
                "grid has more points than can be indexed".into(),
            ));
        }
        Ok(())
    }

    fn checked_len(&self) -> Option<usize> {
        self.resolution
            .speed
            .checked_mul(self.resolution.elevation)?
            .checked_mul(self.resolution.azimuth)?
            .checked_mul(self.resolution.spin)
    }

    pub fn len(&self) -> usize {
        self.checked_len().unwrap_or(usize::MAX)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn kick_at(&self, index: usize) -> KickParameters {
        let r = self.resolution;
        let spin = index % r.spin.max(1);
        let rest = index / r.spin.max(1);
        let azimuth = rest % r.azimuth.max(1);
        let rest = rest / r.azimuth.max(1);
        let elevation = rest % r.elevation.max(1);
        let speed = rest / r.elevation.max(1);

        KickParameters::new(
            self.bounds.speed_m_s.linspace(r.speed, speed),
            self.bounds.elevation_deg.linspace(r.elevation, elevation),
            self.bounds.azimuth_deg.linspace(r.azimuth, azimuth),
            self.bounds.spin_rad_s.linspace(r.spin, spin),
        )
    }

    /// Fresh enumerator over every grid point.
    pub fn iter(&self) -> GridIter<'_> {
        GridIter {
            grid: self,
            next: 0,
            end: self.len(),
        }
    }
}

pub struct GridIter<'a> {
    grid: &'a ParameterGrid,
    next: usize,
    end: usize,
}

impl Iterator for GridIter<'_> {
    type Item = KickParameters;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next >= self.end {
            return None;
        }
        let kick = self.grid.kick_at(self.next);
        self.next += 1;
        Some(kick)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.end - self.next;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for GridIter<'_> {}

/// Uniform random sample of `budget` kicks within the bounds.
///
/// Each index draws from its own ChaCha stream, so the kick at a given index
/// depends only on the seed and never on evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RandomPlan {
    pub bounds: ParameterBounds,
    pub budget: usize,
    pub seed: u64,
}

impl RandomPlan {
    pub fn new(bounds: ParameterBounds, budget: usize, seed: u64) -> Self {
        Self {
            bounds,
            budget,
            seed,
        }
    }

    pub fn validate(&self) -> Result<(), SearchError> {
        self.bounds.validate()?;
        if self.budget == 0 {
            return Err(SearchError::InvalidOptions(
                "random search budget must be at least 1".into(),
            ));
        }
        Ok(())
    }

    pub fn kick_at(&self, index: usize) -> KickParameters {
        let mut rng = ChaCha8Rng::seed_from_u64(self.seed);
        rng.set_stream(index as u64);
        KickParameters::new(
            self.bounds.speed_m_s.sample(&mut rng),
            self.bounds.elevation_deg.sample(&mut rng),
            self.bounds.azimuth_deg.sample(&mut rng),
            self.bounds.spin_rad_s.sample(&mut rng),
        )
    }
}

/// What a sweep evaluates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum SweepPlan {
    Grid(ParameterGrid),
    Random(RandomPlan),
}

impl SweepPlan {
    pub fn validate(&self) -> Result<(), SearchError> {
        match self {
            SweepPlan::Grid(grid) => grid.validate(),
            SweepPlan::Random(plan) => plan.validate(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            SweepPlan::Grid(grid) => grid.len(),
            SweepPlan::Random(plan) => plan.budget,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn bounds(&self) -> &ParameterBounds {
        match self {
            SweepPlan::Grid(grid) => &grid.bounds,
            SweepPlan::Random(plan) => &plan.bounds,
        }
    }

    pub fn kick_at(&self, index: usize) -> KickParameters {
        match self {
            SweepPlan::Grid(grid) => grid.kick_at(index),
            SweepPlan::Random(plan) => plan.kick_at(index),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = KickParameters> + '_ {
        (0..self.len()).map(move |index| self.kick_at(index))
    }

    pub fn label(&self) -> &'static str {
        match self {
            SweepPlan::Grid(_) => "grid",
            SweepPlan::Random(_) => "random",
        }
    }
}
