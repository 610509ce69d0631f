//! Export helpers for CSV and JSON artifacts.

use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Create a writer for the target path, handling stdout (`-`) by convention.
pub fn writer_for_path(path: &Path) -> io::Result<Box<dyn Write>> {
    if path == Path::new("-") {
        return Ok(Box::new(BufWriter::new(io::stdout())));
    }
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    let file = File::create(path)?;
    Ok(Box::new(BufWriter::new(file)))
}

pub mod goals {
    use std::path::Path;

    use olympic_search::GoalRecord;

    use crate::{ExportError, writer_for_path};

    /// Write one row per goal: kick parameters, flight time, crossing point, near-post flag.
    pub fn write_goals(path: &Path, goals: &[GoalRecord]) -> Result<(), ExportError> {
        let mut writer = csv::Writer::from_writer(writer_for_path(path)?);
        for goal in goals {
            writer.serialize(goal)?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn read_goals(path: &Path) -> Result<Vec<GoalRecord>, ExportError> {
        let mut reader = csv::ReaderBuilder::new().has_headers(true).from_path(path)?;
        let mut goals = Vec::new();
        for record in reader.deserialize() {
            goals.push(record?);
        }
        Ok(goals)
    }
}

pub mod trajectory {
    use std::path::Path;

    use olympic_flight::TrajectoryResult;
    use serde::{Deserialize, Serialize};

    use crate::{ExportError, writer_for_path};

    /// One time-stamped sample as it appears in a trajectory CSV.
    #[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
    pub struct TrajectoryRow {
        pub time_s: f64,
        pub x_m: f64,
        pub y_m: f64,
        pub z_m: f64,
        pub vx_m_s: f64,
        pub vy_m_s: f64,
        pub vz_m_s: f64,
    }

    pub fn rows(result: &TrajectoryResult) -> Vec<TrajectoryRow> {
        result
            .samples
            .iter()
            .map(|sample| {
                let [x_m, y_m, z_m] = sample.state.position;
                let [vx_m_s, vy_m_s, vz_m_s] = sample.state.velocity;
                TrajectoryRow {
                    time_s: sample.time_s,
                    x_m,
                    y_m,
                    z_m,
                    vx_m_s,
                    vy_m_s,
                    vz_m_s,
                }
            })
            .collect()
    }

    pub fn write_trajectory(path: &Path, result: &TrajectoryResult) -> Result<(), ExportError> {
        let mut writer = csv::Writer::from_writer(writer_for_path(path)?);
        for row in rows(result) {
            writer.serialize(row)?;
        }
        writer.flush()?;
        Ok(())
    }

    pub fn read_trajectory(path: &Path) -> Result<Vec<TrajectoryRow>, ExportError> {
        let mut reader = csv::ReaderBuilder::new().has_headers(true).from_path(path)?;
        let mut rows = Vec::new();
        for record in reader.deserialize() {
            rows.push(record?);
        }
        Ok(rows)
    }
}

pub mod summary {
    use std::io::Write;
    use std::path::Path;

    use chrono::{SecondsFormat, Utc};
    use olympic_flight::KickParameters;
    use olympic_search::{CandidatePool, SearchReport};
    use serde::Serialize;
    use serde_json::to_writer_pretty;

    use crate::{ExportError, writer_for_path};

    #[derive(Debug, Serialize)]
    pub struct SelectedSummary {
        pub rank: usize,
        pub kick: KickParameters,
        pub flight_time_s: f64,
        pub near_post: bool,
        pub crossing_y_m: Option<f64>,
        pub crossing_z_m: Option<f64>,
        pub max_height_m: f64,
        pub termination: &'static str,
    }

    /// JSON sidecar describing one search run.
    #[derive(Debug, Serialize)]
    pub struct RunSummary {
        pub generated_at: String,
        pub mode: &'static str,
        pub total: usize,
        pub evaluated: usize,
        pub failed: usize,
        pub goals: usize,
        pub near_post_goals: usize,
        pub pool: CandidatePool,
        pub diversity_satisfied: bool,
        pub requested: usize,
        pub stopped_early: bool,
        pub elapsed_s: f64,
        pub selected: Vec<SelectedSummary>,
    }

    impl RunSummary {
        pub fn from_report(report: &SearchReport) -> Self {
            let selected = report
                .selections
                .iter()
                .enumerate()
                .map(|(index, pick)| SelectedSummary {
                    rank: index + 1,
                    kick: pick.kick,
                    flight_time_s: pick.trajectory.flight_time,
                    near_post: pick.trajectory.is_near_post,
                    crossing_y_m: pick.trajectory.crossing.map(|c| c.y_m),
                    crossing_z_m: pick.trajectory.crossing.map(|c| c.z_m),
                    max_height_m: pick.trajectory.max_height(),
                    termination: pick.trajectory.termination.as_str(),
                })
                .collect();

            Self {
                generated_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
                mode: report.plan.label(),
                total: report.total,
                evaluated: report.evaluated,
                failed: report.failed,
                goals: report.goals.len(),
                near_post_goals: report.near_post_goals(),
                pool: report.pool,
                diversity_satisfied: report.diversity_satisfied,
                requested: report.requested,
                stopped_early: report.stopped_early,
                elapsed_s: report.elapsed.as_secs_f64(),
                selected,
            }
        }
    }

    pub fn write_summary(path: &Path, report: &SearchReport) -> Result<(), ExportError> {
        let mut writer = writer_for_path(path)?;
        to_writer_pretty(&mut writer, &RunSummary::from_report(report))?;
        writeln!(writer)?;
        writer.flush()?;
        Ok(())
    }
}

/// Paths written by [`write_search_artifacts`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactPaths {
    pub goals: PathBuf,
    pub trajectories: Vec<PathBuf>,
    pub summary: PathBuf,
}

/// Write `goals.csv`, `trajectory_<n>.csv` per selected kick, and `summary.json`.
pub fn write_search_artifacts(
    dir: &Path,
    report: &olympic_search::SearchReport,
) -> Result<ArtifactPaths, ExportError> {
    fs::create_dir_all(dir)?;

    let goals_path = dir.join("goals.csv");
    goals::write_goals(&goals_path, &report.goals)?;

    let mut trajectories = Vec::with_capacity(report.selections.len());
    for (index, pick) in report.selections.iter().enumerate() {
        let path = dir.join(format!("trajectory_{}.csv", index + 1));
        trajectory::write_trajectory(&path, &pick.trajectory)?;
        trajectories.push(path);
    }

    let summary_path = dir.join("summary.json");
    summary::write_summary(&summary_path, report)?;

    Ok(ArtifactPaths {
        goals: goals_path,
        trajectories,
        summary: summary_path,
    })
}
