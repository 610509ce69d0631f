use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use olympic_goal::config::SearchMode;
use olympic_goal::export::write_search_artifacts;
use olympic_goal::plot::{self, PlotTrajectory};
use olympic_goal::scenario::{Scenario, SearchOverrides};
use olympic_goal::search::{CandidatePool, NoProgress, SearchReport, TracingProgress};

/// Sweep launch parameters for a corner kick and report the fastest distinct direct goals.
#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Corner-kick search for direct (Olympic) goals"
)]
struct Cli {
    /// Scenario file (YAML or TOML); built-in defaults when omitted
    #[arg(long)]
    config: Option<PathBuf>,

    /// Sweep strategy
    #[arg(long, value_enum)]
    mode: Option<ModeArg>,

    /// Grid points per parameter axis (grid mode)
    #[arg(long)]
    samples: Option<usize>,

    /// Number of random kicks (random mode)
    #[arg(long)]
    budget: Option<usize>,

    /// Seed for random mode
    #[arg(long)]
    seed: Option<u64>,

    /// Number of kicks to select
    #[arg(long)]
    top_k: Option<usize>,

    /// Minimum flight-time separation between selected kicks, in seconds
    #[arg(long)]
    min_time_diff: Option<f64>,

    /// Worker threads (defaults to all cores)
    #[arg(long)]
    threads: Option<usize>,

    /// Stop evaluating after this many seconds and select from what was found
    #[arg(long)]
    time_budget: Option<f64>,

    /// Directory for goals.csv, trajectory CSVs, and summary.json
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Also render PNG plots of the selected trajectories and goal crossings
    #[arg(long, default_value_t = false)]
    plot: bool,

    /// Suppress progress logging
    #[arg(long, default_value_t = false)]
    quiet: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModeArg {
    Grid,
    Random,
}

impl From<ModeArg> for SearchMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Grid => SearchMode::Grid,
            ModeArg::Random => SearchMode::Random,
        }
    }
}

fn main() -> anyhow::Result<()> {
    olympic_cli::init_tracing();
    let cli = Cli::parse();

    let overrides = SearchOverrides {
        mode: cli.mode.map(SearchMode::from),
        samples_per_axis: cli.samples,
        random_budget: cli.budget,
        seed: cli.seed,
        top_k: cli.top_k,
        min_time_diff_s: cli.min_time_diff,
        threads: cli.threads,
        time_budget_s: cli.time_budget,
    };
    let scenario = Scenario::load(cli.config.as_deref(), &overrides)?;
    let output_dir = cli
        .output_dir
        .clone()
        .unwrap_or_else(|| scenario.output.directory.clone());

    let report = if cli.quiet {
        scenario.search(&NoProgress)?
    } else {
        scenario.search(&TracingProgress)?
    };

    print_report(&report);

    let paths = write_search_artifacts(&output_dir, &report)?;
    println!("Goals CSV: {}", paths.goals.display());
    for path in &paths.trajectories {
        println!("Trajectory CSV: {}", path.display());
    }
    println!("Summary: {}", paths.summary.display());

    if cli.plot || scenario.output.plot {
        render_plots(&scenario, &report, &output_dir);
    }

    Ok(())
}

fn print_report(report: &SearchReport) {
    println!(
        "Evaluated {} of {} {} kicks in {:.1}s: {} goals ({} near post)",
        report.evaluated,
        report.total,
        report.plan.label(),
        report.elapsed.as_secs_f64(),
        report.goals.len(),
        report.near_post_goals(),
    );
    if report.stopped_early {
        println!("Search stopped early; selection uses the kicks evaluated so far.");
    }
    if report.pool == CandidatePool::FarPostFallback {
        println!("No near-post goals found; selection drawn from far-post goals.");
    }
    if !report.diversity_satisfied {
        println!(
            "Fewer than {} goals are separated in flight time; filled with the fastest remaining.",
            report.requested
        );
    }

    for (index, pick) in report.selections.iter().enumerate() {
        let kick = &pick.kick;
        let trajectory = &pick.trajectory;
        let (y, z) = trajectory
            .crossing
            .map(|c| (c.y_m, c.z_m))
            .unwrap_or((f64::NAN, f64::NAN));
        println!(
            "#{:<2} speed {:>5.2} m/s  elevation {:>5.2} deg  azimuth {:>5.2} deg  spin {:>7.2} rad/s  time {:.3} s  crossing y {:+.2} m z {:.2} m{}",
            index + 1,
            kick.speed_m_s,
            kick.elevation_deg,
            kick.azimuth_deg,
            kick.spin_rad_s,
            trajectory.flight_time,
            y,
            z,
            if trajectory.is_near_post {
                "  near post"
            } else {
                ""
            },
        );
    }
}

fn render_plots(scenario: &Scenario, report: &SearchReport, output_dir: &std::path::Path) {
    let trajectories: Vec<PlotTrajectory> = report
        .selections
        .iter()
        .enumerate()
        .map(|(index, pick)| {
            PlotTrajectory::from_result(
                format!("#{} ({:.2} s)", index + 1, pick.trajectory.flight_time),
                &pick.trajectory,
            )
        })
        .collect();

    let trajectories_png = output_dir.join("trajectories.png");
    match plot::render_trajectories(&trajectories_png, &trajectories, &scenario.field, (1400, 700)) {
        Ok(()) => println!("Trajectory plot: {}", trajectories_png.display()),
        Err(err) => tracing::warn!(error = %err, "failed to render trajectory plot"),
    }

    let goals_png = output_dir.join("goal_map.png");
    match plot::render_goal_map(&goals_png, &report.goals, &scenario.field, (900, 500)) {
        Ok(()) => println!("Goal map: {}", goals_png.display()),
        Err(err) => tracing::warn!(error = %err, "failed to render goal map"),
    }
}
