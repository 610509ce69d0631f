use std::path::PathBuf;

use clap::Parser;
use olympic_goal::export::trajectory::write_trajectory;
use olympic_goal::flight::{CrossingKind, KickParameters};
use olympic_goal::scenario::{Scenario, SearchOverrides};

/// Simulate a single corner kick and print how it ends.
#[derive(Parser, Debug)]
#[command(author, version, about = "Simulate one corner kick")]
struct Cli {
    /// Launch speed in m/s
    #[arg(long)]
    speed: f64,

    /// Elevation above the ground plane in degrees
    #[arg(long, allow_negative_numbers = true)]
    elevation: f64,

    /// Azimuth from the goal line towards the pitch in degrees
    #[arg(long, allow_negative_numbers = true)]
    azimuth: f64,

    /// Spin about the vertical axis in rad/s (negative curls towards goal)
    #[arg(long, allow_negative_numbers = true)]
    spin: f64,

    /// Scenario file for ball, field, and simulation settings
    #[arg(long)]
    config: Option<PathBuf>,

    /// Write the sampled trajectory as CSV (use '-' for stdout)
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    olympic_cli::init_tracing();
    let cli = Cli::parse();

    let scenario = Scenario::load(cli.config.as_deref(), &SearchOverrides::default())?;
    let kick = KickParameters::new(cli.speed, cli.elevation, cli.azimuth, cli.spin);
    let result = scenario.simulate(&kick)?;

    let verdict = match (result.is_goal, result.is_near_post) {
        (true, true) => "GOAL (near post)",
        (true, false) => "GOAL (far post)",
        (false, _) => "MISS",
    };
    println!("Outcome: {verdict}");
    println!("Termination: {}", result.termination.as_str());
    println!("Flight time: {:.3} s", result.flight_time);
    if let Some(crossing) = result.crossing {
        let kind = match crossing.kind {
            CrossingKind::Inside => "inside",
            CrossingKind::Frame => "frame",
            CrossingKind::Wide => "wide",
        };
        println!(
            "Goal-line crossing: y = {:+.3} m, z = {:.3} m ({kind})",
            crossing.y_m, crossing.z_m
        );
    }
    println!(
        "Closest approach to goal centre: {:.3} m",
        result.min_distance_to_target
    );
    println!("Max height: {:.2} m", result.max_height());
    println!("Samples: {}", result.samples.len());

    if let Some(path) = cli.output.as_ref() {
        write_trajectory(path, &result)?;
        if path.as_os_str() != "-" {
            println!("Trajectory CSV: {}", path.display());
        }
    }

    Ok(())
}
