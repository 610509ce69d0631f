use std::path::PathBuf;

use anyhow::anyhow;
use clap::Parser;
use olympic_goal::export::goals::read_goals;
use olympic_goal::export::trajectory::read_trajectory;
use olympic_goal::plot::{self, PlotTrajectory};
use olympic_goal::scenario::{Scenario, SearchOverrides};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Render exported trajectory and goal CSVs to PNG"
)]
struct Cli {
    /// Trajectory CSVs written by `kick` or `corner_search`
    #[arg(long, num_args = 1..)]
    input: Vec<PathBuf>,
    #[arg(long, default_value = "artifacts/trajectories.png")]
    output: PathBuf,
    /// goals.csv written by `corner_search`
    #[arg(long)]
    goals: Option<PathBuf>,
    #[arg(long, default_value = "artifacts/goal_map.png")]
    goal_map: PathBuf,
    /// Scenario file providing the field geometry
    #[arg(long)]
    config: Option<PathBuf>,
    #[arg(long, default_value_t = 1400)]
    width: u32,
    #[arg(long, default_value_t = 700)]
    height: u32,
}

fn main() -> anyhow::Result<()> {
    olympic_cli::init_tracing();
    let cli = Cli::parse();
    if cli.input.is_empty() && cli.goals.is_none() {
        return Err(anyhow!("nothing to plot: pass --input and/or --goals"));
    }

    let field = Scenario::load(cli.config.as_deref(), &SearchOverrides::default())?.field;

    if !cli.input.is_empty() {
        let mut trajectories = Vec::with_capacity(cli.input.len());
        for path in &cli.input {
            let rows = read_trajectory(path)?;
            let label = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or("trajectory")
                .to_string();
            trajectories.push(PlotTrajectory {
                label,
                points: rows.iter().map(|r| [r.x_m, r.y_m, r.z_m]).collect(),
            });
        }
        plot::render_trajectories(&cli.output, &trajectories, &field, (cli.width, cli.height))?;
        println!("Trajectory plot: {}", cli.output.display());
    }

    if let Some(goals_path) = cli.goals.as_ref() {
        let goals = read_goals(goals_path)?;
        plot::render_goal_map(&cli.goal_map, &goals, &field, (cli.width, cli.height))?;
        println!("Goal map: {}", cli.goal_map.display());
    }

    Ok(())
}
