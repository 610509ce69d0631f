//! PNG rendering of trajectories and goal-mouth crossings.

use std::fs;
use std::path::Path;

use plotters::prelude::*;
use thiserror::Error;

use olympic_flight::{FieldGeometry, TrajectoryResult};
use olympic_search::GoalRecord;

#[derive(Debug, Error)]
pub enum PlotError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("nothing to plot")]
    Empty,
    #[error("drawing failed: {0}")]
    Drawing(String),
}

type DrawResult = Result<(), Box<dyn std::error::Error>>;

const PALETTE: [RGBColor; 6] = [
    RGBColor(31, 119, 180),
    RGBColor(214, 39, 40),
    RGBColor(44, 160, 44),
    RGBColor(255, 127, 14),
    RGBColor(148, 103, 189),
    RGBColor(140, 86, 75),
];

/// One labelled polyline of ball positions.
#[derive(Debug, Clone, PartialEq)]
pub struct PlotTrajectory {
    pub label: String,
    pub points: Vec<[f64; 3]>,
}

impl PlotTrajectory {
    pub fn from_result(label: impl Into<String>, result: &TrajectoryResult) -> Self {
        Self {
            label: label.into(),
            points: result
                .samples
                .iter()
                .map(|sample| sample.state.position)
                .collect(),
        }
    }
}

/// Render a top view (x, y) and a goal-line view (y, z) side by side.
pub fn render_trajectories(
    output: &Path,
    trajectories: &[PlotTrajectory],
    field: &FieldGeometry,
    size: (u32, u32),
) -> Result<(), PlotError> {
    if trajectories.iter().all(|t| t.points.is_empty()) {
        return Err(PlotError::Empty);
    }
    ensure_parent(output)?;
    draw_trajectories(output, trajectories, field, size)
        .map_err(|err| PlotError::Drawing(err.to_string()))
}

/// Scatter goal-mouth crossing points, near-post goals highlighted.
pub fn render_goal_map(
    output: &Path,
    goals: &[GoalRecord],
    field: &FieldGeometry,
    size: (u32, u32),
) -> Result<(), PlotError> {
    if goals.is_empty() {
        return Err(PlotError::Empty);
    }
    ensure_parent(output)?;
    draw_goal_map(output, goals, field, size).map_err(|err| PlotError::Drawing(err.to_string()))
}

fn ensure_parent(output: &Path) -> std::io::Result<()> {
    if let Some(parent) = output.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }
    Ok(())
}

fn select_font_family() -> FontFamily<'static> {
    if cfg!(target_os = "macos") {
        FontFamily::Name("Helvetica")
    } else if cfg!(target_os = "windows") {
        FontFamily::Name("Arial")
    } else {
        FontFamily::Name("DejaVu Sans")
    }
}

/// Padded `(min, max)` over `values`, widened to include `extra`.
fn padded_range(values: impl Iterator<Item = f64>, extra: [f64; 2], pad: f64) -> (f64, f64) {
    let (lo, hi) = values
        .chain(extra)
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    (lo - pad, hi + pad)
}

fn draw_trajectories(
    output: &Path,
    trajectories: &[PlotTrajectory],
    field: &FieldGeometry,
    size: (u32, u32),
) -> DrawResult {
    let root = BitMapBackend::new(output, size).into_drawing_area();
    root.fill(&WHITE)?;

    let font_family = select_font_family();
    let caption_font = FontDesc::new(font_family, 22.0, FontStyle::Bold);
    let label_font = FontDesc::new(font_family, 15.0, FontStyle::Normal);
    let half_goal = 0.5 * field.goal_width_m;

    let (top_area, side_area) = root.split_horizontally((size.0 as i32 * 3 / 5).max(200));
    let all_points = || trajectories.iter().flat_map(|t| t.points.iter());

    {
        let x_range = padded_range(all_points().map(|p| p[0]), [-field.goal_depth_m, 0.0], 1.0);
        let y_range = padded_range(all_points().map(|p| p[1]), [-half_goal, half_goal], 1.0);
        let mut chart = ChartBuilder::on(&top_area)
            .margin(20)
            .caption("Top view", caption_font.clone())
            .x_label_area_size(40)
            .y_label_area_size(50)
            .build_cartesian_2d(x_range.0..x_range.1, y_range.0..y_range.1)?;
        chart
            .configure_mesh()
            .x_desc("x (m)")
            .y_desc("y (m)")
            .label_style(label_font.clone())
            .draw()?;

        chart.draw_series(std::iter::once(PathElement::new(
            vec![(0.0, -half_goal), (0.0, half_goal)],
            ShapeStyle::from(&BLACK).stroke_width(4),
        )))?;
        chart.draw_series(std::iter::once(PathElement::new(
            vec![
                (0.0, -half_goal),
                (-field.goal_depth_m, -half_goal),
                (-field.goal_depth_m, half_goal),
                (0.0, half_goal),
            ],
            ShapeStyle::from(&BLACK.mix(0.4)).stroke_width(1),
        )))?;

        for (index, trajectory) in trajectories.iter().enumerate() {
            let color = PALETTE[index % PALETTE.len()];
            chart
                .draw_series(LineSeries::new(
                    trajectory.points.iter().map(|p| (p[0], p[1])),
                    ShapeStyle::from(&color).stroke_width(2),
                ))?
                .label(trajectory.label.clone())
                .legend(move |(x, y)| {
                    PathElement::new(vec![(x, y), (x + 20, y)], ShapeStyle::from(&color))
                });
        }

        chart
            .configure_series_labels()
            .label_font(label_font.clone())
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;
    }

    {
        let y_range = padded_range(all_points().map(|p| p[1]), [-half_goal, half_goal], 0.5);
        let z_top = all_points()
            .map(|p| p[2])
            .fold(field.goal_height_m, f64::max)
            + 0.5;
        let mut chart = ChartBuilder::on(&side_area)
            .margin(20)
            .caption("Goal-line view", caption_font)
            .x_label_area_size(40)
            .y_label_area_size(50)
            .build_cartesian_2d(y_range.0..y_range.1, 0.0..z_top)?;
        chart
            .configure_mesh()
            .x_desc("y (m)")
            .y_desc("z (m)")
            .label_style(label_font)
            .draw()?;

        chart.draw_series(std::iter::once(PathElement::new(
            goal_frame(field),
            ShapeStyle::from(&BLACK).stroke_width(3),
        )))?;

        for (index, trajectory) in trajectories.iter().enumerate() {
            let color = PALETTE[index % PALETTE.len()];
            chart.draw_series(LineSeries::new(
                trajectory.points.iter().map(|p| (p[1], p[2])),
                ShapeStyle::from(&color).stroke_width(2),
            ))?;
        }
    }

    root.present()?;
    Ok(())
}

fn draw_goal_map(
    output: &Path,
    goals: &[GoalRecord],
    field: &FieldGeometry,
    size: (u32, u32),
) -> DrawResult {
    let root = BitMapBackend::new(output, size).into_drawing_area();
    root.fill(&WHITE)?;

    let font_family = select_font_family();
    let caption_font = FontDesc::new(font_family, 22.0, FontStyle::Bold);
    let label_font = FontDesc::new(font_family, 15.0, FontStyle::Normal);
    let half_goal = 0.5 * field.goal_width_m;

    let mut chart = ChartBuilder::on(&root)
        .margin(20)
        .caption(
            format!("Goal-mouth crossings ({} goals)", goals.len()),
            caption_font,
        )
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(
            -half_goal - 0.5..half_goal + 0.5,
            0.0..field.goal_height_m + 0.5,
        )?;
    chart
        .configure_mesh()
        .x_desc("y (m)")
        .y_desc("z (m)")
        .label_style(label_font.clone())
        .draw()?;

    chart.draw_series(std::iter::once(PathElement::new(
        goal_frame(field),
        ShapeStyle::from(&BLACK).stroke_width(3),
    )))?;
    let near_edge = field.near_post_y() + field.near_post_distance_m;
    chart.draw_series(std::iter::once(PathElement::new(
        vec![(near_edge, 0.0), (near_edge, field.goal_height_m)],
        ShapeStyle::from(&BLACK.mix(0.4)).stroke_width(1),
    )))?;

    let near = RGBColor(214, 39, 40);
    let far = RGBColor(31, 119, 180);
    chart
        .draw_series(
            goals
                .iter()
                .filter(|g| g.is_near_post)
                .map(|g| Circle::new((g.y_pos, g.z_pos), 4, near.filled())),
        )?
        .label("near post")
        .legend(move |(x, y)| Circle::new((x + 10, y), 4, near.filled()));
    chart
        .draw_series(
            goals
                .iter()
                .filter(|g| !g.is_near_post)
                .map(|g| Circle::new((g.y_pos, g.z_pos), 4, far.filled())),
        )?
        .label("far post")
        .legend(move |(x, y)| Circle::new((x + 10, y), 4, far.filled()));

    chart
        .configure_series_labels()
        .label_font(label_font)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    Ok(())
}

fn goal_frame(field: &FieldGeometry) -> Vec<(f64, f64)> {
    let half_goal = 0.5 * field.goal_width_m;
    vec![
        (-half_goal, 0.0),
        (-half_goal, field.goal_height_m),
        (half_goal, field.goal_height_m),
        (half_goal, 0.0),
    ]
}
