//! SVG figure rendering.
//!
//! Every figure is a titled grid of subplots, three per row, each
//! 500×400 px. Trailing cells of the last row stay blank. Rendering uses
//! the [`plotters`] SVG backend, which needs no system fonts and works in
//! headless environments.

use std::path::Path;

use plotters::coord::Shift;
use plotters::prelude::*;

use crate::distribution::{BoxplotStats, HistogramResult};
use crate::error::EdaError;

/// Subplots per grid row.
pub const GRID_COLUMNS: usize = 3;

/// Pixel size of a single subplot cell.
pub const CELL_SIZE: (u32, u32) = (500, 400);

const TITLE_HEIGHT: u32 = 60;
const BAR_COLOR: RGBColor = RGBColor(31, 119, 180);
const MEDIAN_COLOR: RGBColor = RGBColor(255, 127, 14);
const MAX_LABEL_CHARS: usize = 12;

type Cell<'a> = DrawingArea<SVGBackend<'a>, Shift>;

/// Content of one subplot.
#[derive(Debug, Clone)]
pub enum PanelData {
    /// Bar chart of `(label, frequency)` pairs, drawn left to right.
    Bars(Vec<(String, usize)>),
    /// Histogram with black bar edges.
    Histogram(HistogramResult),
    /// Single vertical boxplot.
    Boxplot(BoxplotStats),
    /// Title only.
    Empty,
}

/// A titled subplot.
#[derive(Debug, Clone)]
pub struct Panel {
    /// Subplot title (usually the column name).
    pub title: String,
    /// What to draw.
    pub data: PanelData,
}

/// Returns `(rows, columns)` for a grid holding `n_panels` subplots.
///
/// ```
/// use u_eda::plot::grid_shape;
///
/// assert_eq!(grid_shape(1), (1, 3));
/// assert_eq!(grid_shape(3), (1, 3));
/// assert_eq!(grid_shape(7), (3, 3));
/// ```
pub fn grid_shape(n_panels: usize) -> (usize, usize) {
    (n_panels.div_ceil(GRID_COLUMNS), GRID_COLUMNS)
}

/// Renders `panels` as a titled subplot grid into an SVG file at `path`.
pub fn render_grid(path: &Path, title: &str, panels: &[Panel]) -> Result<(), EdaError> {
    if panels.is_empty() {
        return Err(EdaError::InsufficientData {
            min_required: 1,
            actual: 0,
        });
    }

    let (rows, cols) = grid_shape(panels.len());
    let size = (
        CELL_SIZE.0 * cols as u32,
        CELL_SIZE.1 * rows as u32 + TITLE_HEIGHT,
    );

    let root = SVGBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE).map_err(plot_error)?;
    let body = root
        .titled(title, ("sans-serif", 28))
        .map_err(plot_error)?;
    let cells = body.split_evenly((rows, cols));

    for (panel, cell) in panels.iter().zip(cells.iter()) {
        match &panel.data {
            PanelData::Bars(counts) => draw_bars(cell, &panel.title, counts)?,
            PanelData::Histogram(hist) => draw_histogram(cell, &panel.title, hist)?,
            PanelData::Boxplot(stats) => draw_boxplot(cell, &panel.title, stats)?,
            PanelData::Empty => {
                cell.titled(&panel.title, ("sans-serif", 18))
                    .map_err(plot_error)?;
            }
        }
    }

    root.present().map_err(plot_error)?;
    log::info!("wrote figure '{title}' to {}", path.display());
    Ok(())
}

fn plot_error<E: std::fmt::Display>(e: E) -> EdaError {
    EdaError::Plot(e.to_string())
}

fn short_label(label: &str) -> String {
    if label.chars().count() <= MAX_LABEL_CHARS {
        label.to_string()
    } else {
        let head: String = label.chars().take(MAX_LABEL_CHARS - 1).collect();
        format!("{head}…")
    }
}

/// Pads a value range so a constant series still gets a visible axis.
fn padded(lo: f64, hi: f64) -> (f64, f64) {
    if lo < hi {
        let pad = (hi - lo) * 0.05;
        (lo - pad, hi + pad)
    } else {
        (lo - 0.5, hi + 0.5)
    }
}

fn draw_bars(cell: &Cell<'_>, title: &str, counts: &[(String, usize)]) -> Result<(), EdaError> {
    let k = counts.len().max(1);
    let y_max = counts.iter().map(|(_, c)| *c).max().unwrap_or(0).max(1) as f64 * 1.05;

    let mut chart = ChartBuilder::on(cell)
        .caption(title, ("sans-serif", 18))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(-0.5f64..(k as f64 - 0.5), 0f64..y_max)
        .map_err(plot_error)?;

    let label_at = |x: &f64| {
        let i = x.round();
        if (x - i).abs() > 1e-6 || i < 0.0 {
            return String::new();
        }
        counts
            .get(i as usize)
            .map(|(label, _)| short_label(label))
            .unwrap_or_default()
    };

    chart
        .configure_mesh()
        .disable_x_mesh()
        .bold_line_style(BLACK.mix(0.2))
        .light_line_style(TRANSPARENT)
        .x_labels(k)
        .x_label_formatter(&label_at)
        .y_desc("Frequency")
        .draw()
        .map_err(plot_error)?;

    chart
        .draw_series(counts.iter().enumerate().map(|(i, (_, count))| {
            let x = i as f64;
            Rectangle::new([(x - 0.4, 0.0), (x + 0.4, *count as f64)], BAR_COLOR.filled())
        }))
        .map_err(plot_error)?;

    Ok(())
}

fn draw_histogram(cell: &Cell<'_>, title: &str, hist: &HistogramResult) -> Result<(), EdaError> {
    let (Some(&lo), Some(&hi)) = (hist.edges.first(), hist.edges.last()) else {
        return Ok(());
    };
    let y_max = hist.max_count().max(1) as f64 * 1.05;

    let mut chart = ChartBuilder::on(cell)
        .caption(title, ("sans-serif", 18))
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(lo..hi, 0f64..y_max)
        .map_err(plot_error)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .bold_line_style(BLACK.mix(0.2))
        .light_line_style(TRANSPARENT)
        .x_labels(6)
        .y_desc("Frequency")
        .draw()
        .map_err(plot_error)?;

    let bars = || {
        hist.edges
            .windows(2)
            .zip(hist.counts.iter())
            .map(|(edge, &count)| [(edge[0], 0.0), (edge[1], count as f64)])
    };

    chart
        .draw_series(bars().map(|corners| Rectangle::new(corners, BAR_COLOR.filled())))
        .map_err(plot_error)?;
    chart
        .draw_series(bars().map(|corners| Rectangle::new(corners, BLACK.stroke_width(1))))
        .map_err(plot_error)?;

    Ok(())
}

fn draw_boxplot(cell: &Cell<'_>, title: &str, stats: &BoxplotStats) -> Result<(), EdaError> {
    let (y_lo, y_hi) = padded(stats.lower_extent(), stats.upper_extent());

    let mut chart = ChartBuilder::on(cell)
        .caption(title, ("sans-serif", 18))
        .margin(10)
        .x_label_area_size(20)
        .y_label_area_size(60)
        .build_cartesian_2d(0.5f64..1.5f64, y_lo..y_hi)
        .map_err(plot_error)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .bold_line_style(BLACK.mix(0.2))
        .light_line_style(TRANSPARENT)
        .x_labels(1)
        .x_label_formatter(&|_| String::new())
        .draw()
        .map_err(plot_error)?;

    chart
        .draw_series(std::iter::once(Rectangle::new(
            [(0.85, stats.q1), (1.15, stats.q3)],
            BLACK.stroke_width(1),
        )))
        .map_err(plot_error)?;

    let segments = [
        vec![(0.85, stats.median), (1.15, stats.median)],
        vec![(1.0, stats.whisker_low), (1.0, stats.q1)],
        vec![(1.0, stats.q3), (1.0, stats.whisker_high)],
        vec![(0.93, stats.whisker_low), (1.07, stats.whisker_low)],
        vec![(0.93, stats.whisker_high), (1.07, stats.whisker_high)],
    ];
    chart
        .draw_series(segments.into_iter().enumerate().map(|(i, points)| {
            let style = if i == 0 {
                MEDIAN_COLOR.stroke_width(2)
            } else {
                BLACK.stroke_width(1)
            };
            PathElement::new(points, style)
        }))
        .map_err(plot_error)?;

    chart
        .draw_series(
            stats
                .outliers
                .iter()
                .map(|&o| Circle::new((1.0, o), 3, BLACK.stroke_width(1))),
        )
        .map_err(plot_error)?;

    Ok(())
}
