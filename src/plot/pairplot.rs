//! Pairplot: scatter grid with histograms on the diagonal

use std::path::Path;

use anyhow::Result;
use plotters::prelude::*;

use crate::pipeline::{CountryYearRecord, Indicator};
use crate::plot::padded_bounds;

/// Scatter panels draw at most this many points
pub const PAIRPLOT_MAX_POINTS: usize = 5_000;

const PANEL_SIZE: u32 = 400;
const HISTOGRAM_BINS: usize = 20;

/// Every `step`-th value so that at most `max_points` remain
pub fn sample_evenly<T: Copy>(values: &[T], max_points: usize) -> Vec<T> {
    if max_points == 0 || values.len() <= max_points {
        return values.to_vec();
    }
    let step = values.len().div_ceil(max_points);
    values.iter().step_by(step).copied().collect()
}

/// Equal-width histogram: `(lower, upper, count)` per bin
pub fn histogram(values: &[f64], bins: usize) -> Vec<(f64, f64, usize)> {
    let Some((min, max)) = values
        .iter()
        .copied()
        .filter(|v| v.is_finite())
        .fold(None, |acc: Option<(f64, f64)>, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })
    else {
        return Vec::new();
    };

    let bins = bins.max(1);
    let (min, max) = if min == max { (min - 0.5, max + 0.5) } else { (min, max) };
    let width = (max - min) / bins as f64;

    let mut counts = vec![0usize; bins];
    for v in values.iter().filter(|v| v.is_finite()) {
        let idx = (((v - min) / width) as usize).min(bins - 1);
        counts[idx] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| {
            let lower = min + i as f64 * width;
            (lower, lower + width, count)
        })
        .collect()
}

/// Render an n×n grid over the given record columns
pub fn render_pairplot(records: &[CountryYearRecord], columns: &[&str], path: &Path) -> Result<()> {
    if records.is_empty() {
        anyhow::bail!("Cannot draw a pairplot without records");
    }

    let mut data: Vec<Vec<Option<f64>>> = Vec::with_capacity(columns.len());
    for name in columns {
        if Indicator::from_column(name).is_none() {
            anyhow::bail!("Unknown column for pairplot: '{}'", name);
        }
        data.push(records.iter().map(|r| r.field(name)).collect());
    }

    let n = columns.len();
    let side = PANEL_SIZE * n as u32;
    let root = SVGBackend::new(path, (side, side)).into_drawing_area();
    root.fill(&WHITE)?;

    let panels = root.split_evenly((n, n));
    let color = Palette99::pick(0).to_rgba();

    for (idx, panel) in panels.iter().enumerate() {
        let (row, col) = (idx / n, idx % n);
        let x_desc = if row == n - 1 { columns[col] } else { "" };
        let y_desc = if col == 0 { columns[row] } else { "" };

        let (x_min, x_max) =
            padded_bounds(data[col].iter().flatten().copied()).unwrap_or((0.0, 1.0));

        if row == col {
            let present: Vec<f64> = data[col].iter().flatten().copied().collect();
            let bins = histogram(&present, HISTOGRAM_BINS);
            let top = bins.iter().map(|(_, _, c)| *c).max().unwrap_or(1).max(1) as f64;

            let mut chart = ChartBuilder::on(panel)
                .margin(10)
                .x_label_area_size(40)
                .y_label_area_size(60)
                .build_cartesian_2d(x_min..x_max, 0.0..top * 1.05)?;
            chart
                .configure_mesh()
                .x_labels(4)
                .y_labels(4)
                .x_desc(x_desc)
                .y_desc(y_desc)
                .draw()?;
            chart.draw_series(bins.iter().map(|&(lower, upper, count)| {
                Rectangle::new([(lower, 0.0), (upper, count as f64)], color.mix(0.6).filled())
            }))?;
        } else {
            let (y_min, y_max) =
                padded_bounds(data[row].iter().flatten().copied()).unwrap_or((0.0, 1.0));
            // Points missing either average are left out of the panel
            let points: Vec<(f64, f64)> = data[col]
                .iter()
                .zip(&data[row])
                .filter_map(|(x, y)| x.zip(*y))
                .collect();

            let mut chart = ChartBuilder::on(panel)
                .margin(10)
                .x_label_area_size(40)
                .y_label_area_size(60)
                .build_cartesian_2d(x_min..x_max, y_min..y_max)?;
            chart
                .configure_mesh()
                .x_labels(4)
                .y_labels(4)
                .x_desc(x_desc)
                .y_desc(y_desc)
                .draw()?;
            chart.draw_series(
                sample_evenly(&points, PAIRPLOT_MAX_POINTS)
                    .into_iter()
                    .map(|p| Circle::new(p, 2, color.mix(0.4).filled())),
            )?;
        }
    }

    root.present()?;
    Ok(())
}
