//! Rolling-average line charts, one series per country

use std::path::{Path, PathBuf};

use anyhow::Result;
use plotters::prelude::*;

use crate::pipeline::CountryYearRecord;
use crate::plot::{padded_bounds, PlotSpec};

const LINE_PLOT_SIZE: (u32, u32) = (1600, 800);

/// What a line plot ended up showing
#[derive(Debug, Clone)]
pub struct LinePlotOutcome {
    pub path: PathBuf,
    pub plotted: Vec<String>,
    /// Requested countries absent from the table
    pub missing: Vec<String>,
}

/// Per-country (year, rolling average) series for a plot spec, in request order.
///
/// Years without an average are left out; a country with no averaged year
/// at all is reported as missing.
pub fn collect_series(
    records: &[CountryYearRecord],
    spec: &PlotSpec,
) -> (Vec<(String, Vec<(i32, f64)>)>, Vec<String>) {
    let mut series = Vec::new();
    let mut missing = Vec::new();

    for country in &spec.countries {
        let mut points: Vec<(i32, f64)> = records
            .iter()
            .filter(|r| &r.country == country)
            .filter_map(|r| r.average(spec.indicator).map(|avg| (r.year, avg)))
            .collect();

        if points.is_empty() {
            missing.push(country.clone());
            continue;
        }

        points.sort_by_key(|(year, _)| *year);
        series.push((country.clone(), points));
    }

    (series, missing)
}

/// Render the rolling averages of the spec's countries to an SVG file
pub fn render_line_plot(
    records: &[CountryYearRecord],
    spec: &PlotSpec,
    window: usize,
    path: &Path,
) -> Result<LinePlotOutcome> {
    let (series, missing) = collect_series(records, spec);
    if series.is_empty() {
        anyhow::bail!(
            "None of the countries {:?} are present in the table",
            spec.countries
        );
    }

    let years = series.iter().flat_map(|(_, points)| points.iter().map(|(y, _)| *y));
    let min_year = years.clone().min().unwrap_or(0);
    let max_year = years.max().unwrap_or(0).max(min_year + 1);

    let (min_y, max_y) = padded_bounds(
        series
            .iter()
            .flat_map(|(_, points)| points.iter().map(|(_, v)| *v)),
    )
    .unwrap_or((0.0, 1.0));

    let root = SVGBackend::new(path, LINE_PLOT_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(spec.indicator.plot_title(window), ("sans-serif", 32))
        .margin(20)
        .x_label_area_size(60)
        .y_label_area_size(90)
        .build_cartesian_2d(min_year..max_year, min_y..max_y)?;

    chart
        .configure_mesh()
        .x_desc("year")
        .y_desc(spec.indicator.label())
        .axis_desc_style(("sans-serif", 22))
        .label_style(("sans-serif", 16))
        .draw()?;

    for (idx, (country, points)) in series.iter().enumerate() {
        let color = Palette99::pick(idx).to_rgba();
        chart
            .draw_series(LineSeries::new(points.iter().copied(), color.stroke_width(2)))?
            .label(country.as_str())
            .legend(move |(x, y)| {
                PathElement::new(vec![(x, y), (x + 24, y)], color.stroke_width(3))
            });
    }

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::UpperLeft)
        .background_style(WHITE.mix(0.85))
        .border_style(BLACK)
        .label_font(("sans-serif", 20))
        .draw()?;

    root.present()?;

    if !missing.is_empty() {
        log::warn!(
            "{}: no data for {}",
            path.display(),
            missing.join(", ")
        );
    }

    Ok(LinePlotOutcome {
        path: path.to_path_buf(),
        plotted: series.into_iter().map(|(country, _)| country).collect(),
        missing,
    })
}
