//! Plot module - SVG line charts, correlation heatmap and pairplot

pub mod heatmap;
pub mod line;
pub mod pairplot;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::pipeline::Indicator;

pub use heatmap::*;
pub use line::*;
pub use pairplot::*;

/// Countries to compare on one indicator's rolling average
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlotSpec {
    pub indicator: Indicator,
    pub countries: Vec<String>,
}

impl PlotSpec {
    pub fn new(indicator: Indicator, countries: &[&str]) -> Self {
        Self {
            indicator,
            countries: countries.iter().map(|c| c.to_string()).collect(),
        }
    }

    /// File name for the `index`-th spec, e.g. `line_01_avg_income.svg`
    pub fn file_name(&self, index: usize) -> String {
        format!("line_{:02}_{}.svg", index + 1, self.indicator.average_column())
    }
}

/// The three comparisons rendered when no plot file is given
pub fn default_plot_specs() -> Vec<PlotSpec> {
    vec![
        PlotSpec::new(
            Indicator::ChildMortality,
            &["Norway", "Sweden", "Denmark", "Brazil", "Panama", "Bolivia"],
        ),
        PlotSpec::new(
            Indicator::Income,
            &["Malaysia", "South Korea", "Japan", "Benin", "Nigeria", "Kenya"],
        ),
        PlotSpec::new(
            Indicator::LifeExpectancy,
            &[
                "Tajikistan",
                "Kazakhstan",
                "Uzbekistan",
                "Switzerland",
                "Canada",
                "United Kingdom",
            ],
        ),
    ]
}

/// Read plot specifications from a JSON array.
///
/// ```json
/// [{ "indicator": "income", "countries": ["Japan", "Kenya"] }]
/// ```
pub fn load_plot_specs(path: &Path) -> Result<Vec<PlotSpec>> {
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read plot specifications: {}", path.display()))?;
    let specs: Vec<PlotSpec> = serde_json::from_str(&contents)
        .with_context(|| format!("Invalid plot specifications in {}", path.display()))?;

    if let Some(empty) = specs.iter().find(|s| s.countries.is_empty()) {
        anyhow::bail!(
            "Plot specification for {} lists no countries ({})",
            empty.indicator,
            path.display()
        );
    }

    Ok(specs)
}

/// Paths of every rendered plot, for the analysis export
#[derive(Debug, Clone, Default, Serialize)]
pub struct RenderedPlots {
    pub line_plots: Vec<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub heatmap: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pairplot: Option<PathBuf>,
}

impl RenderedPlots {
    pub fn count(&self) -> usize {
        self.line_plots.len() + self.heatmap.iter().count() + self.pairplot.iter().count()
    }
}

/// Lower and upper bounds of a series, padded so flat series still get a range
pub(crate) fn padded_bounds(values: impl IntoIterator<Item = f64>) -> Option<(f64, f64)> {
    let (min, max) = values
        .into_iter()
        .filter(|v| v.is_finite())
        .fold(None, |acc: Option<(f64, f64)>, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
        })?;

    if min == max {
        return Some((min - 1.0, max + 1.0));
    }

    let pad = (max - min) * 0.05;
    Some((min - pad, max + pad))
}
