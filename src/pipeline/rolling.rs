//! Trailing rolling averages, computed per country and per indicator

use anyhow::{Context, Result};
use polars::prelude::*;

use crate::pipeline::{Indicator, COUNTRY_COLUMN, YEAR_COLUMN};

/// Window settings for the rolling averages
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RollingConfig {
    /// Number of periods in the trailing window, the current one included
    pub window: usize,
    /// Observations required in the window before a value is produced
    pub min_periods: usize,
}

impl Default for RollingConfig {
    fn default() -> Self {
        Self {
            window: 20,
            min_periods: 1,
        }
    }
}

impl RollingConfig {
    pub fn new(window: usize, min_periods: usize) -> Result<Self> {
        if window == 0 {
            anyhow::bail!("Rolling window must be at least 1");
        }
        if min_periods == 0 {
            anyhow::bail!("min_periods must be at least 1");
        }
        if min_periods > window {
            anyhow::bail!(
                "min_periods ({}) cannot exceed the rolling window ({})",
                min_periods,
                window
            );
        }
        Ok(Self {
            window,
            min_periods,
        })
    }

    fn options(&self) -> RollingOptionsFixedWindow {
        RollingOptionsFixedWindow {
            window_size: self.window,
            min_periods: self.min_periods,
            ..Default::default()
        }
    }
}

/// Trailing rolling mean of a single series.
///
/// Missing values occupy a slot in the window but are left out of the mean.
/// A position yields `None` while fewer than `min_periods` observations are
/// in its window.
pub fn rolling_mean(values: &[Option<f64>], config: RollingConfig) -> Result<Vec<Option<f64>>> {
    let df = DataFrame::new(vec![Column::new("value".into(), values)])?;

    let out = df
        .lazy()
        .select([col("value").rolling_mean(config.options())])
        .collect()
        .context("Failed to compute rolling mean")?;

    Ok(out.column("value")?.f64()?.into_iter().collect())
}

/// Append one rolling-average column per indicator.
///
/// The table is sorted by country and year first; each country's series is
/// averaged on its own. Every average column is placed right after the raw
/// indicator it summarizes, and raw indicators come out as `Float64`.
pub fn add_rolling_averages(df: &DataFrame, config: RollingConfig) -> Result<DataFrame> {
    for indicator in Indicator::ALL {
        let raw = df
            .column(indicator.column())
            .with_context(|| format!("Column '{}' not found", indicator.column()))?;
        if !raw.dtype().is_primitive_numeric() {
            anyhow::bail!(
                "Column '{}' is not numeric (found {})",
                indicator.column(),
                raw.dtype()
            );
        }
    }

    let averages: Vec<Expr> = Indicator::ALL
        .iter()
        .map(|indicator| {
            col(indicator.column())
                .cast(DataType::Float64)
                .rolling_mean(config.options())
                .over([col(COUNTRY_COLUMN)])
                .alias(indicator.average_column())
        })
        .collect();

    let mut ordered = vec![col(COUNTRY_COLUMN), col(YEAR_COLUMN)];
    for indicator in Indicator::ALL {
        ordered.push(col(indicator.column()).cast(DataType::Float64));
        ordered.push(col(indicator.average_column()));
    }
    let known: Vec<&str> = Indicator::ALL
        .iter()
        .flat_map(|i| [i.column(), i.average_column()])
        .chain([COUNTRY_COLUMN, YEAR_COLUMN])
        .collect();
    ordered.extend(
        df.get_column_names()
            .into_iter()
            .filter(|name| !known.contains(&name.as_str()))
            .map(|name| col(name.clone())),
    );

    let out = df
        .clone()
        .lazy()
        .sort([COUNTRY_COLUMN, YEAR_COLUMN], SortMultipleOptions::default())
        .with_columns(averages)
        .select(ordered)
        .collect()
        .context("Failed to compute rolling averages")?;

    log::debug!(
        "rolling averages over {} rows (window {}, min_periods {})",
        out.height(),
        config.window,
        config.min_periods
    );

    Ok(out)
}
