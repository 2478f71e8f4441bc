//! Wide-to-long reshaping and the (country, year) merge

use std::collections::HashSet;

use anyhow::{Context, Result};
use polars::prelude::*;

use crate::pipeline::{column_to_raw_values, raw_values_to_column, RawValue, COUNTRY_COLUMN};

/// Name of the year column in long-format tables
pub const YEAR_COLUMN: &str = "year";

/// Parse a column header as a calendar year.
///
/// Accepts integer headers (`"1800"`) and float-formatted headers (`"1800.0"`)
/// as written by some spreadsheet exports.
pub fn parse_year_header(header: &str) -> Option<i32> {
    let trimmed = header.trim();
    if let Ok(year) = trimmed.parse::<i32>() {
        return Some(year);
    }
    let value: f64 = trimmed.parse().ok()?;
    if value.fract() == 0.0 && value >= i32::MIN as f64 && value <= i32::MAX as f64 {
        Some(value as i32)
    } else {
        None
    }
}

/// Reshape a wide table into long format.
///
/// Output columns are `country`, `year` and `value_name`. Rows are emitted
/// year by year, and within a year in source row order. Columns whose header
/// is not a year are skipped, as are rows without a country.
///
/// The value column is `Float64` when every melted cell is numeric and
/// `String` as soon as one cell holds text.
pub fn melt_wide_table(wide: &DataFrame, value_name: &str) -> Result<DataFrame> {
    let countries = wide
        .column(COUNTRY_COLUMN)
        .context("Wide table has no country column")?
        .cast(&DataType::String)?;
    let countries = countries.str()?;

    let mut out_countries: Vec<String> = Vec::new();
    let mut out_years: Vec<i32> = Vec::new();
    let mut out_values: Vec<RawValue> = Vec::new();

    for column in wide.get_columns() {
        let name = column.name().as_str();
        if name == COUNTRY_COLUMN {
            continue;
        }

        let Some(year) = parse_year_header(name) else {
            log::debug!("skipping non-year column '{}'", name);
            continue;
        };

        let values = column_to_raw_values(column)
            .with_context(|| format!("Failed to read values of column '{}'", name))?;

        for (country, value) in countries.into_iter().zip(values) {
            if let Some(country) = country {
                out_countries.push(country.to_string());
                out_years.push(year);
                out_values.push(value);
            }
        }
    }

    let df = DataFrame::new(vec![
        Column::new(COUNTRY_COLUMN.into(), out_countries),
        Column::new(YEAR_COLUMN.into(), out_years),
        raw_values_to_column(value_name, out_values),
    ])?;

    Ok(df)
}

/// Fail if a long table holds the same (country, year) key twice
pub fn ensure_unique_keys(long: &DataFrame, name: &str) -> Result<()> {
    let countries = long.column(COUNTRY_COLUMN)?.str()?;
    let years = long.column(YEAR_COLUMN)?.i32()?;

    let mut seen: HashSet<(&str, i32)> = HashSet::with_capacity(long.height());
    for (country, year) in countries.into_iter().zip(years) {
        if let (Some(country), Some(year)) = (country, year) {
            if !seen.insert((country, year)) {
                anyhow::bail!(
                    "Duplicate entry for country '{}' and year {} in {}",
                    country,
                    year,
                    name
                );
            }
        }
    }

    Ok(())
}

/// Inner-join long tables on (country, year).
///
/// A key is kept only when every input contains it. Each input must carry
/// unique keys. The result is sorted by country, then year.
pub fn merge_indicators(long_tables: &[DataFrame]) -> Result<DataFrame> {
    let (first, rest) = long_tables
        .split_first()
        .ok_or_else(|| anyhow::anyhow!("No tables to merge"))?;

    for (idx, table) in long_tables.iter().enumerate() {
        ensure_unique_keys(table, &format!("table {}", idx + 1))?;
    }

    let keys = [col(COUNTRY_COLUMN), col(YEAR_COLUMN)];
    let mut merged = first.clone().lazy();
    for table in rest {
        merged = merged.join(
            table.clone().lazy(),
            keys.clone(),
            keys.clone(),
            JoinArgs::new(JoinType::Inner),
        );
    }

    let df = merged
        .sort([COUNTRY_COLUMN, YEAR_COLUMN], SortMultipleOptions::default())
        .collect()
        .context("Failed to merge indicator tables")?;

    Ok(df)
}
