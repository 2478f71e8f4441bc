//! Cleaning of the merged table: missing rows, excluded countries, income coercion

use std::collections::HashSet;

use anyhow::{Context, Result};
use polars::prelude::*;
use thiserror::Error;

use crate::pipeline::{Indicator, RawValue, COUNTRY_COLUMN, YEAR_COLUMN};

/// Countries whose history is too incomplete to be compared with the rest
pub const DEFAULT_EXCLUDED_COUNTRIES: [&str; 10] = [
    "Hong Kong, China",
    "Andorra",
    "Dominica",
    "Nauru",
    "Marshall Islands",
    "Tuvalu",
    "Monaco",
    "St. Kitts and Nevis",
    "Palau",
    "San Marino",
];

/// Errors raised while turning an income cell into a number
#[derive(Debug, Error, PartialEq)]
pub enum ParseIncomeError {
    #[error("income value is missing")]
    Missing,

    #[error("income value is empty")]
    Empty,

    #[error("unsupported unit suffix '{suffix}' in income value '{value}'")]
    UnsupportedSuffix { value: String, suffix: char },

    #[error("'{0}' is not a valid income value")]
    InvalidNumber(String),
}

/// Parse an income cell that may be numeric or text.
pub fn parse_income(value: &RawValue) -> Result<f64, ParseIncomeError> {
    match value {
        RawValue::Missing => Err(ParseIncomeError::Missing),
        RawValue::Number(n) => Ok(*n),
        RawValue::Text(s) => parse_income_str(s),
    }
}

/// Parse an income string such as `"4.5k"` or `"1200"`.
///
/// A trailing `k` (thousands) multiplies the number by 1000. Any other
/// trailing letter is rejected rather than guessed.
pub fn parse_income_str(raw: &str) -> Result<f64, ParseIncomeError> {
    let trimmed = raw.trim();
    let last = trimmed.chars().last().ok_or(ParseIncomeError::Empty)?;

    let (number, multiplier) = match last {
        'k' | 'K' => (trimmed[..trimmed.len() - 1].trim_end(), 1000.0),
        // A letter only counts as a suffix when a number precedes it
        c if c.is_alphabetic() => {
            let body = trimmed[..trimmed.len() - c.len_utf8()].trim_end();
            if body.parse::<f64>().is_ok_and(f64::is_finite) {
                return Err(ParseIncomeError::UnsupportedSuffix {
                    value: trimmed.to_string(),
                    suffix: c,
                });
            }
            return Err(ParseIncomeError::InvalidNumber(trimmed.to_string()));
        }
        _ => (trimmed, 1.0),
    };

    let parsed: f64 = number
        .parse()
        .map_err(|_| ParseIncomeError::InvalidNumber(trimmed.to_string()))?;

    if !parsed.is_finite() {
        return Err(ParseIncomeError::InvalidNumber(trimmed.to_string()));
    }

    Ok(parsed * multiplier)
}

/// Drop every row holding a null in any column.
///
/// Returns the cleaned table and the number of rows removed.
pub fn drop_missing_rows(df: &DataFrame) -> Result<(DataFrame, usize)> {
    let mut mask = BooleanChunked::full("mask".into(), true, df.height());
    for column in df.get_columns() {
        mask = &mask & &column.is_not_null();
    }

    let cleaned = df.filter(&mask)?;
    let removed = df.height() - cleaned.height();
    Ok((cleaned, removed))
}

/// Remove every row whose country appears in `countries`.
///
/// Returns the filtered table and the number of rows removed.
pub fn exclude_countries<S: AsRef<str>>(
    df: &DataFrame,
    countries: &[S],
) -> Result<(DataFrame, usize)> {
    if countries.is_empty() {
        return Ok((df.clone(), 0));
    }

    let excluded: HashSet<&str> = countries.iter().map(|c| c.as_ref()).collect();
    let mask: BooleanChunked = df
        .column(COUNTRY_COLUMN)?
        .str()?
        .into_iter()
        .map(|country| Some(country.map_or(true, |c| !excluded.contains(c))))
        .collect();

    let filtered = df.filter(&mask)?;
    let removed = df.height() - filtered.height();
    Ok((filtered, removed))
}

/// Replace an income column by its numeric form.
///
/// String cells go through [`parse_income_str`]; numeric columns are cast to
/// `Float64`. The first malformed cell aborts with its country and year.
pub fn coerce_income_column(df: &DataFrame, column: &str) -> Result<DataFrame> {
    let income = df
        .column(column)
        .with_context(|| format!("Column '{}' not found", column))?;

    let coerced: Column = match income.dtype() {
        DataType::String => {
            let raw = income.str()?;
            let mut parsed: Vec<Option<f64>> = Vec::with_capacity(raw.len());
            for (idx, value) in raw.into_iter().enumerate() {
                match value {
                    None => parsed.push(None),
                    Some(text) => {
                        let number = parse_income_str(text).with_context(|| {
                            format!("Malformed income value at {}", describe_row(df, idx))
                        })?;
                        parsed.push(Some(number));
                    }
                }
            }
            Column::new(column.into(), parsed)
        }
        dtype if dtype.is_primitive_numeric() => income.cast(&DataType::Float64)?,
        other => anyhow::bail!("Column '{}' has unsupported type {}", column, other),
    };

    let mut out = df.clone();
    out.with_column(coerced)?;
    Ok(out)
}

/// Outcome of [`clean_merged_table`]
#[derive(Debug)]
pub struct CleaningOutcome {
    pub table: DataFrame,
    pub dropped_missing: usize,
    pub dropped_excluded: usize,
}

/// Run the cleaning steps in order: nulls, excluded countries, income coercion
pub fn clean_merged_table<S: AsRef<str>>(
    df: &DataFrame,
    excluded: &[S],
) -> Result<CleaningOutcome> {
    let (table, dropped_missing) = drop_missing_rows(df)?;
    let (table, dropped_excluded) = exclude_countries(&table, excluded)?;
    let table = coerce_income_column(&table, Indicator::Income.column())?;

    Ok(CleaningOutcome {
        table,
        dropped_missing,
        dropped_excluded,
    })
}

fn describe_row(df: &DataFrame, idx: usize) -> String {
    let country = df
        .column(COUNTRY_COLUMN)
        .ok()
        .and_then(|c| c.str().ok().and_then(|ca| ca.get(idx).map(str::to_string)));
    let year = df
        .column(YEAR_COLUMN)
        .ok()
        .and_then(|c| c.i32().ok().and_then(|ca| ca.get(idx)));

    match (country, year) {
        (Some(country), Some(year)) => format!("country '{}', year {}", country, year),
        _ => format!("row {}", idx),
    }
}
