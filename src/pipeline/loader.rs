//! Wide-table loader for spreadsheet, CSV and Parquet files

use std::path::Path;

use anyhow::{Context, Result};
use calamine::{open_workbook_auto, Data, Reader};
use polars::prelude::*;

use crate::pipeline::{raw_values_to_column, RawValue};
use crate::utils::run_step;

/// Name given to the first column of every wide table
pub const COUNTRY_COLUMN: &str = "country";

/// Load a wide-format table (one row per country, one column per year).
///
/// The format is chosen by extension: `xlsx`, `xlsm`, `xls` and `ods` are
/// read from their first worksheet, `csv` and `parquet` through polars.
/// The first column is always renamed to `country`.
pub fn load_wide_table(path: &Path) -> Result<DataFrame> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_lowercase();

    let mut df = match extension.as_str() {
        "xlsx" | "xlsm" | "xls" | "ods" => load_workbook(path)?,
        "csv" => LazyCsvReader::new(path)
            .with_infer_schema_length(None)
            .finish()
            .and_then(|lf| lf.collect())
            .with_context(|| format!("Failed to load CSV file: {}", path.display()))?,
        "parquet" => LazyFrame::scan_parquet(path, Default::default())
            .and_then(|lf| lf.collect())
            .with_context(|| format!("Failed to load Parquet file: {}", path.display()))?,
        _ => anyhow::bail!(
            "Unsupported file format: {}. Supported formats: xlsx, xls, ods, csv, parquet",
            extension
        ),
    };

    let first = df
        .get_column_names()
        .first()
        .map(|name| name.to_string())
        .ok_or_else(|| anyhow::anyhow!("Table has no columns: {}", path.display()))?;

    if first != COUNTRY_COLUMN {
        df.rename(&first, COUNTRY_COLUMN.into())
            .with_context(|| format!("Failed to rename first column of {}", path.display()))?;
    }

    Ok(df)
}

/// Load a wide table behind a spinner.
///
/// Returns the table together with its row count, column count and
/// estimated memory footprint in MB.
pub fn load_wide_table_with_progress(path: &Path) -> Result<(DataFrame, usize, usize, f64)> {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("table");
    let df = run_step(
        &format!("Reading {}...", file_name),
        || load_wide_table(path),
        |_| format!("Loaded {}", file_name),
    )?;
    let (rows, cols) = df.shape();
    let memory_mb = df.estimated_size() as f64 / (1024.0 * 1024.0);

    log::debug!(
        "loaded {}: {} rows x {} columns",
        path.display(),
        rows,
        cols
    );

    Ok((df, rows, cols, memory_mb))
}

/// Display shape statistics for a loaded table
pub fn display_table_stats(name: &str, rows: usize, cols: usize, memory_mb: f64) {
    println!(
        "      {}: {} countries × {} years ({:.2} MB)",
        name,
        rows,
        cols.saturating_sub(1),
        memory_mb
    );
}

/// Read the first worksheet of a workbook into a DataFrame.
///
/// The header row names the columns. Year headers stored as numbers are
/// written without a fractional part (`1800.0` becomes `"1800"`).
fn load_workbook(path: &Path) -> Result<DataFrame> {
    let mut workbook = open_workbook_auto(path)
        .with_context(|| format!("Failed to open workbook: {}", path.display()))?;

    let sheet = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| anyhow::anyhow!("Workbook has no sheets: {}", path.display()))?;

    let range = workbook
        .worksheet_range(&sheet)
        .with_context(|| format!("Failed to read sheet '{}' in {}", sheet, path.display()))?;

    let mut rows = range.rows();
    let header = rows
        .next()
        .ok_or_else(|| anyhow::anyhow!("Sheet '{}' is empty: {}", sheet, path.display()))?;

    if header.is_empty() {
        anyhow::bail!("Sheet '{}' has no header row: {}", sheet, path.display());
    }

    let names: Vec<String> = header
        .iter()
        .enumerate()
        .map(|(idx, cell)| header_name(idx, cell))
        .collect();

    let mut countries: Vec<Option<String>> = Vec::new();
    let mut values: Vec<Vec<RawValue>> = vec![Vec::new(); names.len() - 1];

    for row in rows {
        countries.push(cell_to_text(row.first().unwrap_or(&Data::Empty)));
        for (idx, column) in values.iter_mut().enumerate() {
            column.push(cell_to_raw(row.get(idx + 1).unwrap_or(&Data::Empty)));
        }
    }

    let mut columns: Vec<Column> = Vec::with_capacity(names.len());
    columns.push(Column::new(COUNTRY_COLUMN.into(), countries));
    for (name, column_values) in names.iter().skip(1).zip(values) {
        columns.push(raw_values_to_column(name, column_values));
    }

    DataFrame::new(columns)
        .with_context(|| {
            format!("Failed to build table from sheet '{}' in {}", sheet, path.display())
        })
}

fn header_name(idx: usize, cell: &Data) -> String {
    match cell {
        Data::Int(i) => i.to_string(),
        Data::Float(f) if f.fract() == 0.0 => format!("{}", *f as i64),
        Data::Empty => format!("column_{}", idx),
        Data::String(s) if s.trim().is_empty() => format!("column_{}", idx),
        Data::String(s) => s.trim().to_string(),
        other => other.to_string(),
    }
}

fn cell_to_text(cell: &Data) -> Option<String> {
    match cell {
        Data::Empty | Data::Error(_) => None,
        Data::String(s) if s.trim().is_empty() => None,
        Data::String(s) => Some(s.trim().to_string()),
        other => Some(other.to_string()),
    }
}

fn cell_to_raw(cell: &Data) -> RawValue {
    match cell {
        Data::Int(i) => RawValue::Number(*i as f64),
        Data::Float(f) => RawValue::from(*f),
        Data::String(s) => RawValue::from_text(s),
        Data::Empty | Data::Error(_) => RawValue::Missing,
        other => RawValue::from_text(&other.to_string()),
    }
}
