//! Raw cell values as read from a source table

use polars::prelude::*;

/// A single cell before type coercion
///
/// Spreadsheet columns can mix numbers and text (e.g. `1200` next to `"4.5k"`),
/// so values are kept in this form until the column's final type is known.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    Missing,
    Number(f64),
    Text(String),
}

impl RawValue {
    pub fn is_missing(&self) -> bool {
        matches!(self, RawValue::Missing)
    }

    /// Build a raw value from trimmed text; blank text counts as missing
    pub fn from_text(s: &str) -> Self {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            RawValue::Missing
        } else {
            RawValue::Text(trimmed.to_string())
        }
    }
}

impl From<f64> for RawValue {
    fn from(value: f64) -> Self {
        if value.is_nan() {
            RawValue::Missing
        } else {
            RawValue::Number(value)
        }
    }
}

impl From<Option<f64>> for RawValue {
    fn from(value: Option<f64>) -> Self {
        value.map_or(RawValue::Missing, RawValue::from)
    }
}

impl From<Option<&str>> for RawValue {
    fn from(value: Option<&str>) -> Self {
        value.map_or(RawValue::Missing, RawValue::from_text)
    }
}

/// Turn raw values into a column.
///
/// The column is `Float64` when no value is text, otherwise `String` with
/// numbers written in their shortest round-trip form.
pub fn raw_values_to_column(name: &str, values: Vec<RawValue>) -> Column {
    let has_text = values.iter().any(|v| matches!(v, RawValue::Text(_)));

    if has_text {
        let texts: Vec<Option<String>> = values
            .into_iter()
            .map(|v| match v {
                RawValue::Missing => None,
                RawValue::Number(n) => Some(n.to_string()),
                RawValue::Text(s) => Some(s),
            })
            .collect();
        Column::new(name.into(), texts)
    } else {
        let numbers: Vec<Option<f64>> = values
            .into_iter()
            .map(|v| match v {
                RawValue::Number(n) => Some(n),
                _ => None,
            })
            .collect();
        Column::new(name.into(), numbers)
    }
}

/// Read any column back as raw values.
///
/// Numeric columns yield numbers, string columns yield text, all-null
/// columns yield missing values; anything else is read through its string form.
pub fn column_to_raw_values(column: &Column) -> PolarsResult<Vec<RawValue>> {
    let dtype = column.dtype();

    if dtype.is_primitive_numeric() {
        let floats = column.cast(&DataType::Float64)?;
        return Ok(floats.f64()?.into_iter().map(RawValue::from).collect());
    }

    match dtype {
        DataType::Null => Ok(vec![RawValue::Missing; column.len()]),
        DataType::String => Ok(column.str()?.into_iter().map(RawValue::from).collect()),
        _ => {
            let strings = column.cast(&DataType::String)?;
            Ok(strings.str()?.into_iter().map(RawValue::from).collect())
        }
    }
}
