//! Typed rows of the final country/year table

use anyhow::{Context, Result};
use polars::prelude::*;
use serde::Serialize;

use crate::pipeline::{Indicator, COUNTRY_COLUMN, YEAR_COLUMN};

/// One country in one year, with raw indicators and their rolling averages
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CountryYearRecord {
    pub country: String,
    pub year: i32,
    pub child_mortality_per_1000_born: f64,
    pub income_per_person: f64,
    pub life_expectancy_years: f64,
    /// Rolling averages stay empty until the window holds `min_periods` years
    pub avg_child_mortality: Option<f64>,
    pub avg_income: Option<f64>,
    pub avg_life_years: Option<f64>,
}

impl CountryYearRecord {
    /// Raw value of an indicator
    pub fn value(&self, indicator: Indicator) -> f64 {
        match indicator {
            Indicator::ChildMortality => self.child_mortality_per_1000_born,
            Indicator::Income => self.income_per_person,
            Indicator::LifeExpectancy => self.life_expectancy_years,
        }
    }

    /// Rolling average of an indicator, if the window had enough years
    pub fn average(&self, indicator: Indicator) -> Option<f64> {
        match indicator {
            Indicator::ChildMortality => self.avg_child_mortality,
            Indicator::Income => self.avg_income,
            Indicator::LifeExpectancy => self.avg_life_years,
        }
    }

    /// Look up a numeric field by column name.
    ///
    /// `None` for unknown columns and for averages not produced yet.
    pub fn field(&self, column: &str) -> Option<f64> {
        let indicator = Indicator::from_column(column)?;
        if indicator.column() == column {
            Some(self.value(indicator))
        } else {
            self.average(indicator)
        }
    }
}

/// Extract typed records from the final table.
///
/// Fails when a column is absent or a raw value is null, so it must run
/// after cleaning and after the rolling averages were added. Null averages
/// (a window below `min_periods`) are kept as `None`.
pub fn records_from_frame(df: &DataFrame) -> Result<Vec<CountryYearRecord>> {
    let countries = df.column(COUNTRY_COLUMN)?.str()?;
    let years = df.column(YEAR_COLUMN)?.cast(&DataType::Int32)?;
    let years = years.i32()?;

    let mut numeric: Vec<Vec<Option<f64>>> = Vec::with_capacity(6);
    for indicator in Indicator::ALL {
        for name in [indicator.column(), indicator.average_column()] {
            let column = df
                .column(name)
                .with_context(|| format!("Column '{}' not found", name))?
                .cast(&DataType::Float64)?;
            numeric.push(column.f64()?.into_iter().collect());
        }
    }

    let mut records = Vec::with_capacity(df.height());
    for row in 0..df.height() {
        let country = countries
            .get(row)
            .ok_or_else(|| anyhow::anyhow!("Null country at row {}", row))?;
        let year = years
            .get(row)
            .ok_or_else(|| anyhow::anyhow!("Null year for '{}' at row {}", country, row))?;

        let raw = |idx: usize| {
            numeric[idx][row].ok_or_else(|| {
                anyhow::anyhow!("Null indicator value for '{}' in {}", country, year)
            })
        };

        records.push(CountryYearRecord {
            country: country.to_string(),
            year,
            child_mortality_per_1000_born: raw(0)?,
            avg_child_mortality: numeric[1][row],
            income_per_person: raw(2)?,
            avg_income: numeric[3][row],
            life_expectancy_years: raw(4)?,
            avg_life_years: numeric[5][row],
        });
    }

    Ok(records)
}
