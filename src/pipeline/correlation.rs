//! Pearson correlation between indicator columns

use anyhow::{Context, Result};
use polars::prelude::*;
use serde::Serialize;

/// Represents a correlated pair of columns
#[derive(Debug, Clone, Serialize)]
pub struct CorrelatedPair {
    pub feature1: String,
    pub feature2: String,
    pub correlation: f64,
}

/// Square, symmetric matrix of pairwise Pearson coefficients
#[derive(Debug, Clone, Serialize)]
pub struct CorrelationMatrix {
    pub columns: Vec<String>,
    /// Row-major coefficients; `NaN` where the correlation is undefined
    pub values: Vec<Vec<f64>>,
}

impl CorrelationMatrix {
    /// Coefficient between two named columns
    pub fn get(&self, a: &str, b: &str) -> Option<f64> {
        let i = self.columns.iter().position(|c| c == a)?;
        let j = self.columns.iter().position(|c| c == b)?;
        Some(self.values[i][j])
    }

    /// Upper-triangle pairs sorted by absolute correlation descending
    pub fn pairs(&self) -> Vec<CorrelatedPair> {
        let n = self.columns.len();
        let mut pairs: Vec<CorrelatedPair> = (0..n)
            .flat_map(|i| ((i + 1)..n).map(move |j| (i, j)))
            .map(|(i, j)| CorrelatedPair {
                feature1: self.columns[i].clone(),
                feature2: self.columns[j].clone(),
                correlation: self.values[i][j],
            })
            .collect();

        pairs.sort_by(|a, b| {
            b.correlation
                .abs()
                .partial_cmp(&a.correlation.abs())
                .unwrap_or(std::cmp::Ordering::Equal)
        });

        pairs
    }
}

/// Pearson correlation using a single-pass Welford update.
///
/// Positions where either side is missing are skipped. Returns `None` with
/// fewer than two paired observations or when either side is constant.
pub fn pearson_correlation(xs: &[Option<f64>], ys: &[Option<f64>]) -> Option<f64> {
    if xs.len() != ys.len() {
        return None;
    }

    let mut n = 0.0;
    let mut mean_x = 0.0;
    let mut mean_y = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    let mut cov_xy = 0.0;

    for (x, y) in xs.iter().zip(ys) {
        if let (Some(x), Some(y)) = (x, y) {
            n += 1.0;
            let dx = x - mean_x;
            let dy = y - mean_y;
            mean_x += dx / n;
            mean_y += dy / n;
            var_x += dx * (x - mean_x);
            var_y += dy * (y - mean_y);
            cov_xy += dx * (y - mean_y);
        }
    }

    if n < 2.0 || var_x <= 0.0 || var_y <= 0.0 {
        return None;
    }

    Some((cov_xy / (var_x.sqrt() * var_y.sqrt())).clamp(-1.0, 1.0))
}

/// Correlation matrix over the named numeric columns.
///
/// The diagonal is 1.0 for any column with variance, `NaN` otherwise.
pub fn correlation_matrix(df: &DataFrame, columns: &[&str]) -> Result<CorrelationMatrix> {
    let mut data: Vec<Vec<Option<f64>>> = Vec::with_capacity(columns.len());
    for name in columns {
        let column = df
            .column(name)
            .with_context(|| format!("Column '{}' not found", name))?;
        if !column.dtype().is_primitive_numeric() {
            anyhow::bail!("Column '{}' is not numeric (found {})", name, column.dtype());
        }
        let column = column.cast(&DataType::Float64)?;
        data.push(column.f64()?.into_iter().collect());
    }

    let n = columns.len();
    let mut values = vec![vec![f64::NAN; n]; n];
    for i in 0..n {
        for j in i..n {
            let r = if i == j {
                pearson_correlation(&data[i], &data[j]).map(|_| 1.0)
            } else {
                pearson_correlation(&data[i], &data[j])
            };
            let r = r.unwrap_or(f64::NAN);
            values[i][j] = r;
            values[j][i] = r;
        }
    }

    log::debug!("computed {}x{} correlation matrix", n, n);

    Ok(CorrelationMatrix {
        columns: columns.iter().map(|c| c.to_string()).collect(),
        values,
    })
}
