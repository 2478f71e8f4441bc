//! Analysis export to JSON

use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;

use crate::pipeline::{CorrelatedPair, CorrelationMatrix, Indicator, RollingConfig};
use crate::plot::RenderedPlots;
use crate::report::PipelineSummary;

/// Metadata about the analysis run
#[derive(Debug, Serialize)]
pub struct AnalysisMetadata {
    /// Timestamp of the analysis (ISO 8601 format)
    pub timestamp: String,
    pub gaptrends_version: String,
    /// Source table per indicator
    pub input_files: Vec<InputFile>,
    pub rolling_window: usize,
    pub min_periods: usize,
    pub excluded_countries: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct InputFile {
    pub indicator: Indicator,
    pub path: String,
}

/// Complete analysis export
#[derive(Debug, Serialize)]
pub struct AnalysisExport {
    pub metadata: AnalysisMetadata,
    pub summary: PipelineSummary,
    pub correlation: CorrelationMatrix,
    /// Pairs sorted by absolute correlation descending
    pub correlated_pairs: Vec<CorrelatedPair>,
    pub plots: RenderedPlots,
}

/// Parameters for the analysis export
pub struct ExportParams<'a> {
    pub inputs: &'a [(Indicator, &'a Path)],
    pub rolling: RollingConfig,
    pub excluded_countries: &'a [String],
}

impl AnalysisExport {
    pub fn new(
        params: &ExportParams,
        summary: &PipelineSummary,
        correlation: &CorrelationMatrix,
        plots: &RenderedPlots,
    ) -> Self {
        Self {
            metadata: AnalysisMetadata {
                timestamp: Utc::now().to_rfc3339(),
                gaptrends_version: env!("CARGO_PKG_VERSION").to_string(),
                input_files: params
                    .inputs
                    .iter()
                    .map(|(indicator, path)| InputFile {
                        indicator: *indicator,
                        path: path.display().to_string(),
                    })
                    .collect(),
                rolling_window: params.rolling.window,
                min_periods: params.rolling.min_periods,
                excluded_countries: params.excluded_countries.to_vec(),
            },
            summary: summary.clone(),
            correlation: correlation.clone(),
            correlated_pairs: correlation.pairs(),
            plots: plots.clone(),
        }
    }
}

/// Write the export as pretty-printed JSON
pub fn write_analysis_export(export: &AnalysisExport, output_path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(export)
        .context("Failed to serialize analysis to JSON")?;

    std::fs::write(output_path, json)
        .with_context(|| format!("Failed to write analysis to {}", output_path.display()))?;

    Ok(())
}
