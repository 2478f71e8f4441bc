//! Command-line argument definitions using clap

use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};

use crate::pipeline::{Indicator, DEFAULT_EXCLUDED_COUNTRIES};

/// gaptrends - Merge Gapminder indicator tables and explore their trends
#[derive(Parser, Debug)]
#[command(name = "gaptrends")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Directory holding the three Gapminder tables under their default names
    #[arg(short, long, default_value = ".")]
    pub data_dir: PathBuf,

    /// Child mortality table (overrides the file in --data-dir)
    #[arg(long)]
    pub child_mortality: Option<PathBuf>,

    /// Income per person table (overrides the file in --data-dir)
    #[arg(long)]
    pub income: Option<PathBuf>,

    /// Life expectancy table (overrides the file in --data-dir)
    #[arg(long)]
    pub life_expectancy: Option<PathBuf>,

    /// Directory receiving the plots and the analysis JSON
    #[arg(short, long, default_value = "gaptrends_output")]
    pub output_dir: PathBuf,

    /// Rolling window in years
    #[arg(long, default_value = "20", value_parser = validate_window)]
    pub window: usize,

    /// Minimum observations in a window before an average is produced
    #[arg(long, default_value = "1", value_parser = validate_window)]
    pub min_periods: usize,

    /// Countries to exclude, separated by ';'.
    /// Defaults to the countries with incomplete history.
    #[arg(long, value_delimiter = ';')]
    pub exclude: Vec<String>,

    /// Keep every country, ignoring the exclusion list
    #[arg(long, default_value = "false", conflicts_with = "exclude")]
    pub keep_all_countries: bool,

    /// JSON file with the line plots to render
    #[arg(long)]
    pub plots: Option<PathBuf>,

    /// Skip rendering plots
    #[arg(long, default_value = "false")]
    pub no_plots: bool,

    /// Also write the final table (CSV or Parquet, determined by extension)
    #[arg(long)]
    pub save_table: Option<PathBuf>,

    /// Skip writing analysis.json
    #[arg(long, default_value = "false")]
    pub no_export: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Reshape one wide table (country × year) into long format
    Convert {
        /// Input file path (xlsx, xls, ods, CSV or Parquet)
        input: PathBuf,

        /// Output file path (optional, defaults to input with '_long.csv' suffix)
        output: Option<PathBuf>,

        /// Name of the value column in the long table
        #[arg(long, default_value = "value")]
        value_name: String,
    },
}

impl Cli {
    /// Source table for an indicator: the explicit override, or its default
    /// file name inside the data directory.
    pub fn indicator_path(&self, indicator: Indicator) -> PathBuf {
        let explicit = match indicator {
            Indicator::ChildMortality => self.child_mortality.as_ref(),
            Indicator::Income => self.income.as_ref(),
            Indicator::LifeExpectancy => self.life_expectancy.as_ref(),
        };

        explicit
            .cloned()
            .unwrap_or_else(|| self.data_dir.join(indicator.default_file_name()))
    }

    /// Source tables of all indicators, in merge order
    pub fn indicator_paths(&self) -> Vec<(Indicator, PathBuf)> {
        Indicator::ALL
            .into_iter()
            .map(|indicator| (indicator, self.indicator_path(indicator)))
            .collect()
    }

    /// Countries removed during cleaning
    pub fn excluded_countries(&self) -> Vec<String> {
        if self.keep_all_countries {
            Vec::new()
        } else if self.exclude.is_empty() {
            DEFAULT_EXCLUDED_COUNTRIES
                .iter()
                .map(|c| c.to_string())
                .collect()
        } else {
            self.exclude
                .iter()
                .map(|c| c.trim().to_string())
                .filter(|c| !c.is_empty())
                .collect()
        }
    }

    /// Location of the JSON analysis export
    pub fn export_path(&self) -> PathBuf {
        self.output_dir.join("analysis.json")
    }
}

/// Default output for the convert command: `<stem>_long.csv` next to the input
pub fn convert_output_path(input: &Path) -> PathBuf {
    let parent = input.parent().unwrap_or_else(|| Path::new("."));
    let stem = input
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("output");
    parent.join(format!("{}_long.csv", stem))
}

/// Validator for window-sized parameters
fn validate_window(s: &str) -> Result<usize, String> {
    let value: usize = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number of years", s))?;

    if value == 0 {
        Err("value must be at least 1".to_string())
    } else {
        Ok(value)
    }
}
