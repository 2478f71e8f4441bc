//! Wide-to-long conversion of a single indicator table

use std::path::Path;

use anyhow::Result;
use console::style;

use crate::cli::convert_output_path;
use crate::pipeline::{load_wide_table, melt_wide_table, save_table, COUNTRY_COLUMN};
use crate::utils::run_step;

/// Run the wide-to-long conversion
///
/// # Arguments
/// * `input` - Path to the wide table (one row per country, one column per year)
/// * `output` - Optional output path. If not provided, writes `<stem>_long.csv` next to the input
/// * `value_name` - Name of the value column in the long table
pub fn run_convert(input: &Path, output: Option<&Path>, value_name: &str) -> Result<()> {
    if value_name == COUNTRY_COLUMN || value_name == "year" {
        anyhow::bail!("Value column cannot be named '{}'", value_name);
    }

    let output_path = match output {
        Some(p) => p.to_path_buf(),
        None => convert_output_path(input),
    };

    println!(
        "\n {} Converting wide table to long format",
        style("◆").cyan().bold()
    );
    println!("   Input:  {}", style(input.display()).dim());
    println!("   Output: {}", style(output_path.display()).dim());
    println!();

    let wide = run_step(
        "Reading wide table...",
        || load_wide_table(input),
        |wide| format!("Table loaded ({} countries × {} columns)", wide.height(), wide.width()),
    )?;

    let mut long = run_step(
        "Reshaping...",
        || melt_wide_table(&wide, value_name),
        |_| "Reshaped to long format".to_string(),
    )?;
    let missing = long.column(value_name)?.null_count();

    run_step(
        "Writing output...",
        || save_table(&mut long, &output_path),
        |_| format!("Saved to {}", output_path.display()),
    )?;

    println!();
    println!(
        "   {} rows × {} columns",
        style(long.height()).yellow(),
        style(long.width()).yellow()
    );
    if missing > 0 {
        println!(
            "   {} {} missing value(s)",
            style("✧").cyan(),
            style(missing).yellow()
        );
    }

    println!();
    println!(" {} Conversion complete!", style("✓").green().bold());

    Ok(())
}
