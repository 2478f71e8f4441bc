//! gaptrends: Gapminder Trend CLI Tool
//!
//! Merges the child mortality, income and life expectancy tables, computes
//! rolling averages and renders plots and correlation statistics.

mod cli;
mod pipeline;
mod plot;
mod report;
mod utils;

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use polars::prelude::DataFrame;

use cli::{Cli, Commands};
use pipeline::{
    add_rolling_averages, clean_merged_table, correlation_matrix, display_table_stats,
    load_wide_table_with_progress, melt_wide_table, merge_indicators, records_from_frame,
    save_table, CountryYearRecord, Indicator, RollingConfig,
};
use plot::{
    default_plot_specs, load_plot_specs, render_heatmap, render_line_plot, render_pairplot,
    RenderedPlots,
};
use report::{
    display_correlation_table, write_analysis_export, AnalysisExport, ExportParams,
    PipelineSummary,
};
use utils::{
    create_progress_bar, finish_with_success, finish_with_warning, print_banner, print_completion,
    print_config, print_count, print_info, print_step_header, print_step_time, print_success,
    print_warning, run_step,
};

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    // Handle subcommands
    if let Some(command) = &cli.command {
        return match command {
            Commands::Convert {
                input,
                output,
                value_name,
            } => cli::convert::run_convert(input, output.as_deref(), value_name),
        };
    }

    let rolling = RollingConfig::new(cli.window, cli.min_periods)?;
    let excluded = cli.excluded_countries();
    let input_paths = cli.indicator_paths();
    let inputs: Vec<(Indicator, &Path)> = input_paths
        .iter()
        .map(|(indicator, path)| (*indicator, path.as_path()))
        .collect();

    for (indicator, path) in &inputs {
        if !path.exists() {
            anyhow::bail!(
                "Input table for {} not found: {}. Use --data-dir or --{} to locate it.",
                indicator,
                path.display(),
                indicator
            );
        }
    }

    print_banner(env!("CARGO_PKG_VERSION"));
    print_config(&inputs, &cli.output_dir, rolling, excluded.len());

    let mut summary = PipelineSummary::new();

    // Step 1: Load and reshape each indicator table
    print_step_header(1, "Load & Reshape");

    let step_start = Instant::now();
    let mut long_tables: Vec<DataFrame> = Vec::with_capacity(inputs.len());
    for (indicator, path) in &inputs {
        let (wide, rows, cols, memory_mb) = load_wide_table_with_progress(path)?;
        display_table_stats(&indicator.to_string(), rows, cols, memory_mb);

        let long = melt_wide_table(&wide, indicator.column())
            .with_context(|| format!("Failed to reshape {}", path.display()))?;
        summary.add_long_rows(*indicator, long.height());
        long_tables.push(long);
    }
    print_success("Tables reshaped to long format");
    let elapsed = step_start.elapsed();
    summary.record_time("Load & reshape", elapsed);
    print_step_time(elapsed);

    // Step 2: Merge on (country, year)
    print_step_header(2, "Merge");

    let step_start = Instant::now();
    let merged = run_step(
        "Joining tables on country and year...",
        || merge_indicators(&long_tables),
        |_| "Tables merged".to_string(),
    )?;
    print_count("country/year rows present in all tables", merged.height(), None);
    summary.set_merged_rows(merged.height());
    let elapsed = step_start.elapsed();
    summary.record_time("Merge", elapsed);
    print_step_time(elapsed);

    // Step 3: Clean
    print_step_header(3, "Clean");

    let step_start = Instant::now();
    let outcome = clean_merged_table(&merged, &excluded)?;
    if outcome.dropped_missing == 0 {
        print_info("No rows with missing values");
    } else {
        print_count("row(s) with missing values", outcome.dropped_missing, Some("(dropped)"));
    }
    if outcome.dropped_excluded > 0 {
        print_count(
            "row(s) of excluded countries",
            outcome.dropped_excluded,
            Some("(dropped)"),
        );
    }
    print_success("Income converted to numbers");
    summary.set_cleaning(outcome.dropped_missing, outcome.dropped_excluded);
    let cleaned = outcome.table;
    if cleaned.height() == 0 {
        anyhow::bail!(
            "No rows left after cleaning; \
             check that the three tables share countries and years"
        );
    }
    let elapsed = step_start.elapsed();
    summary.record_time("Clean", elapsed);
    print_step_time(elapsed);

    // Step 4: Rolling averages
    print_step_header(4, "Rolling Averages");

    let step_start = Instant::now();
    let (mut table, records) = run_step(
        &format!("Computing {}-year rolling averages...", rolling.window),
        || {
            let table = add_rolling_averages(&cleaned, rolling)?;
            let records = records_from_frame(&table)?;
            Ok((table, records))
        },
        |_| "Rolling averages computed".to_string(),
    )?;

    let countries: HashSet<&str> = records.iter().map(|r| r.country.as_str()).collect();
    let year_range = records
        .iter()
        .map(|r| r.year)
        .min()
        .zip(records.iter().map(|r| r.year).max());
    summary.set_final_table(records.len(), countries.len(), year_range);
    let elapsed = step_start.elapsed();
    summary.record_time("Rolling averages", elapsed);
    print_step_time(elapsed);

    // Step 5: Correlation
    print_step_header(5, "Correlation Analysis");

    let step_start = Instant::now();
    let average_columns: Vec<&str> = Indicator::ALL.iter().map(|i| i.average_column()).collect();
    let matrix = correlation_matrix(&table, &average_columns)?;
    println!();
    display_correlation_table(&matrix);
    let elapsed = step_start.elapsed();
    summary.record_time("Correlation", elapsed);
    print_step_time(elapsed);

    // Step 6: Plots
    print_step_header(6, "Plots");

    let step_start = Instant::now();
    let plots = if cli.no_plots {
        print_info("Plot rendering skipped (--no-plots)");
        RenderedPlots::default()
    } else {
        std::fs::create_dir_all(&cli.output_dir).with_context(|| {
            format!("Failed to create output directory: {}", cli.output_dir.display())
        })?;
        render_plots(&cli, &records, &matrix, &average_columns, rolling)?
    };
    summary.set_plots_rendered(plots.count());
    let elapsed = step_start.elapsed();
    summary.record_time("Plots", elapsed);
    print_step_time(elapsed);

    // Step 7: Save results
    print_step_header(7, "Save Results");

    let step_start = Instant::now();
    if let Some(path) = &cli.save_table {
        run_step(
            "Writing table...",
            || save_table(&mut table, path),
            |_| format!("Table saved to {}", path.display()),
        )?;
    }

    if cli.no_export {
        print_info("Analysis export skipped (--no-export)");
    } else {
        std::fs::create_dir_all(&cli.output_dir).with_context(|| {
            format!("Failed to create output directory: {}", cli.output_dir.display())
        })?;
        let export_path = cli.export_path();
        let params = ExportParams {
            inputs: &inputs,
            rolling,
            excluded_countries: &excluded,
        };
        let export = AnalysisExport::new(&params, &summary, &matrix, &plots);
        write_analysis_export(&export, &export_path)?;
        print_success(&format!("Analysis saved to {}", export_path.display()));
    }
    let elapsed = step_start.elapsed();
    summary.record_time("Save", elapsed);
    print_step_time(elapsed);

    // Display summary
    summary.display();

    // Final completion message
    print_completion();

    Ok(())
}

/// Render the line plots, the heatmap and the pairplot into the output directory
fn render_plots(
    cli: &Cli,
    records: &[CountryYearRecord],
    matrix: &pipeline::CorrelationMatrix,
    average_columns: &[&str],
    rolling: RollingConfig,
) -> Result<RenderedPlots> {
    let specs = match &cli.plots {
        Some(path) => load_plot_specs(path)?,
        None => default_plot_specs(),
    };

    let mut rendered = RenderedPlots::default();
    let pb = create_progress_bar(specs.len() as u64 + 2, "Rendering plots");
    let mut skipped: Vec<String> = Vec::new();

    for (idx, spec) in specs.iter().enumerate() {
        let path: PathBuf = cli.output_dir.join(spec.file_name(idx));
        match render_line_plot(records, spec, rolling.window, &path) {
            Ok(outcome) => {
                skipped.extend(outcome.missing);
                rendered.line_plots.push(outcome.path);
            }
            Err(err) => {
                log::warn!("line plot {} not rendered: {:#}", idx + 1, err);
                skipped.extend(spec.countries.iter().cloned());
            }
        }
        pb.inc(1);
    }

    let heatmap_path = cli.output_dir.join("correlation_heatmap.svg");
    render_heatmap(matrix, &heatmap_path)?;
    rendered.heatmap = Some(heatmap_path);
    pb.inc(1);

    let pairplot_path = cli.output_dir.join("pairplot.svg");
    render_pairplot(records, average_columns, &pairplot_path)?;
    rendered.pairplot = Some(pairplot_path);
    pb.inc(1);

    if skipped.is_empty() {
        finish_with_success(&pb, &format!("{} plot(s) rendered", rendered.count()));
    } else {
        finish_with_warning(&pb, &format!("{} plot(s) rendered", rendered.count()));
        print_warning(&format!("No data for: {}", skipped.join(", ")));
    }

    for path in &rendered.line_plots {
        print_info(&path.display().to_string());
    }

    Ok(rendered)
}
