//! Pipeline summary report

use std::time::Duration;

use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, CellAlignment, Color, Table};
use console::style;
use serde::Serialize;

use crate::pipeline::Indicator;

/// Row counts and timings collected while the pipeline runs
#[derive(Debug, Default, Clone, Serialize)]
pub struct PipelineSummary {
    /// Long-format rows per indicator before the merge
    pub long_rows: Vec<(Indicator, usize)>,
    pub merged_rows: usize,
    pub dropped_missing: usize,
    pub dropped_excluded: usize,
    pub final_rows: usize,
    pub countries: usize,
    pub year_range: Option<(i32, i32)>,
    pub plots_rendered: usize,
    #[serde(skip)]
    pub timings: Vec<(String, Duration)>,
}

impl PipelineSummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_long_rows(&mut self, indicator: Indicator, rows: usize) {
        self.long_rows.push((indicator, rows));
    }

    pub fn set_merged_rows(&mut self, rows: usize) {
        self.merged_rows = rows;
    }

    pub fn set_cleaning(&mut self, dropped_missing: usize, dropped_excluded: usize) {
        self.dropped_missing = dropped_missing;
        self.dropped_excluded = dropped_excluded;
    }

    pub fn set_final_table(
        &mut self,
        rows: usize,
        countries: usize,
        year_range: Option<(i32, i32)>,
    ) {
        self.final_rows = rows;
        self.countries = countries;
        self.year_range = year_range;
    }

    pub fn set_plots_rendered(&mut self, count: usize) {
        self.plots_rendered = count;
    }

    pub fn record_time(&mut self, step: &str, elapsed: Duration) {
        self.timings.push((step.to_string(), elapsed));
    }

    pub fn total_time(&self) -> Duration {
        self.timings.iter().map(|(_, d)| *d).sum()
    }

    /// Share of merged rows that survived cleaning, in percent
    pub fn retained_pct(&self) -> f64 {
        if self.merged_rows == 0 {
            0.0
        } else {
            self.final_rows as f64 / self.merged_rows as f64 * 100.0
        }
    }

    pub fn display(&self) {
        println!();
        println!(
            "    {} {}",
            style("📋").cyan(),
            style("PIPELINE SUMMARY").white().bold()
        );
        println!("    {}", style("─".repeat(50)).dim());
        println!();

        let mut table = Table::new();
        table.load_preset(UTF8_FULL_CONDENSED);
        table.set_header(vec![
            Cell::new("Metric").add_attribute(Attribute::Bold),
            Cell::new("Value").add_attribute(Attribute::Bold),
        ]);

        for (indicator, rows) in &self.long_rows {
            table.add_row(vec![
                Cell::new(format!("📁 Rows ({})", indicator)),
                Cell::new(rows).set_alignment(CellAlignment::Right),
            ]);
        }

        table.add_row(vec![
            Cell::new("🔗 Merged Rows"),
            Cell::new(self.merged_rows).set_alignment(CellAlignment::Right),
        ]);

        table.add_row(vec![
            Cell::new("🗑️  Dropped (Missing)"),
            Cell::new(self.dropped_missing)
                .set_alignment(CellAlignment::Right)
                .fg(if self.dropped_missing == 0 {
                    Color::White
                } else {
                    Color::Red
                }),
        ]);

        table.add_row(vec![
            Cell::new("🚫 Dropped (Excluded)"),
            Cell::new(self.dropped_excluded)
                .set_alignment(CellAlignment::Right)
                .fg(if self.dropped_excluded == 0 {
                    Color::White
                } else {
                    Color::Red
                }),
        ]);

        table.add_row(vec![
            Cell::new("✅ Final Rows"),
            Cell::new(self.final_rows)
                .set_alignment(CellAlignment::Right)
                .fg(Color::Green)
                .add_attribute(Attribute::Bold),
        ]);

        table.add_row(vec![
            Cell::new("🌍 Countries"),
            Cell::new(self.countries).set_alignment(CellAlignment::Right),
        ]);

        if let Some((first, last)) = self.year_range {
            table.add_row(vec![
                Cell::new("📅 Years"),
                Cell::new(format!("{}–{}", first, last)).set_alignment(CellAlignment::Right),
            ]);
        }

        let retained = self.retained_pct();
        let color = if retained > 90.0 {
            Color::Green
        } else if retained > 50.0 {
            Color::Yellow
        } else {
            Color::Red
        };
        table.add_row(vec![
            Cell::new("📉 Retained"),
            Cell::new(format!("{:.1}%", retained))
                .set_alignment(CellAlignment::Right)
                .fg(color)
                .add_attribute(Attribute::Bold),
        ]);

        table.add_row(vec![
            Cell::new("🖼️  Plots"),
            Cell::new(self.plots_rendered).set_alignment(CellAlignment::Right),
        ]);

        // Indent the table
        for line in table.to_string().lines() {
            println!("    {}", line);
        }

        if !self.timings.is_empty() {
            println!();
            println!(
                "    {} {}",
                style("⏱").cyan(),
                style("TIMINGS").white().bold()
            );
            println!("    {}", style("─".repeat(50)).dim());
            for (step, elapsed) in &self.timings {
                println!(
                    "      {:<24} {}",
                    step,
                    style(format!("{:.2}s", elapsed.as_secs_f64())).dim()
                );
            }
            println!(
                "      {:<24} {}",
                style("Total").bold(),
                style(format!("{:.2}s", self.total_time().as_secs_f64())).bold()
            );
        }
    }
}
