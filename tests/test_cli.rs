//! Argument parsing and whole-binary runs

use assert_cmd::Command;
use clap::Parser;
use gaptrends::cli::{Cli, Commands};
use gaptrends::pipeline::{Indicator, DEFAULT_EXCLUDED_COUNTRIES};
use predicates::prelude::*;
use std::path::PathBuf;
use tempfile::TempDir;

#[path = "common/mod.rs"]
mod common;

#[test]
fn test_defaults() {
    let cli = Cli::parse_from(["gaptrends"]);

    assert!(cli.command.is_none());
    assert_eq!(cli.window, 20);
    assert_eq!(cli.min_periods, 1);
    assert_eq!(cli.output_dir, PathBuf::from("gaptrends_output"));
    assert_eq!(cli.excluded_countries().len(), DEFAULT_EXCLUDED_COUNTRIES.len());
    assert_eq!(
        cli.indicator_path(Indicator::Income),
        PathBuf::from(".").join(Indicator::Income.default_file_name())
    );
    assert_eq!(
        cli.export_path(),
        PathBuf::from("gaptrends_output").join("analysis.json")
    );
}

#[test]
fn test_explicit_paths_override_data_dir() {
    let cli = Cli::parse_from([
        "gaptrends",
        "--data-dir",
        "data",
        "--income",
        "/tmp/income.csv",
    ]);

    let paths = cli.indicator_paths();
    assert_eq!(paths.len(), 3);
    assert_eq!(paths[0].0, Indicator::ChildMortality);
    assert_eq!(
        paths[0].1,
        PathBuf::from("data").join(Indicator::ChildMortality.default_file_name())
    );
    assert_eq!(cli.indicator_path(Indicator::Income), PathBuf::from("/tmp/income.csv"));
}

#[test]
fn test_exclusion_overrides() {
    let cli = Cli::parse_from(["gaptrends", "--exclude", "Monaco; Palau;"]);
    assert_eq!(cli.excluded_countries(), vec!["Monaco", "Palau"]);

    let cli = Cli::parse_from(["gaptrends", "--keep-all-countries"]);
    assert!(cli.excluded_countries().is_empty());

    let conflicting = ["gaptrends", "--keep-all-countries", "--exclude", "Monaco"];
    assert!(Cli::try_parse_from(conflicting).is_err());
}

#[test]
fn test_zero_window_rejected() {
    assert!(Cli::try_parse_from(["gaptrends", "--window", "0"]).is_err());
    assert!(Cli::try_parse_from(["gaptrends", "--window", "ten"]).is_err());
}

#[test]
fn test_convert_subcommand() {
    let cli = Cli::parse_from(["gaptrends", "convert", "income.xlsx", "--value-name", "income"]);

    match cli.command {
        Some(Commands::Convert {
            input,
            output,
            value_name,
        }) => {
            assert_eq!(input, PathBuf::from("income.xlsx"));
            assert!(output.is_none());
            assert_eq!(value_name, "income");
        }
        None => panic!("expected convert subcommand"),
    }
}

#[test]
fn test_binary_full_run() {
    let (data_dir, mortality, income, life) = common::write_gapminder_csvs();
    let output_dir = TempDir::new().unwrap();
    let table_path = output_dir.path().join("final.parquet");

    Command::cargo_bin("gaptrends")
        .unwrap()
        .arg("--child-mortality")
        .arg(&mortality)
        .arg("--income")
        .arg(&income)
        .arg("--life-expectancy")
        .arg(&life)
        .arg("--output-dir")
        .arg(output_dir.path())
        .arg("--save-table")
        .arg(&table_path)
        .assert()
        .success()
        .stdout(predicate::str::contains("Rolling Averages"));

    assert!(output_dir.path().join("correlation_heatmap.svg").exists());
    assert!(output_dir.path().join("pairplot.svg").exists());
    assert!(table_path.exists());

    let json = std::fs::read_to_string(output_dir.path().join("analysis.json")).unwrap();
    let export: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(export["metadata"]["rolling_window"], 20);
    assert_eq!(export["summary"]["final_rows"], 2 * common::YEARS - 1);

    drop(data_dir);
}

#[test]
fn test_binary_min_periods_run() {
    let (data_dir, mortality, income, life) = common::write_gapminder_csvs();
    let output_dir = TempDir::new().unwrap();

    Command::cargo_bin("gaptrends")
        .unwrap()
        .arg("--child-mortality")
        .arg(&mortality)
        .arg("--income")
        .arg(&income)
        .arg("--life-expectancy")
        .arg(&life)
        .arg("--output-dir")
        .arg(output_dir.path())
        .arg("--min-periods")
        .arg("2")
        .assert()
        .success();

    assert!(output_dir.path().join("pairplot.svg").exists());

    let json = std::fs::read_to_string(output_dir.path().join("analysis.json")).unwrap();
    let export: serde_json::Value = serde_json::from_str(&json).unwrap();
    assert_eq!(export["metadata"]["min_periods"], 2);
    assert_eq!(export["summary"]["final_rows"], 2 * common::YEARS - 1);

    drop(data_dir);
}

#[test]
fn test_binary_min_periods_above_window_fails() {
    let (data_dir, mortality, income, life) = common::write_gapminder_csvs();
    let output_dir = TempDir::new().unwrap();

    Command::cargo_bin("gaptrends")
        .unwrap()
        .arg("--child-mortality")
        .arg(&mortality)
        .arg("--income")
        .arg(&income)
        .arg("--life-expectancy")
        .arg(&life)
        .arg("--output-dir")
        .arg(output_dir.path())
        .arg("--window")
        .arg("3")
        .arg("--min-periods")
        .arg("4")
        .assert()
        .failure();

    drop(data_dir);
}

#[test]
fn test_binary_fails_when_cleaning_leaves_no_rows() {
    let (data_dir, mortality, income, life) = common::write_gapminder_csvs();
    let output_dir = TempDir::new().unwrap();

    Command::cargo_bin("gaptrends")
        .unwrap()
        .arg("--child-mortality")
        .arg(&mortality)
        .arg("--income")
        .arg(&income)
        .arg("--life-expectancy")
        .arg(&life)
        .arg("--output-dir")
        .arg(output_dir.path())
        .arg("--exclude")
        .arg("Norway;Kenya;Monaco")
        .assert()
        .failure()
        .stdout(predicate::str::contains("3 countries × 25 years"))
        .stderr(predicate::str::contains(
            "No rows left after cleaning; check that the three tables share countries and years",
        ));

    drop(data_dir);
}

#[test]
fn test_binary_missing_input() {
    let data_dir = TempDir::new().unwrap();

    Command::cargo_bin("gaptrends")
        .unwrap()
        .arg("--data-dir")
        .arg(data_dir.path())
        .arg("--no-plots")
        .assert()
        .failure()
        .stderr(predicate::str::contains("not found"));
}
