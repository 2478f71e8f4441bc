//! End-to-end tests of the pipeline stages on generated indicator tables

use gaptrends::pipeline::{
    add_rolling_averages, clean_merged_table, correlation_matrix, load_wide_table,
    melt_wide_table, merge_indicators, records_from_frame, save_table, CountryYearRecord,
    Indicator, RollingConfig, DEFAULT_EXCLUDED_COUNTRIES,
};
use gaptrends::plot::{render_heatmap, render_line_plot, render_pairplot, PlotSpec};
use polars::prelude::*;
use std::path::Path;

#[path = "common/mod.rs"]
mod common;

use common::{approx_eq, write_gapminder_csvs, FIRST_YEAR, YEARS};

fn load_long(indicator: Indicator, path: &Path) -> DataFrame {
    let wide = load_wide_table(path).unwrap();
    melt_wide_table(&wide, indicator.column()).unwrap()
}

fn merged_table() -> (tempfile::TempDir, DataFrame) {
    let (dir, mortality, income, life) = write_gapminder_csvs();
    let tables = vec![
        load_long(Indicator::ChildMortality, &mortality),
        load_long(Indicator::Income, &income),
        load_long(Indicator::LifeExpectancy, &life),
    ];
    let merged = merge_indicators(&tables).unwrap();
    (dir, merged)
}

fn final_records() -> (tempfile::TempDir, DataFrame, Vec<CountryYearRecord>) {
    let (dir, merged) = merged_table();
    let outcome = clean_merged_table(&merged, &DEFAULT_EXCLUDED_COUNTRIES).unwrap();
    let table = add_rolling_averages(&outcome.table, RollingConfig::default()).unwrap();
    let records = records_from_frame(&table).unwrap();
    (dir, table, records)
}

#[test]
fn test_long_tables_have_country_year_rows() {
    let (_dir, mortality, _, _) = write_gapminder_csvs();
    let long = load_long(Indicator::ChildMortality, &mortality);

    assert_eq!(long.height(), 4 * YEARS);
}

#[test]
fn test_merge_drops_countries_missing_from_a_table() {
    let (_dir, merged) = merged_table();

    // Atlantis is only in the child mortality table
    assert_eq!(merged.height(), 3 * YEARS);
    let countries = common::str_values(&merged, "country");
    assert!(!countries.contains(&"Atlantis".to_string()));
}

#[test]
fn test_cleaning_counts() {
    let (_dir, merged) = merged_table();

    let outcome = clean_merged_table(&merged, &DEFAULT_EXCLUDED_COUNTRIES).unwrap();

    assert_eq!(outcome.dropped_missing, 1);
    assert_eq!(outcome.dropped_excluded, YEARS);
    assert_eq!(outcome.table.height(), 2 * YEARS - 1);
    for column in outcome.table.get_columns() {
        assert_eq!(column.null_count(), 0, "nulls left in {}", column.name());
    }
}

#[test]
fn test_final_records() {
    let (_dir, _table, records) = final_records();

    assert_eq!(records.len(), 2 * YEARS - 1);
    assert!(records.iter().all(|r| r.country != "Monaco"));
    assert!(!records
        .iter()
        .any(|r| r.country == "Kenya" && r.year == FIRST_YEAR + 5));

    // Income written as "1.1k" comes out as a number
    let norway_1801 = records
        .iter()
        .find(|r| r.country == "Norway" && r.year == FIRST_YEAR + 1)
        .unwrap();
    assert!(approx_eq(norway_1801.income_per_person, 1100.0));
}

#[test]
fn test_first_average_equals_raw_value() {
    let (_dir, _table, records) = final_records();

    for country in ["Norway", "Kenya"] {
        let first = records
            .iter()
            .filter(|r| r.country == country)
            .min_by_key(|r| r.year)
            .unwrap();
        for indicator in Indicator::ALL {
            assert!(
                approx_eq(first.average(indicator).unwrap(), first.value(indicator)),
                "{} {}",
                country,
                indicator
            );
        }
    }
}

#[test]
fn test_twenty_year_average_after_full_window() {
    let (_dir, _table, records) = final_records();

    let last = records
        .iter()
        .find(|r| r.country == "Norway" && r.year == FIRST_YEAR + YEARS as i32 - 1)
        .unwrap();

    // Mean of 300 - 2i for i in 5..=24
    assert!(approx_eq(last.avg_child_mortality.unwrap(), 271.0));
    // Mean of 1000 + 100i for i in 5..=24
    assert!(approx_eq(last.avg_income.unwrap(), 2450.0));
    // Mean of 30 + 0.5i for i in 5..=24
    assert!(approx_eq(last.avg_life_years.unwrap(), 37.25));
}

#[test]
fn test_correlation_and_plots() {
    let (dir, table, records) = final_records();
    let columns: Vec<&str> = Indicator::ALL.iter().map(|i| i.average_column()).collect();

    let matrix = correlation_matrix(&table, &columns).unwrap();
    assert_eq!(matrix.get("avg_income", "avg_income"), Some(1.0));

    let spec = PlotSpec::new(Indicator::Income, &["Norway", "Kenya", "Atlantis"]);
    let line_path = dir.path().join("line.svg");
    let outcome = render_line_plot(&records, &spec, 20, &line_path).unwrap();
    assert_eq!(outcome.plotted, vec!["Norway", "Kenya"]);
    assert_eq!(outcome.missing, vec!["Atlantis"]);
    assert!(line_path.exists());

    let heatmap_path = dir.path().join("heatmap.svg");
    render_heatmap(&matrix, &heatmap_path).unwrap();
    let svg = std::fs::read_to_string(&heatmap_path).unwrap();
    assert!(svg.contains("<svg"));

    let pairplot_path = dir.path().join("pairplot.svg");
    render_pairplot(&records, &columns, &pairplot_path).unwrap();
    assert!(pairplot_path.exists());
}

#[test]
fn test_save_final_table_as_csv() {
    let (dir, mut table, _records) = final_records();
    let path = dir.path().join("out").join("final.csv");

    save_table(&mut table, &path).unwrap();

    let reloaded = CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(path))
        .unwrap()
        .finish()
        .unwrap();
    assert_eq!(reloaded.height(), table.height());
    common::assert_has_columns(&reloaded, &["avg_child_mortality", "avg_income", "avg_life_years"]);
}
