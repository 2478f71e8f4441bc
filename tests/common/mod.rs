//! Shared test utilities and fixture generators

#![allow(dead_code)]

use std::io::Write;
use std::path::{Path, PathBuf};

use polars::prelude::*;
use tempfile::TempDir;

/// First year of the generated Gapminder-like fixtures
pub const FIRST_YEAR: i32 = 1800;

/// Number of years in the generated fixtures (more than one 20-year window)
pub const YEARS: usize = 25;

/// Child mortality for a country at year offset `idx`
pub fn child_mortality(country: &str, idx: usize) -> f64 {
    match country {
        "Norway" => 300.0 - 2.0 * idx as f64,
        "Kenya" => 400.0 - idx as f64,
        _ => 200.0,
    }
}

/// Income per person for a country at year offset `idx`
pub fn income(country: &str, idx: usize) -> f64 {
    match country {
        "Norway" => 1000.0 + 100.0 * idx as f64,
        "Kenya" => 500.0 + 10.0 * idx as f64,
        _ => 50000.0,
    }
}

/// Life expectancy for a country at year offset `idx`
pub fn life_expectancy(country: &str, idx: usize) -> f64 {
    match country {
        "Norway" => 30.0 + 0.5 * idx as f64,
        "Kenya" => 25.0 + 0.25 * idx as f64,
        _ => 60.0,
    }
}

fn year_header() -> String {
    let years: Vec<String> = (0..YEARS)
        .map(|idx| (FIRST_YEAR + idx as i32).to_string())
        .collect();
    format!("country,{}", years.join(","))
}

fn write_lines(path: &Path, lines: &[String]) {
    let mut file = std::fs::File::create(path).unwrap();
    for line in lines {
        writeln!(file, "{}", line).unwrap();
    }
}

/// Write the three indicator tables as wide CSV files.
///
/// - Norway, Kenya and Monaco appear in every table
/// - Atlantis only appears in the child mortality table
/// - Kenya has no life expectancy for 1805
/// - Norway's income is written with a `k` suffix, Kenya's as plain numbers
///
/// Returns the temp dir (keep it alive) and the child mortality, income and
/// life expectancy paths.
pub fn write_gapminder_csvs() -> (TempDir, PathBuf, PathBuf, PathBuf) {
    let temp_dir = TempDir::new().unwrap();

    let mortality_path = temp_dir.path().join("child_mortality.csv");
    let mut lines = vec![year_header()];
    for country in ["Norway", "Kenya", "Monaco", "Atlantis"] {
        let values: Vec<String> = (0..YEARS)
            .map(|idx| child_mortality(country, idx).to_string())
            .collect();
        lines.push(format!("{},{}", country, values.join(",")));
    }
    write_lines(&mortality_path, &lines);

    let income_path = temp_dir.path().join("income.csv");
    let mut lines = vec![year_header()];
    for country in ["Norway", "Kenya", "Monaco"] {
        let values: Vec<String> = (0..YEARS)
            .map(|idx| {
                let value = income(country, idx);
                if country == "Kenya" {
                    value.to_string()
                } else {
                    format!("{}k", value / 1000.0)
                }
            })
            .collect();
        lines.push(format!("{},{}", country, values.join(",")));
    }
    write_lines(&income_path, &lines);

    let life_path = temp_dir.path().join("life_expectancy.csv");
    let mut lines = vec![year_header()];
    for country in ["Kenya", "Norway", "Monaco"] {
        let values: Vec<String> = (0..YEARS)
            .map(|idx| {
                if country == "Kenya" && idx == 5 {
                    String::new()
                } else {
                    life_expectancy(country, idx).to_string()
                }
            })
            .collect();
        lines.push(format!("{},{}", country, values.join(",")));
    }
    write_lines(&life_path, &lines);

    (temp_dir, mortality_path, income_path, life_path)
}

/// A cell of a generated spreadsheet
#[derive(Debug, Clone)]
pub enum SheetCell {
    Num(f64),
    Text(String),
    Empty,
}

/// Numeric spreadsheet cell
pub fn num(value: f64) -> SheetCell {
    SheetCell::Num(value)
}

/// Text spreadsheet cell
pub fn text(value: &str) -> SheetCell {
    SheetCell::Text(value.to_string())
}

fn column_letter(mut idx: usize) -> String {
    let mut letters = Vec::new();
    loop {
        letters.push((b'A' + (idx % 26) as u8) as char);
        if idx < 26 {
            break;
        }
        idx = idx / 26 - 1;
    }
    letters.iter().rev().collect()
}

fn escape_xml(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Write a single-sheet xlsx workbook with inline strings
pub fn write_xlsx(path: &Path, rows: &[Vec<SheetCell>]) {
    use ::zip::write::SimpleFileOptions;

    let mut sheet = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main"><sheetData>"#,
    );
    for (r, row) in rows.iter().enumerate() {
        sheet.push_str(&format!(r#"<row r="{}">"#, r + 1));
        for (c, cell) in row.iter().enumerate() {
            let reference = format!("{}{}", column_letter(c), r + 1);
            match cell {
                SheetCell::Num(v) => {
                    sheet.push_str(&format!(r#"<c r="{}"><v>{}</v></c>"#, reference, v))
                }
                SheetCell::Text(s) => sheet.push_str(&format!(
                    r#"<c r="{}" t="inlineStr"><is><t>{}</t></is></c>"#,
                    reference,
                    escape_xml(s)
                )),
                SheetCell::Empty => {}
            }
        }
        sheet.push_str("</row>");
    }
    sheet.push_str("</sheetData></worksheet>");

    let parts: [(&str, String); 5] = [
        (
            "[Content_Types].xml",
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/xl/workbook.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"/><Override PartName="/xl/worksheets/sheet1.xml" ContentType="application/vnd.openxmlformats-officedocument.spreadsheetml.worksheet+xml"/></Types>"#.to_string(),
        ),
        (
            "_rels/.rels",
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="xl/workbook.xml"/></Relationships>"#.to_string(),
        ),
        (
            "xl/workbook.xml",
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><workbook xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships"><sheets><sheet name="Data" sheetId="1" r:id="rId1"/></sheets></workbook>"#.to_string(),
        ),
        (
            "xl/_rels/workbook.xml.rels",
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/worksheet" Target="worksheets/sheet1.xml"/></Relationships>"#.to_string(),
        ),
        ("xl/worksheets/sheet1.xml", sheet),
    ];

    let file = std::fs::File::create(path).unwrap();
    let mut zip = ::zip::ZipWriter::new(file);
    for (name, contents) in parts {
        zip.start_file(name, SimpleFileOptions::default()).unwrap();
        zip.write_all(contents.as_bytes()).unwrap();
    }
    zip.finish().unwrap();
}

/// Create a temporary directory with a test CSV file
pub fn create_temp_csv(df: &mut DataFrame) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let csv_path = temp_dir.path().join("test_data.csv");

    let mut file = std::fs::File::create(&csv_path).unwrap();
    CsvWriter::new(&mut file).finish(df).unwrap();

    (temp_dir, csv_path)
}

/// Create a temporary directory with a test Parquet file
pub fn create_temp_parquet(df: &mut DataFrame) -> (TempDir, PathBuf) {
    let temp_dir = TempDir::new().unwrap();
    let parquet_path = temp_dir.path().join("test_data.parquet");

    let file = std::fs::File::create(&parquet_path).unwrap();
    ParquetWriter::new(file).finish(df).unwrap();

    (temp_dir, parquet_path)
}

/// A long table with the three raw indicator columns, as produced by the merge
pub fn create_merged_dataframe() -> DataFrame {
    df! {
        "country" => ["Norway", "Norway", "Kenya", "Monaco"],
        "year" => [1800i32, 1801, 1800, 1800],
        "child_mortality_per_1000_born" => [Some(300.0f64), Some(298.0), Some(400.0), Some(200.0)],
        "income_per_person" => [Some("1.2k"), Some("1300"), None, Some("50k")],
        "life_expectancy_years" => [Some(30.0f64), Some(30.5), Some(25.0), Some(60.0)],
    }
    .unwrap()
}

/// Assert that a DataFrame has expected shape
pub fn assert_shape(df: &DataFrame, expected_rows: usize, expected_cols: usize) {
    let (rows, cols) = df.shape();
    assert_eq!(rows, expected_rows, "Row count mismatch: expected {}, got {}", expected_rows, rows);
    assert_eq!(
        cols, expected_cols,
        "Column count mismatch: expected {}, got {}",
        expected_cols, cols
    );
}

/// Assert that a DataFrame contains specific columns
pub fn assert_has_columns(df: &DataFrame, expected_cols: &[&str]) {
    let actual_cols: Vec<String> = df.get_column_names().iter().map(|s| s.to_string()).collect();
    for col in expected_cols {
        assert!(
            actual_cols.contains(&col.to_string()),
            "Missing expected column: '{}'. Actual columns: {:?}",
            col,
            actual_cols
        );
    }
}

/// Float values of a column
pub fn f64_values(df: &DataFrame, column: &str) -> Vec<Option<f64>> {
    df.column(column)
        .unwrap()
        .cast(&DataType::Float64)
        .unwrap()
        .f64()
        .unwrap()
        .into_iter()
        .collect()
}

/// String values of a column
pub fn str_values(df: &DataFrame, column: &str) -> Vec<String> {
    df.column(column)
        .unwrap()
        .str()
        .unwrap()
        .into_no_null_iter()
        .map(|s| s.to_string())
        .collect()
}

pub fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9 * b.abs().max(1.0)
}
