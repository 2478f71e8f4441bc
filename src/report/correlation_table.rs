//! Terminal table of correlation coefficients

use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, CellAlignment, Color, Table};

use crate::pipeline::CorrelationMatrix;

/// Color of a coefficient cell: sign picks the hue, strength the intensity
pub fn coefficient_color(r: f64) -> Color {
    if !r.is_finite() {
        Color::DarkGrey
    } else if r >= 0.7 {
        Color::Green
    } else if r >= 0.3 {
        Color::DarkGreen
    } else if r <= -0.7 {
        Color::Red
    } else if r <= -0.3 {
        Color::DarkRed
    } else {
        Color::White
    }
}

/// Build the coefficient table for a correlation matrix
pub fn correlation_table(matrix: &CorrelationMatrix) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);

    let mut header = vec![Cell::new("")];
    header.extend(
        matrix
            .columns
            .iter()
            .map(|c| Cell::new(c).add_attribute(Attribute::Bold)),
    );
    table.set_header(header);

    for (name, row) in matrix.columns.iter().zip(&matrix.values) {
        let mut cells = vec![Cell::new(name).add_attribute(Attribute::Bold)];
        cells.extend(row.iter().map(|r| {
            let text = if r.is_finite() {
                format!("{:+.3}", r)
            } else {
                "n/a".to_string()
            };
            Cell::new(text)
                .set_alignment(CellAlignment::Right)
                .fg(coefficient_color(*r))
        }));
        table.add_row(cells);
    }

    table
}

/// Print the coefficient table indented like the other reports
pub fn display_correlation_table(matrix: &CorrelationMatrix) {
    for line in correlation_table(matrix).to_string().lines() {
        println!("    {}", line);
    }
}
