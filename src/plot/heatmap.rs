//! Correlation heatmap

use std::path::Path;

use anyhow::Result;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};

use crate::pipeline::CorrelationMatrix;

const CELL_SIZE: i32 = 160;
const LEFT_MARGIN: i32 = 220;
const TOP_MARGIN: i32 = 80;
const BOTTOM_MARGIN: i32 = 120;

/// Diverging color for a coefficient: blue for -1, white for 0, red for +1
pub fn correlation_color(r: f64) -> RGBColor {
    if !r.is_finite() {
        return RGBColor(210, 210, 210);
    }

    let r = r.clamp(-1.0, 1.0);
    let fade = |strength: f64| (255.0 * (1.0 - strength)).round() as u8;
    if r >= 0.0 {
        RGBColor(255, fade(r), fade(r))
    } else {
        RGBColor(fade(-r), fade(-r), 255)
    }
}

/// Render the matrix as a colored grid with the coefficient in every cell
pub fn render_heatmap(matrix: &CorrelationMatrix, path: &Path) -> Result<()> {
    let n = matrix.columns.len() as i32;
    if n == 0 {
        anyhow::bail!("Cannot draw a heatmap of an empty correlation matrix");
    }

    let width = (LEFT_MARGIN + n * CELL_SIZE + 40) as u32;
    let height = (TOP_MARGIN + n * CELL_SIZE + BOTTOM_MARGIN) as u32;

    let root = SVGBackend::new(path, (width, height)).into_drawing_area();
    root.fill(&WHITE)?;

    let centered = Pos::new(HPos::Center, VPos::Center);
    let title_style = TextStyle::from(("sans-serif", 28).into_font()).pos(centered);
    let value_style = TextStyle::from(("sans-serif", 22).into_font()).pos(centered);
    let row_label_style =
        TextStyle::from(("sans-serif", 18).into_font()).pos(Pos::new(HPos::Right, VPos::Center));
    let col_label_style =
        TextStyle::from(("sans-serif", 18).into_font()).pos(Pos::new(HPos::Center, VPos::Top));

    root.draw(&Text::new(
        "Correlation of rolling averages",
        ((width / 2) as i32, TOP_MARGIN / 2),
        title_style,
    ))?;

    for (i, row) in matrix.values.iter().enumerate() {
        let y0 = TOP_MARGIN + i as i32 * CELL_SIZE;
        for (j, r) in row.iter().enumerate() {
            let x0 = LEFT_MARGIN + j as i32 * CELL_SIZE;
            root.draw(&Rectangle::new(
                [(x0, y0), (x0 + CELL_SIZE, y0 + CELL_SIZE)],
                correlation_color(*r).filled(),
            ))?;
            root.draw(&Rectangle::new(
                [(x0, y0), (x0 + CELL_SIZE, y0 + CELL_SIZE)],
                WHITE.stroke_width(2),
            ))?;

            let label = if r.is_finite() {
                format!("{:.2}", r)
            } else {
                "n/a".to_string()
            };
            root.draw(&Text::new(
                label,
                (x0 + CELL_SIZE / 2, y0 + CELL_SIZE / 2),
                value_style.clone(),
            ))?;
        }

        root.draw(&Text::new(
            matrix.columns[i].clone(),
            (LEFT_MARGIN - 12, y0 + CELL_SIZE / 2),
            row_label_style.clone(),
        ))?;
    }

    for (j, name) in matrix.columns.iter().enumerate() {
        let x = LEFT_MARGIN + j as i32 * CELL_SIZE + CELL_SIZE / 2;
        root.draw(&Text::new(
            name.clone(),
            (x, TOP_MARGIN + n * CELL_SIZE + 12),
            col_label_style.clone(),
        ))?;
    }

    root.present()?;
    Ok(())
}
