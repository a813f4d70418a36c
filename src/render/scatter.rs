use std::path::Path;

use anyhow::Result;
use plotters::prelude::*;

use super::{BAR_BLUE, ChartText, FONT, padded_range};

pub fn draw_scatter(
    path: &Path,
    text: ChartText<'_>,
    points: &[(f64, f64)],
    size: (u32, u32),
) -> Result<()> {
    let root = BitMapBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE)?;

    let (x_lo, x_hi) = padded_range(points.iter().map(|(x, _)| *x));
    let (y_lo, y_hi) = padded_range(points.iter().map(|(_, y)| *y));

    let mut chart = ChartBuilder::on(&root)
        .caption(text.title, (FONT, 28))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(x_lo..x_hi, y_lo..y_hi)?;

    chart
        .configure_mesh()
        .x_desc(text.x_desc)
        .y_desc(text.y_desc)
        .label_style((FONT, 15))
        .axis_desc_style((FONT, 18))
        .draw()?;

    chart.draw_series(
        points
            .iter()
            .map(|(x, y)| Circle::new((*x, *y), 3, BAR_BLUE.mix(0.5).filled())),
    )?;

    root.present()?;
    Ok(())
}
