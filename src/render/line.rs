use std::path::Path;

use anyhow::Result;
use plotters::prelude::*;

use super::{BAR_BLUE, ChartText, FONT, padded_range};

/// Line chart over continuous x. `x_label` formats x-axis ticks; `markers`
/// adds a dot at every point.
pub fn draw_line(
    path: &Path,
    text: ChartText<'_>,
    points: &[(f64, f64)],
    x_label: &dyn Fn(&f64) -> String,
    markers: bool,
    size: (u32, u32),
) -> Result<()> {
    let root = BitMapBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE)?;

    let (x_lo, x_hi) = padded_range(points.iter().map(|(x, _)| *x));
    let y_max = points.iter().map(|(_, y)| *y).fold(1.0, f64::max) * 1.1;

    let mut chart = ChartBuilder::on(&root)
        .caption(text.title, (FONT, 28))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(x_lo..x_hi, 0f64..y_max)?;

    chart
        .configure_mesh()
        .x_labels(points.len().clamp(2, 24))
        .x_label_formatter(x_label)
        .y_label_formatter(&|v| format!("{v:.1}"))
        .x_desc(text.x_desc)
        .y_desc(text.y_desc)
        .label_style((FONT, 15))
        .axis_desc_style((FONT, 18))
        .draw()?;

    chart.draw_series(LineSeries::new(
        points.iter().copied(),
        BAR_BLUE.stroke_width(2),
    ))?;

    if markers {
        chart.draw_series(
            points
                .iter()
                .map(|(x, y)| Circle::new((*x, *y), 4, BAR_BLUE.filled())),
        )?;
    }

    root.present()?;
    Ok(())
}
