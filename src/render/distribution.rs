use std::path::Path;

use anyhow::Result;
use plotters::prelude::*;

use super::{BAR_BLUE, CURVE_RED, ChartText, FONT, count_axis_max};
use crate::analyzers::types::Distribution;

/// Histogram bars with the density curve drawn over them.
pub fn draw_distribution(
    path: &Path,
    text: ChartText<'_>,
    dist: &Distribution,
    size: (u32, u32),
) -> Result<()> {
    let root = BitMapBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE)?;

    let hist = &dist.histogram;
    let (x_lo, x_hi) = hist.range();
    let curve_max = dist
        .density
        .iter()
        .flatten()
        .map(|(_, y)| y.ceil() as usize);
    let y_max = count_axis_max(hist.counts.iter().copied().chain(curve_max)) as f64;

    let mut chart = ChartBuilder::on(&root)
        .caption(text.title, (FONT, 28))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d(x_lo..x_hi, 0f64..y_max)?;

    chart
        .configure_mesh()
        .x_label_formatter(&|v| format!("{v:.1}"))
        .y_label_formatter(&|v| format!("{v:.0}"))
        .x_desc(text.x_desc)
        .y_desc(text.y_desc)
        .label_style((FONT, 15))
        .axis_desc_style((FONT, 18))
        .draw()?;

    chart.draw_series(
        hist.edges
            .windows(2)
            .zip(&hist.counts)
            .filter(|(_, count)| **count > 0)
            .map(|(edge, count)| {
                Rectangle::new(
                    [(edge[0], 0.0), (edge[1], *count as f64)],
                    BAR_BLUE.mix(0.6).filled(),
                )
            }),
    )?;

    if let Some(curve) = &dist.density {
        chart.draw_series(LineSeries::new(
            curve.iter().copied(),
            CURVE_RED.stroke_width(2),
        ))?;
    }

    root.present()?;
    Ok(())
}
