use std::path::Path;

use anyhow::Result;
use plotters::prelude::*;

use super::{ChartText, FONT, count_axis_max};

fn segment_label(labels: &[String], v: &SegmentValue<usize>) -> String {
    match v {
        SegmentValue::CenterOf(i) => labels.get(*i).cloned().unwrap_or_default(),
        _ => String::new(),
    }
}

/// Vertical bar chart with one category label per bar, in the given order.
pub fn draw_bars(
    path: &Path,
    text: ChartText<'_>,
    labels: &[String],
    values: &[usize],
    color: RGBColor,
    size: (u32, u32),
) -> Result<()> {
    let root = BitMapBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE)?;

    let n = labels.len().max(1);
    let y_max = count_axis_max(values.iter().copied());

    let mut chart = ChartBuilder::on(&root)
        .caption(text.title, (FONT, 28))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(70)
        .build_cartesian_2d((0..n).into_segmented(), 0usize..y_max)?;

    let x_fmt = |v: &SegmentValue<usize>| segment_label(labels, v);
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(n)
        .x_label_formatter(&x_fmt)
        .x_desc(text.x_desc)
        .y_desc(text.y_desc)
        .label_style((FONT, 16))
        .axis_desc_style((FONT, 18))
        .draw()?;

    chart.draw_series(
        Histogram::vertical(&chart)
            .style(color.filled())
            .margin(10)
            .data(values.iter().enumerate().map(|(i, v)| (i, *v))),
    )?;

    root.present()?;
    Ok(())
}

/// Horizontal bar chart; the first label is drawn at the top.
pub fn draw_horizontal_bars(
    path: &Path,
    text: ChartText<'_>,
    labels: &[String],
    values: &[usize],
    color: RGBColor,
    size: (u32, u32),
) -> Result<()> {
    let root = BitMapBackend::new(path, size).into_drawing_area();
    root.fill(&WHITE)?;

    let n = labels.len().max(1);
    let x_max = count_axis_max(values.iter().copied());
    // Segment 0 sits at the bottom of the axis, so rows are flipped.
    let flipped: Vec<String> = labels.iter().rev().cloned().collect();

    let mut chart = ChartBuilder::on(&root)
        .caption(text.title, (FONT, 28))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(260)
        .build_cartesian_2d(0usize..x_max, (0..n).into_segmented())?;

    let y_fmt = |v: &SegmentValue<usize>| segment_label(&flipped, v);
    chart
        .configure_mesh()
        .disable_y_mesh()
        .y_labels(n)
        .y_label_formatter(&y_fmt)
        .x_desc(text.x_desc)
        .y_desc(text.y_desc)
        .label_style((FONT, 15))
        .axis_desc_style((FONT, 18))
        .draw()?;

    let last = values.len().saturating_sub(1);
    chart.draw_series(
        Histogram::horizontal(&chart)
            .style(color.filled())
            .margin(6)
            .data(values.iter().enumerate().map(|(i, v)| (last - i, *v))),
    )?;

    root.present()?;
    Ok(())
}
