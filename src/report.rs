//! Multi-page PDF report: a text summary page followed by one page per chart.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result as AnyResult};
use chrono::NaiveDateTime;
use printpdf::image_crate::{self, GenericImageView};
use printpdf::{
    BuiltinFont, Image, ImageTransform, IndirectFontRef, Mm, PdfDocument, PdfDocumentReference,
    PdfLayerReference,
};
use tracing::{debug, info};

use crate::error::{PipelineError, Result};
use crate::stats::SummaryMetrics;

pub const REPORT_PDF: &str = "bangalore_analysis_report.pdf";

const PAGE_WIDTH_MM: f32 = 210.0;
const PAGE_HEIGHT_MM: f32 = 297.0;
const MARGIN_MM: f32 = 10.0;
const LINE_STEP_MM: f32 = PAGE_HEIGHT_MM * 0.03;

/// Builds the summary page text, one entry per line. `purposes` must already
/// be in descending-count order; only the first `top` are listed.
pub fn summary_lines(
    summary: &SummaryMetrics,
    purposes: &[(String, usize)],
    top: usize,
    generated_at: NaiveDateTime,
) -> Vec<String> {
    let day = |t: Option<NaiveDateTime>| {
        t.map(|t| t.format("%Y-%m-%d").to_string())
            .unwrap_or_else(|| "NaT".to_string())
    };

    let mut lines = vec![
        format!("Generated: {}", generated_at.format("%Y-%m-%d %H:%M:%S")),
        String::new(),
        format!("Total rides analyzed: {}", summary.total_rides),
        format!(
            "Date range: {} to {}",
            day(summary.date_range_start),
            day(summary.date_range_end)
        ),
        format!("Unique pickup locations: {}", summary.unique_start_locations),
        format!("Unique dropoff locations: {}", summary.unique_stop_locations),
        String::new(),
        "Distance (miles):".to_string(),
        format!("  - Mean: {:.2}", summary.mean_distance_miles),
        format!("  - Median: {:.2}", summary.median_distance_miles),
        String::new(),
        "Duration (minutes):".to_string(),
        format!("  - Mean: {:.2}", summary.mean_duration_mins),
        format!("  - Median: {:.2}", summary.median_duration_mins),
        String::new(),
        format!("Top {top} ride purposes:"),
    ];
    for (purpose, count) in purposes.iter().take(top) {
        lines.push(format!("  - {purpose}: {count} rides"));
    }
    lines.push(String::new());
    lines
}

/// Arranges the charts rendered in this run by file name in `order`. Names
/// with no rendered chart are left out.
pub fn ordered_charts(rendered: &[PathBuf], order: &[&str]) -> Vec<PathBuf> {
    order
        .iter()
        .filter_map(|name| {
            rendered
                .iter()
                .find(|p| p.file_name().is_some_and(|f| f == *name))
        })
        .inspect(|p| debug!(chart = %p.display(), "Chart added to report"))
        .cloned()
        .collect()
}

/// Input for [`compose`].
#[derive(Debug)]
pub struct ReportContent<'a> {
    pub title: &'a str,
    pub lines: Vec<String>,
    pub charts: Vec<PathBuf>,
}

/// Writes the report to `path`.
#[tracing::instrument(skip_all, fields(path = %path.display(), charts = content.charts.len()))]
pub fn compose(path: &Path, content: &ReportContent<'_>) -> Result<()> {
    write_pdf(path, content).map_err(|e| PipelineError::artifact_write(path, e))?;
    info!("Report written");
    Ok(())
}

fn write_pdf(path: &Path, content: &ReportContent<'_>) -> AnyResult<()> {
    let (doc, page, layer) = PdfDocument::new(
        content.title,
        Mm(PAGE_WIDTH_MM),
        Mm(PAGE_HEIGHT_MM),
        "Summary",
    );
    let font = doc.add_builtin_font(BuiltinFont::Helvetica)?;
    let bold = doc.add_builtin_font(BuiltinFont::HelveticaBold)?;

    let summary_layer = doc.get_page(page).get_layer(layer);
    write_summary_page(&summary_layer, content, &font, &bold);

    for (i, chart) in content.charts.iter().enumerate() {
        add_chart_page(&doc, chart, i + 1)
            .with_context(|| format!("embedding chart {}", chart.display()))?;
    }

    let file = File::create(path)?;
    doc.save(&mut BufWriter::new(file))?;
    Ok(())
}

fn write_summary_page(
    layer: &PdfLayerReference,
    content: &ReportContent<'_>,
    font: &IndirectFontRef,
    bold: &IndirectFontRef,
) {
    let x = Mm(PAGE_WIDTH_MM * 0.05);
    layer.use_text(content.title, 16.0, Mm(PAGE_WIDTH_MM * 0.22), Mm(PAGE_HEIGHT_MM * 0.95), bold);

    let mut y = PAGE_HEIGHT_MM * 0.92;
    for line in &content.lines {
        if !line.is_empty() {
            layer.use_text(line.as_str(), 10.0, x, Mm(y), font);
        }
        y -= LINE_STEP_MM;
    }
}

/// Adds an A4 page with the chart scaled to fit inside the margins, centered.
fn add_chart_page(doc: &PdfDocumentReference, chart: &Path, index: usize) -> AnyResult<()> {
    let decoded = image_crate::open(chart)?;
    let (px_w, px_h) = decoded.dimensions();
    let (px_w, px_h) = (px_w as f32, px_h as f32);

    let max_w = PAGE_WIDTH_MM - 2.0 * MARGIN_MM;
    let max_h = PAGE_HEIGHT_MM - 2.0 * MARGIN_MM;
    // 1 inch = 25.4 mm; pick the dpi at which the image just fits.
    let dpi = (px_w * 25.4 / max_w).max(px_h * 25.4 / max_h);
    let (w_mm, h_mm) = (px_w * 25.4 / dpi, px_h * 25.4 / dpi);

    let (page, layer) = doc.add_page(
        Mm(PAGE_WIDTH_MM),
        Mm(PAGE_HEIGHT_MM),
        format!("Chart {index}"),
    );
    let layer = doc.get_page(page).get_layer(layer);

    Image::from_dynamic_image(&decoded).add_to_layer(
        layer,
        ImageTransform {
            translate_x: Some(Mm((PAGE_WIDTH_MM - w_mm) / 2.0)),
            translate_y: Some(Mm((PAGE_HEIGHT_MM - h_mm) / 2.0)),
            dpi: Some(dpi),
            ..Default::default()
        },
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::derive;
    use crate::features::tests::{trip, ts};

    fn generated() -> NaiveDateTime {
        ts(2025, 1, 2, 3)
    }

    #[test]
    fn test_summary_lines_layout() {
        let (cleaned, _) = derive(vec![
            trip(Some(ts(2024, 1, 1, 8)), Some(3.0)),
            trip(Some(ts(2024, 2, 1, 8)), Some(4.0)),
        ]);
        let summary = SummaryMetrics::from_trips(&cleaned);
        let purposes = vec![("Completed".to_string(), 2), ("Cancelled".to_string(), 1)];

        let lines = summary_lines(&summary, &purposes, 1, generated());
        assert_eq!(lines[0], "Generated: 2025-01-02 03:00:00");
        assert_eq!(lines[2], "Total rides analyzed: 2");
        assert_eq!(lines[3], "Date range: 2024-01-01 to 2024-02-01");
        assert_eq!(lines[8], "  - Mean: 3.50");
        assert_eq!(lines[15], "Top 1 ride purposes:");
        assert_eq!(lines[16], "  - Completed: 2 rides");
        assert_eq!(lines.len(), 18);
    }

    #[test]
    fn test_summary_lines_empty_table_prints_sentinels() {
        let summary = SummaryMetrics::from_trips(&[]);
        let lines = summary_lines(&summary, &[], 5, generated());

        assert_eq!(lines[3], "Date range: NaT to NaT");
        assert_eq!(lines[8], "  - Mean: NaN");
        assert_eq!(lines[13], "  - Median: NaN");
    }

    #[test]
    fn test_ordered_charts_uses_only_rendered_files() {
        let dir = Path::new("out");
        let rendered = vec![dir.join("a.png"), dir.join("b.png")];

        let found = ordered_charts(&rendered, &["b.png", "stale.png", "a.png"]);
        assert_eq!(found, vec![dir.join("b.png"), dir.join("a.png")]);
    }

    #[test]
    fn test_compose_text_only_report() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(REPORT_PDF);
        let content = ReportContent {
            title: "Rides",
            lines: summary_lines(&SummaryMetrics::from_trips(&[]), &[], 5, generated()),
            charts: vec![],
        };

        compose(&path, &content).unwrap();

        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }
}
