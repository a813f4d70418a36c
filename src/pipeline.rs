//! Stage wiring: load, normalize, derive, aggregate, export, render, report.

use std::path::PathBuf;

use chrono::{Local, NaiveDateTime};
use tracing::info;

use crate::analyzers::aggregate::aggregate;
use crate::analyzers::types::AggregateViews;
use crate::config::AnalysisConfig;
use crate::error::Result;
use crate::features::{CleanTrip, CleaningReport, derive};
use crate::loader::load_table;
use crate::normalize::{NormalizeReport, normalize};
use crate::output::{ExportedFiles, export_all};
use crate::render::{CHART_ORDER, render_all};
use crate::report::{REPORT_PDF, ReportContent, compose, ordered_charts, summary_lines};
use crate::stats::SummaryMetrics;

/// Cleaned rows plus the bookkeeping from getting there.
#[derive(Debug)]
pub struct Prepared {
    pub source_headers: csv::StringRecord,
    pub trips: Vec<CleanTrip>,
    pub normalize: NormalizeReport,
    pub cleaning: CleaningReport,
}

/// Everything a full run produced.
#[derive(Debug)]
pub struct PipelineOutputs {
    pub output_dir: PathBuf,
    pub exported: ExportedFiles,
    pub charts: Vec<PathBuf>,
    pub report: PathBuf,
    pub summary: SummaryMetrics,
    pub normalize: NormalizeReport,
    pub cleaning: CleaningReport,
}

/// Loads the input and runs it through normalization and feature derivation.
#[tracing::instrument(skip_all, fields(input = %config.input_path.display()))]
pub fn prepare(config: &AnalysisConfig) -> Result<Prepared> {
    let table = load_table(&config.input_path)?;
    let (trips, normalize_report) = normalize(
        &table,
        &config.mapping,
        &config.timestamp_formats,
        &config.input_path,
    )?;

    let (trips, cleaning) = derive(trips);
    Ok(Prepared {
        source_headers: table.headers,
        trips,
        normalize: normalize_report,
        cleaning,
    })
}

/// Computes only the scalar summary; nothing is written.
pub fn summarize(config: &AnalysisConfig) -> Result<SummaryMetrics> {
    let prepared = prepare(config)?;
    Ok(SummaryMetrics::from_trips(&prepared.trips))
}

/// Runs every stage, stamping the report with the current local time.
pub fn run(config: &AnalysisConfig) -> Result<PipelineOutputs> {
    run_at(config, Local::now().naive_local())
}

/// Runs every stage with an explicit report timestamp.
#[tracing::instrument(skip_all, fields(output_dir = %config.output_dir.display()))]
pub fn run_at(config: &AnalysisConfig, generated_at: NaiveDateTime) -> Result<PipelineOutputs> {
    let prepared = prepare(config)?;
    let views = aggregate(&prepared.trips, config);
    let dir = config.output_dir.as_path();

    let exported = export_all(dir, &prepared.source_headers, &prepared.trips, &views)?;
    let charts = render_all(dir, &views)?;
    let report = dir.join(REPORT_PDF);
    compose(&report, &report_content(config, &views, generated_at, &charts))?;

    info!(
        rides = views.summary.total_rides,
        charts = charts.len(),
        "Analysis complete"
    );
    Ok(PipelineOutputs {
        output_dir: dir.to_path_buf(),
        exported,
        charts,
        report,
        summary: views.summary,
        normalize: prepared.normalize,
        cleaning: prepared.cleaning,
    })
}

fn report_content<'a>(
    config: &'a AnalysisConfig,
    views: &AggregateViews,
    generated_at: NaiveDateTime,
    rendered: &[PathBuf],
) -> ReportContent<'a> {
    ReportContent {
        title: &config.report_title,
        lines: summary_lines(
            &views.summary,
            &views.purpose_counts,
            config.report_top_purposes,
            generated_at,
        ),
        charts: ordered_charts(rendered, &CHART_ORDER),
    }
}
