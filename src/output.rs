//! Output formatting and persistence for trip summaries and aggregate views.
//!
//! Supports pretty-printing and JSON logging of the scalar summary, and one
//! CSV file per view under a single output directory.

use anyhow::Result as AnyResult;
use csv::{StringRecord, Writer};
use std::fmt::Display;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

use crate::analyzers::types::{AggregateViews, Counts};
use crate::error::{PipelineError, Result};
use crate::features::CleanTrip;
use crate::stats::{SummaryMetrics, decimal};

pub const CLEANED_CSV: &str = "bangalore_cleaned_data.csv";
pub const SUMMARY_CSV: &str = "bangalore_summary_metrics.csv";
pub const TOP_START_CSV: &str = "top_start_locations.csv";
pub const TOP_STOP_CSV: &str = "top_stop_locations.csv";
pub const MONTHLY_CSV: &str = "monthly_counts.csv";
pub const YEARLY_CSV: &str = "yearly_counts.csv";
pub const HOURLY_CSV: &str = "hourly_counts.csv";
pub const WEEKDAY_CSV: &str = "weekday_counts.csv";
pub const DAILY_CSV: &str = "daily_counts.csv";
pub const PURPOSE_CSV: &str = "purpose_counts.csv";
pub const DAY_PERIOD_CSV: &str = "day_period_counts.csv";
pub const MOVING_AVERAGE_CSV: &str = "moving_average_7day.csv";

/// Columns appended after the source columns in the cleaned export.
const DERIVED_COLUMNS: [&str; 14] = [
    "start_timestamp",
    "end_timestamp",
    "category",
    "origin",
    "destination",
    "distance",
    "purpose",
    "date",
    "hour",
    "month",
    "year",
    "weekday",
    "duration_minutes",
    "day_period",
];

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Logs the summary using Rust's debug pretty-print format.
pub fn print_pretty(summary: &SummaryMetrics) {
    info!("{:#?}", summary);
}

/// Logs the summary as pretty-printed JSON. Undefined values appear as `null`.
pub fn print_json(summary: &SummaryMetrics) -> AnyResult<()> {
    info!("{}", serde_json::to_string_pretty(summary)?);
    Ok(())
}

/// Runs `write` against a CSV writer at `path`. The file is closed before
/// returning, whether or not writing succeeded.
fn write_csv<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut Writer<fs::File>) -> std::result::Result<(), csv::Error>,
{
    debug!(path = %path.display(), "Writing CSV");
    let mut writer =
        Writer::from_path(path).map_err(|e| PipelineError::artifact_write(path, e))?;
    write(&mut writer).map_err(|e| PipelineError::artifact_write(path, e))?;
    writer
        .flush()
        .map_err(|e| PipelineError::artifact_write(path, e))?;
    Ok(())
}

/// Writes a two-column `(key, count)` table.
pub fn write_counts<K: Display>(path: &Path, key_name: &str, counts: &Counts<K>) -> Result<()> {
    write_csv(path, |w| {
        w.write_record([key_name, "count"])?;
        for (key, count) in counts {
            w.write_record([key.to_string(), count.to_string()])?;
        }
        Ok(())
    })
}

/// Writes the two-column `(metric, value)` summary table.
pub fn write_summary(path: &Path, summary: &SummaryMetrics) -> Result<()> {
    write_csv(path, |w| {
        w.write_record(["metric", "value"])?;
        for (metric, value) in summary.rows() {
            w.write_record([metric, value.as_str()])?;
        }
        Ok(())
    })
}

pub fn write_moving_average(path: &Path, series: &[(chrono::NaiveDate, f64)]) -> Result<()> {
    write_csv(path, |w| {
        w.write_record(["date", "moving_average"])?;
        for (date, value) in series {
            w.write_record([date.to_string(), decimal(*value)])?;
        }
        Ok(())
    })
}

/// Writes every cleaned row: the source columns as read, then canonical and
/// derived columns. Missing values are written as empty cells.
pub fn write_cleaned(path: &Path, source_headers: &StringRecord, trips: &[CleanTrip]) -> Result<()> {
    let width = source_headers.len();
    write_csv(path, |w| {
        let mut header: Vec<&str> = source_headers.iter().collect();
        header.extend(DERIVED_COLUMNS);
        w.write_record(&header)?;

        for t in trips {
            let mut row: Vec<String> = (0..width)
                .map(|i| t.source.get(i).unwrap_or_default().to_string())
                .collect();
            row.extend(cleaned_fields(t));
            w.write_record(&row)?;
        }
        Ok(())
    })
}

fn cleaned_fields(t: &CleanTrip) -> [String; 14] {
    let opt = |v: Option<String>| v.unwrap_or_default();
    [
        t.start.format(TIMESTAMP_FORMAT).to_string(),
        opt(t.end.map(|e| e.format(TIMESTAMP_FORMAT).to_string())),
        opt(t.category.clone()),
        opt(t.origin.clone()),
        opt(t.destination.clone()),
        opt(t.distance.map(decimal)),
        t.purpose.clone(),
        t.date.to_string(),
        t.hour.to_string(),
        t.month_name().to_string(),
        t.year.to_string(),
        t.weekday_name().to_string(),
        opt(t.duration_minutes.map(decimal)),
        t.day_period.to_string(),
    ]
}

/// Collects per-artifact outcomes so a stage can attempt every artifact
/// before failing on the first error.
#[derive(Debug, Default)]
pub(crate) struct Attempts {
    written: Vec<PathBuf>,
    first_error: Option<PipelineError>,
}

impl Attempts {
    pub(crate) fn record(&mut self, path: PathBuf, result: Result<()>) {
        match result {
            Ok(()) => {
                debug!(path = %path.display(), "Artifact written");
                self.written.push(path);
            }
            Err(e) => {
                error!(error = %e, "Artifact write failed");
                self.first_error.get_or_insert(e);
            }
        }
    }

    pub(crate) fn fail(&mut self, e: PipelineError) {
        error!(error = %e, "Artifact cleanup failed");
        self.first_error.get_or_insert(e);
    }

    pub(crate) fn finish(self) -> Result<Vec<PathBuf>> {
        match self.first_error {
            Some(e) => Err(e),
            None => Ok(self.written),
        }
    }
}

/// Paths of the files written by [`export_all`].
#[derive(Debug, Clone)]
pub struct ExportedFiles {
    pub cleaned: PathBuf,
    pub summary: PathBuf,
    pub views: Vec<PathBuf>,
}

/// Writes the cleaned table and every aggregate view into `dir`, creating it
/// if needed.
///
/// Every file is attempted even when an earlier one fails; the first failure
/// is returned once all have been tried.
#[tracing::instrument(skip_all, fields(dir = %dir.display()))]
pub fn export_all(
    dir: &Path,
    source_headers: &StringRecord,
    trips: &[CleanTrip],
    views: &AggregateViews,
) -> Result<ExportedFiles> {
    fs::create_dir_all(dir).map_err(|e| PipelineError::artifact_write(dir, e))?;

    let cleaned = dir.join(CLEANED_CSV);
    let summary = dir.join(SUMMARY_CSV);
    let mut attempts = Attempts::default();

    attempts.record(cleaned.clone(), write_cleaned(&cleaned, source_headers, trips));
    attempts.record(summary.clone(), write_summary(&summary, &views.summary));

    macro_rules! counts {
        ($file:expr, $key:expr, $view:expr) => {{
            let path = dir.join($file);
            let result = write_counts(&path, $key, &$view);
            attempts.record(path, result);
        }};
    }

    counts!(TOP_START_CSV, "location", views.top_origins);
    counts!(TOP_STOP_CSV, "location", views.top_destinations);
    counts!(MONTHLY_CSV, "month", views.monthly_counts);
    counts!(YEARLY_CSV, "year", views.yearly_counts);
    counts!(HOURLY_CSV, "hour", views.hourly_counts);
    counts!(WEEKDAY_CSV, "weekday", views.weekday_counts);
    counts!(DAILY_CSV, "date", views.daily_counts);
    counts!(PURPOSE_CSV, "purpose", views.purpose_counts);
    counts!(DAY_PERIOD_CSV, "day_period", views.day_period_counts);

    let moving = dir.join(MOVING_AVERAGE_CSV);
    let result = write_moving_average(&moving, &views.moving_average);
    attempts.record(moving, result);

    let written = attempts.finish()?;
    info!(files = written.len(), "CSV exports written");

    let views = written
        .into_iter()
        .filter(|p| *p != cleaned && *p != summary)
        .collect();
    Ok(ExportedFiles {
        cleaned,
        summary,
        views,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzers::aggregate::aggregate;
    use crate::config::AnalysisConfig;
    use crate::features::derive;
    use crate::features::tests::{trip, ts};

    #[test]
    fn test_print_pretty_does_not_panic() {
        print_pretty(&SummaryMetrics::from_trips(&[]));
    }

    #[test]
    fn test_print_json_handles_nan() {
        print_json(&SummaryMetrics::from_trips(&[])).unwrap();
    }

    #[test]
    fn test_write_counts_header_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("yearly.csv");

        write_counts(&path, "year", &vec![(2023, 10), (2024, 5)]).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "year,count\n2023,10\n2024,5\n");
    }

    #[test]
    fn test_write_moving_average_keeps_decimal_point() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("moving.csv");
        let day = chrono::NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();

        write_moving_average(&path, &[(day, 1.0), (day.succ_opt().unwrap(), 1.5)]).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert_eq!(content, "date,moving_average\n2024-01-01,1.0\n2024-01-02,1.5\n");
    }

    #[test]
    fn test_write_summary_writes_nan_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("summary.csv");

        write_summary(&path, &SummaryMetrics::from_trips(&[])).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.starts_with("metric,value\ntotal_rides,0\n"));
        assert!(content.contains("date_range_start,NaT\n"));
        assert!(content.contains("median_duration_mins,NaN\n"));
    }

    #[test]
    fn test_write_cleaned_appends_derived_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cleaned.csv");

        let mut t = trip(Some(ts(2024, 3, 23, 12)), None);
        t.source = StringRecord::from(vec!["2024-03-23", "12:00:00"]);
        let (cleaned, _) = derive(vec![t]);
        let headers = StringRecord::from(vec!["Date", "Time"]);

        write_cleaned(&path, &headers, &cleaned).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("Date,Time,start_timestamp,end_timestamp,"));
        assert_eq!(
            lines[1],
            "2024-03-23,12:00:00,2024-03-23 12:00:00,2024-03-23 12:00:00,Auto,A,B,,Completed,\
             2024-03-23,12,March,2024,Saturday,0.0,Afternoon"
        );
    }

    #[test]
    fn test_export_all_writes_every_view() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("nested/output");

        let (cleaned, _) = derive(vec![trip(Some(ts(2024, 1, 1, 9)), Some(2.0))]);
        let views = aggregate(&cleaned, &AnalysisConfig::default());
        let files = export_all(&out, &StringRecord::new(), &cleaned, &views).unwrap();

        assert!(files.cleaned.exists());
        assert!(files.summary.exists());
        assert_eq!(files.views.len(), 10);
        let hourly = fs::read_to_string(out.join(HOURLY_CSV)).unwrap();
        assert_eq!(hourly.lines().count(), 25);
    }

    #[test]
    fn test_export_to_unwritable_dir_fails() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        fs::write(&blocker, "not a directory").unwrap();

        let views = aggregate(&[], &AnalysisConfig::default());
        let err = export_all(&blocker.join("out"), &StringRecord::new(), &[], &views).unwrap_err();
        assert!(err.is_write_error());
    }
}
