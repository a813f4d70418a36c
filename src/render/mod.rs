//! Chart rendering with `plotters`.
//!
//! One PNG per aggregate view, each under a fixed file name. Charts only read
//! [`AggregateViews`]; an empty view produces an empty chart, except the
//! distance/duration scatter which is skipped when either series is empty.

mod bar;
mod distribution;
mod line;
mod scatter;

use std::path::{Path, PathBuf};

use plotters::style::RGBColor;
use tracing::info;

use crate::analyzers::types::AggregateViews;
use crate::error::{PipelineError, Result};
use crate::output::Attempts;

pub use bar::{draw_bars, draw_horizontal_bars};
pub use distribution::draw_distribution;
pub use line::draw_line;
pub use scatter::draw_scatter;

pub const PURPOSE_PNG: &str = "purpose_distribution.png";
pub const DAY_PERIOD_PNG: &str = "dayperiod_counts.png";
pub const WEEKDAY_PNG: &str = "weekday_counts.png";
pub const HOURLY_PNG: &str = "hourly_trend.png";
pub const MONTHLY_PNG: &str = "monthly_trend.png";
pub const YEARLY_PNG: &str = "yearly_trend.png";
pub const TOP_PICKUP_PNG: &str = "top_pickup_locations.png";
pub const TOP_DROPOFF_PNG: &str = "top_dropoff_locations.png";
pub const DISTANCE_PNG: &str = "distance_distribution.png";
pub const DURATION_PNG: &str = "duration_distribution.png";
pub const SCATTER_PNG: &str = "distance_vs_duration.png";
pub const MOVING_AVERAGE_PNG: &str = "moving_average_7day.png";

/// Chart files in report order.
pub const CHART_ORDER: [&str; 12] = [
    PURPOSE_PNG,
    DAY_PERIOD_PNG,
    WEEKDAY_PNG,
    HOURLY_PNG,
    MONTHLY_PNG,
    YEARLY_PNG,
    TOP_PICKUP_PNG,
    TOP_DROPOFF_PNG,
    DISTANCE_PNG,
    DURATION_PNG,
    SCATTER_PNG,
    MOVING_AVERAGE_PNG,
];

pub(crate) const FONT: &str = "sans-serif";
pub(crate) const BAR_BLUE: RGBColor = RGBColor(31, 119, 180);
pub(crate) const BAR_GREEN: RGBColor = RGBColor(44, 160, 44);
pub(crate) const BAR_ORANGE: RGBColor = RGBColor(255, 127, 14);
pub(crate) const CURVE_RED: RGBColor = RGBColor(214, 39, 40);

/// Title and axis descriptions for one chart.
#[derive(Debug, Clone, Copy)]
pub struct ChartText<'a> {
    pub title: &'a str,
    pub x_desc: &'a str,
    pub y_desc: &'a str,
}

impl<'a> ChartText<'a> {
    pub fn new(title: &'a str, x_desc: &'a str, y_desc: &'a str) -> Self {
        Self {
            title,
            x_desc,
            y_desc,
        }
    }
}

/// Upper bound for a count axis: 10% headroom, never zero.
pub(crate) fn count_axis_max(values: impl Iterator<Item = usize>) -> usize {
    let max = values.max().unwrap_or(0).max(1);
    max + (max / 10).max(1)
}

/// Padded `(lo, hi)` for a continuous axis. A single value is widened to
/// ±0.5 and no values gives [0, 1].
pub(crate) fn padded_range(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (lo, hi) = values.fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
        (lo.min(v), hi.max(v))
    });
    if !lo.is_finite() || !hi.is_finite() {
        (0.0, 1.0)
    } else if lo == hi {
        (lo - 0.5, hi + 0.5)
    } else {
        let pad = (hi - lo) * 0.05;
        (lo - pad, hi + pad)
    }
}

fn labels<K: ToString>(counts: &[(K, usize)]) -> (Vec<String>, Vec<usize>) {
    counts.iter().map(|(k, c)| (k.to_string(), *c)).unzip()
}

/// Renders every chart into `dir`. Each chart is attempted even when an
/// earlier one fails; the first failure is returned once all have been tried.
#[tracing::instrument(skip_all, fields(dir = %dir.display()))]
pub fn render_all(dir: &Path, views: &AggregateViews) -> Result<Vec<PathBuf>> {
    std::fs::create_dir_all(dir).map_err(|e| PipelineError::artifact_write(dir, e))?;
    let mut attempts = Attempts::default();

    macro_rules! chart {
        ($file:expr, $draw:expr) => {{
            let path = dir.join($file);
            let result: anyhow::Result<()> = $draw(path.as_path());
            attempts.record(
                path.clone(),
                result.map_err(|e| PipelineError::artifact_write(path.as_path(), e)),
            );
        }};
    }

    let (purposes, purpose_counts) = labels(&views.purpose_counts);
    chart!(PURPOSE_PNG, |p| draw_horizontal_bars(
        p,
        ChartText::new("Ride Purpose Distribution (Top categories)", "Count", "Purpose"),
        &purposes,
        &purpose_counts,
        BAR_BLUE,
        (1350, 750),
    ));

    let (periods, period_counts) = labels(&views.day_period_counts);
    chart!(DAY_PERIOD_PNG, |p| draw_bars(
        p,
        ChartText::new("Rides by Day Period", "Day Period", "Count"),
        &periods,
        &period_counts,
        BAR_BLUE,
        (1050, 600),
    ));

    let (weekdays, weekday_counts) = labels(&views.weekday_counts);
    chart!(WEEKDAY_PNG, |p| draw_bars(
        p,
        ChartText::new("Rides by Day of Week", "Day", "Count"),
        &weekdays,
        &weekday_counts,
        BAR_BLUE,
        (1350, 750),
    ));

    let hourly: Vec<(f64, f64)> = views
        .hourly_counts
        .iter()
        .map(|(h, c)| (f64::from(*h), *c as f64))
        .collect();
    chart!(HOURLY_PNG, |p| draw_line(
        p,
        ChartText::new("Hourly Ride Trend (0-23 hours)", "Hour of Day", "Count"),
        &hourly,
        &|x: &f64| format!("{x:.0}"),
        true,
        (1350, 600),
    ));

    let (months, month_counts) = labels(&views.monthly_counts);
    chart!(MONTHLY_PNG, |p| draw_bars(
        p,
        ChartText::new("Monthly Ride Counts", "Month", "Count"),
        &months,
        &month_counts,
        BAR_BLUE,
        (1500, 600),
    ));

    let (years, year_counts) = labels(&views.yearly_counts);
    chart!(YEARLY_PNG, |p| draw_bars(
        p,
        ChartText::new("Yearly Ride Counts", "Year", "Count"),
        &years,
        &year_counts,
        BAR_BLUE,
        (900, 600),
    ));

    let (pickups, pickup_counts) = labels(&views.top_origins);
    chart!(TOP_PICKUP_PNG, |p| draw_horizontal_bars(
        p,
        ChartText::new("Top Pickup Locations (Top 15)", "Count", ""),
        &pickups,
        &pickup_counts,
        BAR_GREEN,
        (1200, 900),
    ));

    let (dropoffs, dropoff_counts) = labels(&views.top_destinations);
    chart!(TOP_DROPOFF_PNG, |p| draw_horizontal_bars(
        p,
        ChartText::new("Top Dropoff Locations (Top 15)", "Count", ""),
        &dropoffs,
        &dropoff_counts,
        BAR_ORANGE,
        (1200, 900),
    ));

    chart!(DISTANCE_PNG, |p| draw_distribution(
        p,
        ChartText::new("Distribution of Trip Distances (MILES)", "Miles", "Frequency"),
        &views.distance_distribution,
        (1200, 600),
    ));

    chart!(DURATION_PNG, |p| draw_distribution(
        p,
        ChartText::new(
            "Distribution of Trip Duration (minutes)",
            "Duration (mins)",
            "Frequency"
        ),
        &views.duration_distribution,
        (1200, 600),
    ));

    match &views.scatter_sample {
        Some(points) => chart!(SCATTER_PNG, |p| draw_scatter(
            p,
            ChartText::new("Distance vs Duration (sample)", "Miles", "Duration (mins)"),
            points,
            (1050, 900),
        )),
        None => {
            info!("Distance or duration series empty, skipping scatter chart");
            // A scatter left by an earlier run into the same directory.
            let stale = dir.join(SCATTER_PNG);
            if stale.exists() {
                let removed = std::fs::remove_file(&stale)
                    .map_err(|e| PipelineError::artifact_write(&stale, e));
                if let Err(e) = removed {
                    attempts.fail(e);
                }
            }
        }
    }

    let dates: Vec<String> = views.moving_average.iter().map(|(d, _)| d.to_string()).collect();
    let moving: Vec<(f64, f64)> = views
        .moving_average
        .iter()
        .enumerate()
        .map(|(i, (_, v))| (i as f64, *v))
        .collect();
    let date_label = |x: &f64| {
        let i = x.round();
        if (x - i).abs() > 1e-6 || i < 0.0 {
            return String::new();
        }
        dates.get(i as usize).cloned().unwrap_or_default()
    };
    chart!(MOVING_AVERAGE_PNG, |p| draw_line(
        p,
        ChartText::new("7-Day Moving Average of Daily Ride Counts", "Date", "Average Rides"),
        &moving,
        &date_label,
        false,
        (1500, 600),
    ));

    let written = attempts.finish()?;
    info!(charts = written.len(), "Charts rendered");
    Ok(written)
}
