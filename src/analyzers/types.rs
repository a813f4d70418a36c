//! Data types produced by the aggregation pass.

use chrono::NaiveDate;
use serde::Serialize;

use crate::analyzers::histogram::Histogram;
use crate::period::DayPeriod;
use crate::stats::SummaryMetrics;

/// A key paired with its row count.
pub type Counts<K> = Vec<(K, usize)>;

/// Histogram plus optional density curve for one numeric series.
#[derive(Debug, Clone)]
pub struct Distribution {
    pub histogram: Histogram,
    pub density: Option<Vec<(f64, f64)>>,
}

/// Every aggregate view of a cleaned trip table.
///
/// Fixed-domain views (`hourly_counts`, `weekday_counts`, `monthly_counts`,
/// `day_period_counts`) always list their full domain in canonical order.
#[derive(Debug, Clone)]
pub struct AggregateViews {
    pub summary: SummaryMetrics,
    /// Descending by count, ties in first-seen order.
    pub purpose_counts: Counts<String>,
    pub day_period_counts: Counts<DayPeriod>,
    pub top_origins: Counts<String>,
    pub top_destinations: Counts<String>,
    pub monthly_counts: Counts<&'static str>,
    pub yearly_counts: Counts<i32>,
    pub hourly_counts: Counts<u32>,
    pub weekday_counts: Counts<&'static str>,
    pub daily_counts: Counts<NaiveDate>,
    pub moving_average: Vec<(NaiveDate, f64)>,
    pub distances: Vec<f64>,
    pub durations: Vec<f64>,
    pub distance_distribution: Distribution,
    pub duration_distribution: Distribution,
    /// `(distance, duration)` points; `None` when either series is empty.
    pub scatter_sample: Option<Vec<(f64, f64)>>,
}

/// Short overview logged after aggregation.
#[derive(Debug, Serialize)]
pub struct ViewSizes {
    pub purposes: usize,
    pub top_origins: usize,
    pub top_destinations: usize,
    pub years: usize,
    pub days: usize,
    pub scatter_points: Option<usize>,
}

impl AggregateViews {
    pub fn sizes(&self) -> ViewSizes {
        ViewSizes {
            purposes: self.purpose_counts.len(),
            top_origins: self.top_origins.len(),
            top_destinations: self.top_destinations.len(),
            years: self.yearly_counts.len(),
            days: self.daily_counts.len(),
            scatter_points: self.scatter_sample.as_ref().map(Vec::len),
        }
    }
}
