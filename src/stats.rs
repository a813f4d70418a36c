use chrono::NaiveDateTime;
use serde::Serialize;
use std::collections::HashSet;

use crate::analyzers::utility::{mean, median};
use crate::features::CleanTrip;

/// Scalar summary of a cleaned trip table.
///
/// Means and medians over zero observations are `NaN`; an empty table has no
/// date range.
#[derive(Debug, Clone, Serialize)]
pub struct SummaryMetrics {
    pub total_rides: usize,
    pub unique_start_locations: usize,
    pub unique_stop_locations: usize,
    pub date_range_start: Option<NaiveDateTime>,
    pub date_range_end: Option<NaiveDateTime>,
    pub mean_distance_miles: f64,
    pub median_distance_miles: f64,
    pub mean_duration_mins: f64,
    pub median_duration_mins: f64,
}

impl SummaryMetrics {
    pub fn from_trips(trips: &[CleanTrip]) -> Self {
        let mut origins = HashSet::new();
        let mut destinations = HashSet::new();
        let mut distances = Vec::new();
        let mut durations = Vec::new();

        for t in trips {
            if let Some(o) = &t.origin {
                origins.insert(o.as_str());
            }

            if let Some(d) = &t.destination {
                destinations.insert(d.as_str());
            }

            if let Some(d) = t.distance {
                distances.push(d);
            }

            if let Some(d) = t.duration_minutes {
                durations.push(d);
            }
        }

        SummaryMetrics {
            total_rides: trips.len(),
            unique_start_locations: origins.len(),
            unique_stop_locations: destinations.len(),
            date_range_start: trips.iter().map(|t| t.start).min(),
            date_range_end: trips.iter().map(|t| t.start).max(),
            mean_distance_miles: mean(&distances),
            median_distance_miles: median(&distances),
            mean_duration_mins: mean(&durations),
            median_duration_mins: median(&durations),
        }
    }

    /// `(metric, value)` rows in export order. Undefined values are written
    /// as `NaN` and absent timestamps as `NaT`.
    pub fn rows(&self) -> Vec<(&'static str, String)> {
        let ts = |t: Option<NaiveDateTime>| {
            t.map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_else(|| "NaT".to_string())
        };

        vec![
            ("total_rides", self.total_rides.to_string()),
            ("unique_start_locations", self.unique_start_locations.to_string()),
            ("unique_stop_locations", self.unique_stop_locations.to_string()),
            ("date_range_start", ts(self.date_range_start)),
            ("date_range_end", ts(self.date_range_end)),
            ("mean_distance_miles", decimal(self.mean_distance_miles)),
            ("median_distance_miles", decimal(self.median_distance_miles)),
            ("mean_duration_mins", decimal(self.mean_duration_mins)),
            ("median_duration_mins", decimal(self.median_duration_mins)),
        ]
    }
}

/// Formats a float with at least one decimal place, so whole values read
/// `5.0` rather than `5`. `NaN` is written as-is.
pub fn decimal(v: f64) -> String {
    format!("{v:?}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::derive;
    use crate::features::tests::{trip, ts};

    #[test]
    fn test_summary_over_cleaned_rows() {
        let mut rows = vec![
            trip(Some(ts(2024, 1, 5, 8)), Some(2.0)),
            trip(Some(ts(2023, 12, 31, 22)), Some(4.0)),
            trip(Some(ts(2024, 1, 7, 9)), Some(9.0)),
            trip(Some(ts(2024, 1, 8, 9)), None),
        ];
        rows[1].origin = Some("C".to_string());
        rows[2].destination = None;
        let (cleaned, _) = derive(rows);

        let s = SummaryMetrics::from_trips(&cleaned);
        assert_eq!(s.total_rides, 4);
        assert_eq!(s.unique_start_locations, 2);
        assert_eq!(s.unique_stop_locations, 1);
        assert_eq!(s.date_range_start, Some(ts(2023, 12, 31, 22)));
        assert_eq!(s.date_range_end, Some(ts(2024, 1, 8, 9)));
        assert_eq!(s.mean_distance_miles, 5.0);
        assert_eq!(s.median_distance_miles, 4.0);
        assert_eq!(s.mean_duration_mins, 0.0);
        assert_eq!(s.median_duration_mins, 0.0);
    }

    #[test]
    fn test_summary_of_empty_table_is_undefined() {
        let s = SummaryMetrics::from_trips(&[]);
        assert_eq!(s.total_rides, 0);
        assert!(s.mean_distance_miles.is_nan());
        assert!(s.median_duration_mins.is_nan());
        assert_eq!(s.date_range_start, None);

        let rows = s.rows();
        assert_eq!(rows[3], ("date_range_start", "NaT".to_string()));
        assert_eq!(rows[5], ("mean_distance_miles", "NaN".to_string()));
    }

    #[test]
    fn test_rows_format_timestamps() {
        let (cleaned, _) = derive(vec![trip(Some(ts(2024, 2, 1, 6)), Some(1.5))]);
        let rows = SummaryMetrics::from_trips(&cleaned).rows();

        assert_eq!(rows.len(), 9);
        assert_eq!(rows[0], ("total_rides", "1".to_string()));
        assert_eq!(rows[3], ("date_range_start", "2024-02-01 06:00:00".to_string()));
        assert_eq!(rows[5], ("mean_distance_miles", "1.5".to_string()));
        assert_eq!(rows[7], ("mean_duration_mins", "0.0".to_string()));
    }

    #[test]
    fn test_decimal_keeps_fraction_digit() {
        assert_eq!(decimal(5.0), "5.0");
        assert_eq!(decimal(13.58), "13.58");
        assert_eq!(decimal(f64::NAN), "NaN");
    }
}
