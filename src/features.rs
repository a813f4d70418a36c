//! Calendar and duration features, plus row cleaning.

use chrono::{Datelike, NaiveDate, NaiveDateTime, Timelike, Weekday};
use csv::StringRecord;
use tracing::info;

use crate::normalize::Trip;
use crate::period::DayPeriod;

pub const MONTH_NAMES: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

pub const WEEKDAY_NAMES: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// A trip that survived cleaning, with its derived attributes.
///
/// `start` is always present here; rows without one never become a
/// `CleanTrip`.
#[derive(Debug, Clone)]
pub struct CleanTrip {
    pub source: StringRecord,
    pub start: NaiveDateTime,
    pub end: Option<NaiveDateTime>,
    pub category: Option<String>,
    pub origin: Option<String>,
    pub destination: Option<String>,
    pub distance: Option<f64>,
    pub purpose: String,

    pub date: NaiveDate,
    pub hour: u32,
    /// 0-based month index into [`MONTH_NAMES`].
    pub month0: u32,
    pub year: i32,
    pub weekday: Weekday,
    pub duration_minutes: Option<f64>,
    pub day_period: DayPeriod,
}

impl CleanTrip {
    pub fn month_name(&self) -> &'static str {
        MONTH_NAMES[self.month0 as usize]
    }

    pub fn weekday_name(&self) -> &'static str {
        WEEKDAY_NAMES[self.weekday.num_days_from_monday() as usize]
    }
}

/// Rows dropped by each cleaning predicate.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct CleaningReport {
    pub input_rows: usize,
    pub missing_start: usize,
    pub negative_distance: usize,
    pub retained: usize,
}

/// Derives features and drops rows with no start timestamp or a negative
/// distance. Input order is preserved for the rows that remain.
#[tracing::instrument(skip_all, fields(rows = trips.len()))]
pub fn derive(trips: Vec<Trip>) -> (Vec<CleanTrip>, CleaningReport) {
    let mut report = CleaningReport {
        input_rows: trips.len(),
        ..Default::default()
    };

    let cleaned: Vec<CleanTrip> = trips
        .into_iter()
        .filter_map(|trip| {
            let Some(start) = trip.start else {
                report.missing_start += 1;
                return None;
            };
            if trip.distance.is_some_and(|d| d < 0.0) {
                report.negative_distance += 1;
                return None;
            }

            let hour = start.hour();
            let duration_minutes = trip
                .end
                .map(|end| (end - start).num_milliseconds() as f64 / 60_000.0);

            Some(CleanTrip {
                source: trip.source,
                start,
                end: trip.end,
                category: trip.category,
                origin: trip.origin,
                destination: trip.destination,
                distance: trip.distance,
                purpose: trip.purpose,
                date: start.date(),
                hour,
                month0: start.month0(),
                year: start.year(),
                weekday: start.weekday(),
                duration_minutes,
                day_period: DayPeriod::from_hour(Some(hour)),
            })
        })
        .collect();

    report.retained = cleaned.len();
    info!(
        retained = report.retained,
        missing_start = report.missing_start,
        negative_distance = report.negative_distance,
        "Rows excluded during cleaning"
    );

    (cleaned, report)
}
