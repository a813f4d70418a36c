use crate::analyzers::histogram::{Histogram, density_curve};
use crate::analyzers::types::{AggregateViews, Counts, Distribution};
use crate::analyzers::utility::trailing_mean;
use crate::config::AnalysisConfig;
use crate::features::{CleanTrip, MONTH_NAMES, WEEKDAY_NAMES};
use crate::period::DayPeriod;
use crate::stats::SummaryMetrics;
use chrono::NaiveDate;
use indexmap::IndexMap;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::collections::BTreeMap;
use tracing::debug;

/// Computes every aggregate view of `trips`.
///
/// Views are independent of each other and fully recomputed on each call;
/// identical input always yields identical output, including the scatter
/// sample, which is drawn from a generator seeded with `config.sample_seed`.
#[tracing::instrument(skip_all, fields(rows = trips.len()))]
pub fn aggregate(trips: &[CleanTrip], config: &AnalysisConfig) -> AggregateViews {
    let distances: Vec<f64> = trips.iter().filter_map(|t| t.distance).collect();
    let durations: Vec<f64> = trips.iter().filter_map(|t| t.duration_minutes).collect();

    let daily_counts = daily_counts(trips);
    let daily_values: Vec<f64> = daily_counts.iter().map(|(_, c)| *c as f64).collect();
    let moving_average = daily_counts
        .iter()
        .map(|(d, _)| *d)
        .zip(trailing_mean(&daily_values, config.moving_average_window))
        .collect();

    let scatter_sample = if distances.is_empty() || durations.is_empty() {
        None
    } else {
        Some(scatter_sample(trips, config.sample_size, config.sample_seed))
    };

    let views = AggregateViews {
        summary: SummaryMetrics::from_trips(trips),
        purpose_counts: value_counts(trips.iter().map(|t| Some(t.purpose.as_str()))),
        day_period_counts: fixed_counts(&DayPeriod::ALL, trips.iter().map(|t| t.day_period)),
        top_origins: top_n(
            value_counts(trips.iter().map(|t| t.origin.as_deref())),
            config.top_n,
        ),
        top_destinations: top_n(
            value_counts(trips.iter().map(|t| t.destination.as_deref())),
            config.top_n,
        ),
        monthly_counts: fixed_counts(&MONTH_NAMES, trips.iter().map(|t| t.month_name())),
        yearly_counts: ordered_counts(trips.iter().map(|t| t.year)),
        hourly_counts: fixed_counts(&(0..24).collect::<Vec<u32>>(), trips.iter().map(|t| t.hour)),
        weekday_counts: fixed_counts(&WEEKDAY_NAMES, trips.iter().map(|t| t.weekday_name())),
        daily_counts,
        moving_average,
        distance_distribution: distribution(&distances, config.histogram_bins),
        duration_distribution: distribution(&durations, config.histogram_bins),
        distances,
        durations,
        scatter_sample,
    };

    debug!(sizes = ?views.sizes(), "Aggregate views computed");
    views
}

/// Counts non-missing values, descending by count. `sort_by` is stable, so
/// ties keep the order in which each value was first seen.
pub fn value_counts<'a>(values: impl Iterator<Item = Option<&'a str>>) -> Counts<String> {
    let mut counts: IndexMap<&str, usize> = IndexMap::new();
    for v in values.flatten() {
        *counts.entry(v).or_default() += 1;
    }

    let mut out: Counts<String> = counts
        .into_iter()
        .map(|(k, c)| (k.to_string(), c))
        .collect();
    out.sort_by(|a, b| b.1.cmp(&a.1));
    out
}

pub fn top_n<K>(mut counts: Counts<K>, n: usize) -> Counts<K> {
    counts.truncate(n);
    counts
}

/// Counts over a fixed domain, in domain order, zero-filled.
pub fn fixed_counts<K: Copy + PartialEq>(domain: &[K], values: impl Iterator<Item = K>) -> Counts<K> {
    let mut counts: Counts<K> = domain.iter().map(|k| (*k, 0)).collect();
    for v in values {
        if let Some(entry) = counts.iter_mut().find(|(k, _)| *k == v) {
            entry.1 += 1;
        }
    }
    counts
}

/// Counts ascending by key, listing only keys present.
pub fn ordered_counts<K: Ord>(values: impl Iterator<Item = K>) -> Counts<K> {
    let mut counts: BTreeMap<K, usize> = BTreeMap::new();
    for v in values {
        *counts.entry(v).or_default() += 1;
    }
    counts.into_iter().collect()
}

fn daily_counts(trips: &[CleanTrip]) -> Counts<NaiveDate> {
    ordered_counts(trips.iter().map(|t| t.date))
}

fn distribution(values: &[f64], bins: usize) -> Distribution {
    let histogram = Histogram::from_values(values, bins);
    let density = density_curve(values, &histogram);
    Distribution { histogram, density }
}

/// Draws up to `size` rows without replacement and returns their
/// `(distance, duration)` pairs in table order. Rows lacking either value are
/// skipped after sampling.
pub fn scatter_sample(trips: &[CleanTrip], size: usize, seed: u64) -> Vec<(f64, f64)> {
    let mut indices: Vec<usize> = if trips.len() <= size {
        (0..trips.len()).collect()
    } else {
        let mut rng = StdRng::seed_from_u64(seed);
        rand::seq::index::sample(&mut rng, trips.len(), size).into_vec()
    };
    indices.sort_unstable();

    indices
        .into_iter()
        .filter_map(|i| Some((trips[i].distance?, trips[i].duration_minutes?)))
        .collect()
}
