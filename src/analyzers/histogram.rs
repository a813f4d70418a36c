//! Histogram binning and the kernel density curve drawn over it.

use crate::analyzers::utility::{mean, stddev};

/// Number of points the density curve is evaluated at.
const DENSITY_POINTS: usize = 200;

/// Equal-width bins over the value range.
#[derive(Debug, Clone, PartialEq)]
pub struct Histogram {
    /// `counts.len() + 1` edges, ascending.
    pub edges: Vec<f64>,
    pub counts: Vec<usize>,
}

impl Histogram {
    /// Bins `values` into `bins` equal-width buckets spanning [min, max]. The
    /// last bucket is closed on the right. A single distinct value is widened
    /// to ±0.5; no values gives [0, 1].
    pub fn from_values(values: &[f64], bins: usize) -> Self {
        let bins = bins.max(1);
        let (lo, hi) = match values.iter().copied().fold(None, |acc, v| match acc {
            None => Some((v, v)),
            Some((lo, hi)) => Some((f64::min(lo, v), f64::max(hi, v))),
        }) {
            None => (0.0, 1.0),
            Some((lo, hi)) if lo == hi => (lo - 0.5, hi + 0.5),
            Some(range) => range,
        };

        let width = (hi - lo) / bins as f64;
        let edges = (0..=bins).map(|i| lo + width * i as f64).collect();

        let mut counts = vec![0; bins];
        for &v in values {
            let idx = (((v - lo) / width) as usize).min(bins - 1);
            counts[idx] += 1;
        }

        Histogram { edges, counts }
    }

    pub fn bin_width(&self) -> f64 {
        match (self.edges.first(), self.edges.get(1)) {
            (Some(a), Some(b)) => b - a,
            _ => 0.0,
        }
    }

    pub fn range(&self) -> (f64, f64) {
        (
            self.edges.first().copied().unwrap_or(0.0),
            self.edges.last().copied().unwrap_or(1.0),
        )
    }

    pub fn max_count(&self) -> usize {
        self.counts.iter().copied().max().unwrap_or(0)
    }
}

/// Gaussian KDE with Scott's bandwidth, scaled so the curve sits on the
/// count axis of `histogram`. `None` when the values have no spread.
pub fn density_curve(values: &[f64], histogram: &Histogram) -> Option<Vec<(f64, f64)>> {
    let sd = stddev(values, mean(values));
    if !sd.is_finite() || sd == 0.0 {
        return None;
    }

    let n = values.len() as f64;
    let bandwidth = sd * n.powf(-0.2);
    let scale = histogram.bin_width() / (bandwidth * (2.0 * std::f64::consts::PI).sqrt());
    let (lo, hi) = histogram.range();
    let step = (hi - lo) / (DENSITY_POINTS - 1) as f64;

    let curve = (0..DENSITY_POINTS)
        .map(|i| {
            let x = lo + step * i as f64;
            let sum: f64 = values
                .iter()
                .map(|v| (-0.5 * ((x - v) / bandwidth).powi(2)).exp())
                .sum();
            (x, sum * scale)
        })
        .collect();

    Some(curve)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bins_cover_range_and_count_everything() {
        let values = [0.0, 1.0, 2.0, 3.0, 10.0];
        let h = Histogram::from_values(&values, 10);

        assert_eq!(h.edges.len(), 11);
        assert_eq!(h.range(), (0.0, 10.0));
        assert_eq!(h.counts.iter().sum::<usize>(), values.len());
        assert_eq!(h.counts[0], 1);
        assert_eq!(h.counts[9], 1);
    }

    #[test]
    fn test_single_value_widened() {
        let h = Histogram::from_values(&[0.0, 0.0, 0.0], 30);
        assert_eq!(h.range(), (-0.5, 0.5));
        assert_eq!(h.counts.iter().sum::<usize>(), 3);
        assert_eq!(h.max_count(), 3);
    }

    #[test]
    fn test_empty_values() {
        let h = Histogram::from_values(&[], 30);
        assert_eq!(h.range(), (0.0, 1.0));
        assert_eq!(h.max_count(), 0);
        assert!(density_curve(&[], &h).is_none());
    }

    #[test]
    fn test_density_curve_area_matches_counts() {
        let values: Vec<f64> = (0..200).map(|i| (i % 20) as f64).collect();
        let h = Histogram::from_values(&values, 20);
        let curve = density_curve(&values, &h).unwrap();

        assert_eq!(curve.len(), DENSITY_POINTS);
        let step = curve[1].0 - curve[0].0;
        let area: f64 = curve.iter().map(|(_, y)| y * step).sum();
        // The curve integrates to roughly n * bin_width, minus the tails cut
        // off at the data range.
        let expected = values.len() as f64 * h.bin_width();
        assert!(area > expected * 0.8 && area < expected * 1.05);
    }

    #[test]
    fn test_no_spread_no_curve() {
        let h = Histogram::from_values(&[2.0, 2.0], 30);
        assert!(density_curve(&[2.0, 2.0], &h).is_none());
    }
}
