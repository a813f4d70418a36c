/// Computes the arithmetic mean of a slice of values. Returns NaN for empty input.
pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Computes the median, averaging the two middle values for even lengths.
/// Returns NaN for empty input.
pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return f64::NAN;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);

    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Computes the sample standard deviation (n - 1 denominator) given a
/// pre-computed mean. Returns NaN for fewer than two values.
pub fn stddev(values: &[f64], mean: f64) -> f64 {
    if values.len() < 2 {
        return f64::NAN;
    }
    let variance =
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (values.len() - 1) as f64;

    variance.sqrt()
}

/// Trailing mean over the last `window` values ending at each index. The
/// window shrinks at the start of the series, so index 0 averages one value.
pub fn trailing_mean(values: &[f64], window: usize) -> Vec<f64> {
    let window = window.max(1);
    (0..values.len())
        .map(|i| {
            let from = (i + 1).saturating_sub(window);
            mean(&values[from..=i])
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_and_median_empty_are_nan() {
        assert!(mean(&[]).is_nan());
        assert!(median(&[]).is_nan());
    }

    #[test]
    fn test_median_odd_and_even() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), 2.0);
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), 2.5);
    }

    #[test]
    fn test_stddev_sample() {
        let v = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        let sd = stddev(&v, mean(&v));
        assert!((sd - 2.138_089_935).abs() < 1e-6);
        assert!(stddev(&[1.0], 1.0).is_nan());
    }

    #[test]
    fn test_trailing_mean_shrinking_window() {
        let daily = [7.0, 1.0, 4.0, 0.0, 3.0, 5.0, 8.0, 14.0];
        let avg = trailing_mean(&daily, 7);

        assert_eq!(avg.len(), daily.len());
        assert_eq!(avg[0], 7.0);
        assert_eq!(avg[1], 4.0);
        assert_eq!(avg[2], 4.0);
        assert_eq!(avg[6], 28.0 / 7.0);
        assert_eq!(avg[7], (28.0 - 7.0 + 14.0) / 7.0);
    }
}
