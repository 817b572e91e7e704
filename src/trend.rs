//! Trend estimation
//!
//! Weighted-window trend over an ordered numeric series. The series is
//! expected oldest-first: the last `window` values form the "recent"
//! window and the `window` values before them the "previous" window.
//! Positions within each window carry ascending weights so the newest
//! value of each window dominates, which makes the trend react faster to
//! the latest result than a plain average-of-averages while still
//! smoothing single-point noise.

/// Default comparison window size
pub const DEFAULT_TREND_WINDOW: usize = 2;

/// Percentage change between the weighted averages of the two trailing
/// windows, rounded to one decimal place.
///
/// Returns 0 when the series is shorter than `2 * window` (insufficient
/// history) and when the previous window's weighted average is exactly
/// zero. Never returns NaN or an infinity.
pub fn compute_trend(series: &[f64], window: usize) -> f64 {
    if window == 0 || series.len() < window * 2 {
        return 0.0;
    }

    let recent = &series[series.len() - window..];
    let previous = &series[series.len() - 2 * window..series.len() - window];

    let recent_avg = weighted_average(recent);
    let previous_avg = weighted_average(previous);
    if previous_avg == 0.0 {
        return 0.0;
    }

    round1((recent_avg - previous_avg) / previous_avg * 100.0)
}

/// Weighted average with ascending integer weights 1..=len, oldest first
fn weighted_average(window: &[f64]) -> f64 {
    let mut weighted_sum = 0.0;
    let mut weight_total = 0.0;
    for (i, value) in window.iter().enumerate() {
        let weight = (i + 1) as f64;
        weighted_sum += value * weight;
        weight_total += weight;
    }
    weighted_sum / weight_total
}

/// Round to one decimal place
pub(crate) fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insufficient_history_returns_zero() {
        assert_eq!(compute_trend(&[], DEFAULT_TREND_WINDOW), 0.0);
        assert_eq!(compute_trend(&[80.0], DEFAULT_TREND_WINDOW), 0.0);
        assert_eq!(compute_trend(&[80.0, 90.0, 85.0], DEFAULT_TREND_WINDOW), 0.0);
        assert_eq!(compute_trend(&[80.0, 90.0, 85.0, 70.0, 75.0], 3), 0.0);
    }

    #[test]
    fn test_zero_previous_window_returns_zero() {
        // Previous window averages to exactly zero; no division happens.
        assert_eq!(compute_trend(&[0.0, 0.0, 50.0, 60.0], 2), 0.0);
    }

    #[test]
    fn test_flat_series_has_zero_trend() {
        assert_eq!(compute_trend(&[10.0, 10.0, 10.0, 10.0], 2), 0.0);
    }

    #[test]
    fn test_doubling_series_is_one_hundred_percent() {
        assert_eq!(compute_trend(&[10.0, 10.0, 20.0, 20.0], 2), 100.0);
    }

    #[test]
    fn test_recent_values_dominate_their_window() {
        // Recent window [85, 95] -> (85 + 190) / 3 = 91.667
        // Previous window [70, 90] -> (70 + 180) / 3 = 83.333
        assert_eq!(compute_trend(&[70.0, 90.0, 85.0, 95.0], 2), 10.0);
    }

    #[test]
    fn test_declining_series_is_negative() {
        let trend = compute_trend(&[90.0, 90.0, 60.0, 60.0], 2);
        assert!(trend < 0.0);
        assert_eq!(trend, -33.3);
    }

    #[test]
    fn test_only_trailing_windows_are_considered() {
        // Leading values are ignored entirely.
        assert_eq!(
            compute_trend(&[1.0, 2.0, 3.0, 10.0, 10.0, 20.0, 20.0], 2),
            100.0
        );
    }

    #[test]
    fn test_result_is_rounded_to_one_decimal() {
        // Recent [80, 81] -> 80.667, previous [75, 77] -> 76.333
        // change = 5.677% -> 5.7
        assert_eq!(compute_trend(&[75.0, 77.0, 80.0, 81.0], 2), 5.7);
    }

    #[test]
    fn test_zero_window_is_a_no_op() {
        assert_eq!(compute_trend(&[10.0, 20.0, 30.0], 0), 0.0);
    }
}
