//! # Robust Filtering Module
//!
//! Outlier-resistant smoothing of a sequence of frequency readings:
//! - Sliding-window median filter
//! - Median-absolute-deviation (MAD) outlier rejection

use std::cmp::Ordering;

/// Scale factor that makes the MAD a consistent estimator of the standard
/// deviation of normally distributed data.
pub const MAD_SCALE: f32 = 1.4826;

/// Stand-in for a MAD of exactly zero, so a constant run does not reject
/// every value that differs from it by rounding noise only.
const MAD_EPSILON: f32 = 1e-9;

/// Median of `values`. Even lengths average the two central values.
///
/// Returns `None` for an empty slice.
pub fn median(values: &[f32]) -> Option<f32> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 1 {
        Some(sorted[mid])
    } else {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    }
}

/// Replaces every value by the median of the window centred on it.
///
/// The window holds `window / 2` neighbours on each side and is clamped at
/// the ends, so edge windows are shorter. Sequences with fewer than three
/// values are returned unchanged.
pub fn median_filter(values: &[f32], window: usize) -> Vec<f32> {
    if values.len() < 3 {
        return values.to_vec();
    }
    let half = window / 2;
    (0..values.len())
        .map(|i| {
            let start = i.saturating_sub(half);
            let end = (i + half + 1).min(values.len());
            // The window is never empty, so the median always exists.
            median(&values[start..end]).unwrap_or(values[i])
        })
        .collect()
}

/// Keeps the values within `k` scaled MADs of the median, in input order.
///
/// Sequences with fewer than five values are returned unchanged.
pub fn mad_filter(values: &[f32], k: f32) -> Vec<f32> {
    if values.len() < 5 {
        return values.to_vec();
    }
    let Some(center) = median(values) else {
        return values.to_vec();
    };
    let deviations: Vec<f32> = values.iter().map(|v| (v - center).abs()).collect();
    let mad = match median(&deviations) {
        Some(m) if m != 0.0 => m,
        _ => MAD_EPSILON,
    };
    let threshold = k * MAD_SCALE * mad;
    values
        .iter()
        .copied()
        .filter(|v| (v - center).abs() <= threshold)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn median_odd_and_even() {
        assert_eq!(median(&[3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median(&[4.0, 1.0, 3.0, 2.0]), Some(2.5));
        assert_eq!(median(&[7.0]), Some(7.0));
        assert_eq!(median(&[]), None);
    }

    #[test]
    fn median_filter_short_input_is_identity() {
        assert_eq!(median_filter(&[], 5), Vec::<f32>::new());
        assert_eq!(median_filter(&[5.0, 1.0], 5), vec![5.0, 1.0]);
    }

    #[test]
    fn median_filter_removes_single_spike() {
        let input = [220.0, 221.0, 5000.0, 219.0, 220.0, 222.0, 221.0];
        let out = median_filter(&input, 5);
        assert_eq!(out.len(), input.len());
        assert!(out.iter().all(|&v| v < 300.0), "{:?}", out);
        assert_eq!(out[2], 220.0);
    }

    #[test]
    fn median_filter_edges_use_short_windows() {
        // First window is [10, 20, 30] → 20; last is [40, 50, 60] → 50.
        let out = median_filter(&[10.0, 20.0, 30.0, 40.0, 50.0, 60.0], 5);
        assert_eq!(out[0], 20.0);
        assert_eq!(out[5], 50.0);
        // Second window is [10, 20, 30, 40] → 25 (even length).
        assert_eq!(out[1], 25.0);
    }

    #[test]
    fn median_filter_keeps_interior_of_monotonic_sequence() {
        let input: Vec<f32> = (0..20).map(|i| 100.0 + i as f32 * 3.0).collect();
        let out = median_filter(&input, 5);
        assert_eq!(out[2..18], input[2..18]);
    }

    #[test]
    fn mad_filter_short_input_is_identity() {
        let input = [1.0, 100.0, 1000.0, 2.0];
        assert_eq!(mad_filter(&input, 3.0), input.to_vec());
    }

    #[test]
    fn mad_filter_rejects_outlier_and_keeps_order() {
        let input = [220.0, 219.0, 221.0, 5000.0, 220.5, 219.5, 222.0];
        let out = mad_filter(&input, 3.0);
        assert_eq!(out, vec![220.0, 219.0, 221.0, 220.5, 219.5, 222.0]);
    }

    #[test]
    fn mad_filter_zero_mad_keeps_exact_median_run() {
        // More than half the values are identical, so the MAD is 0 and only
        // values equal to the median survive.
        let input = [200.0, 200.0, 200.0, 200.0, 201.0, 199.0];
        let out = mad_filter(&input, 3.0);
        assert_eq!(out, vec![200.0, 200.0, 200.0, 200.0]);
    }

    #[test]
    fn mad_filter_huge_k_keeps_everything() {
        let input = [1.0, 2.0, 3.0, 50.0, 4.0, 5.0];
        assert_eq!(mad_filter(&input, f32::MAX), input.to_vec());
    }

    #[test]
    fn mad_filter_zero_k_keeps_only_median_values() {
        let input = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(mad_filter(&input, 0.0), vec![3.0]);
    }
}
