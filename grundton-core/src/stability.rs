//! Live stability meter.
//!
//! A coarse 0..1 score of how steady the most recent readings are. It is a
//! display heuristic, not a probability: a flat pitch scores near 1 and the
//! score reaches 0 once the relative spread exceeds [`STABILITY_SPREAD`].

use crate::config::{STABILITY_MIN_READINGS, STABILITY_WINDOW};

/// Relative standard deviation at which the score drops to 0. Empirical.
pub const STABILITY_SPREAD: f32 = 0.02;

/// Scores the last `window` readings; 0 until `min_readings` have arrived.
pub fn stability_score(readings: &[f32], window: usize, min_readings: usize) -> f32 {
    if readings.len() < min_readings || readings.is_empty() || window == 0 {
        return 0.0;
    }
    let recent = &readings[readings.len().saturating_sub(window)..];
    let n = recent.len() as f32;
    let mean = recent.iter().sum::<f32>() / n;
    let variance = recent.iter().map(|v| (v - mean) * (v - mean)).sum::<f32>() / n;
    let score = 1.0 - variance.sqrt() / (mean * STABILITY_SPREAD);
    if score.is_finite() {
        score.clamp(0.0, 1.0)
    } else {
        0.0
    }
}

/// [`stability_score`] with the default window (20) and minimum (8).
pub fn stability(readings: &[f32]) -> f32 {
    stability_score(readings, STABILITY_WINDOW, STABILITY_MIN_READINGS)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn too_few_readings_score_zero() {
        assert_eq!(stability(&[]), 0.0);
        assert_eq!(stability(&[220.0; 7]), 0.0);
    }

    #[test]
    fn flat_pitch_scores_one() {
        assert_eq!(stability(&[220.0; 8]), 1.0);
    }

    #[test]
    fn half_the_spread_scores_half() {
        // Alternating ±1% around 200 Hz: sd = 2 Hz, mean·0.02 = 4 Hz.
        let readings: Vec<f32> = (0..20)
            .map(|i| if i % 2 == 0 { 198.0 } else { 202.0 })
            .collect();
        assert!((stability(&readings) - 0.5).abs() < 1e-4);
    }

    #[test]
    fn wide_spread_clamps_to_zero() {
        let readings: Vec<f32> = (0..20)
            .map(|i| if i % 2 == 0 { 150.0 } else { 300.0 })
            .collect();
        assert_eq!(stability(&readings), 0.0);
    }

    #[test]
    fn only_recent_window_counts() {
        // A wild start followed by twenty flat readings.
        let mut readings: Vec<f32> = vec![100.0, 900.0, 50.0, 700.0, 300.0];
        readings.extend(std::iter::repeat(220.0).take(20));
        assert_eq!(stability(&readings), 1.0);
    }
}
