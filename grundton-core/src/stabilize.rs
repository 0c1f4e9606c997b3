//! Selection of the stable part of a session's frequency readings.
//!
//! [`select_stable`] is the only definition of "stable": the live preview,
//! the save gate and the stored summaries all go through it with the same
//! [`FilterConfig`].

use crate::config::FilterConfig;
use crate::robust::{mad_filter, median_filter};

/// Median-smooths `raw` and drops MAD outliers from the result.
pub fn select_stable(raw: &[f32], config: &FilterConfig) -> Vec<f32> {
    let smoothed = median_filter(raw, config.median_window);
    mad_filter(&smoothed, config.mad_k)
}

/// Whether a session with these raw readings has enough stable data to be
/// stored.
pub fn save_allowed(raw: &[f32], config: &FilterConfig, min_stable: usize) -> bool {
    let stable = select_stable(raw, config).len();
    tracing::debug!(raw = raw.len(), stable, min_stable, "save gate");
    stable >= min_stable
}
