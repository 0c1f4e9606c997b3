//! # Configuration Module
//!
//! Tunable parameters for the analysis pipeline. Every field has a default
//! matching the constants below, so an empty TOML file (or no file at all)
//! yields the standard behavior.
//!
//! ```toml
//! [detector]
//! noise_floor = 0.0015
//! method = "fft"
//!
//! [filter]
//! median_window = 5
//! ```

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{Error, Result};

/// RMS below which a frame is treated as unvoiced.
pub const NOISE_FLOOR: f32 = 0.0015;
/// Lowest detectable fundamental in Hz.
pub const MIN_FREQUENCY: f32 = 50.0;
/// Highest detectable fundamental in Hz.
pub const MAX_FREQUENCY: f32 = 1000.0;
/// Window length of the median smoother.
pub const MEDIAN_WINDOW: usize = 5;
/// MAD rejection threshold multiplier.
pub const MAD_K: f32 = 3.0;
/// Samples per frame delivered by the frame source.
pub const FRAME_SIZE: usize = 2048;
/// Minimum stable readings before a session may be saved.
pub const MIN_STABLE_SAMPLES: usize = 8;
/// Stable readings kept in a stored session.
pub const STORED_SAMPLE_CAP: usize = 200;
/// Number of most recent readings the stability meter looks at.
pub const STABILITY_WINDOW: usize = 20;
/// Readings required before the stability meter reports anything but 0.
pub const STABILITY_MIN_READINGS: usize = 8;

/// How the detector computes the autocorrelation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AutocorrMethod {
    /// Time-domain sum of products.
    #[default]
    Direct,
    /// Wiener–Khinchin via a zero-padded FFT.
    Fft,
}

/// Parameters of the per-frame pitch detector.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    pub noise_floor: f32,
    pub min_frequency: f32,
    pub max_frequency: f32,
    pub method: AutocorrMethod,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            noise_floor: NOISE_FLOOR,
            min_frequency: MIN_FREQUENCY,
            max_frequency: MAX_FREQUENCY,
            method: AutocorrMethod::Direct,
        }
    }
}

/// Parameters of the stabilization pipeline (median smoothing + MAD rejection).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    pub median_window: usize,
    pub mad_k: f32,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            median_window: MEDIAN_WINDOW,
            mad_k: MAD_K,
        }
    }
}

/// Session-level policy: frame size, save gating, storage cap, stability meter.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    pub frame_size: usize,
    pub min_stable_samples: usize,
    pub stored_sample_cap: usize,
    pub stability_window: usize,
    pub stability_min_readings: usize,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            frame_size: FRAME_SIZE,
            min_stable_samples: MIN_STABLE_SAMPLES,
            stored_sample_cap: STORED_SAMPLE_CAP,
            stability_window: STABILITY_WINDOW,
            stability_min_readings: STABILITY_MIN_READINGS,
        }
    }
}

/// Complete configuration of the analysis pipeline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    pub detector: DetectorConfig,
    pub filter: FilterConfig,
    pub session: SessionConfig,
}

impl AnalysisConfig {
    /// Reads, parses and validates a TOML configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| Error::read_config(path, e))?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!(path = %path.display(), "loaded analysis config");
        Ok(config)
    }

    /// Parses and validates a TOML string.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: AnalysisConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks that every value is usable by the pipeline.
    pub fn validate(&self) -> Result<()> {
        let d = &self.detector;
        if !(d.noise_floor > 0.0) {
            return Err(invalid("noise_floor must be positive"));
        }
        if !(d.min_frequency > 0.0) || !(d.max_frequency > 0.0) {
            return Err(invalid("frequency bounds must be positive"));
        }
        if d.min_frequency >= d.max_frequency {
            return Err(invalid("min_frequency must be below max_frequency"));
        }

        let f = &self.filter;
        if f.median_window < 3 || f.median_window % 2 == 0 {
            return Err(invalid("median_window must be odd and at least 3"));
        }
        if !(f.mad_k >= 0.0) {
            return Err(invalid("mad_k must not be negative"));
        }

        let s = &self.session;
        if s.frame_size == 0 {
            return Err(invalid("frame_size must be positive"));
        }
        if s.min_stable_samples == 0 || s.stored_sample_cap == 0 {
            return Err(invalid("sample thresholds must be positive"));
        }
        if s.stability_window == 0 {
            return Err(invalid("stability_window must be positive"));
        }
        Ok(())
    }
}

fn invalid(msg: &str) -> Error {
    Error::InvalidConfig(msg.to_string())
}
