//! # Pitch Detection Module
//!
//! Fundamental-frequency estimation for one frame of time-domain audio.
//!
//! ## Pipeline
//! - DC removal and RMS noise gate
//! - Autocorrelation over the lag range of the configured pitch bounds
//! - Largest strict local maximum of the autocorrelation (first one wins on
//!   ties, i.e. the shortest period)
//! - Parabolic interpolation for sub-sample lag accuracy

use crate::autocorr;
use crate::config::DetectorConfig;

/// A frequency estimate in Hz, or `None` when the frame carries no pitch.
pub type FrequencyReading = Option<f32>;

/// One frame of mono audio and the rate it was captured at.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl Frame {
    pub fn new(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            samples,
            sample_rate,
        }
    }
}

/// Stateless autocorrelation pitch detector.
///
/// Holds only its configuration; every call to [`PitchDetector::detect`] is
/// independent, so one detector can serve any number of frames.
#[derive(Debug, Clone, Copy, Default)]
pub struct PitchDetector {
    config: DetectorConfig,
}

impl PitchDetector {
    pub fn new(config: DetectorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Estimates the fundamental of `samples`.
    ///
    /// The frame is DC-corrected **in place**; callers must treat it as
    /// consumed. Use [`PitchDetector::detect_copy`] to keep the input intact.
    ///
    /// # Returns
    /// * `Some(frequency)` - Detected fundamental in Hz
    /// * `None` - Silence, no periodicity peak, or an unusable frame
    pub fn detect(&self, samples: &mut [f32], sample_rate: u32) -> FrequencyReading {
        let size = samples.len();
        if size == 0 || sample_rate == 0 {
            return None;
        }

        // --- Noise gate on the DC-free signal ---
        if remove_dc_and_rms(samples) < self.config.noise_floor {
            return None;
        }

        // --- Lag range from the frequency bounds ---
        let rate = sample_rate as f32;
        let min_lag = (rate / self.config.max_frequency).floor() as usize;
        let max_lag = (rate / self.config.min_frequency).floor() as usize;
        if max_lag < min_lag + 3 {
            tracing::trace!(min_lag, max_lag, "lag range too narrow");
            return None;
        }
        // Lags at or beyond the frame length stay zero in the autocorrelation.

        let ac = autocorr::autocorrelate(samples, min_lag, max_lag, self.config.method);

        let best_lag = find_peak_lag(&ac, min_lag, max_lag)?;

        // --- Parabolic interpolation around the peak ---
        let y1 = ac[best_lag - 1];
        let y2 = ac[best_lag];
        let y3 = ac[best_lag + 1];
        let shift = 0.5 * (y1 - y3) / (y1 - 2.0 * y2 + y3);
        let true_lag = best_lag as f32 + if shift.is_finite() { shift } else { 0.0 };

        Some(rate / true_lag)
    }

    /// Like [`PitchDetector::detect`], but works on a copy of the input.
    pub fn detect_copy(&self, samples: &[f32], sample_rate: u32) -> FrequencyReading {
        let mut scratch = samples.to_vec();
        self.detect(&mut scratch, sample_rate)
    }

    /// Consumes a [`Frame`].
    pub fn detect_frame(&self, mut frame: Frame) -> FrequencyReading {
        self.detect(&mut frame.samples, frame.sample_rate)
    }
}

/// Subtracts the mean from every sample and returns the RMS of the result.
fn remove_dc_and_rms(samples: &mut [f32]) -> f32 {
    let len = samples.len() as f32;
    let mean = samples.iter().sum::<f32>() / len;
    let mut energy = 0.0;
    for sample in samples.iter_mut() {
        *sample -= mean;
        energy += *sample * *sample;
    }
    (energy / len).sqrt()
}

/// Scans `min_lag+1 ..= max_lag-2` for the strict local maximum with the
/// largest positive value. Only a strictly larger value replaces the current
/// best, so the shortest period wins among equal peaks.
fn find_peak_lag(ac: &[f32], min_lag: usize, max_lag: usize) -> Option<usize> {
    let mut best_lag = None;
    let mut best_val = 0.0;
    for lag in (min_lag + 1)..(max_lag - 1) {
        let v = ac[lag];
        if v > ac[lag - 1] && v > ac[lag + 1] && v > best_val {
            best_val = v;
            best_lag = Some(lag);
        }
    }
    best_lag
}

/// Convenience wrapper using the default detector configuration.
pub fn detect_pitch(samples: &mut [f32], sample_rate: u32) -> FrequencyReading {
    PitchDetector::default().detect(samples, sample_rate)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AutocorrMethod;

    fn sine(freq: f32, sample_rate: u32, len: usize, amplitude: f32) -> Vec<f32> {
        (0..len)
            .map(|i| {
                amplitude
                    * (2.0 * std::f32::consts::PI * freq * i as f32 / sample_rate as f32).sin()
            })
            .collect()
    }

    fn assert_within_one_percent(detected: Option<f32>, expected: f32) {
        let f = detected.unwrap_or_else(|| panic!("no pitch detected for {} Hz", expected));
        assert!(
            (f - expected).abs() / expected < 0.01,
            "expected {} Hz, got {} Hz",
            expected,
            f
        );
    }

    #[test]
    fn silence_has_no_pitch() {
        let mut frame = vec![0.0; 2048];
        assert_eq!(detect_pitch(&mut frame, 44100), None);
    }

    #[test]
    fn constant_offset_is_silence() {
        // Pure DC disappears after mean removal.
        let mut frame = vec![0.3; 2048];
        assert_eq!(detect_pitch(&mut frame, 48000), None);
    }

    #[test]
    fn sub_threshold_sine_has_no_pitch() {
        let mut frame = sine(220.0, 44100, 2048, 0.001);
        assert_eq!(detect_pitch(&mut frame, 44100), None);
    }

    #[test]
    fn detects_sines_across_range() {
        for &freq in &[196.0, 220.0, 261.63, 330.0, 440.0, 659.25, 880.0] {
            let mut frame = sine(freq, 44100, 2048, 0.5);
            assert_within_one_percent(detect_pitch(&mut frame, 44100), freq);
        }
    }

    #[test]
    fn detects_low_sines_with_long_frames() {
        // The lag taper of the plain sum of products biases long periods
        // short; a longer frame keeps the error well inside 1%.
        for &freq in &[55.0, 82.41, 110.0, 146.83] {
            let mut frame = sine(freq, 44100, 8192, 0.5);
            assert_within_one_percent(detect_pitch(&mut frame, 44100), freq);
        }
    }

    #[test]
    fn detects_at_48k() {
        let mut frame = sine(330.0, 48000, 2048, 0.2);
        assert_within_one_percent(detect_pitch(&mut frame, 48000), 330.0);
    }

    #[test]
    fn fft_method_agrees_with_direct() {
        let direct = PitchDetector::default();
        let fft = PitchDetector::new(DetectorConfig {
            method: AutocorrMethod::Fft,
            ..DetectorConfig::default()
        });
        let frame = sine(247.0, 44100, 2048, 0.5);
        let a = direct.detect_copy(&frame, 44100).unwrap();
        let b = fft.detect_copy(&frame, 44100).unwrap();
        assert!((a - b).abs() < 0.5, "direct {} vs fft {}", a, b);
    }

    #[test]
    fn harmonic_rich_tone_reports_fundamental() {
        let sr = 44100;
        let f0 = 196.0;
        let mut frame: Vec<f32> = (0..2048)
            .map(|i| {
                let t = i as f32 / sr as f32;
                (1..=5)
                    .map(|h| {
                        let h = h as f32;
                        (2.0 * std::f32::consts::PI * f0 * h * t).sin() / h
                    })
                    .sum::<f32>()
                    * 0.3
            })
            .collect();
        assert_within_one_percent(detect_pitch(&mut frame, sr), f0);
    }

    #[test]
    fn removes_dc_in_place() {
        let mut frame: Vec<f32> = sine(220.0, 44100, 2048, 0.5)
            .into_iter()
            .map(|s| s + 0.25)
            .collect();
        let detected = detect_pitch(&mut frame, 44100);
        assert_within_one_percent(detected, 220.0);
        let mean = frame.iter().sum::<f32>() / frame.len() as f32;
        assert!(mean.abs() < 1e-4, "frame mean after detection was {}", mean);
    }

    #[test]
    fn detect_copy_leaves_input_untouched() {
        let frame: Vec<f32> = sine(220.0, 44100, 2048, 0.5)
            .into_iter()
            .map(|s| s + 0.25)
            .collect();
        let before = frame.clone();
        PitchDetector::default().detect_copy(&frame, 44100);
        assert_eq!(frame, before);
    }

    #[test]
    fn frame_shorter_than_shortest_period_has_no_pitch() {
        // Every lag in range is past the end of the frame.
        let mut frame = sine(220.0, 44100, 40, 0.5);
        assert_eq!(detect_pitch(&mut frame, 44100), None);
    }

    #[test]
    fn high_rate_frame_shorter_than_lag_range() {
        // At 192 kHz the 50 Hz lag bound is 3840 samples, past a 2048-sample
        // frame. Two and a bit periods fit; the taper costs up to ~1%.
        let mut frame = sine(220.0, 192000, 2048, 0.5);
        let hz = detect_pitch(&mut frame, 192000).expect("no pitch at 192 kHz");
        assert!((hz - 220.0).abs() / 220.0 < 0.02, "got {} Hz", hz);
    }

    #[test]
    fn speaking_range_reads_slightly_sharp_at_default_frame() {
        // 100-200 Hz at 2048 samples: the plain sum of products shortens
        // long periods, so readings land sharp by up to about 1.3%.
        for &freq in &[100.0, 110.0, 120.0, 130.0, 147.0, 165.0, 185.0, 200.0] {
            let mut frame = sine(freq, 44100, 2048, 0.3);
            let hz = detect_pitch(&mut frame, 44100).expect("no pitch");
            let error = (hz - freq) / freq;
            assert!((-0.005..0.02).contains(&error), "{} Hz read as {}", freq, hz);
        }
    }

    #[test]
    fn empty_frame_and_zero_rate() {
        assert_eq!(detect_pitch(&mut [], 44100), None);
        let mut frame = sine(220.0, 44100, 2048, 0.5);
        assert_eq!(detect_pitch(&mut frame, 0), None);
    }

    #[test]
    fn detect_frame_consumes_frame() {
        let frame = Frame::new(sine(440.0, 44100, 2048, 0.5), 44100);
        assert_within_one_percent(PitchDetector::default().detect_frame(frame), 440.0);
    }

    #[test]
    fn peak_search_prefers_first_of_equal_peaks() {
        let mut ac = vec![0.0; 12];
        ac[4] = 5.0;
        ac[8] = 5.0;
        assert_eq!(find_peak_lag(&ac, 1, 12), Some(4));
        ac[8] = 6.0;
        assert_eq!(find_peak_lag(&ac, 1, 12), Some(8));
    }

    #[test]
    fn peak_search_ignores_non_positive_peaks() {
        let mut ac = vec![-1.0; 12];
        ac[5] = -0.5;
        assert_eq!(find_peak_lag(&ac, 1, 12), None);
    }
}
