//! # Autocorrelation Module
//!
//! Lag-domain autocorrelation of one audio frame, in two interchangeable
//! forms:
//! - **Direct**: the plain sum of products, `r[lag] = Σ x[i]·x[i+lag]`
//! - **FFT**: the same values through the Wiener–Khinchin theorem, using a
//!   zero-padded forward FFT, the power spectrum and an inverse FFT
//!
//! Both return a vector of length `max_lag` where entries below `min_lag`
//! are left at zero, so lag indices can be used directly.

use rustfft::{FftPlanner, num_complex::Complex};

use crate::config::AutocorrMethod;

/// Computes the autocorrelation of `signal` for lags in `min_lag..max_lag`.
pub fn autocorrelate(
    signal: &[f32],
    min_lag: usize,
    max_lag: usize,
    method: AutocorrMethod,
) -> Vec<f32> {
    match method {
        AutocorrMethod::Direct => autocorrelate_direct(signal, min_lag, max_lag),
        AutocorrMethod::Fft => autocorrelate_fft(signal, min_lag, max_lag),
    }
}

/// Time-domain autocorrelation. `O(n · lags)`.
pub fn autocorrelate_direct(signal: &[f32], min_lag: usize, max_lag: usize) -> Vec<f32> {
    let mut ac = vec![0.0; max_lag];
    let size = signal.len();
    for lag in min_lag..max_lag.min(size) {
        ac[lag] = signal[..size - lag]
            .iter()
            .zip(&signal[lag..])
            .map(|(a, b)| a * b)
            .sum();
    }
    ac
}

/// FFT-accelerated autocorrelation. `O(n log n)`.
///
/// The signal is zero-padded to at least `len + max_lag` samples so the
/// circular correlation equals the linear one for every lag we keep.
pub fn autocorrelate_fft(signal: &[f32], min_lag: usize, max_lag: usize) -> Vec<f32> {
    let mut ac = vec![0.0; max_lag];
    if signal.is_empty() || max_lag == 0 {
        return ac;
    }

    let fft_size = (signal.len() + max_lag).next_power_of_two();
    let mut planner = FftPlanner::new();
    let forward = planner.plan_fft_forward(fft_size);
    let inverse = planner.plan_fft_inverse(fft_size);

    let mut buffer: Vec<Complex<f32>> = signal
        .iter()
        .map(|&sample| Complex { re: sample, im: 0.0 })
        .chain(std::iter::repeat(Complex { re: 0.0, im: 0.0 }))
        .take(fft_size)
        .collect();

    forward.process(&mut buffer);
    // Power spectral density: X · conj(X)
    for bin in buffer.iter_mut() {
        *bin = Complex {
            re: bin.norm_sqr(),
            im: 0.0,
        };
    }
    inverse.process(&mut buffer);

    // rustfft does not normalize the inverse transform.
    let scale = 1.0 / fft_size as f32;
    let upper = max_lag.min(signal.len());
    for lag in min_lag..upper {
        ac[lag] = buffer[lag].re * scale;
    }
    ac
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn direct_matches_hand_computed_values() {
        // a = [1 2 3 4 5 6 7 8]; conv(a, fliplr(a)) centre and right half:
        // 204 168 133 100
        let window = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];
        let ac = autocorrelate_direct(&window, 0, 4);
        assert_eq!(ac, vec![204.0, 168.0, 133.0, 100.0]);
    }

    #[test]
    fn lags_below_min_are_zero() {
        let window = [1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0];
        let ac = autocorrelate_direct(&window, 2, 4);
        assert_eq!(ac, vec![0.0, 0.0, 133.0, 100.0]);
    }

    #[test]
    fn fft_matches_direct() {
        let signal: Vec<f32> = (0..2048)
            .map(|i| {
                let t = i as f32 / 44100.0;
                (2.0 * std::f32::consts::PI * 196.0 * t).sin()
                    + 0.4 * (2.0 * std::f32::consts::PI * 392.0 * t).sin()
            })
            .collect();
        let direct = autocorrelate_direct(&signal, 44, 882);
        let fft = autocorrelate_fft(&signal, 44, 882);
        assert_eq!(direct.len(), fft.len());
        let peak = direct.iter().fold(0.0f32, |m, v| m.max(v.abs()));
        for (lag, (d, f)) in direct.iter().zip(&fft).enumerate() {
            assert!(
                (d - f).abs() <= peak * 1e-3,
                "lag {}: direct {} vs fft {}",
                lag,
                d,
                f
            );
        }
    }

    #[test]
    fn lags_beyond_signal_are_zero() {
        let signal = [1.0, -1.0, 1.0];
        assert_eq!(autocorrelate_direct(&signal, 0, 6)[3..], [0.0, 0.0, 0.0]);
        assert_eq!(autocorrelate_fft(&signal, 0, 6)[3..], [0.0, 0.0, 0.0]);
    }

    #[test]
    fn empty_signal() {
        assert_eq!(autocorrelate(&[], 1, 4, AutocorrMethod::Fft), vec![0.0; 4]);
        assert_eq!(autocorrelate(&[], 1, 4, AutocorrMethod::Direct), vec![0.0; 4]);
    }
}
