//! Shared spectral primitives
//!
//! Hann-windowed magnitude spectra and the strict local-peak test used by
//! the peak pickers. Frame sizes are powers of two, 4096 or below.

use rustfft::{num_complex::Complex, FftPlanner};
use std::f64::consts::PI;

/// Generate a Hann window of the given size.
pub fn hann_window(size: usize) -> Vec<f64> {
    if size < 2 {
        return vec![1.0; size];
    }
    (0..size)
        .map(|i| {
            let phase = 2.0 * PI * i as f64 / (size - 1) as f64;
            0.5 * (1.0 - phase.cos())
        })
        .collect()
}

/// N-point magnitude spectrum of `samples`, Hann windowed.
///
/// Returns one magnitude per input sample; the upper half mirrors the lower
/// for real input, so frequency-domain callers read bins `0..N/2`.
pub fn magnitude_spectrum(samples: &[f64]) -> Vec<f64> {
    let n = samples.len();
    if n == 0 {
        return Vec::new();
    }

    let window = hann_window(n);
    let mut planner = FftPlanner::new();
    let fft = planner.plan_fft_forward(n);

    let mut frame: Vec<Complex<f64>> = samples
        .iter()
        .zip(window.iter())
        .map(|(&s, &w)| Complex::new(s * w, 0.0))
        .collect();
    fft.process(&mut frame);

    frame.iter().map(|c| c.norm()).collect()
}

/// True iff `series[i]` is strictly greater than every other element in
/// `[i - radius, i + radius]`.
pub fn is_local_peak(series: &[f64], i: usize, radius: usize) -> bool {
    if i >= series.len() {
        return false;
    }
    let lo = i.saturating_sub(radius);
    let hi = (i + radius + 1).min(series.len());
    let val = series[i];
    (lo..hi).all(|j| j == i || val > series[j])
}
