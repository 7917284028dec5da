//! Beat candidate detection via spectral flux
//!
//! Computes a rectified spectral-flux onset function over short frames and
//! peak-picks it against an adaptive local-mean threshold. The emitted times
//! feed the tempo histogram and the downbeat walk; on degenerate input a
//! small synthetic grid is returned so downstream stages stay total.

use ndarray::Array1;
use rustfft::{num_complex::Complex, FftPlanner};

use crate::spectrum::{hann_window, is_local_peak};

/// Analysis frame size for the onset function.
pub const ONSET_FRAME: usize = 2048;
/// Hop between consecutive flux frames.
pub const ONSET_HOP: usize = 512;

/// Flux must exceed this multiple of the local mean to count as an onset.
const THRESHOLD_RATIO: f64 = 1.5;
/// Local-peak radius (in flux frames) for peak picking.
const PEAK_RADIUS: usize = 3;

/// Synthetic beat grid used when the input is too short or no onsets survive
/// thresholding. Two beats per second reads as 120 BPM downstream.
pub fn fallback_grid() -> Vec<f64> {
    vec![0.0, 0.5, 1.0, 1.5]
}

/// Spectral-flux beat detector.
pub struct OnsetDetector {
    sample_rate: f64,
}

impl OnsetDetector {
    pub fn new(sample_rate: u32) -> Self {
        Self {
            sample_rate: sample_rate as f64,
        }
    }

    /// Detect beat times in seconds. Non-decreasing, finite; never empty.
    pub fn detect(&self, audio: &[f64]) -> Vec<f64> {
        if audio.len() < ONSET_FRAME || self.sample_rate <= 0.0 {
            return fallback_grid();
        }

        let flux = self.compute_flux(audio);
        let peaks = self.pick_peaks(&flux);
        if peaks.is_empty() {
            return fallback_grid();
        }

        self.frames_to_time(&peaks)
    }

    /// Rectified spectral flux per hop: sqrt of the sum of squared positive
    /// per-bin magnitude increases between consecutive frames.
    fn compute_flux(&self, audio: &[f64]) -> Array1<f64> {
        let num_frames = (audio.len() - ONSET_FRAME) / ONSET_HOP + 1;
        let mut flux = Array1::zeros(num_frames);

        let mut planner = FftPlanner::new();
        let fft = planner.plan_fft_forward(ONSET_FRAME);
        let window = hann_window(ONSET_FRAME);

        let mut prev_mag: Option<Vec<f64>> = None;

        for frame_idx in 0..num_frames {
            let start = frame_idx * ONSET_HOP;
            let end = start + ONSET_FRAME;
            if end > audio.len() {
                break;
            }

            let mut frame: Vec<Complex<f64>> = audio[start..end]
                .iter()
                .zip(window.iter())
                .map(|(&s, &w)| Complex::new(s * w, 0.0))
                .collect();
            fft.process(&mut frame);

            let mag: Vec<f64> = frame
                .iter()
                .take(ONSET_FRAME / 2 + 1)
                .map(|c| c.norm())
                .collect();

            if let Some(ref prev) = prev_mag {
                let sum_sq: f64 = mag
                    .iter()
                    .zip(prev.iter())
                    .map(|(&curr, &p)| {
                        let d = (curr - p).max(0.0);
                        d * d
                    })
                    .sum();
                flux[frame_idx] = sum_sq.sqrt();
            }

            prev_mag = Some(mag);
        }

        flux
    }

    /// Adaptive threshold peak picking: a frame is accepted when its flux
    /// exceeds 1.5x the mean over a ~1 s window and it is a strict local
    /// maximum within the peak radius.
    fn pick_peaks(&self, flux: &Array1<f64>) -> Vec<usize> {
        let series = flux.as_slice().unwrap_or(&[]);
        let len = series.len();
        if len == 0 {
            return Vec::new();
        }

        let mean_radius = (self.sample_rate / ONSET_HOP as f64).round() as usize;
        let mut peaks = Vec::new();

        for i in 0..len {
            let lo = i.saturating_sub(mean_radius);
            let hi = (i + mean_radius + 1).min(len);
            let mean = series[lo..hi].iter().sum::<f64>() / (hi - lo) as f64;

            if series[i] > THRESHOLD_RATIO * mean && is_local_peak(series, i, PEAK_RADIUS) {
                peaks.push(i);
            }
        }

        peaks
    }

    /// Convert flux frame indices to seconds.
    fn frames_to_time(&self, frames: &[usize]) -> Vec<f64> {
        frames
            .iter()
            .map(|&f| f as f64 * ONSET_HOP as f64 / self.sample_rate)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn click_track(sample_rate: usize, seconds: f64, interval_sec: f64) -> Vec<f64> {
        let len = (sample_rate as f64 * seconds) as usize;
        let mut audio = vec![0.0; len];
        let step = (interval_sec * sample_rate as f64) as usize;
        let mut pos = 0;
        while pos < len {
            for i in 0..256.min(len - pos) {
                audio[pos + i] = (1.0 - i as f64 / 256.0) * if i % 2 == 0 { 1.0 } else { -1.0 };
            }
            pos += step;
        }
        audio
    }

    #[test]
    fn test_detect_clicks() {
        let detector = OnsetDetector::new(44100);
        let audio = click_track(44100, 4.0, 0.5);
        let beats = detector.detect(&audio);

        assert!(beats.len() >= 4);
        // Non-decreasing and finite
        for pair in beats.windows(2) {
            assert!(pair[1] >= pair[0]);
        }
        assert!(beats.iter().all(|t| t.is_finite()));
    }

    #[test]
    fn test_fallback_on_short_input() {
        let detector = OnsetDetector::new(44100);
        assert_eq!(detector.detect(&vec![0.0; 512]), fallback_grid());
    }

    #[test]
    fn test_fallback_on_silence() {
        let detector = OnsetDetector::new(48000);
        assert_eq!(detector.detect(&vec![0.0; 96000]), fallback_grid());
    }

    #[test]
    fn test_fallback_grid_shape() {
        let grid = fallback_grid();
        assert_eq!(grid, vec![0.0, 0.5, 1.0, 1.5]);
    }
}
