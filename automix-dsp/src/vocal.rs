//! Vocal-band presence estimate
//!
//! Per-hop ratio of 2-5 kHz magnitude against the full spectrum, doubled and
//! clamped into [0, 1]. A crude but serviceable proxy for vocal content; the
//! planner only thresholds it.

use crate::spectrum::magnitude_spectrum;

/// Frame and hop size of the vocal-band scan.
pub const VOCAL_HOP: usize = 4096;

const BAND_LOW: f64 = 2000.0;
const BAND_HIGH: f64 = 5000.0;

/// Per-frame vocal likelihood for a mono signal, one value per 4096-sample
/// hop. Empty for inputs shorter than one hop.
pub fn vocal_likelihood(audio: &[f64], sample_rate: u32) -> Vec<f32> {
    if sample_rate == 0 {
        return Vec::new();
    }

    let sr = sample_rate as f64;
    let mut out = Vec::new();

    let mut start = 0;
    while start + VOCAL_HOP <= audio.len() {
        let mag = magnitude_spectrum(&audio[start..start + VOCAL_HOP]);

        let mut total = 0.0f64;
        let mut band = 0.0f64;
        for (k, &m) in mag.iter().enumerate().take(VOCAL_HOP / 2) {
            let freq = k as f64 * sr / VOCAL_HOP as f64;
            total += m;
            if (BAND_LOW..=BAND_HIGH).contains(&freq) {
                band += m;
            }
        }

        let ratio = if total > 0.0 {
            (2.0 * band / total).clamp(0.0, 1.0)
        } else {
            0.0
        };
        out.push(ratio as f32);

        start += VOCAL_HOP;
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    fn tone(freq: f64, sr: usize, len: usize) -> Vec<f64> {
        (0..len)
            .map(|i| (2.0 * PI * freq * i as f64 / sr as f64).sin())
            .collect()
    }

    #[test]
    fn test_vocal_band_tone_scores_high() {
        let audio = tone(3000.0, 44100, VOCAL_HOP * 4);
        let scores = vocal_likelihood(&audio, 44100);
        assert_eq!(scores.len(), 4);
        assert!(scores.iter().all(|&s| s > 0.8));
    }

    #[test]
    fn test_bass_tone_scores_low() {
        let audio = tone(100.0, 44100, VOCAL_HOP * 4);
        let scores = vocal_likelihood(&audio, 44100);
        assert!(scores.iter().all(|&s| s < 0.2));
    }

    #[test]
    fn test_silence_scores_zero() {
        let scores = vocal_likelihood(&vec![0.0; VOCAL_HOP * 2], 48000);
        assert!(scores.iter().all(|&s| s == 0.0));
    }

    #[test]
    fn test_short_input_is_empty() {
        assert!(vocal_likelihood(&[0.1; 100], 44100).is_empty());
    }

    #[test]
    fn test_scores_clamped() {
        let audio = tone(2500.0, 44100, VOCAL_HOP);
        let scores = vocal_likelihood(&audio, 44100);
        assert!(scores.iter().all(|&s| (0.0..=1.0).contains(&s)));
    }
}
