//! RMS energy envelope
//!
//! 20 ms RMS windows smoothed with a +/-5 frame centered average. The curve
//! is what the planner compares across the transition seam, so it is always
//! finite and never empty.

/// Envelope resolution in seconds.
const WINDOW_SEC: f64 = 0.020;
/// Centered smoothing radius in envelope frames.
const SMOOTH_RADIUS: usize = 5;

/// Compute the smoothed RMS envelope of a mono signal. Empty or unusable
/// input yields the neutral `[0.5]` curve.
pub fn rms_envelope(audio: &[f64], sample_rate: u32) -> Vec<f32> {
    if audio.is_empty() || sample_rate == 0 {
        return vec![0.5];
    }

    let window = ((sample_rate as f64 * WINDOW_SEC) as usize).max(1);
    let raw: Vec<f64> = audio
        .chunks(window)
        .map(|chunk| {
            let mean_sq = chunk.iter().map(|s| s * s).sum::<f64>() / chunk.len() as f64;
            let rms = mean_sq.sqrt();
            if rms.is_finite() {
                rms
            } else {
                0.0
            }
        })
        .collect();

    if raw.is_empty() {
        return vec![0.5];
    }

    let len = raw.len();
    (0..len)
        .map(|i| {
            let lo = i.saturating_sub(SMOOTH_RADIUS);
            let hi = (i + SMOOTH_RADIUS + 1).min(len);
            (raw[lo..hi].iter().sum::<f64>() / (hi - lo) as f64) as f32
        })
        .collect()
}
