//! Stereo field tools for the mix seam
//!
//! Phase correlation across the transition overlap (the bass-mono trigger)
//! and a sliding-window bass mono-ization for the mastered output.

use rayon::prelude::*;

use crate::buffer::AudioBuffer;

/// Default crossover below which bass is folded to mono.
pub const DEFAULT_BASS_CUTOFF_HZ: f32 = 120.0;

/// Phase correlation between the tail of `a` (from `a_start`) and the head
/// of `b` over `len` frames: the mean of mid*side with the quarter-sum
/// mid/side of both overlapped signals. Mono channels mirror into L and R.
pub fn overlap_phase_correlation(
    a: &AudioBuffer,
    a_start: usize,
    b: &AudioBuffer,
    len: usize,
) -> f32 {
    if a.is_empty() || b.is_empty() || len == 0 {
        return 0.0;
    }

    let la = a.channel_or_last(0);
    let ra = a.channel_or_last(1);
    let lb = b.channel_or_last(0);
    let rb = b.channel_or_last(1);

    let usable = len
        .min(la.len().saturating_sub(a_start))
        .min(lb.len());
    if usable == 0 {
        return 0.0;
    }

    let mut acc = 0.0f64;
    for i in 0..usable {
        let (xa, ya) = (la[a_start + i] as f64, ra[a_start + i] as f64);
        let (xb, yb) = (lb[i] as f64, rb[i] as f64);
        let mid = 0.25 * (xa + ya + xb + yb);
        let side = 0.25 * (xa - ya + xb - yb);
        acc += mid * side;
    }

    let corr = acc / usable as f64;
    if corr.is_finite() {
        corr as f32
    } else {
        0.0
    }
}

/// Fold low-frequency content to mono in place. No-op for mono buffers.
///
/// The low band is approximated per channel by a centered moving average of
/// half-window `sr / (2 * cutoff)`; each channel keeps its own content above
/// the crossover and shares the averaged low band.
pub fn bass_mono(buffer: &mut AudioBuffer, cutoff_hz: f32) {
    let frames = buffer.frames();
    if buffer.channel_count() < 2 || frames == 0 {
        return;
    }
    if !cutoff_hz.is_finite() || cutoff_hz <= 0.0 {
        return;
    }

    let half_window = ((buffer.sample_rate as f32 / (2.0 * cutoff_hz)) as usize).max(1);

    // Per-channel sliding means via prefix sums
    let lows: Vec<Vec<f32>> = buffer
        .channels
        .par_iter()
        .map(|ch| sliding_mean(ch, half_window))
        .collect();

    let channel_scale = 1.0 / buffer.channel_count() as f32;
    for i in 0..frames {
        let mono_low: f32 = lows.iter().map(|low| low[i]).sum::<f32>() * channel_scale;
        for (ch, low) in buffer.channels.iter_mut().zip(lows.iter()) {
            ch[i] = mono_low + (ch[i] - low[i]);
        }
    }
}

fn sliding_mean(samples: &[f32], half_window: usize) -> Vec<f32> {
    let len = samples.len();
    let mut prefix = vec![0.0f64; len + 1];
    for (i, &s) in samples.iter().enumerate() {
        prefix[i + 1] = prefix[i] + s as f64;
    }

    (0..len)
        .map(|i| {
            let lo = i.saturating_sub(half_window);
            let hi = (i + half_window + 1).min(len);
            ((prefix[hi] - prefix[lo]) / (hi - lo) as f64) as f32
        })
        .collect()
}
