//! True-peak limiter
//!
//! Sample-domain approximation of a true-peak ceiling: every sample is scaled
//! against the maximum absolute value over a short lookahead window, then an
//! unconditional soft clip bounds the output strictly below 0.95.

use crate::buffer::AudioBuffer;

/// Lookahead window in samples.
const LOOKAHEAD: usize = 10;

const SOFT_CLIP_CEILING: f32 = 0.95;
const SOFT_CLIP_DRIVE: f32 = 1.5;

/// Configuration for the true-peak limiter.
#[derive(Debug, Clone)]
pub struct LimiterConfig {
    pub ceiling_db: f32,
}

impl Default for LimiterConfig {
    fn default() -> Self {
        Self { ceiling_db: -1.0 }
    }
}

/// Limiting statistics for the report surface.
#[derive(Debug, Clone, Copy)]
pub struct LimiterReport {
    pub ceiling_db: f32,
    pub input_peak_db: f32,
    pub output_peak_db: f32,
}

/// Limit the buffer in place. After this pass `|y| < 0.95` everywhere.
pub fn limit_true_peak(buffer: &mut AudioBuffer, config: &LimiterConfig) -> LimiterReport {
    let ceiling_lin = 10.0f32.powf(config.ceiling_db / 20.0);

    let input_peak = peak(buffer);

    for ch in buffer.channels.iter_mut() {
        let len = ch.len();
        for i in 0..len {
            let hi = (i + LOOKAHEAD).min(len);
            let window_max = ch[i..hi].iter().map(|s| s.abs()).fold(0.0f32, f32::max);
            if window_max > ceiling_lin {
                ch[i] *= ceiling_lin / window_max;
            }
            ch[i] = SOFT_CLIP_CEILING * (SOFT_CLIP_DRIVE * ch[i]).tanh();
        }
    }

    LimiterReport {
        ceiling_db: config.ceiling_db,
        input_peak_db: to_db(input_peak),
        output_peak_db: to_db(peak(buffer)),
    }
}

fn peak(buffer: &AudioBuffer) -> f32 {
    buffer
        .channels
        .iter()
        .flatten()
        .map(|s| s.abs())
        .fold(0.0f32, f32::max)
}

fn to_db(lin: f32) -> f32 {
    20.0 * lin.max(1e-10).log10()
}
