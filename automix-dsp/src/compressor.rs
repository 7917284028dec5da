//! Glue compressor
//!
//! Gentle bus compression applied across the finished mix. The envelope is
//! fed the per-frame maximum across channels so every channel receives the
//! same gain, and reduction follows `(env/threshold)^(1/ratio - 1)` above
//! threshold.

use crate::buffer::AudioBuffer;
use crate::envelope::EnvelopeFollower;

/// Configuration for the glue compressor.
#[derive(Debug, Clone)]
pub struct GlueConfig {
    pub threshold_db: f32,
    pub ratio: f32,
    pub attack_ms: f32,
    pub release_ms: f32,
}

impl Default for GlueConfig {
    fn default() -> Self {
        Self {
            threshold_db: -12.0,
            ratio: 2.0,
            attack_ms: 10.0,
            release_ms: 80.0,
        }
    }
}

/// Compression statistics for the report surface.
#[derive(Debug, Clone, Copy)]
pub struct GlueReport {
    pub threshold_db: f32,
    pub ratio: f32,
    /// Deepest gain reduction applied, in dB (<= 0).
    pub max_gain_reduction_db: f32,
}

/// Compress the buffer in place, returning the reduction statistics.
pub fn glue_compress(buffer: &mut AudioBuffer, config: &GlueConfig) -> GlueReport {
    let frames = buffer.frames();
    let mut report = GlueReport {
        threshold_db: config.threshold_db,
        ratio: config.ratio,
        max_gain_reduction_db: 0.0,
    };

    if frames == 0 || config.ratio <= 0.0 {
        return report;
    }

    let threshold_lin = 10.0f32.powf(config.threshold_db / 20.0);
    let exponent = 1.0 / config.ratio - 1.0;
    let mut follower =
        EnvelopeFollower::new(buffer.sample_rate, config.attack_ms, config.release_ms);

    let mut min_gain = 1.0f32;
    for i in 0..frames {
        let level = buffer
            .channels
            .iter()
            .map(|ch| ch[i].abs())
            .fold(0.0f32, f32::max);
        let env = follower.process(level);

        let gain = if env > threshold_lin {
            (env / threshold_lin).powf(exponent)
        } else {
            1.0
        };
        min_gain = min_gain.min(gain);

        for ch in buffer.channels.iter_mut() {
            ch[i] *= gain;
        }
    }

    report.max_gain_reduction_db = 20.0 * min_gain.max(1e-10).log10();
    report
}
