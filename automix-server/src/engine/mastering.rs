//! Mastering tail
//!
//! Bass management, glue compression, loudness normalization and true-peak
//! limiting over the assembled mix, in that order, with the stage statistics
//! folded into one report for the response surface.

use automix_dsp::compressor::{glue_compress, GlueConfig};
use automix_dsp::limiter::{limit_true_peak, LimiterConfig};
use automix_dsp::loudness::normalize_loudness;
use automix_dsp::stereo::{bass_mono, DEFAULT_BASS_CUTOFF_HZ};
use automix_dsp::AudioBuffer;
use serde::{Deserialize, Serialize};

/// Correlation below which the overlap is considered phase-hostile and the
/// low end is folded to mono.
const CORRELATION_TRIGGER: f32 = -0.3;

#[derive(Debug, Clone)]
pub struct MasteringConfig {
    pub target_lufs: f32,
    pub true_peak_ceiling_db: f32,
}

impl Default for MasteringConfig {
    fn default() -> Self {
        Self {
            target_lufs: -14.0,
            true_peak_ceiling_db: -1.0,
        }
    }
}

/// Aggregated statistics from the mastering stages.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MasteringReport {
    pub phase_correlation: f32,
    pub bass_mono_applied: bool,
    /// Deepest glue-compressor reduction, in dB (<= 0).
    pub compressor_gain_reduction_db: f32,
    pub input_lufs: f32,
    pub normalize_gain_db: f32,
    pub input_peak_db: f32,
    pub output_peak_db: f32,
}

/// Run the mastering chain in place over the assembled mix.
///
/// `force_bass_mono` is the style trigger (bass swap); the correlation
/// trigger fires independently of it.
pub fn master(
    output: &mut AudioBuffer,
    config: &MasteringConfig,
    phase_correlation: f32,
    force_bass_mono: bool,
) -> MasteringReport {
    let bass_mono_applied = force_bass_mono || phase_correlation < CORRELATION_TRIGGER;
    if bass_mono_applied {
        tracing::debug!(
            "Folding bass to mono (correlation {:.3}, forced: {})",
            phase_correlation,
            force_bass_mono
        );
        bass_mono(output, DEFAULT_BASS_CUTOFF_HZ);
    }

    let glue = glue_compress(output, &GlueConfig::default());
    let loudness = normalize_loudness(output, config.target_lufs);
    let limiting = limit_true_peak(
        output,
        &LimiterConfig {
            ceiling_db: config.true_peak_ceiling_db,
        },
    );

    tracing::debug!(
        "Mastered: {:.1} LUFS in, {:+.1} dB gain, peak {:.2} -> {:.2} dBFS",
        loudness.input_lufs,
        loudness.gain_db,
        limiting.input_peak_db,
        limiting.output_peak_db
    );

    MasteringReport {
        phase_correlation,
        bass_mono_applied,
        compressor_gain_reduction_db: glue.max_gain_reduction_db,
        input_lufs: loudness.input_lufs,
        normalize_gain_db: loudness.gain_db,
        input_peak_db: limiting.input_peak_db,
        output_peak_db: limiting.output_peak_db,
    }
}
