//! Mix rendering
//!
//! The end-to-end pipeline: analyze both tracks (concurrently), plan the
//! transition, drop the planned effects onto the buffers, splice A into B
//! through the style's crossfade curve, and run the mastering tail. Stages
//! are sequential; each writes a fresh buffer or mutates one it uniquely
//! owns, so a cancelled render never leaves shared state corrupted.

use std::f32::consts::PI;

use automix_dsp::stereo::overlap_phase_correlation;
use automix_dsp::{fx, AudioBuffer};

use crate::analysis::analyze_track;
use crate::engine::mastering::{master, MasteringConfig, MasteringReport};
use crate::engine::planner::plan_transition;
use crate::error::{MixError, Result};
use crate::models::plan::{FxEvent, FxKind, MixMode, PlanOverride, TransitionPlan, TransitionStyle};
use crate::models::summary::TrackAnalysis;

#[derive(Debug, Clone)]
pub struct MergeOptions {
    /// Advisory; clamped by available samples at render time.
    pub crossfade_seconds: f64,
    pub mode: MixMode,
    pub target_lufs: f32,
    pub true_peak_ceiling_db: f32,
    /// Seed for the noise-sweep PRNG so renders reproduce bit-for-bit.
    pub noise_seed: u64,
    pub plan_override: Option<PlanOverride>,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            crossfade_seconds: 8.0,
            mode: MixMode::Neutral,
            target_lufs: -14.0,
            true_peak_ceiling_db: -1.0,
            noise_seed: 0,
            plan_override: None,
        }
    }
}

/// Everything a merge produces: the mastered buffer, the plan that was
/// actually executed, and both analysis summaries.
#[derive(Debug)]
pub struct MergedResult {
    pub output: AudioBuffer,
    pub plan: TransitionPlan,
    pub analysis_a: TrackAnalysis,
    pub analysis_b: TrackAnalysis,
    pub mastering: MasteringReport,
}

/// Merge two decoded tracks into one mastered mix.
pub fn merge_buffers(
    mut a: AudioBuffer,
    mut b: AudioBuffer,
    options: &MergeOptions,
) -> Result<MergedResult> {
    if a.is_empty() || b.is_empty() {
        return Err(MixError::InvalidAudio(
            "cannot merge an empty track".to_string(),
        ));
    }
    if a.sample_rate == 0 || b.sample_rate == 0 {
        return Err(MixError::InvalidAudio("zero sample rate".to_string()));
    }
    if b.sample_rate != a.sample_rate {
        tracing::warn!(
            "Sample rate mismatch ({} vs {}), rendering at track A's rate",
            a.sample_rate,
            b.sample_rate
        );
    }

    // Analyses are independent; run them side by side
    let (analysis_a, analysis_b) = rayon::join(|| analyze_track(&a), || analyze_track(&b));

    for (name, analysis) in [("A", &analysis_a), ("B", &analysis_b)] {
        if !analysis.bpm.is_finite() || analysis.bpm <= 0.0 {
            return Err(MixError::InvalidAnalysis(format!(
                "track {} produced BPM {}",
                name, analysis.bpm
            )));
        }
    }

    let mut plan = plan_transition(&analysis_a, &analysis_b, options.mode);
    if let Some(override_) = options.plan_override.clone() {
        plan = override_.apply(plan);
    }
    plan.start_bar_a = plan.start_bar_a.min(analysis_a.bars() - 1);

    tracing::debug!(
        "Plan: {:?}, {} bars from bar {} of A, {} fx",
        plan.style,
        plan.length_bars,
        plan.start_bar_a,
        plan.fx.len()
    );

    let sr = a.sample_rate;
    let beat_a = 60.0 / analysis_a.bpm;
    let transition_start_sec = plan.start_bar_a as f64 * 4.0 * beat_a;

    apply_fx(
        &plan.fx,
        &mut a,
        &mut b,
        transition_start_sec,
        beat_a,
        analysis_b.bpm,
        options.noise_seed,
    );

    let overlap_start = ((transition_start_sec * sr as f64) as usize).min(a.frames());

    if plan.style == TransitionStyle::EqMorph {
        let morph_len = ((plan.length_bars as f64 * 4.0 * beat_a * sr as f64) as usize)
            .min(a.frames() - overlap_start)
            .min(b.frames());
        fx::eq_morph(&mut a, overlap_start, &mut b, morph_len);
    }

    // Correlation over the pre-fade overlap decides bass management later
    let overlap_len = (a.frames() - overlap_start).min(b.frames());
    let correlation = overlap_phase_correlation(&a, overlap_start, &b, overlap_len);

    let crossfade_samples = ((options.crossfade_seconds.max(0.0) * sr as f64) as usize)
        .min(a.frames() - overlap_start)
        .min(b.frames());

    let mut output = splice(&a, &b, overlap_start, crossfade_samples, plan.style);

    let mastering = master(
        &mut output,
        &MasteringConfig {
            target_lufs: options.target_lufs,
            true_peak_ceiling_db: options.true_peak_ceiling_db,
        },
        correlation,
        plan.style == TransitionStyle::BassSwap,
    );

    Ok(MergedResult {
        output,
        plan,
        analysis_a,
        analysis_b,
        mastering,
    })
}

/// Apply planned effects in plan order. Effect times resolve against A's
/// tempo; the stutter lands on B's head and follows B's own tempo for its
/// slice rhythm. Per-effect failures are logged and skipped.
fn apply_fx(
    events: &[FxEvent],
    a: &mut AudioBuffer,
    b: &mut AudioBuffer,
    transition_start_sec: f64,
    beat_a: f64,
    bpm_b: f64,
    noise_seed: u64,
) {
    for (index, event) in events.iter().enumerate() {
        let fx_time = transition_start_sec + event.at_beat * beat_a;
        if !fx_time.is_finite() || fx_time < 0.0 {
            tracing::warn!(
                "Skipping {:?} at beat {}: resolves to unusable time {}",
                event.kind,
                event.at_beat,
                fx_time
            );
            continue;
        }

        match event.kind {
            FxKind::Sweep => {
                let duration = event.param("duration").unwrap_or(1.0);
                fx::noise_sweep(a, fx_time, duration, noise_seed.wrapping_add(index as u64));
            }
            FxKind::ReverseVerb => {
                let duration = event.param("duration").unwrap_or(2.0);
                fx::reverse_reverb(a, fx_time, duration);
            }
            FxKind::TapeStop => {
                let duration = event.param("duration").unwrap_or(1.0);
                fx::tape_stop(a, fx_time, duration);
            }
            FxKind::Stutter => {
                let division = event.param("division").unwrap_or(8.0) as usize;
                let bars = event.param("bars").unwrap_or(1.0);
                fx::stutter(b, 0.0, bpm_b, division, bars);
            }
        }
    }
}

/// Assemble `A[0..overlap_start] ++ crossfade ++ rest of B` with the
/// style's gain curves. Output channel count is the max of the inputs;
/// missing channels pull from the nearest available one.
fn splice(
    a: &AudioBuffer,
    b: &AudioBuffer,
    overlap_start: usize,
    crossfade_samples: usize,
    style: TransitionStyle,
) -> AudioBuffer {
    let channels = a.channel_count().max(b.channel_count());
    let out_len = overlap_start + b.frames();
    let mut output = AudioBuffer::silent(a.sample_rate, channels, out_len);

    for c in 0..channels {
        let ca = a.channel_or_last(c);
        let cb = b.channel_or_last(c);
        let out = &mut output.channels[c];

        out[..overlap_start].copy_from_slice(&ca[..overlap_start]);

        for i in 0..crossfade_samples {
            let x = i as f32 / crossfade_samples as f32;
            let (gain_a, gain_b) = crossfade_gains(style, x);
            out[overlap_start + i] = ca[overlap_start + i] * gain_a + cb[i] * gain_b;
        }

        for i in crossfade_samples..b.frames() {
            out[overlap_start + i] = cb[i];
        }
    }

    output
}

/// Gain pair at crossfade progress `x` in [0, 1].
///
/// The hard cut uses a smoothstep S-curve (gains sum to 1), the vocal-aware
/// blend is linear, everything else is equal-power.
pub fn crossfade_gains(style: TransitionStyle, x: f32) -> (f32, f32) {
    match style {
        TransitionStyle::HardDownbeat => {
            let s = x * x * (3.0 - 2.0 * x);
            (1.0 - s, s)
        }
        TransitionStyle::VocalAware => (1.0 - x, x),
        _ => ((PI * x / 2.0).cos(), (PI * x / 2.0).sin()),
    }
}
