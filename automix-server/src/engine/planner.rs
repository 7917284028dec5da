//! Transition planning
//!
//! A pure decision procedure over the two analysis summaries and the mix
//! mode. Identical inputs always produce byte-identical plans, so the FX
//! parameter maps are ordered and nothing here touches a clock or RNG.

use automix_dsp::key::{keys_compatible, semitone_delta, wheel_distance};

use crate::models::plan::{
    FxEvent, FxKind, MixMode, PitchOp, TempoOp, TrackRef, TransitionPlan, TransitionStyle,
};
use crate::models::summary::TrackAnalysis;

/// Vocal likelihood above which a track counts as vocal-heavy.
const VOCAL_THRESHOLD: f32 = 0.3;
/// Energy seam difference that counts as a mismatch.
const ENERGY_MISMATCH: f32 = 0.3;
/// Tempo deltas below this blend cleanly without correction.
const TEMPO_CLOSE: f64 = 0.02;
/// Tempo deltas above this cannot be beatmatched musically.
const TEMPO_FAR: f64 = 0.06;

/// Decide how to get from track A into track B.
pub fn plan_transition(
    a: &TrackAnalysis,
    b: &TrackAnalysis,
    mode: MixMode,
) -> TransitionPlan {
    let tempo_delta = if a.bpm > 0.0 {
        (a.bpm - b.bpm).abs() / a.bpm
    } else {
        0.0
    };
    let compatible = keys_compatible(&a.camelot, &b.camelot);

    let avg_vocal_a = a.avg_vocal();
    let avg_vocal_b = b.avg_vocal();
    let both_vocal = avg_vocal_a.min(avg_vocal_b) > VOCAL_THRESHOLD;

    let energy_out = a.energy_curve.last().copied().unwrap_or(0.5);
    let energy_in = b.energy_curve.first().copied().unwrap_or(0.5);
    let energy_mismatch = (energy_out - energy_in).abs() > ENERGY_MISMATCH;
    let b_louder = energy_in > energy_out;

    // First matching rule wins
    let (style, length_bars) = if both_vocal {
        (TransitionStyle::VocalAware, 4)
    } else if !compatible && tempo_delta > TEMPO_FAR {
        (TransitionStyle::HardDownbeat, 4)
    } else if compatible && tempo_delta < TEMPO_CLOSE {
        let bars = if mode == MixMode::ClubSmooth { 16 } else { 8 };
        (TransitionStyle::EqMorph, bars)
    } else if compatible && tempo_delta < TEMPO_FAR {
        (TransitionStyle::BassSwap, 8)
    } else if mode == MixMode::Festival {
        (TransitionStyle::StutterEntry, 4)
    } else {
        (TransitionStyle::HardDownbeat, 4)
    };

    let mut fx = Vec::new();
    if style == TransitionStyle::HardDownbeat {
        fx.push(FxEvent::new(FxKind::Sweep, -2.0, &[("duration", 1.0)]));
    }
    if style == TransitionStyle::StutterEntry {
        fx.push(FxEvent::new(
            FxKind::Stutter,
            -4.0,
            &[("division", 8.0), ("bars", 1.0)],
        ));
    }
    if energy_mismatch && b_louder && mode == MixMode::Festival {
        fx.push(FxEvent::new(
            FxKind::ReverseVerb,
            -4.0,
            &[("duration", 2.0)],
        ));
    }

    // Mid-size tempo gaps: nudge both tracks toward the mean BPM
    let mut tempo_ops = Vec::new();
    if tempo_delta > TEMPO_CLOSE && tempo_delta <= TEMPO_FAR {
        let target = (a.bpm + b.bpm) / 2.0;
        tempo_ops.push(TempoOp {
            track: TrackRef::A,
            stretch_percent: stretch_percent(a.bpm, target),
        });
        tempo_ops.push(TempoOp {
            track: TrackRef::B,
            stretch_percent: stretch_percent(b.bpm, target),
        });
    }

    // One wheel step is close enough to correct with a small pitch shift
    let mut pitch_ops = Vec::new();
    if !compatible && wheel_distance(&a.camelot, &b.camelot) <= 1 {
        pitch_ops.push(PitchOp {
            track: TrackRef::B,
            semitones: semitone_delta(b.key_semitone, a.key_semitone),
            formant_preserve: true,
        });
    }

    TransitionPlan {
        style,
        start_bar_a: (0.75 * a.bars() as f64).floor() as usize,
        start_bar_b: 0,
        length_bars,
        tempo_ops,
        pitch_ops,
        fx,
    }
}

fn stretch_percent(from_bpm: f64, to_bpm: f64) -> f64 {
    if from_bpm <= 0.0 {
        return 0.0;
    }
    (to_bpm / from_bpm - 1.0) * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::summary::TrackAnalysis;

    fn summary(bpm: f64, camelot: &str, semitone: u8) -> TrackAnalysis {
        TrackAnalysis {
            bpm,
            bpm_alt: if bpm > 100.0 { bpm / 2.0 } else { bpm * 2.0 },
            bpm_confidence: 0.9,
            camelot: camelot.to_string(),
            key_semitone: semitone,
            key_confidence: 0.8,
            beat_times: (0..64).map(|i| i as f64 * 60.0 / bpm).collect(),
            downbeat_indices: (0..16).map(|i| i * 4).collect(),
            phrase_spans: Vec::new(),
            energy_curve: vec![0.5; 100],
            vocal_likelihood: vec![0.1; 10],
            kick_times: Vec::new(),
            duration_sec: 64.0 * 60.0 / bpm,
            sample_rate: 44100,
        }
    }

    #[test]
    fn test_planner_is_pure() {
        let a = summary(120.0, "8B", 3);
        let b = summary(128.0, "9B", 10);
        let one = plan_transition(&a, &b, MixMode::Festival);
        let two = plan_transition(&a, &b, MixMode::Festival);
        assert_eq!(
            serde_json::to_string(&one).unwrap(),
            serde_json::to_string(&two).unwrap()
        );
    }

    #[test]
    fn test_both_vocal_wins_first() {
        let mut a = summary(120.0, "8B", 3);
        let mut b = summary(170.0, "3A", 1);
        a.vocal_likelihood = vec![0.6; 10];
        b.vocal_likelihood = vec![0.5; 10];

        let plan = plan_transition(&a, &b, MixMode::Neutral);
        assert_eq!(plan.style, TransitionStyle::VocalAware);
        assert_eq!(plan.length_bars, 4);
    }

    #[test]
    fn test_compatible_fast_gap_is_hard_downbeat() {
        // 120 vs 128: delta = 8/120 = 0.067, past the beatmatch limit. Keys
        // are compatible so the final rule fires, still with the pre-sweep.
        let a = summary(120.0, "8B", 3);
        let b = summary(128.0, "9B", 10);

        let plan = plan_transition(&a, &b, MixMode::Neutral);
        assert_eq!(plan.style, TransitionStyle::HardDownbeat);
        assert_eq!(plan.length_bars, 4);
        assert_eq!(plan.fx.len(), 1);
        let sweep = &plan.fx[0];
        assert_eq!(sweep.kind, FxKind::Sweep);
        assert_eq!(sweep.at_beat, -2.0);
        assert_eq!(sweep.param("duration"), Some(1.0));
    }

    #[test]
    fn test_same_track_is_eq_morph() {
        let a = summary(124.0, "8B", 3);
        let plan = plan_transition(&a, &a, MixMode::Neutral);
        assert_eq!(plan.style, TransitionStyle::EqMorph);
        assert_eq!(plan.length_bars, 8);
        assert!(plan.tempo_ops.is_empty());
        assert!(plan.pitch_ops.is_empty());

        let plan = plan_transition(&a, &a, MixMode::ClubSmooth);
        assert_eq!(plan.length_bars, 16);
    }

    #[test]
    fn test_moderate_gap_is_bass_swap_with_tempo_ops() {
        // 120 vs 125: delta ~0.0417, between close and far
        let a = summary(120.0, "8B", 3);
        let b = summary(125.0, "8B", 3);

        let plan = plan_transition(&a, &b, MixMode::Neutral);
        assert_eq!(plan.style, TransitionStyle::BassSwap);
        assert_eq!(plan.length_bars, 8);
        assert_eq!(plan.tempo_ops.len(), 2);

        // Both nudge toward 122.5
        let up = plan.tempo_ops[0].stretch_percent;
        let down = plan.tempo_ops[1].stretch_percent;
        assert!(up > 0.0 && down < 0.0);
        assert!((up - 2.083).abs() < 0.01);
    }

    #[test]
    fn test_incompatible_distant_keys_skip_pitch_shift() {
        // 1A vs 7A: wheel distance 6, no pitch op
        let a = summary(120.0, "1A", 11);
        let b = summary(140.0, "7A", 5);

        let plan = plan_transition(&a, &b, MixMode::Neutral);
        assert_eq!(plan.style, TransitionStyle::HardDownbeat);
        assert!(plan.pitch_ops.is_empty());
        assert!(plan.fx.iter().any(|f| f.kind == FxKind::Sweep));
    }

    #[test]
    fn test_adjacent_key_requests_pitch_shift_on_b() {
        // Adjacent hours but different mode letters: incompatible, distance 1
        let a = summary(120.0, "8B", 3);
        let b = summary(128.0, "9A", 10);

        let plan = plan_transition(&a, &b, MixMode::Neutral);
        assert_eq!(plan.pitch_ops.len(), 1);
        let op = plan.pitch_ops[0];
        assert_eq!(op.track, TrackRef::B);
        assert!(op.formant_preserve);
        assert_eq!(op.semitones, semitone_delta(10, 3));
    }

    #[test]
    fn test_incompatible_gap_rules() {
        // Incompatible keys with a big gap hit the hard cut even in festival
        let mut a = summary(124.0, "1A", 11);
        let mut b = summary(136.0, "7A", 5);
        a.energy_curve = vec![0.2; 100];
        b.energy_curve = vec![0.9; 100];

        let plan = plan_transition(&a, &b, MixMode::Festival);
        assert_eq!(plan.style, TransitionStyle::HardDownbeat);

        // Clashing keys never bass-swap; a moderate gap stutters in festival
        // mode and hard-cuts otherwise
        b.bpm = 130.0;
        let plan = plan_transition(&a, &b, MixMode::Festival);
        assert_eq!(plan.style, TransitionStyle::StutterEntry);
        let plan = plan_transition(&a, &b, MixMode::Neutral);
        assert_eq!(plan.style, TransitionStyle::HardDownbeat);
    }

    #[test]
    fn test_festival_close_clashing_keys_stutter_with_verb() {
        // Close tempos but clashing keys in festival mode, B coming in louder
        let mut a = summary(124.0, "1A", 11);
        let mut b = summary(126.0, "7A", 5);
        a.energy_curve = vec![0.2; 100];
        b.energy_curve = vec![0.9; 100];

        let plan = plan_transition(&a, &b, MixMode::Festival);
        assert_eq!(plan.style, TransitionStyle::StutterEntry);
        assert!(plan.fx.iter().any(|f| f.kind == FxKind::Stutter && f.at_beat == -4.0));
        assert!(plan
            .fx
            .iter()
            .any(|f| f.kind == FxKind::ReverseVerb && f.at_beat == -4.0));
    }

    #[test]
    fn test_festival_stutter_entry_branch() {
        // Compatible keys, delta just above far: vocal off, not rule 2
        // (keys compatible), not eq_morph (delta too big), not bass_swap
        // (delta > 0.06) -> festival stutter entry
        let a = summary(120.0, "8B", 3);
        let mut b = summary(129.0, "8B", 3);
        b.energy_curve = vec![0.9; 100];
        let mut a2 = a.clone();
        a2.energy_curve = vec![0.2; 100];

        let plan = plan_transition(&a2, &b, MixMode::Festival);
        assert_eq!(plan.style, TransitionStyle::StutterEntry);
        assert_eq!(plan.length_bars, 4);

        let stutter = plan
            .fx
            .iter()
            .find(|f| f.kind == FxKind::Stutter)
            .expect("stutter fx");
        assert_eq!(stutter.at_beat, -4.0);
        assert_eq!(stutter.param("division"), Some(8.0));
        assert_eq!(stutter.param("bars"), Some(1.0));

        // Energy mismatch with B louder adds the reverse verb pre-roll
        let verb = plan
            .fx
            .iter()
            .find(|f| f.kind == FxKind::ReverseVerb)
            .expect("reverseVerb fx");
        assert_eq!(verb.at_beat, -4.0);
        assert_eq!(verb.param("duration"), Some(2.0));
    }

    #[test]
    fn test_start_bars() {
        let a = summary(120.0, "8B", 3); // 16 bars
        let plan = plan_transition(&a, &a, MixMode::Neutral);
        assert_eq!(plan.start_bar_a, 12);
        assert_eq!(plan.start_bar_b, 0);
    }
}
