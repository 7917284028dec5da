use automix_dsp::beatgrid::{find_downbeats, group_phrases, refine_kicks};
use automix_dsp::energy::rms_envelope;
use automix_dsp::key::detect_key;
use automix_dsp::onset::OnsetDetector;
use automix_dsp::tempo::estimate_tempo;
use automix_dsp::vocal::vocal_likelihood;
use automix_dsp::AudioBuffer;

use crate::models::summary::{PhraseSpan, TrackAnalysis};

/// Analyze one track into the summary the planner consumes.
///
/// Total by design: pathological input degrades to the synthetic fallback
/// summary instead of failing, so the pipeline only rejects at its input
/// and output boundaries.
pub fn analyze_track(buffer: &AudioBuffer) -> TrackAnalysis {
    let sample_rate = buffer.sample_rate;
    let duration_sec = buffer.duration_sec();

    let mono = buffer.mono_mix();
    if mono.is_empty() || sample_rate == 0 {
        tracing::warn!("Degenerate input, using fallback analysis");
        return TrackAnalysis::fallback(sample_rate, duration_sec);
    }

    tracing::debug!(
        "Analyzing track: {} frames at {} Hz",
        mono.len(),
        sample_rate
    );

    // Rhythm: onsets -> tempo -> bar structure
    let beat_times = OnsetDetector::new(sample_rate).detect(&mono);
    let tempo = estimate_tempo(&beat_times);
    let downbeat_indices = find_downbeats(&beat_times, tempo.bpm);
    let phrase_spans: Vec<PhraseSpan> = group_phrases(&downbeat_indices)
        .into_iter()
        .map(|(downbeat_index, length_beats)| PhraseSpan {
            downbeat_index,
            length_beats,
        })
        .collect();
    let kick_times = refine_kicks(&mono, sample_rate, &beat_times);

    // Tonality and texture
    let key = detect_key(&mono, sample_rate);
    let energy_curve = rms_envelope(&mono, sample_rate);
    let vocal = vocal_likelihood(&mono, sample_rate);

    let analysis = TrackAnalysis {
        bpm: tempo.bpm,
        bpm_alt: tempo.bpm_alt,
        bpm_confidence: tempo.confidence,
        camelot: key.camelot,
        key_semitone: key.semitone,
        key_confidence: key.confidence,
        beat_times,
        downbeat_indices,
        phrase_spans,
        energy_curve,
        vocal_likelihood: vocal,
        kick_times,
        duration_sec,
        sample_rate,
    };

    if !analysis.is_well_formed() {
        tracing::warn!("Analysis produced out-of-range values, using fallback");
        return TrackAnalysis::fallback(sample_rate, duration_sec);
    }

    tracing::debug!(
        "Analysis: {:.1} BPM (conf {:.2}), key {} (conf {:.2}), {} beats, {} bars",
        analysis.bpm,
        analysis.bpm_confidence,
        analysis.camelot,
        analysis.key_confidence,
        analysis.beat_times.len(),
        analysis.downbeat_indices.len(),
    );

    analysis
}
