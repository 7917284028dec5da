use serde::{Deserialize, Serialize};

/// A contiguous musical span quantized to 16 beats, anchored at a downbeat.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhraseSpan {
    /// Index into `beat_times` of the phrase's first downbeat.
    pub downbeat_index: usize,
    pub length_beats: u32,
}

/// Per-track analysis summary
///
/// Everything the transition planner needs to know about one track:
/// - Tempo: BPM with half/double candidate and confidence
/// - Key: Camelot code, tonic pitch class, confidence
/// - Rhythm: beat times, downbeat indices, 16-beat phrase spans, kick times
/// - Texture: smoothed RMS energy curve and vocal-band likelihood
///
/// All numeric fields are finite and confidences lie in [0, 1]; degenerate
/// input produces `fallback()` rather than an error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackAnalysis {
    pub bpm: f64,              // Estimated tempo, 60-200
    pub bpm_alt: f64,          // Half/double-time candidate
    pub bpm_confidence: f64,   // Dominant interval share (0-1)
    pub camelot: String,       // Camelot key code "1A".."12B"
    pub key_semitone: u8,      // Tonic pitch class (0-11)
    pub key_confidence: f64,   // Dominant chroma share (0-1)
    pub beat_times: Vec<f64>,  // Non-decreasing seconds
    pub downbeat_indices: Vec<usize>,
    pub phrase_spans: Vec<PhraseSpan>,
    pub energy_curve: Vec<f32>, // 20 ms RMS envelope, smoothed
    pub vocal_likelihood: Vec<f32>, // Per 4096-sample hop (0-1)
    pub kick_times: Vec<f64>,  // Beats refined to low-band maxima
    pub duration_sec: f64,
    pub sample_rate: u32,
}

impl TrackAnalysis {
    /// Synthetic summary for silent, empty or otherwise unanalyzable input:
    /// a neutral 120 BPM grid in 1A. Keeps every downstream stage total.
    pub fn fallback(sample_rate: u32, duration_sec: f64) -> Self {
        Self {
            bpm: 120.0,
            bpm_alt: 60.0,
            bpm_confidence: 0.0,
            camelot: "1A".to_string(),
            key_semitone: 11,
            key_confidence: 0.0,
            beat_times: vec![0.0, 0.5, 1.0, 1.5],
            downbeat_indices: vec![0],
            phrase_spans: Vec::new(),
            energy_curve: vec![0.5],
            vocal_likelihood: Vec::new(),
            kick_times: Vec::new(),
            duration_sec,
            sample_rate,
        }
    }

    /// Number of bars, i.e. detected downbeats. At least 1 so bar math never
    /// divides by zero.
    pub fn bars(&self) -> usize {
        self.downbeat_indices.len().max(1)
    }

    /// Mean vocal likelihood, 0.0 when no frames were analyzed.
    pub fn avg_vocal(&self) -> f32 {
        if self.vocal_likelihood.is_empty() {
            return 0.0;
        }
        self.vocal_likelihood.iter().sum::<f32>() / self.vocal_likelihood.len() as f32
    }

    /// True when every scalar and series value is finite and confidences and
    /// indices are in range.
    pub fn is_well_formed(&self) -> bool {
        let scalars_ok = self.bpm.is_finite()
            && self.bpm > 0.0
            && self.bpm_alt.is_finite()
            && (0.0..=1.0).contains(&self.bpm_confidence)
            && (0.0..=1.0).contains(&self.key_confidence)
            && self.key_semitone < 12
            && self.duration_sec.is_finite();

        let series_ok = self.beat_times.iter().all(|t| t.is_finite())
            && self.energy_curve.iter().all(|v| v.is_finite())
            && self.vocal_likelihood.iter().all(|v| v.is_finite())
            && self.kick_times.iter().all(|t| t.is_finite());

        let indices_ok = self
            .downbeat_indices
            .iter()
            .all(|&i| i < self.beat_times.len())
            && self
                .phrase_spans
                .iter()
                .all(|p| p.downbeat_index < self.beat_times.len());

        scalars_ok && series_ok && indices_ok
    }
}
