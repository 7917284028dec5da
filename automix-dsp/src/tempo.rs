//! Tempo estimation from inter-beat intervals
//!
//! Each positive finite interval votes for a rounded BPM bin; the dominant
//! bin wins. Confidence is the dominant bin's share of all votes, which
//! doubles as the documented accuracy number for the estimate.

/// Lowest reported tempo.
pub const MIN_BPM: f64 = 60.0;
/// Highest reported tempo.
pub const MAX_BPM: f64 = 200.0;

const HISTOGRAM_BINS: usize = 300;

/// Tempo estimate with the half/double candidate and a confidence share.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TempoEstimate {
    pub bpm: f64,
    /// Half/double-time candidate: bpm/2 above 100 BPM, bpm*2 below.
    pub bpm_alt: f64,
    /// Dominant histogram bin share of all intervals, in [0, 1].
    pub confidence: f64,
}

impl TempoEstimate {
    /// Neutral estimate used when no usable intervals exist.
    pub fn fallback() -> Self {
        Self {
            bpm: 120.0,
            bpm_alt: 60.0,
            confidence: 0.0,
        }
    }
}

/// Estimate tempo from non-decreasing beat times in seconds.
pub fn estimate_tempo(beat_times: &[f64]) -> TempoEstimate {
    let mut histogram = [0u32; HISTOGRAM_BINS];
    let mut total = 0u32;

    for pair in beat_times.windows(2) {
        let delta = pair[1] - pair[0];
        if !delta.is_finite() || delta <= 0.0 {
            continue;
        }
        let bin = (60.0 / delta).round().clamp(1.0, 299.0) as usize;
        histogram[bin] += 1;
        total += 1;
    }

    if total == 0 {
        return TempoEstimate::fallback();
    }

    let (dominant_bin, dominant_count) = histogram
        .iter()
        .enumerate()
        .max_by_key(|&(_, &count)| count)
        .map(|(bin, &count)| (bin, count))
        .unwrap_or((120, 0));

    let bpm = (dominant_bin as f64).clamp(MIN_BPM, MAX_BPM);
    let bpm_alt = if bpm > 100.0 { bpm / 2.0 } else { bpm * 2.0 };

    TempoEstimate {
        bpm,
        bpm_alt,
        confidence: dominant_count as f64 / total as f64,
    }
}
