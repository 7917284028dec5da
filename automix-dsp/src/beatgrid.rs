//! Bar structure on top of a detected beat list
//!
//! Downbeats are walked assuming 4/4: a beat close enough to the expected
//! bar position confirms the grid, anything past it resynchronizes the grid
//! to the bar boundary floored at that beat. Phrases are runs of four bars.
//! Kick times refine beats to the strongest low-band sub-frame nearby.

use crate::spectrum::magnitude_spectrum;

/// Sub-frame length used by the kick scan.
const KICK_FRAME: usize = 512;
/// DFT bins summed as "low band" in the kick scan.
const KICK_LOW_BINS: usize = 20;
/// Kick search radius around each beat, in seconds.
const KICK_RADIUS_SEC: f64 = 0.050;

/// Indices into `beat_times` that open a bar, assuming 4/4.
///
/// Beat 0 is always the first downbeat. From there the walk expects a
/// downbeat one bar later; a beat within half a beat of that position
/// confirms it, and a beat overshooting the window resyncs the grid to the
/// floored bar boundary at its time.
pub fn find_downbeats(beat_times: &[f64], bpm: f64) -> Vec<usize> {
    if beat_times.is_empty() || !bpm.is_finite() || bpm <= 0.0 {
        return Vec::new();
    }

    let beat_len = 60.0 / bpm;
    let bar_len = 4.0 * beat_len;
    let tolerance = 0.5 * beat_len;
    let origin = beat_times[0];

    let mut downbeats = vec![0];
    let mut expected = origin + bar_len;

    for (i, &t) in beat_times.iter().enumerate().skip(1) {
        if (t - expected).abs() <= tolerance {
            downbeats.push(i);
            expected = t + bar_len;
        } else if t > expected + tolerance {
            // Lost the grid: floor this beat to the bar boundary and restart
            let bars_past = ((t - origin) / bar_len).floor();
            downbeats.push(i);
            expected = origin + (bars_past + 1.0) * bar_len;
        }
    }

    downbeats
}

/// Group downbeats into 16-beat phrases: each run of four bars becomes one
/// span `(index_of_first_downbeat, 16)`.
pub fn group_phrases(downbeat_indices: &[usize]) -> Vec<(usize, u32)> {
    downbeat_indices
        .chunks_exact(4)
        .map(|run| (run[0], 16))
        .collect()
}

/// Refine beats to kick onsets: within +/-50 ms of each beat, report the
/// start time of the 512-sample sub-frame with the largest summed low-band
/// magnitude. Beats whose window holds no full sub-frame are dropped, so the
/// result is a subset of the beat list.
pub fn refine_kicks(audio: &[f64], sample_rate: u32, beat_times: &[f64]) -> Vec<f64> {
    if audio.is_empty() || sample_rate == 0 {
        return Vec::new();
    }

    let sr = sample_rate as f64;
    let radius = (KICK_RADIUS_SEC * sr) as usize;
    let mut kicks = Vec::new();

    for &beat in beat_times {
        if !beat.is_finite() || beat < 0.0 {
            continue;
        }
        let center = (beat * sr) as usize;
        let start = center.saturating_sub(radius);
        let end = (center + radius).min(audio.len());

        let mut best: Option<(f64, usize)> = None;
        let mut pos = start;
        while pos + KICK_FRAME <= end {
            let mag = magnitude_spectrum(&audio[pos..pos + KICK_FRAME]);
            let low: f64 = mag.iter().take(KICK_LOW_BINS).sum();
            if best.map_or(true, |(b, _)| low > b) {
                best = Some((low, pos));
            }
            pos += KICK_FRAME;
        }

        if let Some((_, best_pos)) = best {
            kicks.push(best_pos as f64 / sr);
        }
    }

    kicks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_downbeats_on_clean_grid() {
        // 120 BPM grid: beats every 0.5 s, bars every 2 s
        let beats: Vec<f64> = (0..16).map(|i| i as f64 * 0.5).collect();
        let downbeats = find_downbeats(&beats, 120.0);
        assert_eq!(downbeats, vec![0, 4, 8, 12]);
    }

    #[test]
    fn test_downbeats_resync_after_gap() {
        // Grid with a dropped bar: walk resyncs at the late beat
        let mut beats: Vec<f64> = (0..4).map(|i| i as f64 * 0.5).collect();
        beats.extend((0..4).map(|i| 6.0 + i as f64 * 0.5));
        let downbeats = find_downbeats(&beats, 120.0);
        assert!(downbeats.contains(&0));
        assert!(downbeats.contains(&4));
    }

    #[test]
    fn test_downbeats_guard_bad_bpm() {
        assert!(find_downbeats(&[0.0, 0.5], f64::NAN).is_empty());
        assert!(find_downbeats(&[0.0, 0.5], 0.0).is_empty());
        assert!(find_downbeats(&[], 120.0).is_empty());
    }

    #[test]
    fn test_phrases_group_in_fours() {
        let downbeats = vec![0, 4, 8, 12, 16, 20, 24, 28, 32];
        let phrases = group_phrases(&downbeats);
        assert_eq!(phrases, vec![(0, 16), (16, 16)]);
    }

    #[test]
    fn test_phrases_empty_for_short_grids() {
        assert!(group_phrases(&[0, 4, 8]).is_empty());
    }

    #[test]
    fn test_kicks_snap_to_low_band_burst() {
        let sr = 44100u32;
        let mut audio = vec![0.0; sr as usize];
        // Low-frequency burst slightly after the nominal beat at 0.5 s
        let burst_at = (0.52 * sr as f64) as usize;
        for i in 0..KICK_FRAME {
            audio[burst_at + i] =
                (2.0 * std::f64::consts::PI * 60.0 * i as f64 / sr as f64).sin();
        }

        let kicks = refine_kicks(&audio, sr, &[0.5]);
        assert_eq!(kicks.len(), 1);
        assert!((kicks[0] - 0.5).abs() <= KICK_RADIUS_SEC + KICK_FRAME as f64 / sr as f64);
    }

    #[test]
    fn test_kicks_subset_of_beats() {
        let audio = vec![0.0; 4410];
        // Beat too close to the end for a full sub-frame window is dropped
        let kicks = refine_kicks(&audio, 44100, &[0.05, 0.0999]);
        assert!(kicks.len() <= 2);
    }
}
