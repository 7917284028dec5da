//! Transition effects
//!
//! Time-domain effects dropped around the mix seam: noise sweep, reverse
//! reverb, tape stop, stutter and the EQ morph blend. Every operation
//! validates its parameters and leaves the buffer unchanged when they are
//! non-finite or non-positive; the renderer logs and moves on.

use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};

use crate::buffer::AudioBuffer;

/// Peak amplitude of the sweep noise before the progress ramp.
const SWEEP_NOISE_LEVEL: f32 = 0.3;
/// Wet level of the reverse-reverb tail.
const REVERSE_VERB_LEVEL: f32 = 0.4;

fn seconds_to_samples(sec: f64, sample_rate: u32) -> usize {
    (sec * sample_rate as f64) as usize
}

fn valid_span(start_sec: f64, duration_sec: f64) -> bool {
    start_sec.is_finite() && start_sec >= 0.0 && duration_sec.is_finite() && duration_sec > 0.0
}

/// Add a rising white-noise sweep over `[start, start + duration)`.
///
/// Noise is uniform in [-0.3, 0.3], scaled linearly by progress through the
/// sweep. The PRNG is explicitly seeded so renders reproduce bit-for-bit.
pub fn noise_sweep(buffer: &mut AudioBuffer, start_sec: f64, duration_sec: f64, seed: u64) {
    if !valid_span(start_sec, duration_sec) {
        return;
    }

    let start = seconds_to_samples(start_sec, buffer.sample_rate);
    let duration = seconds_to_samples(duration_sec, buffer.sample_rate);
    if duration == 0 {
        return;
    }

    let mut rng = SmallRng::seed_from_u64(seed);
    for ch in buffer.channels.iter_mut() {
        for i in 0..duration {
            let idx = start + i;
            if idx >= ch.len() {
                break;
            }
            let progress = i as f32 / duration as f32;
            ch[idx] += rng.gen_range(-SWEEP_NOISE_LEVEL..SWEEP_NOISE_LEVEL) * progress;
        }
    }
}

/// Fold a reversed copy of `[start, start + duration)` back over itself,
/// fading the tail in as the source fades out.
pub fn reverse_reverb(buffer: &mut AudioBuffer, start_sec: f64, duration_sec: f64) {
    if !valid_span(start_sec, duration_sec) {
        return;
    }

    let start = seconds_to_samples(start_sec, buffer.sample_rate);
    let duration = seconds_to_samples(duration_sec, buffer.sample_rate);
    if duration == 0 {
        return;
    }

    for ch in buffer.channels.iter_mut() {
        if start >= ch.len() {
            continue;
        }
        // The mirror read counts down from one past the window, so the
        // snapshot includes start + duration itself (clamped at the end).
        let end = (start + duration + 1).min(ch.len());
        let region: Vec<f32> = ch[start..end].to_vec();

        for i in 0..duration {
            let dst = start + i;
            if dst >= ch.len() {
                break;
            }
            let src_off = duration - i;
            if src_off >= region.len() {
                continue;
            }
            let fade = 1.0 - i as f32 / duration as f32;
            ch[dst] += region[src_off] * fade * REVERSE_VERB_LEVEL;
        }
    }
}

/// Quadratic tape-stop into `stop_sec`: playback slows as `1 - p^2` across
/// the final `duration_sec`, with a level fade of `1 - 0.5*p`, and silence
/// beyond the stop point.
pub fn tape_stop(buffer: &mut AudioBuffer, stop_sec: f64, duration_sec: f64) {
    if !stop_sec.is_finite() || stop_sec < 0.0 || !duration_sec.is_finite() || duration_sec <= 0.0 {
        return;
    }

    let sr = buffer.sample_rate;
    let stop = seconds_to_samples(stop_sec, sr);
    let duration = seconds_to_samples(duration_sec, sr).min(stop);
    if duration == 0 {
        return;
    }
    let region_start = stop - duration;

    for ch in buffer.channels.iter_mut() {
        if region_start >= ch.len() {
            continue;
        }
        let region_end = stop.min(ch.len());
        let region: Vec<f32> = ch[region_start..region_end].to_vec();

        for offset in 0..duration {
            let dst = region_start + offset;
            if dst >= ch.len() {
                break;
            }
            let p = offset as f64 / duration as f64;
            let speed = 1.0 - p * p;
            let read = (offset as f64 * speed) as usize;
            let sample = region.get(read).copied().unwrap_or(0.0);
            ch[dst] = sample * (1.0 - 0.5 * p as f32);
        }

        // Dead tape after the stop point
        for s in ch.iter_mut().skip(stop) {
            *s = 0.0;
        }
    }
}

/// Rhythmic stutter: the span of `bars` bars from `start_sec` is cut into
/// `division` equal slices and every slice replays the first. No-op unless
/// `bpm` is positive and finite.
pub fn stutter(buffer: &mut AudioBuffer, start_sec: f64, bpm: f64, division: usize, bars: f64) {
    if !bpm.is_finite() || bpm <= 0.0 || division == 0 {
        return;
    }
    if !bars.is_finite() || bars <= 0.0 {
        return;
    }
    if !start_sec.is_finite() || start_sec < 0.0 {
        return;
    }

    let span_sec = bars * 4.0 * 60.0 / bpm;
    let start = seconds_to_samples(start_sec, buffer.sample_rate);
    let span = seconds_to_samples(span_sec, buffer.sample_rate);
    let slice_len = span / division;
    if slice_len == 0 {
        return;
    }

    for ch in buffer.channels.iter_mut() {
        if start + slice_len > ch.len() {
            continue;
        }
        let first: Vec<f32> = ch[start..start + slice_len].to_vec();

        for slice in 1..division {
            let dst_start = start + slice * slice_len;
            for (i, &s) in first.iter().enumerate() {
                let dst = dst_start + i;
                if dst >= ch.len() {
                    break;
                }
                ch[dst] = s;
            }
        }
    }
}

/// Amplitude-only EQ morph across the overlap: A ducks to 30% as B rises
/// from 30% to full, monotone in both directions.
pub fn eq_morph(a: &mut AudioBuffer, a_start: usize, b: &mut AudioBuffer, duration: usize) {
    if duration == 0 {
        return;
    }

    for ch in a.channels.iter_mut() {
        for i in 0..duration {
            let idx = a_start + i;
            if idx >= ch.len() {
                break;
            }
            let progress = i as f32 / duration as f32;
            ch[idx] *= 1.0 - 0.7 * progress;
        }
    }

    for ch in b.channels.iter_mut() {
        for i in 0..duration.min(ch.len()) {
            let progress = i as f32 / duration as f32;
            ch[i] *= 0.3 + 0.7 * progress;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ramp_buffer(frames: usize) -> AudioBuffer {
        AudioBuffer::from_mono(1000, (0..frames).map(|i| i as f32 / frames as f32).collect())
    }

    #[test]
    fn test_invalid_params_leave_buffer_unchanged() {
        let mut buf = ramp_buffer(1000);
        let before = buf.channels[0].clone();

        noise_sweep(&mut buf, f64::NAN, 1.0, 7);
        noise_sweep(&mut buf, 0.0, -1.0, 7);
        reverse_reverb(&mut buf, 0.1, f64::INFINITY);
        tape_stop(&mut buf, -0.5, 0.2);
        stutter(&mut buf, 0.0, 0.0, 8, 1.0);
        stutter(&mut buf, 0.0, 120.0, 0, 1.0);

        assert_eq!(buf.channels[0], before);
    }

    #[test]
    fn test_noise_sweep_is_seeded() {
        let mut one = AudioBuffer::silent(1000, 1, 1000);
        let mut two = AudioBuffer::silent(1000, 1, 1000);
        noise_sweep(&mut one, 0.0, 0.5, 42);
        noise_sweep(&mut two, 0.0, 0.5, 42);
        assert_eq!(one.channels[0], two.channels[0]);

        let mut other = AudioBuffer::silent(1000, 1, 1000);
        noise_sweep(&mut other, 0.0, 0.5, 43);
        assert_ne!(one.channels[0], other.channels[0]);
    }

    #[test]
    fn test_noise_sweep_ramps_up() {
        let mut buf = AudioBuffer::silent(1000, 1, 1000);
        noise_sweep(&mut buf, 0.0, 1.0, 9);
        let ch = &buf.channels[0];

        // First sample has zero progress; later noise stays inside the
        // progress-scaled bound
        assert_eq!(ch[0], 0.0);
        for (i, &s) in ch.iter().enumerate() {
            let bound = SWEEP_NOISE_LEVEL * (i as f32 / 1000.0) + 1e-6;
            assert!(s.abs() <= bound);
        }
    }

    #[test]
    fn test_reverse_reverb_mirrors_window_end_onto_start() {
        let mut buf = AudioBuffer::silent(1000, 1, 1000);
        // The sample just past the window folds onto the window start at
        // full fade
        buf.channels[0][500] = 1.0;
        reverse_reverb(&mut buf, 0.0, 0.5);
        assert!((buf.channels[0][0] - REVERSE_VERB_LEVEL).abs() < 1e-6);
        // The source sample itself is outside the write range
        assert_eq!(buf.channels[0][500], 1.0);
    }

    #[test]
    fn test_reverse_reverb_adds_tail_energy() {
        let mut buf = AudioBuffer::silent(1000, 1, 1000);
        // One loud sample near the end of the effect region
        buf.channels[0][800] = 1.0;
        reverse_reverb(&mut buf, 0.0, 0.9);

        // The mirrored copy lands early in the region
        let early_energy: f32 = buf.channels[0][..400].iter().map(|s| s.abs()).sum();
        assert!(early_energy > 0.0);
    }

    #[test]
    fn test_tape_stop_silences_past_stop() {
        let mut buf = ramp_buffer(1000);
        tape_stop(&mut buf, 0.5, 0.3);
        assert!(buf.channels[0][500..].iter().all(|&s| s == 0.0));
        // Pre-region samples untouched
        assert!(buf.channels[0][..200]
            .iter()
            .enumerate()
            .all(|(i, &s)| (s - i as f32 / 1000.0).abs() < 1e-6));
    }

    #[test]
    fn test_tape_stop_fades() {
        let mut buf = AudioBuffer::from_mono(1000, vec![0.8; 1000]);
        tape_stop(&mut buf, 1.0, 0.5);
        let ch = &buf.channels[0];
        // End of the slowdown approaches the half-level fade
        assert!(ch[990].abs() <= 0.8 * 0.6);
        assert!(ch[990].abs() >= 0.0);
    }

    #[test]
    fn test_stutter_repeats_first_slice() {
        let mut buf = ramp_buffer(2100);
        // 120 BPM: one bar is 2 s = 2000 samples at 1 kHz; 8 slices of 250
        stutter(&mut buf, 0.0, 120.0, 8, 1.0);
        let ch = &buf.channels[0];
        for slice in 1..8 {
            for i in 0..250 {
                assert_eq!(ch[slice * 250 + i], ch[i]);
            }
        }
    }

    #[test]
    fn test_eq_morph_endpoints() {
        let mut a = AudioBuffer::from_mono(1000, vec![1.0; 1000]);
        let mut b = AudioBuffer::from_mono(1000, vec![1.0; 1000]);
        eq_morph(&mut a, 0, &mut b, 1000);

        assert!((a.channels[0][0] - 1.0).abs() < 1e-6);
        assert!((a.channels[0][999] - 0.3007).abs() < 1e-3);
        assert!((b.channels[0][0] - 0.3).abs() < 1e-6);
        assert!((b.channels[0][999] - 0.9993).abs() < 1e-3);

        // Monotone in both directions
        for w in a.channels[0].windows(2) {
            assert!(w[1] <= w[0] + 1e-6);
        }
        for w in b.channels[0].windows(2) {
            assert!(w[1] >= w[0] - 1e-6);
        }
    }
}
