//! Chromagram key detection and Camelot wheel utilities
//!
//! Accumulates a 12-bin chromagram over 4096-sample hops, picks the dominant
//! pitch class, and maps it through a 24-entry Camelot table (lower twelve
//! entries major, upper twelve minor). The wheel helpers answer the harmonic
//! compatibility questions the transition planner asks.

use crate::spectrum::magnitude_spectrum;

/// Frame and hop size of the chromagram accumulation.
pub const CHROMA_HOP: usize = 4096;

const MIN_FREQ: f64 = 80.0;
const MAX_FREQ: f64 = 5000.0;

/// Camelot codes indexed by `pitch_class + 12 * minor`. Pitch classes are
/// referenced to A440 (class 0 = A, 3 = C, and so on up to 11 = G#); the
/// upper twelve entries are the minor modes.
const CAMELOT_TABLE: [&str; 24] = [
    // major: A, A#, B, C, C#, D, D#, E, F, F#, G, G#
    "11B", "6B", "1B", "8B", "3B", "10B", "5B", "12B", "7B", "2B", "9B", "4B",
    // minor
    "8A", "3A", "10A", "5A", "12A", "7A", "2A", "9A", "4A", "11A", "6A", "1A",
];

/// Detected key with its Camelot label and a confidence share.
#[derive(Debug, Clone, PartialEq)]
pub struct KeyDetection {
    /// Camelot code, "1A".."12B".
    pub camelot: String,
    /// Tonic pitch class, 0..=11, referenced to A440.
    pub semitone: u8,
    /// Dominant chroma bin share of total chroma energy, in [0, 1].
    pub confidence: f64,
}

impl KeyDetection {
    /// Key reported for silent or tonally empty input: "1A" (G# minor).
    pub fn fallback() -> Self {
        Self {
            camelot: "1A".to_string(),
            semitone: 11,
            confidence: 0.0,
        }
    }
}

/// Detect the key of a mono signal.
pub fn detect_key(audio: &[f64], sample_rate: u32) -> KeyDetection {
    if sample_rate == 0 || audio.len() < CHROMA_HOP {
        return KeyDetection::fallback();
    }

    let sr = sample_rate as f64;
    let mut chroma = [0.0f64; 12];

    let mut start = 0;
    while start + CHROMA_HOP <= audio.len() {
        let mag = magnitude_spectrum(&audio[start..start + CHROMA_HOP]);
        for (k, &m) in mag.iter().enumerate().take(CHROMA_HOP / 2).skip(1) {
            let freq = k as f64 * sr / CHROMA_HOP as f64;
            if !(MIN_FREQ..=MAX_FREQ).contains(&freq) {
                continue;
            }
            let semis = (12.0 * (freq / 440.0).log2()).round() as i64;
            let pitch_class = semis.rem_euclid(12) as usize;
            chroma[pitch_class] += m;
        }
        start += CHROMA_HOP;
    }

    let total: f64 = chroma.iter().sum();
    if !total.is_finite() || total <= f64::EPSILON {
        return KeyDetection::fallback();
    }

    let dominant = chroma
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.partial_cmp(b.1).unwrap_or(std::cmp::Ordering::Equal))
        .map(|(pc, _)| pc)
        .unwrap_or(0);

    // The chromagram cannot express mode directly; the third above the tonic
    // decides between the major and minor halves of the table.
    let minor_third = chroma[(dominant + 3) % 12];
    let major_third = chroma[(dominant + 4) % 12];
    let minor = minor_third > major_third;

    KeyDetection {
        camelot: CAMELOT_TABLE[dominant + if minor { 12 } else { 0 }].to_string(),
        semitone: dominant as u8,
        confidence: (chroma[dominant] / total).clamp(0.0, 1.0),
    }
}

/// Hour on the Camelot wheel, 1..=12. None for malformed codes.
pub fn camelot_number(code: &str) -> Option<u8> {
    let digits = code.get(..code.len().checked_sub(1)?)?;
    match digits.parse::<u8>() {
        Ok(n) if (1..=12).contains(&n) => Some(n),
        _ => None,
    }
}

/// Mode letter on the Camelot wheel, 'A' (minor) or 'B' (major).
pub fn camelot_letter(code: &str) -> Option<char> {
    match code.chars().last() {
        Some(c @ ('A' | 'B')) => Some(c),
        _ => None,
    }
}

/// Circular distance between two wheel hours, 0..=6. `u8::MAX` when either
/// code is malformed, which no compatibility rule accepts.
pub fn wheel_distance(a: &str, b: &str) -> u8 {
    match (camelot_number(a), camelot_number(b)) {
        (Some(na), Some(nb)) => {
            let diff = (na as i16 - nb as i16).rem_euclid(12) as u8;
            diff.min(12 - diff)
        }
        _ => u8::MAX,
    }
}

/// Harmonic compatibility: same code, one hour apart in the same mode, or
/// the relative major/minor pair (same hour, other letter).
pub fn keys_compatible(a: &str, b: &str) -> bool {
    let (Some(na), Some(nb)) = (camelot_number(a), camelot_number(b)) else {
        return false;
    };
    let (Some(la), Some(lb)) = (camelot_letter(a), camelot_letter(b)) else {
        return false;
    };

    if na == nb {
        return true; // same code or relative pair
    }
    la == lb && wheel_distance(a, b) == 1
}

/// Shortest signed pitch-class distance from `from` to `to`, in -5..=6.
pub fn semitone_delta(from: u8, to: u8) -> i32 {
    let mut d = (to as i32 - from as i32).rem_euclid(12);
    if d > 6 {
        d -= 12;
    }
    d
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn test_camelot_table_is_well_formed() {
        for code in CAMELOT_TABLE {
            let number = camelot_number(code).unwrap();
            assert!((1..=12).contains(&number));
            assert!(matches!(camelot_letter(code), Some('A' | 'B')));
        }
    }

    #[test]
    fn test_detect_key_on_tone() {
        let sr = 44100;
        let audio: Vec<f64> = (0..sr * 2)
            .map(|i| (2.0 * PI * 440.0 * i as f64 / sr as f64).sin())
            .collect();
        let key = detect_key(&audio, sr as u32);
        // A440 lands on pitch class 0
        assert_eq!(key.semitone, 0);
        assert!(key.confidence > 0.1);
        assert!(key.camelot == "11B" || key.camelot == "8A");
    }

    #[test]
    fn test_detect_key_fallback_on_silence() {
        let key = detect_key(&vec![0.0; 44100], 44100);
        assert_eq!(key, KeyDetection::fallback());
        assert_eq!(key.camelot, "1A");
    }

    #[test]
    fn test_detect_key_fallback_on_short_input() {
        assert_eq!(detect_key(&[0.1; 1024], 44100), KeyDetection::fallback());
    }

    #[test]
    fn test_compatibility_rules() {
        assert!(keys_compatible("8B", "8B"));
        assert!(keys_compatible("8B", "9B"));
        assert!(keys_compatible("8B", "7B"));
        assert!(keys_compatible("8B", "8A"));
        assert!(keys_compatible("12A", "1A")); // wheel wraps
        assert!(!keys_compatible("1A", "7A"));
        assert!(!keys_compatible("8B", "9A"));
        assert!(!keys_compatible("8B", "bogus"));
    }

    #[test]
    fn test_wheel_distance_wraps() {
        assert_eq!(wheel_distance("1A", "12A"), 1);
        assert_eq!(wheel_distance("1A", "7A"), 6);
        assert_eq!(wheel_distance("3B", "3A"), 0);
    }

    #[test]
    fn test_semitone_delta_shortest_path() {
        assert_eq!(semitone_delta(0, 1), 1);
        assert_eq!(semitone_delta(1, 0), -1);
        assert_eq!(semitone_delta(0, 7), -5);
        assert_eq!(semitone_delta(0, 6), 6);
    }
}
