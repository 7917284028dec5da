//! Canonical 44-byte RIFF/WAVE PCM16 container
//!
//! Encoding clamps to [-1, 1] and uses the asymmetric scale (0x8000 negative,
//! 0x7FFF positive) so decode round-trips within one LSB.

use automix_dsp::AudioBuffer;

use crate::error::{MixError, Result};

const HEADER_LEN: usize = 44;

/// Encode a buffer as interleaved 16-bit PCM in a canonical WAV container.
pub fn encode_wav16(buffer: &AudioBuffer) -> Result<Vec<u8>> {
    let channels = buffer.channel_count();
    let frames = buffer.frames();
    if channels == 0 || frames == 0 {
        return Err(MixError::EncodingError("empty buffer".to_string()));
    }
    if buffer.sample_rate == 0 {
        return Err(MixError::EncodingError("zero sample rate".to_string()));
    }

    let data_len = frames
        .checked_mul(channels)
        .and_then(|n| n.checked_mul(2))
        .filter(|&n| n <= u32::MAX as usize - 36)
        .ok_or_else(|| MixError::EncodingError("output too long for WAV".to_string()))?;

    let sr = buffer.sample_rate;
    let block_align = (channels * 2) as u16;
    let byte_rate = sr * channels as u32 * 2;

    let mut out = Vec::with_capacity(HEADER_LEN + data_len);
    out.extend_from_slice(b"RIFF");
    out.extend_from_slice(&(36 + data_len as u32).to_le_bytes());
    out.extend_from_slice(b"WAVE");
    out.extend_from_slice(b"fmt ");
    out.extend_from_slice(&16u32.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes()); // PCM
    out.extend_from_slice(&(channels as u16).to_le_bytes());
    out.extend_from_slice(&sr.to_le_bytes());
    out.extend_from_slice(&byte_rate.to_le_bytes());
    out.extend_from_slice(&block_align.to_le_bytes());
    out.extend_from_slice(&16u16.to_le_bytes()); // bits per sample
    out.extend_from_slice(b"data");
    out.extend_from_slice(&(data_len as u32).to_le_bytes());

    for i in 0..frames {
        for ch in &buffer.channels {
            let x = ch[i].clamp(-1.0, 1.0);
            let v = if x < 0.0 {
                (x * 0x8000 as f32) as i16
            } else {
                (x * 0x7FFF as f32) as i16
            };
            out.extend_from_slice(&v.to_le_bytes());
        }
    }

    Ok(out)
}

/// Decode a canonical PCM16 WAV produced by `encode_wav16`. Used by the
/// round-trip tests and as a cheap import path for the engine's own output.
pub fn decode_wav16(bytes: &[u8]) -> Result<AudioBuffer> {
    if bytes.len() < HEADER_LEN {
        return Err(MixError::DecodingError("WAV too short".to_string()));
    }
    if &bytes[0..4] != b"RIFF" || &bytes[8..12] != b"WAVE" || &bytes[12..16] != b"fmt " {
        return Err(MixError::DecodingError("not a RIFF/WAVE file".to_string()));
    }

    let format = u16::from_le_bytes([bytes[20], bytes[21]]);
    if format != 1 {
        return Err(MixError::UnsupportedFormat(format!(
            "WAV format tag {} (want PCM)",
            format
        )));
    }
    let channels = u16::from_le_bytes([bytes[22], bytes[23]]) as usize;
    let sample_rate = u32::from_le_bytes([bytes[24], bytes[25], bytes[26], bytes[27]]);
    let bits = u16::from_le_bytes([bytes[34], bytes[35]]);
    if bits != 16 {
        return Err(MixError::UnsupportedFormat(format!(
            "{}-bit WAV (want 16)",
            bits
        )));
    }
    if channels == 0 || sample_rate == 0 {
        return Err(MixError::DecodingError("degenerate WAV header".to_string()));
    }
    if &bytes[36..40] != b"data" {
        return Err(MixError::DecodingError(
            "non-canonical WAV chunk layout".to_string(),
        ));
    }

    let data_len =
        u32::from_le_bytes([bytes[40], bytes[41], bytes[42], bytes[43]]) as usize;
    let data = bytes
        .get(HEADER_LEN..HEADER_LEN + data_len)
        .ok_or_else(|| MixError::DecodingError("WAV data truncated".to_string()))?;

    let frames = data.len() / (channels * 2);
    let mut out = vec![Vec::with_capacity(frames); channels];
    for frame in 0..frames {
        for (ch, samples) in out.iter_mut().enumerate() {
            let off = (frame * channels + ch) * 2;
            let v = i16::from_le_bytes([data[off], data[off + 1]]);
            let x = if v < 0 {
                v as f32 / 0x8000 as f32
            } else {
                v as f32 / 0x7FFF as f32
            };
            samples.push(x);
        }
    }

    Ok(AudioBuffer {
        sample_rate,
        channels: out,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_layout() {
        let buf = AudioBuffer::silent(44100, 2, 100);
        let bytes = encode_wav16(&buf).unwrap();

        assert_eq!(&bytes[0..4], b"RIFF");
        assert_eq!(&bytes[8..12], b"WAVE");
        assert_eq!(bytes.len(), 44 + 100 * 2 * 2);
        // Byte rate = sr * channels * 2
        let byte_rate = u32::from_le_bytes([bytes[28], bytes[29], bytes[30], bytes[31]]);
        assert_eq!(byte_rate, 44100 * 2 * 2);
    }

    #[test]
    fn test_round_trip_within_one_lsb() {
        let samples: Vec<f32> = (0..1000).map(|i| ((i as f32) * 0.013).sin() * 0.8).collect();
        let buf = AudioBuffer {
            sample_rate: 48000,
            channels: vec![samples.clone(), samples.iter().map(|s| -s).collect()],
        };

        let decoded = decode_wav16(&encode_wav16(&buf).unwrap()).unwrap();
        assert_eq!(decoded.sample_rate, 48000);
        assert_eq!(decoded.channel_count(), 2);
        assert_eq!(decoded.frames(), 1000);

        let tolerance = 1.0 / 32768.0;
        for (a, b) in buf.channels[0].iter().zip(decoded.channels[0].iter()) {
            assert!((a - b).abs() <= tolerance);
        }
    }

    #[test]
    fn test_out_of_range_samples_clamp() {
        let buf = AudioBuffer::from_mono(44100, vec![2.0, -2.0]);
        let decoded = decode_wav16(&encode_wav16(&buf).unwrap()).unwrap();
        assert!((decoded.channels[0][0] - 1.0).abs() < 1e-4);
        assert!((decoded.channels[0][1] + 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_empty_buffer_rejected() {
        let buf = AudioBuffer::silent(44100, 1, 0);
        assert!(encode_wav16(&buf).is_err());
    }

    #[test]
    fn test_garbage_bytes_rejected() {
        assert!(decode_wav16(b"definitely not a wav").is_err());
        assert!(decode_wav16(&[0u8; 100]).is_err());
    }
}
