//! Decoding front door
//!
//! Wraps symphonia behind a single call that yields a planar f32
//! `AudioBuffer`. Whatever sample format the codec produces is converted
//! through an interleaved f32 staging buffer and split back into channels,
//! so the rest of the engine never sees codec-specific types.

use std::fs::File;
use std::path::Path;

use automix_dsp::AudioBuffer;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{Decoder, DecoderOptions};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader};
use symphonia::core::io::{MediaSourceStream, ReadOnlySource};
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

use crate::error::{MixError, Result};

struct OpenedTrack {
    reader: Box<dyn FormatReader>,
    decoder: Box<dyn Decoder>,
    track_id: u32,
    sample_rate: u32,
    channel_count: usize,
}

/// Load a track from disk as planar f32 PCM.
pub async fn load_audio(filepath: &str) -> Result<AudioBuffer> {
    let owned = filepath.to_string();
    tokio::task::spawn_blocking(move || load_audio_sync(&owned))
        .await
        .map_err(|e| MixError::InternalError(format!("decode worker died: {}", e)))?
}

pub fn load_audio_sync(filepath: &str) -> Result<AudioBuffer> {
    let OpenedTrack {
        mut reader,
        mut decoder,
        track_id,
        sample_rate,
        channel_count,
    } = open_track(filepath)?;

    let mut channels: Vec<Vec<f32>> = vec![Vec::new(); channel_count];
    let mut staging: Option<SampleBuffer<f32>> = None;

    loop {
        let packet = match reader.next_packet() {
            Ok(packet) => packet,
            // Both mark the effective end of a stream in symphonia
            Err(SymphoniaError::IoError(_)) | Err(SymphoniaError::Unsupported(_)) => break,
            Err(e) => {
                return Err(MixError::DecodingError(format!(
                    "{}: packet read failed: {}",
                    filepath, e
                )))
            }
        };
        if packet.track_id() != track_id {
            continue;
        }

        let decoded = match decoder.decode(&packet) {
            Ok(decoded) => decoded,
            // A corrupt frame is recoverable; drop it and keep draining
            Err(SymphoniaError::DecodeError(e)) => {
                tracing::warn!("{}: dropped undecodable frame: {}", filepath, e);
                continue;
            }
            Err(e) => {
                return Err(MixError::DecodingError(format!(
                    "{}: decode failed: {}",
                    filepath, e
                )))
            }
        };

        let spec = *decoded.spec();
        let per_frame = spec.channels.count();
        if per_frame == 0 {
            continue;
        }
        let staging = staging
            .get_or_insert_with(|| SampleBuffer::<f32>::new(decoded.capacity() as u64, spec));
        staging.copy_interleaved_ref(decoded);

        for frame in staging.samples().chunks_exact(per_frame) {
            for (channel, &sample) in channels.iter_mut().zip(frame) {
                channel.push(sample);
            }
        }
    }

    let frames = channels.first().map_or(0, Vec::len);
    if frames == 0 {
        return Err(MixError::InvalidAudio(format!(
            "{}: decoded no samples",
            filepath
        )));
    }
    if channels
        .iter()
        .any(|ch| ch.iter().any(|s| !s.is_finite()))
    {
        return Err(MixError::InvalidAudio(format!(
            "{}: non-finite samples in decoded stream",
            filepath
        )));
    }

    tracing::debug!(
        "Decoded {}: {} frames x {} channels at {} Hz",
        filepath,
        frames,
        channel_count,
        sample_rate
    );

    Ok(AudioBuffer {
        sample_rate,
        channels,
    })
}

/// Probe the container, pick the first decodable audio track, and stand up
/// a decoder for it.
fn open_track(filepath: &str) -> Result<OpenedTrack> {
    let file = File::open(filepath)
        .map_err(|e| MixError::FileNotFound(format!("{} ({})", filepath, e)))?;
    let stream = MediaSourceStream::new(Box::new(ReadOnlySource::new(file)), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = Path::new(filepath).extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let reader = symphonia::default::get_probe()
        .format(
            &hint,
            stream,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| MixError::UnsupportedFormat(format!("{}: {}", filepath, e)))?
        .format;

    let track = reader
        .default_track()
        .filter(|t| t.codec_params.sample_rate.is_some())
        .or_else(|| {
            reader
                .tracks()
                .iter()
                .find(|t| t.codec_params.sample_rate.is_some())
        })
        .ok_or_else(|| {
            MixError::InvalidAudio(format!("{}: no decodable audio track", filepath))
        })?;

    let track_id = track.id;
    let params = track.codec_params.clone();

    let sample_rate = params
        .sample_rate
        .ok_or_else(|| MixError::InvalidAudio(format!("{}: unknown sample rate", filepath)))?;
    let channel_count = params.channels.map_or(0, |c| c.count());
    if channel_count == 0 {
        return Err(MixError::InvalidAudio(format!(
            "{}: unknown channel layout",
            filepath
        )));
    }

    let decoder = symphonia::default::get_codecs()
        .make(&params, &DecoderOptions::default())
        .map_err(|e| {
            MixError::UnsupportedFormat(format!("{}: codec not supported ({})", filepath, e))
        })?;

    tracing::debug!(
        "Opened {}: track {} at {} Hz, {} channels",
        filepath,
        track_id,
        sample_rate,
        channel_count
    );

    Ok(OpenedTrack {
        reader,
        decoder,
        track_id,
        sample_rate,
        channel_count,
    })
}
