//! Owned multi-channel PCM buffer shared by the analyzers and processors.
//!
//! Channels are stored planar (one `Vec<f32>` per channel) with a common
//! sample rate. Analyzers take a shared view; effect and mastering passes
//! mutate in place while they hold unique ownership.

/// Decoded PCM audio. Samples are normalized to roughly [-1, 1] but may
/// transiently exceed it until the limiter runs.
#[derive(Debug, Clone)]
pub struct AudioBuffer {
    pub sample_rate: u32,
    pub channels: Vec<Vec<f32>>,
}

impl AudioBuffer {
    /// Create a buffer of `channels` silent channels, `frames` samples each.
    pub fn silent(sample_rate: u32, channels: usize, frames: usize) -> Self {
        Self {
            sample_rate,
            channels: vec![vec![0.0; frames]; channels],
        }
    }

    /// Create a single-channel buffer from raw samples.
    pub fn from_mono(sample_rate: u32, samples: Vec<f32>) -> Self {
        Self {
            sample_rate,
            channels: vec![samples],
        }
    }

    /// Number of frames (samples per channel).
    pub fn frames(&self) -> usize {
        self.channels.first().map_or(0, Vec::len)
    }

    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }

    pub fn duration_sec(&self) -> f64 {
        if self.sample_rate == 0 {
            return 0.0;
        }
        self.frames() as f64 / self.sample_rate as f64
    }

    pub fn is_empty(&self) -> bool {
        self.frames() == 0 || self.channels.is_empty()
    }

    /// Channel `c`, falling back to the last available channel when the
    /// buffer has fewer channels than requested. Used when mixing buffers
    /// of different channel counts.
    pub fn channel_or_last(&self, c: usize) -> &[f32] {
        let idx = c.min(self.channels.len().saturating_sub(1));
        &self.channels[idx]
    }

    /// Channel-averaged mono mix in f64, the input format of the analyzers.
    pub fn mono_mix(&self) -> Vec<f64> {
        let frames = self.frames();
        if frames == 0 || self.channels.is_empty() {
            return Vec::new();
        }
        let scale = 1.0 / self.channels.len() as f64;
        (0..frames)
            .map(|i| {
                self.channels
                    .iter()
                    .map(|ch| ch.get(i).copied().unwrap_or(0.0) as f64)
                    .sum::<f64>()
                    * scale
            })
            .collect()
    }

    /// True when every sample in every channel is finite.
    pub fn all_finite(&self) -> bool {
        self.channels
            .iter()
            .all(|ch| ch.iter().all(|s| s.is_finite()))
    }
}
