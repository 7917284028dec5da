//! One-pole attack/release envelope follower
//!
//! Level detector for the glue compressor: rising input is tracked with the
//! attack coefficient, falling input with the release coefficient.

/// One-pole envelope follower with separate attack and release times.
#[derive(Debug, Clone)]
pub struct EnvelopeFollower {
    attack_coeff: f32,
    release_coeff: f32,
    envelope: f32,
}

impl EnvelopeFollower {
    pub fn new(sample_rate: u32, attack_ms: f32, release_ms: f32) -> Self {
        Self {
            attack_coeff: coefficient(attack_ms, sample_rate),
            release_coeff: coefficient(release_ms, sample_rate),
            envelope: 0.0,
        }
    }

    /// Feed one rectified level sample, returning the smoothed envelope.
    pub fn process(&mut self, level: f32) -> f32 {
        let coeff = if level > self.envelope {
            self.attack_coeff
        } else {
            self.release_coeff
        };
        self.envelope = level + (self.envelope - level) * coeff;
        self.envelope
    }

    pub fn reset(&mut self) {
        self.envelope = 0.0;
    }

    pub fn value(&self) -> f32 {
        self.envelope
    }
}

/// Exponential smoothing coefficient for a time constant in milliseconds.
fn coefficient(time_ms: f32, sample_rate: u32) -> f32 {
    let time_samples = time_ms * 0.001 * sample_rate as f32;
    if time_samples <= 0.0 {
        return 0.0;
    }
    (-1.0 / time_samples).exp()
}
