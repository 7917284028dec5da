//! Automix DSP - signal processing for the two-track mix engine
//!
//! Provides the analysis and processing primitives the renderer chains:
//! - Spectrum: Hann-windowed magnitude spectra and peak tests
//! - Onset/Tempo/Beatgrid: spectral-flux beats, BPM histogram, bar structure
//! - Key: chromagram detection and Camelot wheel utilities
//! - Energy/Vocal: RMS envelope and vocal-band likelihood
//! - Fx: noise sweep, reverse reverb, tape stop, stutter, EQ morph
//! - Compressor/Limiter/Loudness: the mastering tail
//! - Stereo: phase correlation and bass mono-ization

pub mod beatgrid;
pub mod buffer;
pub mod compressor;
pub mod energy;
pub mod envelope;
pub mod fx;
pub mod key;
pub mod limiter;
pub mod loudness;
pub mod onset;
pub mod spectrum;
pub mod stereo;
pub mod tempo;
pub mod vocal;

// Re-export the types the engine works with day to day
pub use buffer::AudioBuffer;
pub use compressor::{glue_compress, GlueConfig, GlueReport};
pub use key::{detect_key, keys_compatible, wheel_distance, KeyDetection};
pub use limiter::{limit_true_peak, LimiterConfig, LimiterReport};
pub use loudness::{measure_lufs, normalize_loudness, LoudnessReport};
pub use onset::OnsetDetector;
pub use stereo::{bass_mono, overlap_phase_correlation};
pub use tempo::{estimate_tempo, TempoEstimate};
