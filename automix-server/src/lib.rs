//! Two-track intelligent mix engine
//!
//! Analyzes a pair of decoded tracks (beats, tempo, key, energy, vocal
//! presence), plans a transition between them, renders the planned effects
//! and crossfade, and masters the result. The HTTP surface in `api` is a
//! thin layer over `engine::merge_files`.

pub mod analysis;
pub mod api;
pub mod audio;
pub mod engine;
pub mod error;
pub mod models;

pub use automix_dsp::AudioBuffer;
pub use engine::{merge_buffers, merge_files, MergeOptions, MergedResult};
pub use error::{MixError, Result};
pub use models::{MixMode, PlanOverride, TrackAnalysis, TransitionPlan, TransitionStyle};
