use serde::{Deserialize, Serialize};

use super::plan::{MixMode, PlanOverride, TransitionPlan};
use super::summary::TrackAnalysis;
use crate::engine::mastering::MasteringReport;

fn default_crossfade_seconds() -> f64 {
    8.0
}

fn default_target_lufs() -> f32 {
    -14.0
}

fn default_true_peak_ceiling_db() -> f32 {
    -1.0
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MergeRequest {
    pub track_a: String,
    pub track_b: String,
    pub output_path: String,
    /// Advisory; the rendered crossfade is clamped by available samples.
    #[serde(default = "default_crossfade_seconds")]
    pub crossfade_seconds: f64,
    #[serde(default)]
    pub mode: MixMode,
    #[serde(default = "default_target_lufs")]
    pub target_lufs: f32,
    #[serde(default = "default_true_peak_ceiling_db")]
    pub true_peak_ceiling_db: f32,
    /// Seed for the noise-sweep PRNG; fixed so renders reproduce.
    #[serde(default)]
    pub noise_seed: u64,
    #[serde(default)]
    pub plan_override: Option<PlanOverride>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct MergeResponse {
    pub plan: TransitionPlan,
    pub analysis_a: TrackAnalysis,
    pub analysis_b: TrackAnalysis,
    pub mastering: MasteringReport,
    pub output_path: String,
    pub duration_sec: f64,
    pub sample_rate: u32,
    pub channels: u16,
    pub processing_time_ms: u128,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub uptime_sec: u64,
}
