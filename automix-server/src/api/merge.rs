use axum::{http::StatusCode, Json};
use std::time::Instant;

use crate::audio::wav::encode_wav16;
use crate::engine::{merge_files, MergeOptions};
use crate::error::{MixError, Result};
use crate::models::request::{MergeRequest, MergeResponse};

pub async fn merge_handler(
    Json(req): Json<MergeRequest>,
) -> Result<(StatusCode, Json<MergeResponse>)> {
    let start = Instant::now();

    tracing::debug!(
        "Processing merge request: {} + {} -> {}",
        req.track_a,
        req.track_b,
        req.output_path
    );

    let options = MergeOptions {
        crossfade_seconds: req.crossfade_seconds,
        mode: req.mode,
        target_lufs: req.target_lufs,
        true_peak_ceiling_db: req.true_peak_ceiling_db,
        noise_seed: req.noise_seed,
        plan_override: req.plan_override.clone(),
    };

    let result = merge_files(&req.track_a, &req.track_b, options).await?;

    let wav = encode_wav16(&result.output)?;
    tokio::fs::write(&req.output_path, &wav)
        .await
        .map_err(|e| MixError::IoError(e))?;

    let response = MergeResponse {
        duration_sec: result.output.duration_sec(),
        sample_rate: result.output.sample_rate,
        channels: result.output.channel_count() as u16,
        plan: result.plan,
        analysis_a: result.analysis_a,
        analysis_b: result.analysis_b,
        mastering: result.mastering,
        output_path: req.output_path.clone(),
        processing_time_ms: start.elapsed().as_millis(),
    };

    tracing::info!(
        "Merged {} + {} into {} ({:.1} s of audio) in {}ms",
        req.track_a,
        req.track_b,
        req.output_path,
        response.duration_sec,
        response.processing_time_ms
    );

    Ok((StatusCode::OK, Json(response)))
}
