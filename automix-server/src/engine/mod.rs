pub mod mastering;
pub mod planner;
pub mod renderer;

pub use mastering::{MasteringConfig, MasteringReport};
pub use planner::plan_transition;
pub use renderer::{merge_buffers, MergeOptions, MergedResult};

use crate::audio::load_audio;
use crate::error::{MixError, Result};

/// File-level merge entry point: decode both tracks, then render off the
/// async runtime (the render is pure CPU).
pub async fn merge_files(
    track_a: &str,
    track_b: &str,
    options: MergeOptions,
) -> Result<MergedResult> {
    let (a, b) = tokio::try_join!(load_audio(track_a), load_audio(track_b))?;

    tokio::task::spawn_blocking(move || merge_buffers(a, b, &options))
        .await
        .map_err(|e| MixError::InternalError(format!("Task join error: {}", e)))?
}
