//! Types for the adaptive encoding stage.

use std::path::PathBuf;

/// A preview that landed within the size budget.
#[derive(Debug, Clone)]
pub struct ProducedGif {
    /// Index of the source clip.
    pub clip_index: usize,
    /// Path of the GIF under the session's `output/` directory.
    pub path: PathBuf,
    /// The accepted trial duration in seconds.
    pub trial_duration_secs: u32,
    /// Final file size in bytes.
    pub size_bytes: u64,
}

/// A clip whose preview could not be produced.
#[derive(Debug, Clone)]
pub struct FailedPreview {
    /// Index of the source clip.
    pub clip_index: usize,
    /// Path of the source clip.
    pub clip_path: PathBuf,
    /// Human-readable failure detail.
    pub reason: String,
}

/// Outcome of the adaptive encoding stage for one session.
#[derive(Debug, Clone, Default)]
pub struct GifReport {
    /// Previews produced within budget, in clip order.
    pub produced: Vec<ProducedGif>,
    /// Clips whose preview failed, in clip order.
    pub failed: Vec<FailedPreview>,
}

impl GifReport {
    /// Number of previews produced.
    pub fn gifs_count(&self) -> usize {
        self.produced.len()
    }
}
